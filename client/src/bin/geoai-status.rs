use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use geoai_client::{ApiClient, ClientConfig, ClientError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "geoai-status")]
#[command(about = "Show backend health, plugins and datasets for the GeoAI platform", long_about = None)]
struct Cli {
    /// Overrides GEOAI_API_BASE_URL.
    #[arg(short, long)]
    base_url: Option<String>,

    /// Per-request timeout; overrides GEOAI_API_TIMEOUT_MS.
    #[arg(short, long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geoai_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(ms);
    }

    let client = ApiClient::with_config(&config);
    println!("API Base URL: {}", client.base_url());

    let (health, plugins, datasets) =
        tokio::join!(client.health(None), client.plugins(None), client.datasets(None));

    let mut ok = true;

    match health {
        Ok(h) => println!("health: status={} core_loaded={}", h.status, h.core_loaded),
        Err(e) => ok &= report("health", &e),
    }

    match plugins {
        Ok(p) if p.plugins.is_empty() => println!("plugins: none"),
        Ok(p) => {
            println!("plugins:");
            for name in p.plugins {
                println!("  {name}");
            }
        }
        Err(e) => ok &= report("plugins", &e),
    }

    match datasets {
        Ok(d) if d.is_empty() => println!("datasets: none"),
        Ok(d) => {
            println!("datasets:");
            for ds in d {
                println!("  {}  {}  {}", ds.id, ds.name, ds.created_at);
            }
        }
        Err(e) => ok &= report("datasets", &e),
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report(section: &str, err: &ClientError) -> bool {
    match err.as_api().and_then(|e| e.detail.as_ref()) {
        Some(detail) => println!("{section}: error: {err} ({detail})"),
        None => println!("{section}: error: {err}"),
    }
    false
}
