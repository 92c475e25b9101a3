//! `guardian-viewer` — terminal dashboard connecting to the engine's
//! WebSocket stream for live service status.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[cfg(feature = "dashboard")]
use guardia_topology::viewer::App;

#[derive(Parser, Debug)]
#[command(name = "guardian-viewer")]
struct Args {
    /// Viewer configuration file path.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Engine API URL (overrides the config file).
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = dirs::data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap())
        .join("guardian-topology")
        .join("viewer.log");

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    match std::fs::OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            tracing_subscriber::fmt().with_target(false).with_writer(file).init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(tracing::Level::ERROR)
                .init();
        }
    }

    #[cfg(feature = "dashboard")]
    {
        let args = Args::parse();
        let config = guardia_topology::viewer::Config::load(args.config.as_deref())?;
        let config = guardia_topology::viewer::Config {
            api_url: args.url.unwrap_or(config.api_url),
            ..config
        };

        let mut app = App::new(config)?;
        app.run().await?;
    }

    #[cfg(not(feature = "dashboard"))]
    {
        eprintln!("this binary was compiled without dashboard support");
        eprintln!("rebuild with: cargo build --features dashboard");
        std::process::exit(1);
    }

    Ok(())
}
