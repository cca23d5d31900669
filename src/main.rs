//! Alliance Observatory
//!
//! ```bash
//! # Web front end on 0.0.0.0:4000
//! observatory serve
//!
//! # One-shot report
//! observatory report --wallet terra1... --out report.html
//! observatory report --wallet terra1... --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use alliance_observatory::analysis::WalletAnalyzer;
use alliance_observatory::api;
use alliance_observatory::api::normalize_wallet;
use alliance_observatory::config::load_config;
use alliance_observatory::metrics::init_metrics;
use alliance_observatory::render::render_report_page;
use alliance_observatory::telemetry::{init_tracing, TelemetryConfig};

#[derive(Parser, Debug)]
#[clap(name = "observatory", version)]
#[clap(about = "Game of Alliances staking rewards observatory", long_about = None)]
struct Cli {
    /// Config file (default: ./config.toml when present)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Log format: "pretty" or "json"
    #[clap(long, global = true)]
    log_format: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web front end
    Serve {
        /// Listen address, overrides server.bind_addr
        #[clap(long)]
        bind: Option<String>,
    },
    /// Analyse one wallet and write its report
    Report {
        #[clap(long)]
        wallet: String,

        /// Output file (stdout when omitted)
        #[clap(long)]
        out: Option<PathBuf>,

        /// Dump the raw report as JSON instead of HTML
        #[clap(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = load_config(cli.config.as_deref())?;

    let mut telemetry = TelemetryConfig::from(&settings.logging);
    if let Some(format) = cli.log_format {
        telemetry.log_format = format;
    }
    init_tracing(telemetry)?;
    init_metrics()?;

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                settings.server.bind_addr = bind;
            }
            api::serve(&settings).await?;
        }
        Command::Report { wallet, out, json } => {
            let wallet = normalize_wallet(&wallet);
            let analyzer = WalletAnalyzer::new(&settings)?;
            let result = analyzer.analyze(&wallet).await;

            let output = if json {
                serde_json::to_string_pretty(&result?)?
            } else {
                render_report_page(
                    &settings.server.base_url,
                    &wallet,
                    &result,
                    analyzer.registry().ibc_denoms(),
                )
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, output)?;
                    tracing::info!(path = %path.display(), "Report written");
                }
                None => println!("{}", output),
            }
        }
    }

    Ok(())
}
