use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use housing_catalog::commands::{report, seed, ReportOptions, SeedOptions};
use housing_catalog::config::Settings;
use housing_catalog::web::{self, AppState};

#[derive(Debug, Parser)]
#[command(name = "housing-catalog", version, about = "Real-estate listing catalog")]
struct Cli {
    /// Settings file (defaults to ./housing-catalog.toml when present)
    #[arg(long, global = true, env = "HOUSING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the public site
    Serve {
        /// Override the bind address, e.g. 0.0.0.0:8000
        #[arg(long)]
        bind: Option<String>,
    },
    /// Fill the catalog with synthetic listings and demo images
    Seed {
        #[arg(long, default_value_t = 50)]
        n: usize,
        /// Delete every listing first
        #[arg(long)]
        truncate: bool,
        /// Share of listings priced in USD
        #[arg(long, default_value_t = 0.30)]
        usd_ratio: f64,
        /// RNG seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,
        /// Directory with source pictures
        #[arg(long)]
        images_dir: Option<PathBuf>,
        /// Delete stored listing media first
        #[arg(long)]
        purge_media: bool,
        /// Share of listings left as drafts
        #[arg(long, default_value_t = 0.0)]
        draft_ratio: f64,
    },
    /// Show listings and the media files they reference
    Report {
        #[arg(long, default_value_t = 50)]
        limit: u64,
        /// Ids such as "1,2,10-15"
        #[arg(long)]
        ids: Option<String>,
        /// Include gallery images
        #[arg(long)]
        related: bool,
        /// Also export rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                settings.server.bind = bind;
            }
            info!("🏠 Housing Catalog");
            web::serve(AppState::from_settings(settings)?).await
        }
        Command::Seed {
            n,
            truncate,
            usd_ratio,
            seed,
            images_dir,
            purge_media,
            draft_ratio,
        } => {
            let state = AppState::from_settings(settings)?;
            let options = SeedOptions {
                count: n,
                truncate,
                usd_ratio,
                seed,
                images_dir,
                purge_media,
                draft_ratio,
            };
            seed::run(&state.db, state.storage.as_ref(), &options).await?;
            Ok(())
        }
        Command::Report {
            limit,
            ids,
            related,
            csv,
            json,
        } => {
            let state = AppState::from_settings(settings)?;
            let options = ReportOptions {
                limit,
                ids,
                related,
                csv,
                json,
                database: state.settings.database.path.display().to_string(),
            };
            let mut stdout = std::io::stdout().lock();
            report::run(&state.db, state.storage.as_ref(), &options, &mut stdout).await?;
            Ok(())
        }
    }
}
