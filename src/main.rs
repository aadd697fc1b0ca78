mod config;
mod dataset;
mod factors;
mod instrumentation;
mod llm;
mod session;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::{Config, Locale};
use factors::{ManualFactors, SoilType};
use session::{Session, DEFAULT_PREVIEW_ROWS};

#[derive(Parser)]
#[command(name = "landslide-console", about = "Landslide factor summaries and remote Q&A")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Display language (en or zh)
    #[arg(long, global = true)]
    lang: Option<Locale>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Interactive,
    /// Summarize hand-set factor values
    Manual {
        /// Precipitation in mm (0-500)
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(0..=500))]
        precipitation: u32,
        /// Soil type: clay, sand, loam or gravel
        #[arg(long, default_value = "clay")]
        soil: SoilType,
        /// Slope angle in degrees (0-90)
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(0..=90))]
        slope: u32,
        /// Vegetation cover in percent (0-100)
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(0..=100))]
        vegetation: u32,
    },
    /// Summarize a .csv (comma) or .txt (tab) file
    Upload {
        path: PathBuf,
        /// Number of rows to preview
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        preview: usize,
    },
    /// Send one question to the remote API
    Ask {
        question: String,
        /// API key (overrides LANDSLIDE_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    instrumentation::init_tracing(cli.log_json);

    let mut config = Config::from_env()?;
    if let Some(lang) = cli.lang {
        config.locale = lang;
    }
    let mut session = Session::new(&config);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            session::run_interactive(&mut session).await?;
        }
        Commands::Manual {
            precipitation,
            soil,
            slope,
            vegetation,
        } => {
            session.set_factors(ManualFactors::new(precipitation, soil, slope, vegetation));
            println!("{}", session.render_manual());
        }
        Commands::Upload { path, preview } => {
            session.set_preview_rows(preview);
            let text = session.upload(&path)?;
            println!("{}", text);
        }
        Commands::Ask { question, api_key } => {
            if let Some(key) = api_key {
                session.set_api_key(&key);
            }
            let reply = session.ask(&question).await?;
            println!("{}", reply);
        }
    }

    Ok(())
}
