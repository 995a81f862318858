use clap::Parser;
use image_register::application::query_similar::format_matches;
use image_register::cli::commands::{Cli, Commands};
use image_register::config::Settings;
use image_register::domain::ports::catalog_source::CatalogSource;
use image_register::infrastructure::catalog::json_catalog::JsonCatalog;
use image_register::ImageRegister;
use std::error::Error;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run_command(cli.command).await {
        report_error(e.as_ref());
        std::process::exit(1);
    }
}

async fn run_command(cmd: Commands) -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;

    match cmd {
        Commands::Register {
            catalog,
            delay_ms,
            allow_duplicate_ids,
            json,
        } => {
            // Validate the catalog before paying for the model load.
            let records = JsonCatalog::new(catalog)
                .allow_duplicate_ids(allow_duplicate_ids)
                .load_all()?;
            info!(count = records.len(), "Loaded catalog");

            let ir = ImageRegister::connect(&settings, Duration::from_millis(delay_ms)).await?;
            let report = ir.register_all(&records).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
        Commands::Query { image, top_k } => {
            let ir = ImageRegister::connect(&settings, Duration::ZERO).await?;
            let matches = ir.query_similar(&image, top_k).await?;
            print!("{}", format_matches(&matches));
        }
    }
    Ok(())
}

/// Print the error with its full cause chain and debug form.
fn report_error(e: &dyn Error) {
    eprintln!("Error: {e}");
    let mut source = e.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    eprintln!("Details: {e:?}");
}
