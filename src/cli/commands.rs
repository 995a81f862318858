use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-register", about = "Embed catalog images and register them in a vector index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed every catalog item and upsert it into the index
    Register {
        /// JSON catalog with an `items` list
        #[arg(long, default_value = "data/items.json")]
        catalog: PathBuf,
        /// Pause after each successful registration, in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,
        /// Warn on repeated image_name values instead of refusing the catalog
        #[arg(long)]
        allow_duplicate_ids: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find the indexed images most similar to one image
    Query {
        image: PathBuf,
        #[arg(long, default_value = "5")]
        top_k: usize,
    },
}
