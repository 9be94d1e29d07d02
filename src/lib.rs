pub mod cli;
pub mod columns;
pub mod combine;
pub mod document;
pub mod error;
pub mod io_utils;
pub mod key;
pub mod merge;
pub mod process;
pub mod rows;
pub mod scanner;
pub mod table;
pub mod transform;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    document::Document,
    error::{Anomaly, StarError},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("star_managed", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Transform(args) => process::execute_transform(&args),
        Commands::Preset(args) => process::execute_preset(&args),
        Commands::Combine(args) => combine::execute(&args),
        Commands::Columns(args) => columns::execute(&args),
    }
}
