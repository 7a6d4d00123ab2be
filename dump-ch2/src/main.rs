//! dump-ch2: Generate a TVTest/BonDriver .ch2 channel file from Mirakurun,
//! mirakc or EPGStation.

use clap::Parser;
use log::{error, info};

use dump_ch2::config::{self, ConfigFile, Settings};
use dump_ch2::context::Args;
use dump_ch2::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load config file: explicit path > auto-detect > default
    let file_config = match config::find_config(args.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Ok(c) => {
                eprintln!("Loaded config from: {}", path.display());
                c
            }
            Err(e) => {
                eprintln!("Failed to load config file: {}", e);
                return Err(e.into());
            }
        },
        None => ConfigFile::default(),
    };

    let settings = match Settings::resolve(&args, file_config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return Err(e.into());
        }
    };

    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("dump-ch2 starting...");
    info!("  Type: {}", settings.bondriver_type);
    info!("  Mirakurun: {}", settings.mirakurun);
    info!("  EPGStation: {}", settings.epgstation);
    if let Some(tsid_source) = &settings.tsid_source {
        info!("  TSID source: {}", tsid_source);
    }
    info!("  Output: {}", settings.output.display());
    info!(
        "  Normalize: {}, Strip: {}, Space order: {:?}, Request headers: {}",
        settings.normalize,
        settings.strip,
        settings.space_order,
        settings.headers.len()
    );

    match dump_ch2::execute(&settings).await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
