use std::path::PathBuf;

use clap::Parser;

use crate::config::SpaceOrder;

/// dump-ch2 - Generate a TVTest/BonDriver .ch2 channel file from Mirakurun, mirakc or EPGStation
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Output path.{n}
    /// Defaults to `<type>.ch2`.
    #[clap(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// BonDriver type.{n}
    /// One of BonDriver_Mirakurun, BonDriver_mirakc or BonDriver_EPGStation.
    #[clap(short = 't', long = "type", value_name = "TYPE")]
    pub bondriver_type: Option<String>,

    /// Mirakurun/mirakc scheme. [default: http]
    #[clap(long)]
    pub mirakurun_scheme: Option<String>,

    /// Mirakurun/mirakc address. [default: 127.0.0.1]
    #[clap(long)]
    pub mirakurun_host: Option<String>,

    /// Mirakurun/mirakc port. [default: 40772]
    #[clap(long)]
    pub mirakurun_port: Option<u16>,

    /// EPGStation scheme. [default: http]
    #[clap(long)]
    pub epgstation_scheme: Option<String>,

    /// EPGStation address. [default: 127.0.0.1]
    #[clap(long)]
    pub epgstation_host: Option<String>,

    /// EPGStation port. [default: 8888]
    #[clap(long)]
    pub epgstation_port: Option<u16>,

    /// Scheme of a second Mirakurun/mirakc used for transport stream IDs. [default: http]
    #[clap(long)]
    pub tsid_scheme: Option<String>,

    /// Address of a second Mirakurun/mirakc used for transport stream IDs.{n}
    /// When set, its TSIDs take precedence over the primary source.
    #[clap(long)]
    pub tsid_host: Option<String>,

    /// Port of a second Mirakurun/mirakc used for transport stream IDs. [default: 40772]
    #[clap(long)]
    pub tsid_port: Option<u16>,

    /// Request header sent to every API, e.g. "Authorization: Basic ...".{n}
    /// May be given multiple times.
    #[clap(short = 'H', long = "header", value_name = "KEY: VALUE")]
    pub headers: Vec<String>,

    /// Normalize service names (convert full-width characters to half-width).
    #[clap(short, long)]
    pub normalize: bool,

    /// Disable services without any scheduled program in the next 7 days.
    #[clap(short, long)]
    pub strip: bool,

    /// Order of tuning spaces. [default: first-seen]
    #[clap(value_enum, long)]
    pub space_order: Option<SpaceOrder>,

    /// Configuration file path.{n}
    /// `dump-ch2.toml` in the working directory is used when present.
    #[clap(short = 'f', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging.
    #[clap(short, long)]
    pub verbose: bool,

    /// Directory where log files are stored.{n}
    /// Logs go to the console only when unset.
    #[clap(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Number of days to keep log files. [default: 7]
    #[clap(long)]
    pub log_retention_days: Option<u64>,
}
