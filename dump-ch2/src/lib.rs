//! dump-ch2 - TVTest/BonDriver channel file generator.
//!
//! Reads services from Mirakurun/mirakc or channels from EPGStation and writes
//! a `.ch2` file for BonDriver_Mirakurun, BonDriver_mirakc or
//! BonDriver_EPGStation.

pub mod app;
pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod external;
pub mod logging;
pub mod normalize;

pub use app::execute;
pub use builder::{ChannelListBuilder, ChannelRecord, TsidTable};
pub use config::{BonDriverType, Settings, SpaceOrder};
pub use error::{DumpError, Result};
