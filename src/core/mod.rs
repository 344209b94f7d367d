pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SiegeConfig, StrategyLock};
pub use error::{Result, SiegeError};
