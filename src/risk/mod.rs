// Risk management module
pub mod monitor;

pub use monitor::{ExitReason, PositionExit, RiskConfig, RiskMonitor, RiskReport};
