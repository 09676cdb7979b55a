// Core modules
pub mod execution;
pub mod indicators;
pub mod market;
pub mod models;
pub mod risk;
pub mod scheduler;
pub mod settings;
pub mod strategy;

// Re-export commonly used types
pub use models::*;
pub use scheduler::{BotState, CycleEngine, TradingBot};
pub use settings::Settings;
pub use strategy::Strategy;
