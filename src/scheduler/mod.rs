// Trading cycle scheduling: cadence, one decision cycle, start/stop lifecycle
pub mod bot;
pub mod cycle;
pub mod timeframe;

pub use bot::{BotError, BotState, TradingBot};
pub use cycle::{CycleEngine, CycleError, CycleReport};
pub use timeframe::timeframe_to_interval;

#[cfg(test)]
mod test_support;
