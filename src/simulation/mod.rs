//! Per-tick driver for all bots

pub mod director;

pub use director::{BotDirector, BotSpec};
