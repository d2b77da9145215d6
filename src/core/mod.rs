pub mod config;
pub mod error;
pub mod types;

pub use config::AiConfig;
pub use error::{BotError, Result};
pub use types::{EntityId, Seconds, Team, Vec2, WorldBounds, FREE_FOR_ALL};
