use thiserror::Error;

use crate::core::types::EntityId;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Invalid weapon '{name}': {reason}")]
    InvalidWeapon { name: String, reason: String },

    #[error("Invalid utility '{name}': {reason}")]
    InvalidUtility { name: String, reason: String },

    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),

    #[error("Unknown utility: {0}")]
    UnknownUtility(String),

    #[error("Unknown personality preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Bot already registered: {0}")]
    DuplicateBot(EntityId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
