//! Arena Bots - decision engine for bot players in an arena shooter

pub mod ai;
pub mod core;
pub mod simulation;
pub mod world;
