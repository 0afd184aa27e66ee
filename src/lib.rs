pub mod config;
pub mod error;
pub mod simulation;
pub mod world;
