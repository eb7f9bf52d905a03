//! Tick behaviour engine for rabbits walking and falling over block terrain.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod sim;
