
pub mod core;
pub mod configs;
pub mod connections;
pub mod loggers;
pub mod utils;
pub mod workflows;

pub use core::error::RpaError;
