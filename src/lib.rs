pub mod config;
pub mod console;
pub mod error;
pub mod terminal;
pub mod utils;
