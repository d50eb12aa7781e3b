pub mod config;
pub mod logging;
pub mod resources;
pub mod runner;

pub use runner::{run, RunSettings};
