// src/lib.rs

#[macro_use]
pub mod macros;

pub mod config;
pub mod core;
pub mod error;

pub mod model;
pub mod tree;
pub mod loader;
pub mod flatten;
pub mod schema;

pub mod file;
pub mod progress;
pub mod report;
pub mod runner;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod log;

pub use error::FlattenError;
pub use runner::run;
