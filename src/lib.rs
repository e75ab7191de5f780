// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod specs;

pub mod csv;
pub mod data;
pub mod error;
pub mod log;
pub mod policy;
pub mod progress;
pub mod runner;
pub mod store;
pub mod verify;

pub use error::{CerberusResult, Error};
