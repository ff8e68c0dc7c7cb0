// src/lib.rs

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod publish;
pub mod server;
pub mod service;
pub mod signal;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
