pub mod cache;
pub mod config;
pub mod diag;
pub mod error;
pub mod extract;
pub mod generate;
pub mod logging;
pub mod model;
pub mod processor;
pub mod validate;

pub use error::Result;
pub use processor::RegistryProcessor;
