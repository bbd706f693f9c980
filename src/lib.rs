pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod symbols;

pub use error::{Error, Result};
