//! Configuration types
//!
//! Controller configuration, readable from TOML and storable as postcard
//! binary data.

#[cfg(feature = "toml")]
pub mod loader;
pub mod types;

pub use types::*;
