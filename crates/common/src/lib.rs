//! Shared types for the Lucidtech AI Services SDK crates

mod secret;
mod error;

pub use secret::Secret;
pub use error::{Error, Result};
