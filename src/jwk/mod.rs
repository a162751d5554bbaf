mod cache;
mod config;
mod error;
mod key;
mod verifier;

pub use error::*;

pub use cache::*;
pub use config::*;
pub use key::*;
pub use verifier::*;
