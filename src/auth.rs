//! Token model, redacted secrets, and request-signing helpers.

pub mod secret;
pub mod sign;
pub mod token;

pub use secret::*;
pub use sign::*;
pub use token::*;
