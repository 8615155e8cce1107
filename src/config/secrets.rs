//! Secret handling utilities.
//!
//! Re-exports secrecy types for working with secrets in the redress context.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
