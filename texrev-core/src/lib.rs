//! Core of texrev: the line diff engine behind reviewing AI suggestions for a
//! LaTeX document, the pending-suggestion state machine, the chat provider
//! capability, the compile service client, and the SQLite document store.

pub mod assistant;
pub mod compile;
pub mod db;
pub mod diff;
pub mod document;
pub mod error;
pub mod provider;
pub mod schema;
pub mod session;
pub mod types;

pub use error::{Error, Result};
