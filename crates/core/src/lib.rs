//! Core application logic for the Napoleon film server.
//!
//! - **services**: the data-store and identity interfaces with their
//!   adapters, plus voting, uploads and listings
//! - **views**: per-page state (shot list, shot detail, film player, upload form)

pub mod services;
pub mod views;

#[cfg(test)]
mod testing;

pub use services::*;
pub use views::*;
