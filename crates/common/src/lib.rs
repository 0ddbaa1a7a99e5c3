//! Common utilities and shared types for the Napoleon film server.
//!
//! This crate provides foundational components used across all workspace crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Storage**: Object storage backends (local, managed backend, S3-compatible)
//!
//! # Example
//!
//! ```no_run
//! use napoleon_common::{Config, AppResult, video_storage_key};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let key = video_storage_key(3, "user-1", "take.mp4");
//!     println!("{} -> {}", config.server.url, key);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use storage::{
    LocalStorage, NoOpStorage, StorageBackend, StorageConfig, StorageService, SupabaseStorage,
    UploadedFile, build_storage, video_storage_key, video_storage_key_at,
};
