//! Business logic services.

#![allow(missing_docs)]

pub mod identity;
pub mod memory_store;
pub mod session;
pub mod shot;
pub mod store;
pub mod video;
pub mod vote;

pub use identity::{
    Identity, IdentityProvider, IdentityService, StaticIdentityProvider, SupabaseAuth,
};
pub use memory_store::MemoryStore;
pub use session::AuthSession;
pub use shot::ShotService;
pub use store::{DataStore, DataStoreService, NewVideo, SeaOrmStore};
pub use video::{
    MAX_DESCRIPTION_LENGTH, MAX_VIDEO_SIZE, UploadInput, VideoService, is_video_content_type,
    normalize_description, validate_video_file,
};
pub use vote::{VoteOutcome, VoteService};
