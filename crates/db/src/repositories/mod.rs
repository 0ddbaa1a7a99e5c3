//! Repositories for database operations.

mod shot;
mod video;
mod vote;

pub use shot::{ShotRepository, ShotWithTopVideo};
pub use video::{VideoRepository, VideoWithVotes};
pub use vote::VoteRepository;
