//! Database entities.

pub mod shot;
pub mod video;
pub mod vote;

pub use shot::Entity as Shot;
pub use video::Entity as Video;
pub use vote::Entity as Vote;
