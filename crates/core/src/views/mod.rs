//! Page state for the site's views.
//!
//! Each view holds what its page renders and turns user actions into
//! service calls.

#![allow(missing_docs)]

pub mod film;
pub mod shot_detail;
pub mod shot_list;
pub mod upload;

pub use film::FilmPlayer;
pub use shot_detail::{SIGN_IN_TO_VOTE, ShotDetailView, VOTE_FAILED, apply_optimistic_vote};
pub use shot_list::{ShotListView, ShotSummary, TopVideo};
pub use upload::{SelectedFile, UploadForm, UploadProgress, UploadStatus, progress_percent};
