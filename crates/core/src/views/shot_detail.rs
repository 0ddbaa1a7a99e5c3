//! Shot detail page state: a shot, its submissions, and voting.

use napoleon_common::{AppError, AppResult};
use napoleon_db::{entities::shot, repositories::VideoWithVotes};
use tokio::sync::watch;

use crate::services::{Identity, ShotService, VoteOutcome, VoteService};

/// Banner shown when an anonymous viewer tries to vote.
pub const SIGN_IN_TO_VOTE: &str = "Please sign in to vote";

/// Banner shown when a vote could not be recorded.
pub const VOTE_FAILED: &str = "Failed to register vote. Please try again.";

/// Flip a video's vote flag and adjust its count to match.
pub fn apply_optimistic_vote(video: &mut VideoWithVotes) {
    video.has_voted = !video.has_voted;
    video.votes_count += if video.has_voted { 1 } else { -1 };
}

/// A speculative vote patch over the displayed list.
///
/// Unless [`commit`](Self::commit)ted, dropping the patch puts the last
/// authoritative list back, so an abandoned or failed toggle never leaves
/// speculative counts on screen.
struct OptimisticPatch<'a> {
    displayed: &'a mut Vec<VideoWithVotes>,
    rollback: Option<Vec<VideoWithVotes>>,
}

impl<'a> OptimisticPatch<'a> {
    fn apply(
        displayed: &'a mut Vec<VideoWithVotes>,
        confirmed: &[VideoWithVotes],
        video_id: i64,
    ) -> Self {
        if let Some(video) = displayed.iter_mut().find(|v| v.id == video_id) {
            apply_optimistic_vote(video);
        }
        Self {
            displayed,
            rollback: Some(confirmed.to_vec()),
        }
    }

    fn snapshot(&self) -> Vec<VideoWithVotes> {
        self.displayed.clone()
    }

    fn commit(mut self) {
        self.rollback = None;
    }
}

impl Drop for OptimisticPatch<'_> {
    fn drop(&mut self) {
        if let Some(confirmed) = self.rollback.take() {
            *self.displayed = confirmed;
        }
    }
}

/// State of the shot detail page for one viewer.
pub struct ShotDetailView {
    shots: ShotService,
    votes: VoteService,
    shot: shot::Model,
    viewer: Option<Identity>,
    /// What the page shows; may hold a speculative vote.
    videos: Vec<VideoWithVotes>,
    /// Last list fetched from the store.
    confirmed: Vec<VideoWithVotes>,
    error: Option<String>,
    rendered: watch::Sender<Vec<VideoWithVotes>>,
}

impl ShotDetailView {
    /// Fetch the shot and its submissions.
    pub async fn load(
        shots: ShotService,
        votes: VoteService,
        shot_id: i64,
        viewer: Option<Identity>,
    ) -> AppResult<Self> {
        let shot = shots.get(shot_id).await?;
        let videos = shots.videos(shot_id, viewer.as_ref()).await?;
        let (rendered, _) = watch::channel(videos.clone());

        Ok(Self {
            shots,
            votes,
            shot,
            viewer,
            confirmed: videos.clone(),
            videos,
            error: None,
            rendered,
        })
    }

    /// The shot.
    #[must_use]
    pub const fn shot(&self) -> &shot::Model {
        &self.shot
    }

    /// Submissions as currently displayed.
    #[must_use]
    pub fn videos(&self) -> &[VideoWithVotes] {
        &self.videos
    }

    /// The user-visible error banner, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Receive every list the page renders, speculative ones included.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<VideoWithVotes>> {
        self.rendered.subscribe()
    }

    fn render(&self) {
        self.rendered.send_replace(self.videos.clone());
    }

    /// Toggle the viewer's vote on a video.
    ///
    /// The flip is shown immediately; the authoritative list is re-fetched
    /// whether or not the store accepted the change. On failure the page falls
    /// back to the re-fetched list, or to the last one it had if that fetch
    /// fails too, and shows an error banner.
    pub async fn toggle_vote(&mut self, video_id: i64) -> AppResult<VoteOutcome> {
        let Some(viewer) = self.viewer.clone() else {
            self.error = Some(SIGN_IN_TO_VOTE.to_string());
            return Err(AppError::Unauthorized);
        };
        if !self.videos.iter().any(|v| v.id == video_id) {
            return Err(AppError::VideoNotFound(video_id));
        }
        self.error = None;

        let patch = OptimisticPatch::apply(&mut self.videos, &self.confirmed, video_id);
        self.rendered.send_replace(patch.snapshot());

        let result = self.votes.toggle(video_id, Some(&viewer)).await;
        if result.is_ok() {
            patch.commit();
        } else {
            drop(patch);
        }

        match self.shots.videos(self.shot.id, Some(&viewer)).await {
            Ok(fresh) => {
                self.confirmed = fresh.clone();
                self.videos = fresh;
            }
            Err(e) => {
                tracing::warn!(error = %e, shot_id = self.shot.id, "Failed to refresh videos after vote");
                if result.is_ok() {
                    // Nothing authoritative to show; keep the accepted flip
                    self.confirmed = self.videos.clone();
                } else {
                    self.videos = self.confirmed.clone();
                }
            }
        }

        if let Err(e) = &result {
            tracing::warn!(error = %e, video_id, "Vote toggle failed");
            self.error = Some(VOTE_FAILED.to_string());
        }
        self.render();

        result
    }
}
