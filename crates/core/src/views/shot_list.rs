//! Shot list page state.

use napoleon_common::AppResult;
use napoleon_db::repositories::ShotWithTopVideo;

use crate::services::ShotService;

/// The leading submission of a shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopVideo {
    pub id: i64,
    pub url: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub votes: i64,
}

/// One row of the shot list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotSummary {
    pub id: i64,
    pub title: String,
    pub script_excerpt: String,
    pub order_index: i32,
    pub top_video: Option<TopVideo>,
}

impl From<ShotWithTopVideo> for ShotSummary {
    fn from(row: ShotWithTopVideo) -> Self {
        let top_video = match (row.top_video_id, row.top_video_url) {
            (Some(id), Some(url)) => Some(TopVideo {
                id,
                url,
                user_id: row.top_video_user_id,
                user_email: row.top_video_user_email,
                votes: row.top_video_votes.unwrap_or(0),
            }),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            script_excerpt: row.script_excerpt,
            order_index: row.order_index,
            top_video,
        }
    }
}

/// Shots in film order, each with its top-voted submission.
#[derive(Debug, Clone, Default)]
pub struct ShotListView {
    pub shots: Vec<ShotSummary>,
}

impl ShotListView {
    /// Fetch the list in one batched call.
    pub async fn load(shots: &ShotService) -> AppResult<Self> {
        let rows = shots.with_top_videos().await?;
        Ok(Self {
            shots: rows.into_iter().map(Into::into).collect(),
        })
    }

    /// Shots that have at least one submission.
    #[must_use]
    pub fn covered(&self) -> usize {
        self.shots.iter().filter(|s| s.top_video.is_some()).count()
    }
}
