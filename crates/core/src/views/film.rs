//! Full-film player: the top submission of every shot, played in order.

use napoleon_common::AppResult;
use napoleon_db::repositories::ShotWithTopVideo;

use crate::services::ShotService;

/// Sequential player over the film's shots.
///
/// The state is `AtShot(i)` with `0 <= i < N`; navigation clamps at both
/// ends instead of wrapping. A film without shots has no current shot and
/// ignores navigation.
#[derive(Debug, Clone)]
pub struct FilmPlayer {
    shots: Vec<ShotWithTopVideo>,
    index: usize,
    autoplay: bool,
}

impl FilmPlayer {
    /// A player positioned at the first shot, autoplay off.
    #[must_use]
    pub const fn new(shots: Vec<ShotWithTopVideo>) -> Self {
        Self {
            shots,
            index: 0,
            autoplay: false,
        }
    }

    /// Fetch every shot with its top video and build a player.
    pub async fn load(shots: &ShotService) -> AppResult<Self> {
        Ok(Self::new(shots.with_top_videos().await?))
    }

    /// Number of shots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shots.len()
    }

    /// Whether the film has no shots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Zero-based index of the current shot.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// All shots, in order.
    #[must_use]
    pub fn shots(&self) -> &[ShotWithTopVideo] {
        &self.shots
    }

    /// The current shot.
    #[must_use]
    pub fn current(&self) -> Option<&ShotWithTopVideo> {
        self.shots.get(self.index)
    }

    /// One-based position and total, as in "Shot 2 of 5".
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        (!self.is_empty()).then(|| (self.index + 1, self.len()))
    }

    /// Whether autoplay is on.
    #[must_use]
    pub const fn autoplay(&self) -> bool {
        self.autoplay
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.index + 1 < self.len()
    }

    /// Move to the next shot; no-op at the last one.
    pub fn next(&mut self) {
        if self.has_next() {
            self.index += 1;
        }
    }

    /// Move to the previous shot; no-op at the first one.
    pub fn previous(&mut self) {
        if self.has_previous() {
            self.index -= 1;
        }
    }

    /// Jump to a zero-based index, clamped into range.
    pub fn jump_to(&mut self, index: i64) {
        let Some(last) = self.len().checked_sub(1) else {
            return;
        };
        self.index = usize::try_from(index.max(0)).map_or(last, |i| i.min(last));
    }

    pub fn toggle_autoplay(&mut self) {
        self.autoplay = !self.autoplay;
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    /// The current video finished playing. Advances when autoplay is on.
    ///
    /// Returns whether the player moved.
    pub fn on_playback_ended(&mut self) -> bool {
        if self.autoplay && self.has_next() {
            self.index += 1;
            true
        } else {
            false
        }
    }
}
