use crate::adapter::Row;

/// Where the screen is in its load/mutate cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScreenState {
    /// Not entered yet, or nothing has loaded successfully.
    #[default]
    Idle,
    /// The latest reload has not resolved yet.
    Loading,
    /// Rows reflect the latest reload.
    Loaded,
    /// A store mutation is in flight; a reload follows once it succeeds.
    Mutating,
}

impl ScreenState {
    pub fn is_busy(self) -> bool {
        matches!(self, ScreenState::Loading | ScreenState::Mutating)
    }
}

/// Direction of a row swipe. Only left swipes delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

/// What the screen currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenSnapshot {
    pub state: ScreenState,
    pub rows: Vec<Row>,
    /// Transient user-facing message, e.g. a rejected add form.
    pub notice: Option<String>,
    /// Bumped every time the rows are re-rendered from a reload.
    pub generation: u64,
}
