//! Table runtime configuration.

use std::time::Duration;

use crate::game::state::GameConfig;

/// Pacing and channel sizing for one table session.
#[derive(Clone, Copy, Debug)]
pub struct TableConfig {
    pub game: GameConfig,
    /// Pause between streets when nobody is left to act, so clients can
    /// watch the board run out.
    pub runout_delay: Duration,
    /// How long showdown results stay visible before the table resets.
    pub showdown_delay: Duration,
    /// Outbound queue depth per subscriber. A subscriber that falls
    /// this far behind is treated as disconnected.
    pub subscriber_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            runout_delay: Duration::from_secs(1),
            showdown_delay: Duration::from_secs(5),
            subscriber_capacity: 256,
        }
    }
}
