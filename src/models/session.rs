//! Per-session state carried between requests

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub num_visits: u64,
}

impl SessionState {
    /// Count one more visit; returns the count before this visit and the new state
    pub fn record_visit(self) -> (u64, SessionState) {
        (
            self.num_visits,
            SessionState {
                num_visits: self.num_visits + 1,
            },
        )
    }
}
