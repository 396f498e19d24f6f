use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::curriculum::CurriculumState;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// One open curriculum draft. Mutations swap in whole new snapshots;
/// `revision` bumps only when the snapshot actually changed, so the shell
/// can spot no-ops without diffing trees.
pub struct Draft {
    pub course_id: Option<String>,
    pub state: CurriculumState,
    pub revision: u64,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(course_id: Option<String>, state: CurriculumState) -> Self {
        let now = Utc::now();
        Self {
            course_id,
            state,
            revision: 0,
            opened_at: now,
            updated_at: now,
        }
    }

    /// Install a new snapshot if it differs from the current one. Returns
    /// whether anything changed.
    pub fn commit(&mut self, next: CurriculumState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        self.revision += 1;
        self.updated_at = Utc::now();
        true
    }
}

pub struct AppState {
    pub drafts: HashMap<String, Draft>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            drafts: HashMap::new(),
        }
    }
}
