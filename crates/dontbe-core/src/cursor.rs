//! Pagination cursor.
//!
//! The cursor is the id of the last item seen; `-1` asks the server for the
//! newest page.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monotonic pagination token with a distinguished start sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(i64);

impl Cursor {
    /// Sentinel value meaning "no pagination yet".
    pub const START: i64 = -1;

    /// A cursor positioned before the first page.
    pub fn start() -> Self {
        Self(Self::START)
    }

    /// Raw cursor value, as sent in the `cursor` query parameter.
    pub fn value(self) -> i64 {
        self.0
    }

    /// Whether the next fetch will request the first page.
    pub fn is_start(self) -> bool {
        self.0 == Self::START
    }

    /// Go back to the start sentinel.
    pub fn reset(&mut self) {
        self.0 = Self::START;
    }

    /// Move to the id of the last item of a freshly fetched page.
    ///
    /// `None` (empty page) leaves the cursor where it is. A sentinel id is
    /// ignored as well, since it can never name a real entity.
    pub fn advance(&mut self, last_item_id: Option<i64>) {
        match last_item_id {
            Some(id) if id != Self::START => self.0 = id,
            _ => {}
        }
    }

    /// Query-string form of the cursor.
    pub fn to_query(self) -> (String, String) {
        ("cursor".to_string(), self.0.to_string())
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
