//! Courts and their daily availability.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    /// Daily window `[from, to)`. A missing bound leaves that side open until midnight.
    pub available_from: Option<NaiveTime>,
    pub available_to: Option<NaiveTime>,
}

impl Court {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            available_from: None,
            available_to: None,
        }
    }

    pub fn with_window(mut self, from: NaiveTime, to: NaiveTime) -> Self {
        self.available_from = Some(from);
        self.available_to = Some(to);
        self
    }
}
