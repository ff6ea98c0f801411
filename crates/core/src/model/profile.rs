use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CategoryId, SetId};
use crate::model::report::ScoreReport;

//
// ─── USER PROFILE ──────────────────────────────────────────────────────────────
//

/// Long-lived gamification state for one user.
///
/// The engine only does arithmetic on snapshots of this value; loading and
/// persisting it belongs to the storage layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub(crate) xp: u64,
    pub(crate) currency: u64,
    pub(crate) completed_set_ids: BTreeSet<SetId>,
    pub(crate) login_timestamps: Vec<DateTime<FixedOffset>>,
    pub(crate) streak: u32,
    pub(crate) history: Vec<ScoreReport>,
}

impl UserProfile {
    /// A fresh profile: no XP, no currency, no logins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a profile from persisted storage.
    ///
    /// Login timestamps are sorted so the most recent one is last.
    #[must_use]
    pub fn from_persisted(
        xp: u64,
        currency: u64,
        completed_set_ids: impl IntoIterator<Item = SetId>,
        login_timestamps: impl IntoIterator<Item = DateTime<FixedOffset>>,
        streak: u32,
        history: impl IntoIterator<Item = ScoreReport>,
    ) -> Self {
        let mut login_timestamps: Vec<_> = login_timestamps.into_iter().collect();
        login_timestamps.sort();
        let mut history: Vec<_> = history.into_iter().collect();
        history.sort_by_key(ScoreReport::completed_at);

        Self {
            xp,
            currency,
            completed_set_ids: completed_set_ids.into_iter().collect(),
            login_timestamps,
            streak,
            history,
        }
    }

    #[must_use]
    pub fn xp(&self) -> u64 {
        self.xp
    }

    #[must_use]
    pub fn currency(&self) -> u64 {
        self.currency
    }

    #[must_use]
    pub fn completed_set_ids(&self) -> &BTreeSet<SetId> {
        &self.completed_set_ids
    }

    #[must_use]
    pub fn login_timestamps(&self) -> &[DateTime<FixedOffset>] {
        &self.login_timestamps
    }

    #[must_use]
    pub fn last_login(&self) -> Option<&DateTime<FixedOffset>> {
        self.login_timestamps.last()
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Every completed session, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ScoreReport] {
        &self.history
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Per-category XP-like counter, separate from the user's global XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPoints {
    category_id: CategoryId,
    points: u64,
}

impl CategoryPoints {
    #[must_use]
    pub fn new(category_id: CategoryId, points: u64) -> Self {
        Self {
            category_id,
            points,
        }
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    #[must_use]
    pub fn points(&self) -> u64 {
        self.points
    }

    pub(crate) fn add(&mut self, points: u64) {
        self.points = self.points.saturating_add(points);
    }
}

/// A category document as held by the card store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    points: u64,
}

impl Category {
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>, points: u64) -> Self {
        Self {
            id,
            name: name.into(),
            points,
        }
    }

    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn points(&self) -> CategoryPoints {
        CategoryPoints::new(self.id, self.points)
    }

    /// Replace the stored counter with an updated one.
    #[must_use]
    pub fn with_points(mut self, points: CategoryPoints) -> Self {
        debug_assert_eq!(points.category_id(), self.id);
        self.points = points.points();
        self
    }
}
