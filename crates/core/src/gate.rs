//! At-most-one-reward-per-set-per-period gating.
//!
//! The gate only reads and appends `completed_set_ids`. Clearing the set is a
//! separately scheduled operation ([`reset_completion_gate`]).

use chrono::NaiveDate;

use crate::model::{SetId, UserProfile};
use crate::time::local_date;

/// Decides whether a set has already paid out in the current reward period.
pub trait CompletionGate {
    fn is_rewarded(&self, profile: &UserProfile, set_id: SetId) -> bool;
}

/// Gate backed by membership in `UserProfile::completed_set_ids`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetMembershipGate;

impl CompletionGate for SetMembershipGate {
    fn is_rewarded(&self, profile: &UserProfile, set_id: SetId) -> bool {
        profile.completed_set_ids.contains(&set_id)
    }
}

pub(crate) fn mark_rewarded(profile: &mut UserProfile, set_id: SetId) {
    profile.completed_set_ids.insert(set_id);
}

/// Returns a copy of `profile` with every set eligible for rewards again.
#[must_use]
pub fn reset_completion_gate(profile: &UserProfile) -> UserProfile {
    let mut next = profile.clone();
    next.completed_set_ids.clear();
    next
}

/// True when the reward period rolled over since the last recorded login.
///
/// The period is one local calendar day; a profile that never logged in is
/// reset whenever it still carries completed sets.
#[must_use]
pub fn is_new_reward_period(profile: &UserProfile, today: NaiveDate) -> bool {
    match profile.last_login() {
        Some(last) => local_date(last) != today,
        None => !profile.completed_set_ids.is_empty(),
    }
}
