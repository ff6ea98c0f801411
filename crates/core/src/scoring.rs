//! Converts a completed session into XP, category points, level-ups and currency.
//!
//! Everything here is a pure function of its inputs: callers pass snapshots in
//! and persist the returned snapshot themselves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gate::{CompletionGate, mark_rewarded};
use crate::model::{CategoryPoints, ScoreReport, UserProfile};

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PolicyError {
    #[error("level-up condition must be > 0")]
    ZeroLevelUpCondition,
}

/// XP quantity that makes up one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpCondition(u64);

impl LevelUpCondition {
    pub const DEFAULT_XP_PER_LEVEL: u64 = 100;

    /// # Errors
    ///
    /// Returns `PolicyError::ZeroLevelUpCondition` for a zero threshold.
    pub fn new(xp_per_level: u64) -> Result<Self, PolicyError> {
        if xp_per_level == 0 {
            return Err(PolicyError::ZeroLevelUpCondition);
        }
        Ok(Self(xp_per_level))
    }

    #[must_use]
    pub fn xp_per_level(self) -> u64 {
        self.0
    }
}

impl Default for LevelUpCondition {
    fn default() -> Self {
        Self(Self::DEFAULT_XP_PER_LEVEL)
    }
}

/// Tunables for the reward calculator, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    level_up_condition: LevelUpCondition,
    currency_per_level: u64,
}

impl RewardPolicy {
    pub const DEFAULT_CURRENCY_PER_LEVEL: u64 = 20;

    #[must_use]
    pub fn new(level_up_condition: LevelUpCondition, currency_per_level: u64) -> Self {
        Self {
            level_up_condition,
            currency_per_level,
        }
    }

    #[must_use]
    pub fn level_up_condition(&self) -> LevelUpCondition {
        self.level_up_condition
    }

    #[must_use]
    pub fn currency_per_level(&self) -> u64 {
        self.currency_per_level
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::new(
            LevelUpCondition::default(),
            Self::DEFAULT_CURRENCY_PER_LEVEL,
        )
    }
}

//
// ─── LEVEL ARITHMETIC ──────────────────────────────────────────────────────────
//

/// Number of level thresholds crossed going from `old_xp` to `new_xp`.
#[must_use]
pub fn levels_crossed(old_xp: u64, new_xp: u64, condition: LevelUpCondition) -> u64 {
    let per = condition.xp_per_level();
    (new_xp / per).saturating_sub(old_xp / per)
}

/// Whole levels reached with `points`.
#[must_use]
pub fn category_level(points: u64, condition: LevelUpCondition) -> u64 {
    points / condition.xp_per_level()
}

/// Percent progress shown on the category XP bar.
///
/// Past one full level the value is re-based to the remainder inside the
/// current level, so 130 points at 100 per level reads 30, not 130.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn xp_percent(points: u64, condition: LevelUpCondition) -> f64 {
    let per = condition.xp_per_level();
    let within = if points > per { points % per } else { points };
    within as f64 / per as f64 * 100.0
}

//
// ─── APPLY REPORT ──────────────────────────────────────────────────────────────
//

/// New snapshots plus what changed, produced by [`apply_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardOutcome {
    pub profile: UserProfile,
    pub category_points: CategoryPoints,
    pub xp_awarded: u64,
    pub leveled_up_by: u64,
    pub currency_awarded: u64,
    /// False when the gate had already paid out for this set.
    pub rewarded: bool,
}

/// Applies a completed session's score to the user profile and category counter.
///
/// A set the gate reports as already rewarded changes no XP, currency or
/// category points; the report is still appended to the profile history.
#[must_use]
pub fn apply_report<G: CompletionGate + ?Sized>(
    report: &ScoreReport,
    profile: &UserProfile,
    category_points: CategoryPoints,
    policy: &RewardPolicy,
    gate: &G,
) -> RewardOutcome {
    let mut next = profile.clone();
    next.history.push(report.clone());

    if gate.is_rewarded(profile, report.set_id()) {
        return RewardOutcome {
            profile: next,
            category_points,
            xp_awarded: 0,
            leveled_up_by: 0,
            currency_awarded: 0,
            rewarded: false,
        };
    }

    let awarded = u64::from(report.raw_score());
    let mut category_points = category_points;
    category_points.add(awarded);

    let new_xp = profile.xp.saturating_add(awarded);
    let leveled_up_by = levels_crossed(profile.xp, new_xp, policy.level_up_condition());
    let currency_awarded = policy.currency_per_level().saturating_mul(leveled_up_by);

    mark_rewarded(&mut next, report.set_id());
    next.xp = new_xp;
    next.currency = next.currency.saturating_add(currency_awarded);

    RewardOutcome {
        profile: next,
        category_points,
        xp_awarded: awarded,
        leveled_up_by,
        currency_awarded,
        rewarded: true,
    }
}

//
// ─── RESULTS VIEW ──────────────────────────────────────────────────────────────
//

/// Display values for the results screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultsSummary {
    pub raw_score: u32,
    pub total_questions: u32,
    pub grade_percent: u32,
    pub category_level: u64,
    /// Bar value before this session's points were added.
    pub previous_xp_percent: f64,
    pub xp_percent: f64,
    pub rewarded: bool,
}

impl ResultsSummary {
    #[must_use]
    pub fn build(report: &ScoreReport, outcome: &RewardOutcome, condition: LevelUpCondition) -> Self {
        let points = outcome.category_points.points();
        let before = points.saturating_sub(outcome.xp_awarded);
        Self {
            raw_score: report.raw_score(),
            total_questions: report.total_questions(),
            grade_percent: report.grade_percent(),
            category_level: category_level(points, condition),
            previous_xp_percent: xp_percent(before, condition),
            xp_percent: xp_percent(points, condition),
            rewarded: outcome.rewarded,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::SetMembershipGate;
    use crate::model::{CategoryId, SetId};
    use crate::time::fixed_now;

    fn report(set: u64, raw_score: u32, total: u32) -> ScoreReport {
        ScoreReport::from_persisted(SetId::new(set), CategoryId::new(1), raw_score, total, fixed_now())
            .unwrap()
    }

    fn policy(condition: u64) -> RewardPolicy {
        RewardPolicy::new(LevelUpCondition::new(condition).unwrap(), 20)
    }

    fn profile_with_xp(xp: u64) -> UserProfile {
        UserProfile::from_persisted(xp, 0, [], [], 0, [])
    }

    #[test]
    fn zero_condition_is_rejected() {
        assert_eq!(
            LevelUpCondition::new(0).unwrap_err(),
            PolicyError::ZeroLevelUpCondition
        );
    }

    #[test]
    fn defaults_match_documented_values() {
        let policy = RewardPolicy::default();
        assert_eq!(policy.level_up_condition().xp_per_level(), 100);
        assert_eq!(policy.currency_per_level(), 20);
    }

    #[test]
    fn crossing_one_threshold_levels_up_once() {
        let report = report(1, 30, 30);
        let outcome = apply_report(
            &report,
            &profile_with_xp(90),
            CategoryPoints::new(CategoryId::new(1), 0),
            &policy(100),
            &SetMembershipGate,
        );

        assert!(outcome.rewarded);
        assert_eq!(outcome.profile.xp(), 120);
        assert_eq!(outcome.leveled_up_by, 1);
        assert_eq!(outcome.currency_awarded, 20);
        assert_eq!(outcome.profile.currency(), 20);
        assert_eq!(outcome.category_points.points(), 30);
        assert!(outcome.profile.completed_set_ids().contains(&SetId::new(1)));
    }

    #[test]
    fn reapplying_a_rewarded_set_is_inert() {
        let report = report(1, 30, 30);
        let policy = policy(100);
        let first = apply_report(
            &report,
            &profile_with_xp(90),
            CategoryPoints::new(CategoryId::new(1), 0),
            &policy,
            &SetMembershipGate,
        );
        let second = apply_report(
            &report,
            &first.profile,
            first.category_points,
            &policy,
            &SetMembershipGate,
        );

        assert!(!second.rewarded);
        assert_eq!(second.profile.xp(), first.profile.xp());
        assert_eq!(second.profile.currency(), first.profile.currency());
        assert_eq!(second.category_points, first.category_points);
        assert_eq!(second.leveled_up_by, 0);
        assert_eq!(second.profile.history().len(), 2);
    }

    #[test]
    fn multi_level_jump_counts_every_threshold() {
        let report = report(1, 130, 130);
        let outcome = apply_report(
            &report,
            &profile_with_xp(0),
            CategoryPoints::new(CategoryId::new(1), 0),
            &policy(50),
            &SetMembershipGate,
        );
        assert_eq!(outcome.leveled_up_by, 2);
        assert_eq!(outcome.currency_awarded, 40);
    }

    #[test]
    fn no_threshold_no_currency() {
        let report = report(1, 5, 10);
        let outcome = apply_report(
            &report,
            &profile_with_xp(10),
            CategoryPoints::new(CategoryId::new(1), 7),
            &policy(100),
            &SetMembershipGate,
        );
        assert_eq!(outcome.profile.xp(), 15);
        assert_eq!(outcome.leveled_up_by, 0);
        assert_eq!(outcome.profile.currency(), 0);
        assert_eq!(outcome.category_points.points(), 12);
    }

    #[test]
    fn levels_crossed_never_negative() {
        let c = LevelUpCondition::new(100).unwrap();
        assert_eq!(levels_crossed(250, 120, c), 0);
        assert_eq!(levels_crossed(99, 100, c), 1);
        assert_eq!(levels_crossed(100, 199, c), 0);
    }

    #[test]
    fn xp_percent_rebases_past_a_full_level() {
        let c = LevelUpCondition::new(100).unwrap();
        assert!((xp_percent(130, c) - 30.0).abs() < 1e-9);
        assert!((xp_percent(40, c) - 40.0).abs() < 1e-9);
        assert!((xp_percent(100, c) - 100.0).abs() < 1e-9);
        // digit-stripping would give 10 here; the remainder is 5
        assert!((xp_percent(1005, c) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn results_summary_reports_level_and_bar() {
        let condition = LevelUpCondition::new(100).unwrap();
        let report = report(1, 3, 4);
        let outcome = apply_report(
            &report,
            &profile_with_xp(0),
            CategoryPoints::new(CategoryId::new(1), 128),
            &RewardPolicy::new(condition, 20),
            &SetMembershipGate,
        );
        let summary = ResultsSummary::build(&report, &outcome, condition);

        assert_eq!(summary.grade_percent, 75);
        assert_eq!(summary.category_level, 1);
        assert!((summary.previous_xp_percent - 28.0).abs() < 1e-9);
        assert!((summary.xp_percent - 31.0).abs() < 1e-9);
        assert!(summary.rewarded);
    }
}
