//! Consecutive-day login streak and the weekly login calendar.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Weekday};

use crate::model::UserProfile;
use crate::time::local_date;

/// Records a login at `now` and updates the streak.
///
/// Compared on local calendar dates only:
/// - previous login yesterday: streak grows by one
/// - previous login today: streak is unchanged
/// - anything else, including a first login: streak restarts at 1
#[must_use]
pub fn record_login(profile: &UserProfile, now: DateTime<FixedOffset>) -> UserProfile {
    let mut next = profile.clone();
    let today = local_date(&now);

    next.streak = match profile.last_login().map(local_date) {
        Some(last) if last == today => profile.streak,
        Some(last) if last.succ_opt() == Some(today) => profile.streak.saturating_add(1),
        _ => 1,
    };

    // the log stays ordered even if the clock stepped backwards
    let at = next.login_timestamps.partition_point(|t| *t <= now);
    next.login_timestamps.insert(at, now);
    next
}

//
// ─── WEEKLY CALENDAR ───────────────────────────────────────────────────────────
//

/// ISO-8601 week identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeekKey {
    pub year: i32,
    pub week: u32,
}

impl IsoWeekKey {
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

/// Groups login timestamps into the distinct local dates of each ISO week.
#[must_use]
pub fn group_by_iso_week(log: &[DateTime<FixedOffset>]) -> BTreeMap<IsoWeekKey, BTreeSet<NaiveDate>> {
    let mut weeks: BTreeMap<IsoWeekKey, BTreeSet<NaiveDate>> = BTreeMap::new();
    for at in log {
        let date = local_date(at);
        weeks.entry(IsoWeekKey::of(date)).or_default().insert(date);
    }
    weeks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMark {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub logged_in: bool,
}

/// Monday-to-Sunday view of one ISO week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekCalendar {
    pub week: IsoWeekKey,
    pub days: Vec<DayMark>,
}

impl WeekCalendar {
    #[must_use]
    pub fn logged_days(&self) -> usize {
        self.days.iter().filter(|d| d.logged_in).count()
    }
}

/// The week containing `today`, marking each day with at least one login.
///
/// An empty log yields seven unmarked days.
#[must_use]
pub fn week_calendar(log: &[DateTime<FixedOffset>], today: NaiveDate) -> WeekCalendar {
    let key = IsoWeekKey::of(today);
    let logged = group_by_iso_week(log).remove(&key).unwrap_or_default();
    let monday =
        today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

    let days = monday
        .iter_days()
        .take(7)
        .map(|date| DayMark {
            date,
            weekday: date.weekday(),
            logged_in: logged.contains(&date),
        })
        .collect();

    WeekCalendar { week: key, days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, day, hour, 0, 0)
            .unwrap()
    }

    fn login_days(days: &[u32]) -> UserProfile {
        days.iter()
            .fold(UserProfile::new(), |p, d| record_login(&p, at(*d, 9)))
    }

    #[test]
    fn first_login_starts_streak() {
        let profile = record_login(&UserProfile::new(), at(1, 8));
        assert_eq!(profile.streak(), 1);
        assert_eq!(profile.login_timestamps().len(), 1);
    }

    #[test]
    fn consecutive_days_build_a_streak() {
        assert_eq!(login_days(&[1, 2, 3]).streak(), 3);
    }

    #[test]
    fn same_day_login_does_not_inflate() {
        let profile = login_days(&[1, 2, 3]);
        let again = record_login(&profile, at(3, 22));
        assert_eq!(again.streak(), 3);
        assert_eq!(again.login_timestamps().len(), 4);
    }

    #[test]
    fn gap_resets_streak() {
        let profile = login_days(&[1, 2, 3, 5]);
        assert_eq!(profile.streak(), 1);
    }

    #[test]
    fn time_of_day_is_ignored() {
        let profile = record_login(&UserProfile::new(), at(1, 23));
        let next = record_login(&profile, at(2, 0));
        assert_eq!(next.streak(), 2);
    }

    #[test]
    fn local_offset_decides_the_day() {
        // 23:30 UTC on the 1st is already the 2nd in UTC+2.
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let first = plus_two.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let late = at(1, 23).with_timezone(&plus_two);

        let profile = record_login(&UserProfile::new(), first);
        assert_eq!(record_login(&profile, late).streak(), 2);
    }

    #[test]
    fn backwards_clock_keeps_log_sorted() {
        let profile = login_days(&[5]);
        let next = record_login(&profile, at(3, 9));
        assert_eq!(next.streak(), 1);
        assert_eq!(next.login_timestamps(), &[at(3, 9), at(5, 9)]);
    }

    #[test]
    fn empty_log_renders_empty_week() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let week = week_calendar(&[], today);
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.days[0].weekday, Weekday::Mon);
        assert_eq!(week.days[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(week.logged_days(), 0);
        assert!(group_by_iso_week(&[]).is_empty());
    }

    #[test]
    fn week_marks_only_this_weeks_logins() {
        // 2024-01-01 is a Monday; the 8th starts the next ISO week.
        let profile = login_days(&[1, 3, 3, 8]);
        let week = week_calendar(
            profile.login_timestamps(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        );
        let marked: Vec<_> = week
            .days
            .iter()
            .filter(|d| d.logged_in)
            .map(|d| d.weekday)
            .collect();
        assert_eq!(marked, vec![Weekday::Mon, Weekday::Wed]);

        let grouped = group_by_iso_week(profile.login_timestamps());
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&IsoWeekKey { year: 2024, week: 1 }].len(), 2);
    }
}
