use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
///
/// Timestamps carry the user's local offset so calendar-day logic (streaks,
/// daily reward gating) can work on the local date rather than UTC.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<FixedOffset>),
}

impl Clock {
    /// Returns a clock that reads the system time in the local timezone.
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// Returns a clock fixed at the given UTC instant (local offset is UTC).
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at.fixed_offset())
    }

    /// Returns a clock fixed at the given local timestamp.
    #[must_use]
    pub fn fixed_local(at: DateTime<FixedOffset>) -> Self {
        Self::Fixed(at)
    }

    /// Current instant in UTC.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now_local().with_timezone(&Utc)
    }

    /// Current instant expressed in the user's local offset.
    #[must_use]
    pub fn now_local(&self) -> DateTime<FixedOffset> {
        match self {
            Clock::System => Local::now().fixed_offset(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Current local calendar date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now_local().date_naive()
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Local calendar date of a timestamp, ignoring time-of-day.
#[must_use]
pub fn local_date(at: &DateTime<FixedOffset>) -> NaiveDate {
    at.date_naive()
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z, a Tuesday).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
