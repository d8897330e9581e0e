//! Recurrence rules and next-occurrence computation.
//!
//! Fully deterministic: `next_occurrence` is a pure function of the rule and
//! the reference date, which is what makes the maintenance sweep idempotent.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Which day a Monthly rule lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthlyDay {
    /// 1-31; clamped to the target month's length so a day-31 rule never
    /// skips a 30-day month.
    Day(u32),
    /// Last calendar day of the target month.
    Last,
}

/// A repetition pattern. Owned by one task at a time, but carried forward by
/// id across regenerations: every occurrence in a series points at the same
/// stored rule, never a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// Store-assigned. Empty until inserted.
    pub id: String,
    pub kind: RecurrenceType,
    /// Every N days/weeks/months/years. Constructors enforce >= 1.
    pub interval: u32,
    /// Weekly only. Empty set degenerates to "every `interval` weeks".
    pub days_of_week: Vec<Weekday>,
    /// Monthly only. `None` is malformed config and takes the fallback path.
    pub monthly_day: Option<MonthlyDay>,
    pub start_date: Option<NaiveDate>,
    /// Inclusive: a rule ending today still produces today's successor.
    pub end_date: Option<NaiveDate>,
    /// Declared but not enforced anywhere; the cap's reset semantics are
    /// unresolved upstream, so we carry it without acting on it.
    pub max_occurrences: Option<u32>,
}

impl RecurrenceRule {
    fn base(kind: RecurrenceType, interval: u32) -> Self {
        Self {
            id: String::new(),
            kind,
            interval: interval.max(1),
            days_of_week: Vec::new(),
            monthly_day: None,
            start_date: None,
            end_date: None,
            max_occurrences: None,
        }
    }

    pub fn daily(interval: u32) -> Self {
        Self::base(RecurrenceType::Daily, interval)
    }

    pub fn weekly(interval: u32, days_of_week: Vec<Weekday>) -> Self {
        let mut rule = Self::base(RecurrenceType::Weekly, interval);
        rule.days_of_week = days_of_week;
        rule
    }

    pub fn monthly(interval: u32, day: MonthlyDay) -> Self {
        let mut rule = Self::base(RecurrenceType::Monthly, interval);
        rule.monthly_day = Some(day);
        rule
    }

    pub fn yearly(interval: u32) -> Self {
        Self::base(RecurrenceType::Yearly, interval)
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Has the series ended as of `today`? The end date is inclusive.
    pub fn ended_by(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }

    /// Compute the next occurrence strictly after `reference`.
    ///
    /// Total by design: malformed monthly config and calendar-overflow edge
    /// cases all resolve to `reference + 1 day` instead of an error, so a
    /// bad rule produces a visible (daily-ish) task rather than a silent
    /// stall of the series.
    pub fn next_occurrence(&self, reference: NaiveDate) -> NaiveDate {
        match self.kind {
            RecurrenceType::Daily => reference
                .checked_add_signed(Duration::days(i64::from(self.interval)))
                .unwrap_or_else(|| fallback(reference)),
            RecurrenceType::Weekly => self.next_weekly(reference),
            RecurrenceType::Monthly => self.next_monthly(reference),
            RecurrenceType::Yearly => self
                .interval
                .checked_mul(12)
                .and_then(|months| reference.checked_add_months(Months::new(months)))
                .unwrap_or_else(|| fallback(reference)),
        }
    }

    fn next_weekly(&self, reference: NaiveDate) -> NaiveDate {
        if self.days_of_week.is_empty() {
            return reference
                .checked_add_signed(Duration::days(7 * i64::from(self.interval)))
                .unwrap_or_else(|| fallback(reference));
        }

        // Nearest matching weekday, starting tomorrow.
        for offset in 1..=7 {
            let candidate = reference + Duration::days(offset);
            if self.days_of_week.contains(&candidate.weekday()) {
                return candidate;
            }
        }

        // Unreachable while days_of_week is non-empty, but mirror the jump
        // to the next interval week rather than trusting that.
        let week_start = reference + Duration::days(7 * i64::from(self.interval));
        for offset in 0..7 {
            let candidate = week_start + Duration::days(offset);
            if self.days_of_week.contains(&candidate.weekday()) {
                return candidate;
            }
        }

        fallback(reference)
    }

    fn next_monthly(&self, reference: NaiveDate) -> NaiveDate {
        let Some(first_of_month) = NaiveDate::from_ymd_opt(reference.year(), reference.month(), 1)
        else {
            return fallback(reference);
        };
        let Some(target_first) = first_of_month.checked_add_months(Months::new(self.interval))
        else {
            return fallback(reference);
        };
        let last = last_day_of_month(target_first);

        match self.monthly_day {
            Some(MonthlyDay::Last) => last,
            Some(MonthlyDay::Day(day)) if (1..=31).contains(&day) => target_first
                .with_day(day.min(last.day()))
                .unwrap_or(last),
            // Missing or out-of-range day config.
            _ => fallback(reference),
        }
    }
}

fn fallback(reference: NaiveDate) -> NaiveDate {
    reference.succ_opt().unwrap_or(reference)
}

fn last_day_of_month(first_of_month: NaiveDate) -> NaiveDate {
    first_of_month
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first_of_month)
}
