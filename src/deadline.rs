//! Response-time descriptions and the cutoff instants they resolve to.
//!
//! Config rules describe thresholds in human terms ("3 business days",
//! "5 days"). Each description resolves to one absolute instant relative
//! to a single "now", computed once per run so every ticket is judged
//! against the same cutoff.

use jiff::civil::{Date, Weekday};
use jiff::{Timestamp, ToSpan, Zoned};

/// Decides which calendar days count towards a business-day span.
///
/// Injected into cutoff computation so a holiday calendar can replace
/// the weekday-only default without touching the arithmetic.
pub trait BusinessCalendar {
    fn is_business_day(&self, date: Date) -> bool;
}

/// The default calendar: Monday through Friday, no holidays.
pub struct WeekdayCalendar;

impl BusinessCalendar for WeekdayCalendar {
    fn is_business_day(&self, date: Date) -> bool {
        !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }
}

/// A parsed response-time description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTime {
    /// Plain calendar days.
    Days(u16),

    /// Days that satisfy the business calendar; weekends don't count.
    BusinessDays(u16),
}

impl ResponseTime {
    /// Parse a description matching `<integer> (business) day(s)`,
    /// case- and pluralization-insensitive. Returns `None` for anything
    /// outside that grammar.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace().map(str::to_ascii_lowercase);
        let count: u16 = words.next()?.parse().ok()?;
        let unit: Vec<String> = words.collect();

        match unit.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["day" | "days"] => Some(Self::Days(count)),
            ["business", "day" | "days"] => Some(Self::BusinessDays(count)),
            _ => None,
        }
    }

    /// The instant this response time ago from `now`.
    ///
    /// Business days walk backwards one day at a time, counting only
    /// days the calendar accepts. A ticket with activity before the
    /// returned instant has exceeded this response time.
    pub fn cutoff(self, now: &Zoned, calendar: &dyn BusinessCalendar) -> Timestamp {
        match self {
            Self::Days(count) => now.saturating_sub(i64::from(count).days()).timestamp(),
            Self::BusinessDays(count) => {
                let mut cursor = now.clone();
                let mut remaining = count;
                while remaining > 0 {
                    cursor = cursor.saturating_sub(1.days());
                    if calendar.is_business_day(cursor.date()) {
                        remaining -= 1;
                    }
                }
                cursor.timestamp()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::tz::TimeZone;

    fn zoned(text: &str) -> Zoned {
        text.parse::<Timestamp>().unwrap().to_zoned(TimeZone::UTC)
    }

    fn timestamp(text: &str) -> Timestamp {
        text.parse().unwrap()
    }

    // ── Parse tests ──

    #[test]
    fn parses_plain_days() {
        assert_eq!(ResponseTime::parse("3 days"), Some(ResponseTime::Days(3)));
        assert_eq!(ResponseTime::parse("1 day"), Some(ResponseTime::Days(1)));
    }

    #[test]
    fn parses_business_days() {
        assert_eq!(
            ResponseTime::parse("2 business days"),
            Some(ResponseTime::BusinessDays(2))
        );
        assert_eq!(
            ResponseTime::parse("1 business day"),
            Some(ResponseTime::BusinessDays(1))
        );
    }

    #[test]
    fn parse_is_case_and_plural_insensitive() {
        assert_eq!(ResponseTime::parse("5 DAYS"), Some(ResponseTime::Days(5)));
        assert_eq!(ResponseTime::parse("3 day"), Some(ResponseTime::Days(3)));
        assert_eq!(
            ResponseTime::parse("1 Business Days"),
            Some(ResponseTime::BusinessDays(1))
        );
    }

    #[test]
    fn parse_rejects_everything_else() {
        for text in [
            "",
            "days",
            "3",
            "3 weeks",
            "3.5 days",
            "three days",
            "-2 days",
            "3 business",
            "3 business day weeks",
        ] {
            assert_eq!(ResponseTime::parse(text), None, "accepted {text:?}");
        }
    }

    // ── Cutoff tests ──

    #[test]
    fn plain_days_subtract_calendar_days() {
        // Monday noon, minus 3 calendar days: Friday noon.
        let now = zoned("2024-01-08T12:00:00Z");
        let cutoff = ResponseTime::Days(3).cutoff(&now, &WeekdayCalendar);
        assert_eq!(cutoff, timestamp("2024-01-05T12:00:00Z"));
    }

    #[test]
    fn business_days_skip_the_weekend() {
        // Monday noon, minus 1 business day: Friday noon, not Sunday.
        let now = zoned("2024-01-08T12:00:00Z");
        let cutoff = ResponseTime::BusinessDays(1).cutoff(&now, &WeekdayCalendar);
        assert_eq!(cutoff, timestamp("2024-01-05T12:00:00Z"));

        // Minus 3 business days: Wednesday the week before.
        let cutoff = ResponseTime::BusinessDays(3).cutoff(&now, &WeekdayCalendar);
        assert_eq!(cutoff, timestamp("2024-01-03T12:00:00Z"));
    }

    #[test]
    fn business_days_from_a_weekend_land_on_a_business_day() {
        // Saturday noon, minus 1 business day: Friday noon.
        let now = zoned("2024-01-06T12:00:00Z");
        let cutoff = ResponseTime::BusinessDays(1).cutoff(&now, &WeekdayCalendar);
        assert_eq!(cutoff, timestamp("2024-01-05T12:00:00Z"));
    }

    #[test]
    fn zero_days_is_now() {
        let now = zoned("2024-01-08T12:00:00Z");
        assert_eq!(
            ResponseTime::Days(0).cutoff(&now, &WeekdayCalendar),
            now.timestamp()
        );
        assert_eq!(
            ResponseTime::BusinessDays(0).cutoff(&now, &WeekdayCalendar),
            now.timestamp()
        );
    }

    #[test]
    fn custom_calendar_is_honored() {
        // A calendar that also excludes Friday 2024-01-05.
        struct NoFriday;
        impl BusinessCalendar for NoFriday {
            fn is_business_day(&self, date: Date) -> bool {
                WeekdayCalendar.is_business_day(date)
                    && date != Date::constant(2024, 1, 5)
            }
        }

        // Monday minus 1 business day skips the weekend and the holiday.
        let now = zoned("2024-01-08T12:00:00Z");
        let cutoff = ResponseTime::BusinessDays(1).cutoff(&now, &NoFriday);
        assert_eq!(cutoff, timestamp("2024-01-04T12:00:00Z"));
    }
}
