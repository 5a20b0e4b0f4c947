//! Date-relative event filters.
//!
//! All functions are pure: the reference instant is passed in and its time
//! zone defines the local calendar. Each start is dated with the offset in
//! force at that start, not the offset of `now`. An event without a start
//! instant only matches [`FilterMode::All`].
//!
//! - `Today`: the start falls on the same local calendar date as `now`.
//! - `Weekend`: the start falls on the upcoming-or-current Saturday or the
//!   Sunday after it, local dates, both days inclusive. On a Sunday the window
//!   is the weekend already in progress.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc, Weekday};
use eventmap_types::{Event, FilterCounts, FilterMode};

/// Whether `event` passes `mode` relative to `now`.
pub fn matches<Tz: TimeZone>(mode: FilterMode, now: &DateTime<Tz>, event: &Event) -> bool {
    match mode {
        FilterMode::All => true,
        FilterMode::Today => event
            .start_time
            .is_some_and(|start| local_date(start, now) == now.date_naive()),
        FilterMode::Weekend => event.start_time.is_some_and(|start| {
            let (saturday, sunday) = weekend_window(now.date_naive());
            let date = local_date(start, now);
            date >= saturday && date <= sunday
        }),
    }
}

/// Number of events passing `mode`.
pub fn count<Tz: TimeZone>(mode: FilterMode, now: &DateTime<Tz>, events: &[Arc<Event>]) -> u32 {
    let n = events.iter().filter(|e| matches(mode, now, e)).count();
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// The events passing `mode`, in their original order.
pub fn apply<Tz: TimeZone>(
    mode: FilterMode,
    now: &DateTime<Tz>,
    events: &[Arc<Event>],
) -> Vec<Arc<Event>> {
    events
        .iter()
        .filter(|e| matches(mode, now, e))
        .cloned()
        .collect()
}

/// Counts for every mode, for the filter badges.
pub fn counts<Tz: TimeZone>(now: &DateTime<Tz>, events: &[Arc<Event>]) -> FilterCounts {
    FilterCounts {
        all: count(FilterMode::All, now, events),
        today: count(FilterMode::Today, now, events),
        weekend: count(FilterMode::Weekend, now, events),
    }
}

/// Saturday and Sunday of the weekend that is upcoming or under way on
/// `today`.
pub fn weekend_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let saturday = match today.weekday() {
        Weekday::Sun => today.pred_opt().unwrap_or(today),
        day => {
            let ahead = 5_u32.saturating_sub(day.num_days_from_monday());
            today
                .checked_add_days(Days::new(u64::from(ahead)))
                .unwrap_or(today)
        }
    };
    let sunday = saturday.succ_opt().unwrap_or(saturday);
    (saturday, sunday)
}

fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, now: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&now.timezone()).date_naive()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Offset;
    use chrono_tz::Europe::Helsinki;
    use chrono_tz::Tz;
    use eventmap_types::EventId;

    use super::*;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Tz> {
        Helsinki.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    /// Wednesday 2024-05-15 10:00 local.
    fn reference() -> DateTime<Tz> {
        local(2024, 5, 15, 10, 0, 0)
    }

    fn event_at(start: Option<DateTime<Tz>>) -> Arc<Event> {
        Arc::new(Event {
            id: EventId::new(),
            title: "Gig".to_owned(),
            description: None,
            start_time: start.map(|s| s.with_timezone(&Utc)),
            end_time: None,
            address: None,
            lat: 60.45,
            lng: 22.27,
        })
    }

    #[test]
    fn all_matches_everything() {
        let now = reference();
        assert!(matches(FilterMode::All, &now, &event_at(None)));
        assert!(matches(
            FilterMode::All,
            &now,
            &event_at(Some(local(2020, 1, 1, 0, 0, 0)))
        ));
    }

    #[test]
    fn today_is_the_local_calendar_day() {
        let now = reference();
        let today = |e: &Arc<Event>| matches(FilterMode::Today, &now, e);

        assert!(today(&event_at(Some(local(2024, 5, 15, 0, 0, 0)))));
        assert!(today(&event_at(Some(local(2024, 5, 15, 9, 0, 0)))));
        assert!(today(&event_at(Some(local(2024, 5, 15, 23, 59, 59)))));
        assert!(!today(&event_at(Some(local(2024, 5, 16, 0, 0, 0)))));
        assert!(!today(&event_at(Some(local(2024, 5, 14, 23, 59, 59)))));
        assert!(!today(&event_at(None)));
    }

    #[test]
    fn today_uses_local_not_utc_date() {
        let now = reference();
        // 22:30 UTC on the 15th is 01:30 local on the 16th.
        let late = Utc.with_ymd_and_hms(2024, 5, 15, 22, 30, 0).unwrap();
        let event = event_at(Some(late.with_timezone(&Helsinki)));
        assert!(!matches(FilterMode::Today, &now, &event));
    }

    #[test]
    fn weekend_window_from_midweek() {
        let now = reference();
        let weekend = |e: &Arc<Event>| matches(FilterMode::Weekend, &now, e);

        assert!(weekend(&event_at(Some(local(2024, 5, 18, 0, 0, 0)))));
        assert!(weekend(&event_at(Some(local(2024, 5, 18, 14, 0, 0)))));
        assert!(weekend(&event_at(Some(local(2024, 5, 19, 23, 59, 59)))));
        assert!(!weekend(&event_at(Some(local(2024, 5, 17, 23, 59, 59)))));
        assert!(!weekend(&event_at(Some(local(2024, 5, 20, 0, 0, 0)))));
        assert!(!weekend(&event_at(Some(local(2024, 5, 15, 12, 0, 0)))));
        assert!(!weekend(&event_at(None)));
    }

    #[test]
    fn weekend_spans_the_end_of_summer_time() {
        // Clocks go back at 04:00 on Sunday 2024-10-27. On the Wednesday
        // before, Helsinki is still at +03:00.
        let now = local(2024, 10, 23, 10, 0, 0);
        let late_sunday = local(2024, 10, 27, 23, 30, 0);
        assert_eq!(late_sunday.offset().fix().local_minus_utc(), 7200);

        let weekend = |e: &Arc<Event>| matches(FilterMode::Weekend, &now, e);
        assert!(weekend(&event_at(Some(late_sunday))));
        assert!(weekend(&event_at(Some(local(2024, 10, 26, 0, 0, 0)))));
        assert!(!weekend(&event_at(Some(local(2024, 10, 28, 0, 0, 0)))));
    }

    #[test]
    fn local_dates_across_the_start_of_summer_time() {
        // Clocks go forward at 03:00 on Sunday 2024-03-31.
        let now = local(2024, 3, 30, 12, 0, 0);
        let monday_early = local(2024, 4, 1, 0, 30, 0);
        let weekend = |e: &Arc<Event>| matches(FilterMode::Weekend, &now, e);
        assert!(weekend(&event_at(Some(local(2024, 3, 31, 23, 45, 0)))));
        assert!(!weekend(&event_at(Some(monday_early))));

        let sunday = local(2024, 3, 31, 9, 0, 0);
        let today = |e: &Arc<Event>| matches(FilterMode::Today, &sunday, e);
        assert!(today(&event_at(Some(local(2024, 3, 31, 0, 15, 0)))));
        assert!(today(&event_at(Some(local(2024, 3, 31, 23, 59, 0)))));
        assert!(!today(&event_at(Some(monday_early))));
    }

    #[test]
    fn weekend_window_on_saturday_and_sunday_is_current_weekend() {
        let saturday = NaiveDate::from_ymd_opt(2024, 5, 18).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 5, 19).unwrap();
        assert_eq!(weekend_window(saturday), (saturday, sunday));
        assert_eq!(weekend_window(sunday), (saturday, sunday));
    }

    #[test]
    fn weekend_window_from_monday_is_following_weekend() {
        let monday = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let (sat, sun) = weekend_window(monday);
        assert_eq!(sat, NaiveDate::from_ymd_opt(2024, 5, 25).unwrap());
        assert_eq!(sun, NaiveDate::from_ymd_opt(2024, 5, 26).unwrap());
    }

    #[test]
    fn apply_preserves_order_and_counts_agree() {
        let now = reference();
        let events = vec![
            event_at(Some(local(2024, 5, 15, 12, 0, 0))),
            event_at(Some(local(2024, 5, 18, 12, 0, 0))),
            event_at(Some(local(2024, 5, 15, 18, 0, 0))),
            event_at(None),
        ];
        let today = apply(FilterMode::Today, &now, &events);
        assert_eq!(today.len(), 2);
        assert_eq!(today[0].id, events[0].id);
        assert_eq!(today[1].id, events[2].id);

        let badges = counts(&now, &events);
        assert_eq!(
            badges,
            FilterCounts {
                all: 4,
                today: 2,
                weekend: 1,
            }
        );
        for mode in FilterMode::ALL_MODES {
            let applied = apply(mode, &now, &events);
            assert_eq!(u32::try_from(applied.len()).unwrap(), count(mode, &now, &events));
        }
    }
}
