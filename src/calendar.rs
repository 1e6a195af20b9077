use crate::models::WeekId;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

/// Week identifier for the week containing `today`.
///
/// Week 1 starts on the Monday of the week that holds January 4. Days before
/// that Monday belong to the last week of the previous year. Late-December days
/// are not moved forward, so they may carry week 53 of their own year.
pub fn current_week_identifier(today: NaiveDate) -> WeekId {
    week_identifier_of(today).unwrap_or_else(|| {
        let iso = today.iso_week();
        WeekId::new(iso.year(), iso.week())
    })
}

fn week_identifier_of(today: NaiveDate) -> Option<WeekId> {
    let monday = monday_of(today);
    let year = today.year();

    let week = week_number(year, monday)?;
    if week > 0 {
        return Some(WeekId::new(year, u32::try_from(week).ok()?));
    }

    let week = week_number(year - 1, monday)?;
    Some(WeekId::new(year - 1, u32::try_from(week).ok()?))
}

fn week_number(year: i32, monday: NaiveDate) -> Option<i64> {
    let anchor = week_one_monday(year)?;
    Some((monday - anchor).num_days().div_euclid(7) + 1)
}

/// Monday..Friday of `week`.
///
/// The week number is not range checked: week 0 lands in the previous year and
/// week 54 in the next. `None` only when the dates fall outside the calendar
/// chrono can represent.
pub fn week_to_dates(week: WeekId) -> Option<[NaiveDate; 5]> {
    let anchor = week_one_monday(week.year)?;
    let offset = (i64::from(week.week) - 1) * 7;
    let monday = anchor.checked_add_signed(Duration::days(offset))?;
    monday.checked_add_signed(Duration::days(4))?;
    Some(std::array::from_fn(|day| monday + Duration::days(day as i64)))
}

/// Every date from `start` to `end` inclusive. Empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|date| *date <= end).collect()
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `n` days before `today`, through `today`.
pub fn last_days(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(i64::from(days)), today)
}

/// First of the current month through `today`.
pub fn current_month(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(i64::from(today.day0())), today)
}

/// One calendar month back through `today`. The start day is clamped to the
/// end of a shorter month (March 31 goes back to February 28 or 29).
pub fn default_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_months(Months::new(1))
        .unwrap_or(today);
    (start, today)
}

fn week_one_monday(year: i32) -> Option<NaiveDate> {
    let jan4 = NaiveDate::from_yo_opt(year, 4)?;
    jan4.checked_sub_signed(Duration::days(i64::from(
        jan4.weekday().num_days_from_monday(),
    )))
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_one_starts_on_iso_anchor() {
        assert_eq!(week_to_dates(WeekId::new(2025, 1)).unwrap()[0], day(2024, 12, 30));
        assert_eq!(week_to_dates(WeekId::new(2026, 1)).unwrap()[0], day(2025, 12, 29));
        assert_eq!(week_to_dates(WeekId::new(2024, 1)).unwrap()[0], day(2024, 1, 1));
        assert_eq!(week_to_dates(WeekId::new(2021, 1)).unwrap()[0], day(2021, 1, 4));
    }

    #[test]
    fn week_one_monday_is_on_or_before_first_thursday() {
        for year in 1990..2060 {
            let monday = week_to_dates(WeekId::new(year, 1)).unwrap()[0];
            let first_thursday = day(year, 1, 1)
                .iter_days()
                .find(|date| date.weekday() == Weekday::Thu)
                .unwrap();
            assert_eq!(monday.weekday(), Weekday::Mon);
            assert!(monday <= first_thursday);
            assert!(first_thursday - monday < Duration::days(7));
        }
    }

    #[test]
    fn week_dates_run_monday_to_friday() {
        let dates = week_to_dates(WeekId::new(2026, 43)).unwrap();
        assert_eq!(
            dates,
            [
                day(2026, 10, 19),
                day(2026, 10, 20),
                day(2026, 10, 21),
                day(2026, 10, 22),
                day(2026, 10, 23),
            ]
        );
    }

    #[test]
    fn current_week_round_trips_for_every_day() {
        let expected = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ];
        for year in [2020, 2021, 2022, 2023, 2024, 2025, 2026, 2027] {
            for today in date_range(day(year, 1, 1), day(year, 12, 31)) {
                let week = current_week_identifier(today);
                let dates = week_to_dates(week).unwrap();
                let weekdays: Vec<Weekday> = dates.iter().map(|d| d.weekday()).collect();
                assert_eq!(weekdays, expected, "{today} -> {week}");
                assert_eq!(dates[0], monday_of(today), "{today} -> {week}");
            }
        }
    }

    #[test]
    fn early_january_belongs_to_previous_year() {
        // 2021-01-01 is a Friday, 2022-01-01 a Saturday, 2023-01-01 a Sunday.
        assert_eq!(current_week_identifier(day(2021, 1, 1)).to_string(), "2020-W53");
        assert_eq!(current_week_identifier(day(2022, 1, 1)).to_string(), "2021-W52");
        assert_eq!(current_week_identifier(day(2023, 1, 1)).to_string(), "2022-W52");
        assert_eq!(current_week_identifier(day(2023, 1, 2)).to_string(), "2023-W01");
    }

    #[test]
    fn matches_iso_weeks_inside_the_year() {
        for today in date_range(day(2019, 1, 1), day(2030, 12, 31)) {
            let iso = today.iso_week();
            if iso.year() > today.year() {
                continue;
            }
            assert_eq!(current_week_identifier(today), WeekId::new(iso.year(), iso.week()));
        }
    }

    #[test]
    fn late_december_keeps_its_own_year() {
        let week = current_week_identifier(day(2024, 12, 31));
        assert_eq!(week.to_string(), "2024-W53");
        assert_eq!(week_to_dates(week).unwrap()[0], day(2024, 12, 30));
    }

    #[test]
    fn out_of_range_weeks_spill_into_neighbouring_years() {
        assert_eq!(week_to_dates(WeekId::new(2025, 0)).unwrap()[0], day(2024, 12, 23));
        assert_eq!(week_to_dates(WeekId::new(2025, 54)).unwrap()[0], day(2026, 1, 5));
    }

    #[test]
    fn date_range_edges() {
        let d = day(2026, 3, 4);
        assert_eq!(date_range(d, d), vec![d]);
        assert!(date_range(day(2026, 3, 5), d).is_empty());

        let leap = date_range(day(2024, 2, 27), day(2024, 3, 1));
        assert_eq!(
            leap,
            vec![day(2024, 2, 27), day(2024, 2, 28), day(2024, 2, 29), day(2024, 3, 1)]
        );
    }

    #[test]
    fn weekday_filter() {
        assert!(is_weekday(day(2026, 10, 19)));
        assert!(is_weekday(day(2026, 10, 23)));
        assert!(!is_weekday(day(2026, 10, 24)));
        assert!(!is_weekday(day(2026, 10, 25)));
    }

    #[test]
    fn preset_ranges() {
        let today = day(2026, 3, 31);
        assert_eq!(last_days(today, 7), (day(2026, 3, 24), today));
        assert_eq!(current_month(today), (day(2026, 3, 1), today));
        assert_eq!(default_range(today), (day(2026, 2, 28), today));
        assert_eq!(default_range(day(2026, 1, 15)), (day(2025, 12, 15), day(2026, 1, 15)));
    }
}
