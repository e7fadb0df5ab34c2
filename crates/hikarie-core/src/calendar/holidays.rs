//! Japanese national holidays.
//!
//! Rules follow the Act on National Holidays as amended through 2021,
//! including Happy Monday dates, the computed equinoxes, the 2019
//! enthronement days and the Olympic reshuffles of 2020 and 2021.
//! Equinoxes are computed for 1980-2099 only.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Name of the national holiday falling on `date`, if any.
///
/// Substitute holidays and citizens' holidays are included.
pub fn holiday_name(date: NaiveDate) -> Option<&'static str> {
    if let Some(name) = statutory_holiday(date) {
        return Some(name);
    }
    if is_substitute_holiday(date) {
        return Some("Substitute Holiday");
    }
    if is_citizens_holiday(date) {
        return Some("Citizens' Holiday");
    }
    None
}

pub fn is_national_holiday(date: NaiveDate) -> bool {
    holiday_name(date).is_some()
}

/// Holidays named directly by the law, before substitution rules.
fn statutory_holiday(date: NaiveDate) -> Option<&'static str> {
    let year = date.year();
    let (month, day) = (date.month(), date.day());

    match (month, day) {
        (1, 1) => return Some("New Year's Day"),
        (2, 11) if year >= 1967 => return Some("National Foundation Day"),
        (2, 23) if year >= 2020 => return Some("Emperor's Birthday"),
        (4, 29) if year >= 2007 => return Some("Showa Day"),
        (4, 29) if year >= 1989 => return Some("Greenery Day"),
        (5, 3) => return Some("Constitution Memorial Day"),
        (5, 4) if year >= 2007 => return Some("Greenery Day"),
        (5, 5) => return Some("Children's Day"),
        (11, 3) => return Some("Culture Day"),
        (11, 23) => return Some("Labour Thanksgiving Day"),
        (12, 23) if (1989..=2018).contains(&year) => return Some("Emperor's Birthday"),
        _ => {}
    }

    if year == 2019 && ((month, day) == (5, 1) || (month, day) == (10, 22)) {
        return Some("Enthronement Day");
    }

    if Some(date) == coming_of_age_day(year) {
        return Some("Coming of Age Day");
    }
    if Some(date) == marine_day(year) {
        return Some("Marine Day");
    }
    if Some(date) == mountain_day(year) {
        return Some("Mountain Day");
    }
    if Some(date) == respect_for_the_aged_day(year) {
        return Some("Respect for the Aged Day");
    }
    if Some(date) == sports_day(year) {
        return Some("Sports Day");
    }
    if Some(date) == vernal_equinox(year) {
        return Some("Vernal Equinox Day");
    }
    if Some(date) == autumnal_equinox(year) {
        return Some("Autumnal Equinox Day");
    }
    None
}

/// A Sunday holiday moves to the next day that is not itself a holiday.
fn is_substitute_holiday(date: NaiveDate) -> bool {
    let year = date.year();
    if year < 1973 || date.weekday() == Weekday::Sun || statutory_holiday(date).is_some() {
        return false;
    }
    if year < 2007 {
        let prev = date - Duration::days(1);
        return date.weekday() == Weekday::Mon && statutory_holiday(prev).is_some();
    }

    let mut prev = date - Duration::days(1);
    while statutory_holiday(prev).is_some() {
        if prev.weekday() == Weekday::Sun {
            return true;
        }
        prev -= Duration::days(1);
    }
    false
}

/// A weekday sandwiched between two holidays.
fn is_citizens_holiday(date: NaiveDate) -> bool {
    if date.year() < 1988 || date.weekday() == Weekday::Sun {
        return false;
    }
    statutory_holiday(date - Duration::days(1)).is_some()
        && statutory_holiday(date + Duration::days(1)).is_some()
}

fn nth_monday(year: i32, month: u32, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Mon, n)
}

fn coming_of_age_day(year: i32) -> Option<NaiveDate> {
    if year >= 2000 {
        nth_monday(year, 1, 2)
    } else {
        NaiveDate::from_ymd_opt(year, 1, 15)
    }
}

fn marine_day(year: i32) -> Option<NaiveDate> {
    match year {
        2020 => NaiveDate::from_ymd_opt(2020, 7, 23),
        2021 => NaiveDate::from_ymd_opt(2021, 7, 22),
        y if y >= 2003 => nth_monday(y, 7, 3),
        y if y >= 1996 => NaiveDate::from_ymd_opt(y, 7, 20),
        _ => None,
    }
}

fn mountain_day(year: i32) -> Option<NaiveDate> {
    match year {
        2020 => NaiveDate::from_ymd_opt(2020, 8, 10),
        2021 => NaiveDate::from_ymd_opt(2021, 8, 8),
        y if y >= 2016 => NaiveDate::from_ymd_opt(y, 8, 11),
        _ => None,
    }
}

fn respect_for_the_aged_day(year: i32) -> Option<NaiveDate> {
    if year >= 2003 {
        nth_monday(year, 9, 3)
    } else {
        NaiveDate::from_ymd_opt(year, 9, 15)
    }
}

fn sports_day(year: i32) -> Option<NaiveDate> {
    match year {
        2020 => NaiveDate::from_ymd_opt(2020, 7, 24),
        2021 => NaiveDate::from_ymd_opt(2021, 7, 23),
        y if y >= 2000 => nth_monday(y, 10, 2),
        y => NaiveDate::from_ymd_opt(y, 10, 10),
    }
}

fn equinox_day(year: i32, base: f64) -> Option<u32> {
    if !(1980..=2099).contains(&year) {
        return None;
    }
    let offset = f64::from(year - 1980);
    let day = (base + 0.242194 * offset).floor() as i32 - (year - 1980) / 4;
    u32::try_from(day).ok()
}

fn vernal_equinox(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 3, equinox_day(year, 20.8431)?)
}

fn autumnal_equinox(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 9, equinox_day(year, 23.2488)?)
}
