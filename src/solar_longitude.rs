//! Low-precision apparent solar longitude.
//!
//! Mean longitude plus a three-harmonic equation of center, with the usual
//! nutation/aberration correction. Good to a few hundredths of a degree, which
//! puts solar-term instants within roughly an hour of the truth; the result is
//! only ever used as a degraded fallback for years the precomputed table lacks.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::cycle::{SolarTerm, DEGREES_PER_TERM, LI_CHUN_LONGITUDE};
use crate::types::CST_OFFSET_MINUTES;

pub const J2000: f64 = 2451545.0;
pub const DAYS_PER_CENTURY: f64 = 36525.0;
pub const TROPICAL_YEAR_DAYS: f64 = 365.2422;
const UNIX_EPOCH_JD: f64 = 2440587.5;
const MINUTES_PER_DAY: f64 = 1440.0;
// Sun's longitude is close to 280° at 0h on 1 January.
const JANUARY_FIRST_LONGITUDE: f64 = 280.0;
const SEARCH_HALF_WINDOW_DAYS: f64 = 6.0;
const SEARCH_ITERATIONS: u32 = 48;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Signed difference `a - b` folded into `[-180, 180)`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    (a - b + 180.0).rem_euclid(360.0) - 180.0
}

/// Julian day number of a proleptic Gregorian date (noon-based integer).
pub fn julian_day_number(year: i32, month: u32, day: u32) -> i64 {
    let (year, month, day) = (year as i64, month as i64, day as i64);
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32045
}

pub fn julian_day(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> f64 {
    julian_day_number(year, month, day) as f64 - 0.5
        + (hour as f64 + minute as f64 / 60.0) / 24.0
}

/// Julian date of a China Standard Time civil instant.
pub fn julian_day_cst(moment: &NaiveDateTime) -> f64 {
    julian_day(
        moment.year(),
        moment.month(),
        moment.day(),
        moment.hour(),
        moment.minute(),
    ) - CST_OFFSET_MINUTES as f64 / MINUTES_PER_DAY
}

/// China Standard Time civil instant of a Julian date, rounded to the minute.
pub fn cst_from_julian_day(jd: f64) -> Option<NaiveDateTime> {
    let minutes = ((jd - UNIX_EPOCH_JD) * MINUTES_PER_DAY).round() as i64
        + CST_OFFSET_MINUTES as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_minutes(minutes)?)
}

pub fn julian_centuries(jd: f64) -> f64 {
    (jd - J2000) / DAYS_PER_CENTURY
}

pub fn mean_longitude(t: f64) -> f64 {
    normalize_angle(280.46646 + 36000.76983 * t + 0.0003032 * t * t)
}

pub fn mean_anomaly(t: f64) -> f64 {
    normalize_angle(357.52911 + 35999.05029 * t - 0.0001537 * t * t)
}

pub fn equation_of_center(t: f64) -> f64 {
    let m = deg_to_rad(mean_anomaly(t));
    (1.914602 - 0.004817 * t - 0.000014 * t * t) * m.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * m).sin()
        + 0.000289 * (3.0 * m).sin()
}

/// Apparent geocentric ecliptic longitude of the Sun, degrees in `[0, 360)`.
pub fn apparent_longitude(jd: f64) -> f64 {
    let t = julian_centuries(jd);
    let true_longitude = mean_longitude(t) + equation_of_center(t);
    let omega = deg_to_rad(125.04 - 1934.136 * t);
    normalize_angle(true_longitude - 0.00569 - 0.00478 * omega.sin())
}

pub fn sun_longitude(moment: &NaiveDateTime) -> f64 {
    apparent_longitude(julian_day_cst(moment))
}

/// Solar term whose 15° band contains the Sun at `moment`.
pub fn term_at(moment: &NaiveDateTime) -> SolarTerm {
    SolarTerm::from_longitude(sun_longitude(moment))
}

/// Solar month (1..=12) from the 30° band measured from 立春.
pub fn approximate_month_index(moment: &NaiveDateTime) -> u32 {
    let offset = normalize_angle(sun_longitude(moment) - LI_CHUN_LONGITUDE);
    (offset / (2.0 * DEGREES_PER_TERM)).floor() as u32 % 12 + 1
}

/// Julian date at which the Sun reaches `target` longitude, searched by
/// bisection in a window around `guess_jd`.
pub fn find_crossing(target: f64, guess_jd: f64) -> Option<f64> {
    let f = |jd: f64| angle_difference(apparent_longitude(jd), target);
    let mut lo = guess_jd - SEARCH_HALF_WINDOW_DAYS;
    let mut hi = guess_jd + SEARCH_HALF_WINDOW_DAYS;
    if f(lo) >= 0.0 || f(hi) < 0.0 {
        return None;
    }
    for _ in 0..SEARCH_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if f(mid) >= 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Some(hi)
}

/// Initial estimate of when `term` falls in Gregorian `year`, from mean motion.
pub fn estimate_term_jd(year: i32, term: SolarTerm) -> f64 {
    let degrees_since_new_year = normalize_angle(term.longitude() - JANUARY_FIRST_LONGITUDE);
    julian_day(year, 1, 1, 0, 0) + degrees_since_new_year / 360.0 * TROPICAL_YEAR_DAYS
}

pub fn term_instant(year: i32, term: SolarTerm) -> Option<NaiveDateTime> {
    let jd = find_crossing(term.longitude(), estimate_term_jd(year, term))?;
    cst_from_julian_day(jd)
}
