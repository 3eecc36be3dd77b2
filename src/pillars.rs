use chrono::{Datelike, NaiveDate};

use crate::cycle::{Branch, Element, Polarity, Stem, StemBranch, CYCLE_LENGTH};
use crate::error::{BaziError, Result};
use crate::types::{ElementBalance, HourPillar};

/// Sexagenary offset of year 4 CE, the 甲子 anchor.
pub const YEAR_CYCLE_ANCHOR: i32 = 4;

/// Days-from-CE ordinal of 1900-01-01, a 甲戌 day.
pub const DAY_EPOCH_ORDINAL: i32 = 693_596;
pub const DAY_EPOCH_CYCLE_INDEX: i32 = 10;

pub fn year_pillar(effective_year: i32) -> StemBranch {
    StemBranch::from_cycle_index((effective_year - YEAR_CYCLE_ANCHOR) as i64)
}

/// 甲己之年丙作首: 0-based stems, month 1 = 寅.
pub fn month_stem(year_stem: Stem, month_index: u32) -> Stem {
    Stem::from_index(2 * year_stem.index() as i64 + month_index as i64 + 1)
}

pub fn month_pillar(year_stem: Stem, month_index: u32) -> Result<StemBranch> {
    if !(1..=12).contains(&month_index) {
        return Err(BaziError::invalid("month index", month_index));
    }
    Ok(StemBranch::new(
        month_stem(year_stem, month_index),
        Branch::for_solar_month(month_index),
    ))
}

/// Position of `date` in the 60-day cycle, counted in calendar days.
pub fn day_cycle_index(date: &NaiveDate) -> usize {
    let elapsed = date.num_days_from_ce() - DAY_EPOCH_ORDINAL;
    (elapsed + DAY_EPOCH_CYCLE_INDEX).rem_euclid(CYCLE_LENGTH as i32) as usize
}

pub fn day_pillar(date: &NaiveDate) -> StemBranch {
    StemBranch::from_cycle_index(day_cycle_index(date) as i64)
}

/// Double-hour block; 23:00 to 00:59 is block 0 (子).
pub fn double_hour_index(hour: u32) -> usize {
    ((hour as usize + 1) / 2) % 12
}

/// 甲己還加甲: each day stem fixes the stem of its 子 hour.
pub fn hour_stem(day_stem: Stem, hour_branch: Branch) -> Stem {
    Stem::from_index(((day_stem.index() % 5) * 2 + hour_branch.index()) as i64)
}

pub fn hour_pillar(day_stem: Stem, hour: u32) -> Result<HourPillar> {
    if hour > 23 {
        return Err(BaziError::invalid("hour", hour));
    }
    let branch = Branch::ALL[double_hour_index(hour)];
    Ok(HourPillar {
        pillar: StemBranch::new(hour_stem(day_stem, branch), branch),
        double_hour: branch.double_hour_name(),
    })
}

/// Five-element tally over stems and branches; polarity over stems only.
pub fn element_balance(pillars: &[StemBranch]) -> ElementBalance {
    let mut counts = [0u32; 5];
    let (mut yang_stems, mut yin_stems) = (0, 0);
    for pillar in pillars {
        counts[pillar.stem.element() as usize] += 1;
        counts[pillar.branch.element() as usize] += 1;
        match pillar.stem.polarity() {
            Polarity::Yang => yang_stems += 1,
            Polarity::Yin => yin_stems += 1,
        }
    }

    // First element wins ties.
    let mut dominant = Element::ALL[0];
    for element in Element::ALL {
        if counts[element as usize] > counts[dominant as usize] {
            dominant = element;
        }
    }
    let missing = Element::ALL
        .into_iter()
        .filter(|e| counts[*e as usize] == 0)
        .collect();

    ElementBalance {
        counts,
        yang_stems,
        yin_stems,
        dominant,
        missing,
    }
}
