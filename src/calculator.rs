use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use crate::cycle::{Polarity, Stem, StemBranch};
use crate::error::{BaziError, Result};
use crate::pillars;
use crate::resolver::{MonthResolver, YearPillarResolver};
use crate::term_table::{TermProvider, TermSource};
use crate::types::{
    CalculatorConfig, Chart, DayMaster, FourPillars, HourPillar, MonthPillar, MonthResolution,
    SolarTermTable, YearResolution, CST_OFFSET_MINUTES,
};

static DEFAULT_CALCULATOR: LazyLock<BaziCalculator> = LazyLock::new(BaziCalculator::default);

pub fn validate_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
        return Err(BaziError::invalid("year", year));
    }
    if !(1..=12).contains(&month) {
        return Err(BaziError::invalid("month", month));
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or(BaziError::invalid("day", day))
}

pub fn validate_moment(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> Result<NaiveDateTime> {
    let date = validate_date(year, month, day)?;
    if hour > 23 {
        return Err(BaziError::invalid("hour", hour));
    }
    if minute > 59 {
        return Err(BaziError::invalid("minute", minute));
    }
    date.and_hms_opt(hour, minute, 0)
        .ok_or(BaziError::invalid("minute", minute))
}

/// Four Pillars calculator over a frozen solar-term source.
#[derive(Debug, Clone)]
pub struct BaziCalculator {
    config: CalculatorConfig,
    provider: TermProvider,
}

impl BaziCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            provider: TermProvider::from_config(&config),
            config,
        }
    }

    pub fn with_provider(config: CalculatorConfig, provider: TermProvider) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn provider(&self) -> &TermProvider {
        &self.provider
    }

    pub fn solar_terms(&self, year: i32) -> Result<SolarTermTable> {
        self.provider.table(year).map(|t| t.into_owned())
    }

    pub fn resolve_month(&self, moment: &NaiveDateTime) -> Result<MonthResolution> {
        MonthResolver::new(&self.provider).resolve(moment)
    }

    pub fn month_pillar_at(&self, moment: &NaiveDateTime) -> Result<MonthPillar> {
        let year = self.year_pillar_at(moment)?;
        self.month_pillar_in(&year, moment)
    }

    /// The month stem follows the Ba Zi year in force at `moment`.
    fn month_pillar_in(&self, year: &YearResolution, moment: &NaiveDateTime) -> Result<MonthPillar> {
        let month = self.resolve_month(moment)?;
        Ok(MonthPillar {
            pillar: pillars::month_pillar(year.pillar.stem, month.month_index)?,
            month_index: month.month_index,
            term: month.term,
            provenance: month.provenance,
            from_prior_year: month.from_prior_year,
        })
    }

    pub fn resolve_month_pillar(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<MonthPillar> {
        self.month_pillar_at(&validate_moment(year, month, day, hour, minute)?)
    }

    pub fn year_pillar_at(&self, moment: &NaiveDateTime) -> Result<YearResolution> {
        YearPillarResolver::new(&self.provider).resolve(moment)
    }

    /// Date-only variant; the whole Li Chun day belongs to the new year.
    pub fn resolve_year_pillar(&self, year: i32, month: u32, day: u32) -> Result<YearResolution> {
        let date = validate_date(year, month, day)?;
        YearPillarResolver::new(&self.provider).resolve_date(&date)
    }

    pub fn resolve_year_pillar_at(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<YearResolution> {
        self.year_pillar_at(&validate_moment(year, month, day, hour, minute)?)
    }

    pub fn resolve_day_pillar(&self, year: i32, month: u32, day: u32) -> Result<StemBranch> {
        Ok(pillars::day_pillar(&validate_date(year, month, day)?))
    }

    pub fn resolve_hour_pillar(&self, day_stem: Stem, hour: u32) -> Result<HourPillar> {
        pillars::hour_pillar(day_stem, hour)
    }

    pub fn calculate(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<Chart> {
        self.calculate_at(&validate_moment(year, month, day, hour, minute)?)
    }

    /// `moment` is a China Standard Time civil instant.
    pub fn calculate_at(&self, moment: &NaiveDateTime) -> Result<Chart> {
        let year = self.year_pillar_at(moment)?;
        let month = self.month_pillar_in(&year, moment)?;
        let day = pillars::day_pillar(&moment.date());
        let hour = pillars::hour_pillar(day.stem, moment.hour())?;
        let four = FourPillars {
            year,
            month,
            day,
            hour,
        };

        Ok(Chart {
            moment: *moment,
            zodiac: year.pillar.branch,
            day_master: DayMaster {
                stem: day.stem,
                pinyin: day.stem.pinyin(),
                element: day.stem.element(),
                yin: day.stem.polarity() == Polarity::Yin,
            },
            elements: pillars::element_balance(&four.as_array()),
            pillars: four,
        })
    }

    pub fn calculate_in_zone<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> Result<Chart> {
        self.calculate_at(&to_cst(dt)?)
    }
}

impl Default for BaziCalculator {
    fn default() -> Self {
        Self::new(CalculatorConfig::default())
    }
}

pub fn to_cst<Tz: TimeZone>(dt: &DateTime<Tz>) -> Result<NaiveDateTime> {
    let cst = FixedOffset::east_opt(CST_OFFSET_MINUTES * 60)
        .ok_or(BaziError::invalid("utc offset", CST_OFFSET_MINUTES))?;
    Ok(dt.with_timezone(&cst).naive_local())
}

pub fn resolve_month_pillar(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> Result<MonthPillar> {
    DEFAULT_CALCULATOR.resolve_month_pillar(year, month, day, hour, minute)
}

pub fn resolve_year_pillar(year: i32, month: u32, day: u32) -> Result<YearResolution> {
    DEFAULT_CALCULATOR.resolve_year_pillar(year, month, day)
}

pub fn resolve_day_pillar(year: i32, month: u32, day: u32) -> Result<StemBranch> {
    DEFAULT_CALCULATOR.resolve_day_pillar(year, month, day)
}

pub fn resolve_hour_pillar(day_stem: Stem, hour: u32) -> Result<HourPillar> {
    DEFAULT_CALCULATOR.resolve_hour_pillar(day_stem, hour)
}

pub fn calculate(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<Chart> {
    DEFAULT_CALCULATOR.calculate(year, month, day, hour, minute)
}
