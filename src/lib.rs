//! Four Pillars (Ba Zi) charts with month pillars resolved at exact solar-term
//! boundaries.
//!
//! ```
//! use four_pillars::resolve_month_pillar;
//!
//! // Cold Dew (寒露) fell at 10:45 CST on 9 October 1967.
//! let before = resolve_month_pillar(1967, 10, 9, 10, 44).unwrap();
//! let after = resolve_month_pillar(1967, 10, 9, 10, 45).unwrap();
//! assert_eq!("己酉", before.pillar.to_string());
//! assert_eq!("庚戌", after.pillar.to_string());
//! ```

pub mod cache;
pub mod calculator;
pub mod cycle;
pub mod error;
pub mod pillars;
pub mod resolver;
pub mod solar_longitude;
pub mod term_table;
pub mod types;

pub use cache::{ChartCache, ChartKey, CachedChart, Clock, SystemClock};

pub use calculator::{
    calculate, resolve_day_pillar, resolve_hour_pillar, resolve_month_pillar,
    resolve_year_pillar, to_cst, validate_date, validate_moment, BaziCalculator,
};

pub use cycle::{Branch, Element, Polarity, SolarTerm, Stem, StemBranch};

pub use error::{BaziError, Result};

pub use pillars::{
    day_cycle_index, day_pillar, double_hour_index, element_balance, hour_pillar, month_pillar,
    month_stem, year_pillar,
};

pub use resolver::{MonthResolver, YearPillarResolver};

pub use solar_longitude::{apparent_longitude, approximate_month_index, julian_day, term_at};

pub use term_table::{AstronomicalApproximation, PrecomputedTable, TermProvider, TermSource};

pub use types::{
    CalculatorConfig, Chart, DayMaster, ElementBalance, FourPillars, HourPillar, MonthPillar,
    MonthResolution, Provenance, SolarTermEntry, SolarTermTable, SourcePolicy, TermKind,
    YearResolution, CST_OFFSET_MINUTES,
};
