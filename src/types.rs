use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::cycle::{Branch, Element, SolarTerm, Stem, StemBranch};

/// China Standard Time, the reference zone of every civil timestamp in the crate.
pub const CST_OFFSET_MINUTES: i32 = 480;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TermKind {
    /// 節, opens a solar month.
    Jie,
    /// 氣, mid-month.
    Qi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Provenance {
    Table,
    /// Astronomical approximation; may be off by up to a day near a boundary.
    Approximation,
    /// No data; a conventional default was used.
    Assumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SolarTermEntry {
    pub timestamp: NaiveDateTime,
    pub term: SolarTerm,
}

impl SolarTermEntry {
    pub fn new(timestamp: NaiveDateTime, term: SolarTerm) -> Self {
        Self { timestamp, term }
    }

    pub fn name(&self) -> &'static str {
        self.term.name()
    }

    pub fn kind(&self) -> TermKind {
        self.term.kind()
    }

    pub fn month_index(&self) -> Option<u32> {
        self.term.month_index()
    }

    pub fn is_jie(&self) -> bool {
        self.kind() == TermKind::Jie
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarTermTable {
    /// Gregorian year containing every entry's timestamp.
    pub year: i32,
    pub provenance: Provenance,
    /// Ascending by timestamp.
    pub entries: Vec<SolarTermEntry>,
}

impl SolarTermTable {
    pub fn jie(&self) -> impl Iterator<Item = &SolarTermEntry> + '_ {
        self.entries.iter().filter(|e| e.is_jie())
    }

    pub fn find(&self, term: SolarTerm) -> Option<&SolarTermEntry> {
        self.entries.iter().find(|e| e.term == term)
    }

    pub fn li_chun(&self) -> Option<&SolarTermEntry> {
        self.find(SolarTerm::LiChun)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthResolution {
    /// 1 = 寅 (from 立春) … 12 = 丑 (from 小寒).
    pub month_index: u32,
    /// Most recently crossed `jie`, if known.
    pub term: Option<SolarTerm>,
    pub term_time: Option<NaiveDateTime>,
    pub provenance: Provenance,
    /// The `jie` was found in the previous Gregorian year's table.
    pub from_prior_year: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearResolution {
    pub effective_year: i32,
    pub pillar: StemBranch,
    pub li_chun: NaiveDateTime,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthPillar {
    pub pillar: StemBranch,
    pub month_index: u32,
    pub term: Option<SolarTerm>,
    pub provenance: Provenance,
    pub from_prior_year: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourPillar {
    pub pillar: StemBranch,
    pub double_hour: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FourPillars {
    pub year: YearResolution,
    pub month: MonthPillar,
    pub day: StemBranch,
    pub hour: HourPillar,
}

impl FourPillars {
    pub fn as_array(&self) -> [StemBranch; 4] {
        [self.year.pillar, self.month.pillar, self.day, self.hour.pillar]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementBalance {
    /// Counts in `Element::ALL` order, over four stems and four branches.
    pub counts: [u32; 5],
    pub yang_stems: u32,
    pub yin_stems: u32,
    pub dominant: Element,
    pub missing: Vec<Element>,
}

impl ElementBalance {
    pub fn count(&self, element: Element) -> u32 {
        self.counts[element as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMaster {
    pub stem: Stem,
    pub pinyin: &'static str,
    pub element: Element,
    pub yin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub moment: NaiveDateTime,
    pub pillars: FourPillars,
    pub zodiac: Branch,
    pub day_master: DayMaster,
    pub elements: ElementBalance,
}

impl Chart {
    pub fn date(&self) -> NaiveDate {
        self.moment.date()
    }

    /// Lowest-confidence source among the year and month resolutions.
    pub fn provenance(&self) -> Provenance {
        self.pillars.year.provenance.max(self.pillars.month.provenance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourcePolicy {
    TableOnly,
    TableWithApproximation,
    ApproximationOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorConfig {
    pub source: SourcePolicy,
    pub approximation_first_year: i32,
    pub approximation_last_year: i32,
    pub cache_ttl_minutes: i64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            source: SourcePolicy::TableWithApproximation,
            approximation_first_year: 1800,
            approximation_last_year: 2200,
            cache_ttl_minutes: 24 * 60,
        }
    }
}
