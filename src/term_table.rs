use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use chrono::{Datelike, NaiveDateTime};
use tracing::debug;

use crate::cycle::SolarTerm;
use crate::error::{BaziError, Result};
use crate::solar_longitude;
use crate::types::{CalculatorConfig, Provenance, SolarTermEntry, SolarTermTable, SourcePolicy};

static BUILTIN_DATA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/solar_terms.txt"));

static BUILTIN: LazyLock<Arc<PrecomputedTable>> = LazyLock::new(|| {
    let table = PrecomputedTable::parse(BUILTIN_DATA)
        .unwrap_or_else(|e| panic!("embedded solar-term data is invalid: {e}"));
    Arc::new(table)
});

pub trait TermSource {
    fn table(&self, year: i32) -> Result<Cow<'_, SolarTermTable>>;
}

/// Static per-year transition times, parsed once and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecomputedTable {
    years: BTreeMap<i32, SolarTermTable>,
}

impl PrecomputedTable {
    pub fn builtin() -> Arc<PrecomputedTable> {
        Arc::clone(&BUILTIN)
    }

    /// Parses `YYYY-MM-DD HH:MM <term>` records; `#` starts a comment.
    pub fn parse(text: &str) -> Result<Self> {
        let mut years: BTreeMap<i32, SolarTermTable> = BTreeMap::new();
        let mut first_lines: BTreeMap<i32, usize> = BTreeMap::new();

        for (line_num, line) in (1usize..).zip(text.lines()) {
            let Some(entry) = parse_line(line_num, line)? else {
                continue;
            };
            let year = entry.timestamp.year();
            match years.entry(year) {
                Entry::Vacant(slot) => {
                    first_lines.insert(year, line_num);
                    slot.insert(SolarTermTable {
                        year,
                        provenance: Provenance::Table,
                        entries: vec![entry],
                    });
                }
                Entry::Occupied(mut slot) => {
                    let entries = &mut slot.get_mut().entries;
                    if let Some(last) = entries.last() {
                        if entry.timestamp <= last.timestamp {
                            return Err(malformed(
                                line_num,
                                format!("{} is not after {}", entry.name(), last.name()),
                            ));
                        }
                    }
                    entries.push(entry);
                }
            }
        }

        for (year, table) in &years {
            let line = first_lines.get(year).copied().unwrap_or(0);
            validate_year(table).map_err(|reason| malformed(line, reason))?;
        }

        Ok(Self { years })
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.contains_key(&year)
    }

    pub fn lookup(&self, year: i32) -> Result<&SolarTermTable> {
        self.years.get(&year).ok_or(BaziError::NoData { year })
    }
}

impl TermSource for PrecomputedTable {
    fn table(&self, year: i32) -> Result<Cow<'_, SolarTermTable>> {
        self.lookup(year).map(Cow::Borrowed)
    }
}

fn malformed(line: usize, reason: String) -> BaziError {
    BaziError::MalformedTable { line, reason }
}

fn parse_line(line_num: usize, line: &str) -> Result<Option<SolarTermEntry>> {
    let content = line.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = content.split_whitespace().collect();
    let &[date, time, name] = fields.as_slice() else {
        return Err(malformed(
            line_num,
            format!("expected 3 fields, found {}", fields.len()),
        ));
    };
    let timestamp = NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
        .map_err(|e| malformed(line_num, format!("bad timestamp '{date} {time}': {e}")))?;
    let term = SolarTerm::from_name(name)
        .ok_or_else(|| malformed(line_num, format!("unknown solar term '{name}'")))?;
    Ok(Some(SolarTermEntry::new(timestamp, term)))
}

/// Twelve distinct `jie`, each opening the month after its predecessor.
fn validate_year(table: &SolarTermTable) -> std::result::Result<(), String> {
    let mut seen = [false; 24];
    for entry in &table.entries {
        let idx = entry.term.index();
        if seen[idx] {
            return Err(format!("{} listed twice in {}", entry.name(), table.year));
        }
        seen[idx] = true;
    }

    let months: Vec<u32> = table.jie().filter_map(|e| e.month_index()).collect();
    if months.len() != 12 {
        return Err(format!("{} has {} jie terms, expected 12", table.year, months.len()));
    }
    for pair in months.windows(2) {
        if pair[1] != pair[0] % 12 + 1 {
            return Err(format!(
                "{}: month {} follows month {}",
                table.year, pair[1], pair[0]
            ));
        }
    }
    Ok(())
}

/// Degraded fallback computing term instants from the approximate solar
/// longitude. Instants may be off by up to a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AstronomicalApproximation {
    pub first_year: i32,
    pub last_year: i32,
}

impl AstronomicalApproximation {
    pub fn new(first_year: i32, last_year: i32) -> Self {
        Self {
            first_year,
            last_year,
        }
    }

    pub fn covers(&self, year: i32) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }

    pub fn generate(&self, year: i32) -> Result<SolarTermTable> {
        if !self.covers(year) {
            return Err(BaziError::NoData { year });
        }
        let mut entries = SolarTerm::ALL
            .iter()
            .map(|&term| {
                solar_longitude::term_instant(year, term)
                    .map(|timestamp| SolarTermEntry::new(timestamp, term))
                    .ok_or(BaziError::NoData { year })
            })
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.timestamp);

        Ok(SolarTermTable {
            year,
            provenance: Provenance::Approximation,
            entries,
        })
    }
}

impl Default for AstronomicalApproximation {
    fn default() -> Self {
        let config = CalculatorConfig::default();
        Self::new(config.approximation_first_year, config.approximation_last_year)
    }
}

impl TermSource for AstronomicalApproximation {
    fn table(&self, year: i32) -> Result<Cow<'_, SolarTermTable>> {
        self.generate(year).map(Cow::Owned)
    }
}

/// Precomputed data first, approximation only for years the table lacks.
#[derive(Debug, Clone)]
pub struct TermProvider {
    table: Option<Arc<PrecomputedTable>>,
    approximation: Option<AstronomicalApproximation>,
}

impl TermProvider {
    pub fn new(
        table: Option<Arc<PrecomputedTable>>,
        approximation: Option<AstronomicalApproximation>,
    ) -> Self {
        Self {
            table,
            approximation,
        }
    }

    pub fn from_config(config: &CalculatorConfig) -> Self {
        let approximation = AstronomicalApproximation::new(
            config.approximation_first_year,
            config.approximation_last_year,
        );
        match config.source {
            SourcePolicy::TableOnly => Self::new(Some(PrecomputedTable::builtin()), None),
            SourcePolicy::TableWithApproximation => {
                Self::new(Some(PrecomputedTable::builtin()), Some(approximation))
            }
            SourcePolicy::ApproximationOnly => Self::new(None, Some(approximation)),
        }
    }

    pub fn precomputed(&self) -> Option<&PrecomputedTable> {
        self.table.as_deref()
    }
}

impl Default for TermProvider {
    fn default() -> Self {
        Self::from_config(&CalculatorConfig::default())
    }
}

impl TermSource for TermProvider {
    fn table(&self, year: i32) -> Result<Cow<'_, SolarTermTable>> {
        if let Some(table) = &self.table {
            if let Ok(found) = table.lookup(year) {
                return Ok(Cow::Borrowed(found));
            }
        }
        match &self.approximation {
            Some(approximation) if approximation.covers(year) => {
                debug!(year, "no precomputed solar terms, using astronomical approximation");
                approximation
                    .generate(year)
                    .map(Cow::Owned)
                    .map_err(|_| BaziError::UnsupportedYear { year })
            }
            _ => Err(BaziError::UnsupportedYear { year }),
        }
    }
}
