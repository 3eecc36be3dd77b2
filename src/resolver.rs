use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::cycle::SolarTerm;
use crate::error::{BaziError, Result};
use crate::pillars;
use crate::term_table::TermSource;
use crate::types::{MonthResolution, Provenance, SolarTermEntry, SolarTermTable, YearResolution};

/// Li Chun assumed when no source covers the year.
const FALLBACK_LI_CHUN: (u32, u32) = (2, 4);

/// Last `jie` at or before `moment`, with its month index.
fn latest_jie<'t>(
    table: &'t SolarTermTable,
    moment: &NaiveDateTime,
) -> Option<(u32, &'t SolarTermEntry)> {
    table
        .jie()
        .take_while(|e| e.timestamp <= *moment)
        .filter_map(|e| e.month_index().map(|m| (m, e)))
        .last()
}

fn last_jie(table: &SolarTermTable) -> Option<(u32, &SolarTermEntry)> {
    table
        .jie()
        .filter_map(|e| e.month_index().map(|m| (m, e)))
        .last()
}

pub struct MonthResolver<'a, S: TermSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: TermSource + ?Sized> MonthResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Month boundaries are inclusive on the new side: the exact `jie` minute
    /// already belongs to the month it opens.
    pub fn resolve(&self, moment: &NaiveDateTime) -> Result<MonthResolution> {
        let year = moment.year();
        let table = self.source.table(year)?;

        if let Some((month_index, entry)) = latest_jie(&table, moment) {
            return Ok(MonthResolution {
                month_index,
                term: Some(entry.term),
                term_time: Some(entry.timestamp),
                provenance: table.provenance,
                from_prior_year: false,
            });
        }

        // Before this year's first jie the month was opened in December.
        if let Ok(prior) = self.source.table(year - 1) {
            if let Some((month_index, entry)) = last_jie(&prior) {
                debug!(year, term = entry.name(), "month carried over from prior year");
                return Ok(MonthResolution {
                    month_index,
                    term: Some(entry.term),
                    term_time: Some(entry.timestamp),
                    provenance: prior.provenance.max(table.provenance),
                    from_prior_year: true,
                });
            }
        }

        warn!(%moment, "no jie before moment and no prior-year data, assuming month 12");
        Ok(MonthResolution {
            month_index: 12,
            term: None,
            term_time: None,
            provenance: Provenance::Assumed,
            from_prior_year: false,
        })
    }
}

pub struct YearPillarResolver<'a, S: TermSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: TermSource + ?Sized> YearPillarResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Li Chun of Gregorian `year`, falling back to 4 February 00:00.
    pub fn li_chun(&self, year: i32) -> Result<(NaiveDateTime, Provenance)> {
        if let Ok(table) = self.source.table(year) {
            if let Some(entry) = table.find(SolarTerm::LiChun) {
                return Ok((entry.timestamp, table.provenance));
            }
        }
        let (month, day) = FALLBACK_LI_CHUN;
        let assumed = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or(BaziError::UnsupportedYear { year })?;
        warn!(year, "no Li Chun data, assuming {assumed}");
        Ok((assumed, Provenance::Assumed))
    }

    /// Exact comparison: the Li Chun minute itself starts the new year.
    pub fn resolve(&self, moment: &NaiveDateTime) -> Result<YearResolution> {
        let year = moment.year();
        let (li_chun, provenance) = self.li_chun(year)?;
        let effective_year = if *moment < li_chun { year - 1 } else { year };
        Ok(resolution(effective_year, li_chun, provenance))
    }

    /// Calendar-date comparison: the whole Li Chun day counts as the new year.
    pub fn resolve_date(&self, date: &NaiveDate) -> Result<YearResolution> {
        let year = date.year();
        let (li_chun, provenance) = self.li_chun(year)?;
        let effective_year = if *date < li_chun.date() { year - 1 } else { year };
        Ok(resolution(effective_year, li_chun, provenance))
    }
}

fn resolution(effective_year: i32, li_chun: NaiveDateTime, provenance: Provenance) -> YearResolution {
    YearResolution {
        effective_year,
        pillar: pillars::year_pillar(effective_year),
        li_chun,
        provenance,
    }
}
