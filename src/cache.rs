use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::trace;

use crate::calculator::BaziCalculator;
use crate::error::Result;
use crate::types::Chart;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChartKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl ChartKey {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedChart {
    pub chart: Chart,
    pub cached: bool,
}

#[derive(Debug)]
struct Stored {
    at: DateTime<Utc>,
    chart: Chart,
}

type Slot = Arc<Mutex<Option<Stored>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Memoizes the charts of one calculator per input minute. Entries expire
/// `ttl` after they were stored, as measured by the injected clock. Failed
/// computations are not stored.
#[derive(Debug)]
pub struct ChartCache<C: Clock = SystemClock> {
    calculator: BaziCalculator,
    ttl: Duration,
    clock: C,
    slots: Mutex<HashMap<ChartKey, Slot>>,
}

impl ChartCache<SystemClock> {
    pub fn new(calculator: BaziCalculator, ttl: Duration) -> Self {
        Self::with_clock(calculator, ttl, SystemClock)
    }

    /// TTL taken from the calculator's own config.
    pub fn for_calculator(calculator: BaziCalculator) -> Self {
        let ttl = ttl_from_minutes(calculator.config().cache_ttl_minutes);
        Self::new(calculator, ttl)
    }
}

pub fn ttl_from_minutes(minutes: i64) -> Duration {
    Duration::try_minutes(minutes.max(0)).unwrap_or(Duration::MAX)
}

impl<C: Clock> ChartCache<C> {
    pub fn with_clock(calculator: BaziCalculator, ttl: Duration, clock: C) -> Self {
        Self {
            calculator,
            ttl,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn calculator(&self) -> &BaziCalculator {
        &self.calculator
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, stored: &Stored, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(stored.at) < self.ttl
    }

    fn slot(&self, key: ChartKey) -> Slot {
        Arc::clone(lock(&self.slots).entry(key).or_default())
    }

    /// Looks `key` up, running `compute` against the cache's calculator on a
    /// miss. Callers asking for the same key wait on that key's slot, so it is
    /// computed once; other keys proceed in parallel.
    pub fn get_or_compute<F>(&self, key: ChartKey, compute: F) -> Result<CachedChart>
    where
        F: FnOnce(&BaziCalculator, ChartKey) -> Result<Chart>,
    {
        let slot = self.slot(key);
        let mut stored = lock(&slot);
        let now = self.clock.now();
        if let Some(hit) = stored.as_ref().filter(|s| self.is_fresh(s, now)) {
            trace!(?key, "chart cache hit");
            return Ok(CachedChart {
                chart: hit.chart.clone(),
                cached: true,
            });
        }

        trace!(?key, "chart cache miss");
        let chart = compute(&self.calculator, key)?;
        *stored = Some(Stored {
            at: now,
            chart: chart.clone(),
        });
        Ok(CachedChart {
            chart,
            cached: false,
        })
    }

    pub fn chart(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<CachedChart> {
        self.get_or_compute(ChartKey::new(year, month, day, hour, minute), |calc, k| {
            calc.calculate(k.year, k.month, k.day, k.hour, k.minute)
        })
    }

    /// Stored charts, expired or not.
    pub fn len(&self) -> usize {
        lock(&self.slots)
            .values()
            .filter(|slot| lock(slot).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> usize {
        let cleared = self.len();
        lock(&self.slots).clear();
        cleared
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut slots = lock(&self.slots);
        let mut purged = 0;
        slots.retain(|_, slot| match lock(slot).as_ref() {
            Some(stored) if self.is_fresh(stored, now) => true,
            Some(_) => {
                purged += 1;
                false
            }
            None => false,
        });
        purged
    }
}
