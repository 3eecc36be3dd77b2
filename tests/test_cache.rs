use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use chrono::{DateTime, Duration, TimeZone, Utc};

use four_pillars::cache::ttl_from_minutes;
use four_pillars::*;

#[derive(Clone)]
struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

fn calculator(source: SourcePolicy) -> BaziCalculator {
    BaziCalculator::new(CalculatorConfig {
        source,
        ..CalculatorConfig::default()
    })
}

fn cache_with_ttl(minutes: i64) -> (ChartCache<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let cache = ChartCache::with_clock(
        BaziCalculator::default(),
        Duration::minutes(minutes),
        clock.clone(),
    );
    (cache, clock)
}

fn key() -> ChartKey {
    ChartKey::new(1967, 10, 9, 10, 45)
}

fn calculate_key(calc: &BaziCalculator, k: ChartKey) -> Result<Chart> {
    calc.calculate(k.year, k.month, k.day, k.hour, k.minute)
}

// ── Hits and misses ──

#[test]
fn test_second_lookup_is_cached() {
    let (cache, _clock) = cache_with_ttl(60);

    let first = cache.chart(1967, 10, 9, 10, 45).unwrap();
    let second = cache.chart(1967, 10, 9, 10, 45).unwrap();
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.chart, second.chart);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_entries_expire_after_ttl() {
    let (cache, clock) = cache_with_ttl(60);
    let computed = AtomicUsize::new(0);
    let lookup = || {
        cache
            .get_or_compute(key(), |calc, k| {
                computed.fetch_add(1, Ordering::SeqCst);
                calculate_key(calc, k)
            })
            .unwrap()
    };

    assert!(!lookup().cached);
    clock.advance(Duration::minutes(59));
    assert!(lookup().cached);
    clock.advance(Duration::minutes(1));
    assert!(!lookup().cached);
    assert_eq!(computed.load(Ordering::SeqCst), 2);
}

#[test]
fn test_zero_ttl_never_hits() {
    let (cache, _clock) = cache_with_ttl(0);
    assert!(!cache.chart(1967, 10, 9, 10, 45).unwrap().cached);
    assert!(!cache.chart(1967, 10, 9, 10, 45).unwrap().cached);
}

#[test]
fn test_errors_are_not_cached() {
    let (cache, _clock) = cache_with_ttl(60);

    let err = cache.chart(3000, 6, 1, 12, 0).unwrap_err();
    assert_eq!(err, BaziError::UnsupportedYear { year: 3000 });
    assert!(cache.is_empty());

    assert!(cache.chart(2024, 13, 1, 0, 0).is_err());
    assert!(cache.is_empty());
}

// ── Source policy ──

#[test]
fn test_cache_answers_with_its_own_calculator() {
    // The approximation puts 1967 寒露 before 09:00; the table has 10:45.
    let approx = ChartCache::with_clock(
        calculator(SourcePolicy::ApproximationOnly),
        Duration::minutes(60),
        ManualClock::new(),
    );
    let table = ChartCache::with_clock(
        calculator(SourcePolicy::TableOnly),
        Duration::minutes(60),
        ManualClock::new(),
    );

    let from_approx = approx.chart(1967, 10, 9, 9, 0).unwrap().chart;
    assert_eq!(from_approx.pillars.month.pillar.to_string(), "庚戌");
    assert_eq!(from_approx.provenance(), Provenance::Approximation);

    let from_table = table.chart(1967, 10, 9, 9, 0).unwrap();
    assert!(!from_table.cached);
    assert_eq!(from_table.chart.pillars.month.pillar.to_string(), "己酉");
    assert_eq!(from_table.chart.provenance(), Provenance::Table);
    assert_eq!(
        from_table.chart,
        table.calculator().calculate(1967, 10, 9, 9, 0).unwrap()
    );
}

#[test]
fn test_compute_receives_cache_calculator() {
    let cache = ChartCache::with_clock(
        calculator(SourcePolicy::TableOnly),
        Duration::minutes(60),
        ManualClock::new(),
    );
    cache
        .get_or_compute(key(), |calc, k| {
            assert_eq!(calc.config().source, SourcePolicy::TableOnly);
            assert_eq!(k, key());
            calculate_key(calc, k)
        })
        .unwrap();
}

// ── Maintenance ──

#[test]
fn test_clear_returns_count() {
    let (cache, _clock) = cache_with_ttl(60);
    cache.chart(2024, 1, 1, 0, 0).unwrap();
    cache.chart(2024, 1, 1, 1, 0).unwrap();
    assert_eq!(cache.clear(), 2);
    assert!(cache.is_empty());
}

#[test]
fn test_purge_expired_keeps_fresh_entries() {
    let (cache, clock) = cache_with_ttl(60);
    cache.chart(2024, 1, 1, 0, 0).unwrap();
    clock.advance(Duration::minutes(30));
    cache.chart(2024, 1, 1, 1, 0).unwrap();
    clock.advance(Duration::minutes(40));

    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.chart(2024, 1, 1, 1, 0).unwrap().cached);
}

// ── Configuration ──

#[test]
fn test_ttl_from_config() {
    let cache = ChartCache::for_calculator(BaziCalculator::default());
    assert_eq!(cache.ttl(), Duration::minutes(24 * 60));
    assert_eq!(ttl_from_minutes(-5), Duration::zero());
    assert_eq!(ttl_from_minutes(90), Duration::minutes(90));
}

// ── Concurrency ──

#[test]
fn test_concurrent_callers_compute_once() {
    let (cache, _clock) = cache_with_ttl(60);
    let computed = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                cache
                    .get_or_compute(key(), |calc, k| {
                        computed.fetch_add(1, Ordering::SeqCst);
                        calculate_key(calc, k)
                    })
                    .unwrap()
            });
        }
    });

    assert_eq!(computed.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_distinct_keys_compute_in_parallel() {
    let (cache, _clock) = cache_with_ttl(60);
    // Both computations must be in flight at once to pass the barrier.
    let barrier = Barrier::new(2);

    thread::scope(|s| {
        for hour in [3, 4] {
            let (cache, barrier) = (&cache, &barrier);
            s.spawn(move || {
                cache
                    .get_or_compute(ChartKey::new(2024, 6, 1, hour, 0), |calc, k| {
                        barrier.wait();
                        calculate_key(calc, k)
                    })
                    .unwrap()
            });
        }
    });

    assert_eq!(cache.len(), 2);
}
