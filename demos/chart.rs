use chrono::TimeZone;
use chrono_tz::America::Chicago;
use tracing_subscriber::EnvFilter;

use four_pillars::{BaziCalculator, BaziError, ChartCache, Provenance};

fn main() -> Result<(), BaziError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cache = ChartCache::for_calculator(BaziCalculator::default());
    let calculator = cache.calculator();

    let chart = cache.chart(1967, 10, 9, 10, 45)?.chart;
    let p = &chart.pillars;

    println!("=== Four Pillars ===");
    println!("Moment (CST): {}", chart.moment);
    println!();
    println!("Year:  {}  (Ba Zi year {})", p.year.pillar, p.year.effective_year);
    println!(
        "Month: {}  (solar month {}, since {})",
        p.month.pillar,
        p.month.month_index,
        p.month.term.map(|t| t.name()).unwrap_or("-")
    );
    println!("Day:   {}", p.day);
    println!("Hour:  {}  ({})", p.hour.pillar, p.hour.double_hour);
    println!();
    println!(
        "Zodiac: {} {}",
        chart.zodiac.animal_glyph(),
        chart.zodiac.animal()
    );
    println!(
        "Day master: {} {} ({:?})",
        chart.day_master.stem, chart.day_master.pinyin, chart.day_master.element
    );
    println!("Dominant element: {}", chart.elements.dominant.glyph());
    if chart.provenance() != Provenance::Table {
        println!("Note: approximate solar-term data, check charts near boundaries.");
    }
    println!();

    let dt = Chicago.with_ymd_and_hms(2026, 3, 21, 12, 0, 0).unwrap();
    let zoned = calculator.calculate_in_zone(&dt)?;
    println!("--- {} ---", dt);
    let pillars: Vec<String> = zoned
        .pillars
        .as_array()
        .iter()
        .map(|p| p.to_string())
        .collect();
    println!("{}  [{:?}]", pillars.join(" "), zoned.provenance());

    println!();
    println!("--- Solar terms 2025 ---");
    for entry in calculator.solar_terms(2025)?.jie() {
        println!(
            "{}  {} ({})",
            entry.timestamp,
            entry.name(),
            entry.term.english_name()
        );
    }
    Ok(())
}
