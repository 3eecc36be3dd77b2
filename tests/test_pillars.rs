use chrono::{Duration, NaiveDate};

use four_pillars::pillars::{hour_stem, DAY_EPOCH_ORDINAL};
use four_pillars::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pair(glyphs: &str) -> StemBranch {
    let mut chars = glyphs.chars();
    let stem = Stem::from_glyph(&chars.next().unwrap().to_string()).unwrap();
    let branch = Branch::from_glyph(&chars.next().unwrap().to_string()).unwrap();
    StemBranch::new(stem, branch)
}

// ── Year ──

#[test]
fn test_year_pillar_known_years() {
    assert_eq!(year_pillar(1984).to_string(), "甲子");
    assert_eq!(year_pillar(1967).to_string(), "丁未");
    assert_eq!(year_pillar(2024).to_string(), "甲辰");
    assert_eq!(year_pillar(2025).to_string(), "乙巳");
    assert_eq!(year_pillar(4).to_string(), "甲子");
}

#[test]
fn test_year_pillar_repeats_every_sixty_years() {
    for year in 1900..1960 {
        assert_eq!(year_pillar(year), year_pillar(year + 60), "year {}", year);
    }
}

// ── Month ──

#[test]
fn test_first_month_stem_per_year_stem() {
    // 甲己之年丙作首, 乙庚之歲戊為頭, 丙辛必定尋庚起, 丁壬壬位順行流, 戊癸何方發, 甲寅之上好追求
    let expected = ["丙", "戊", "庚", "壬", "甲", "丙", "戊", "庚", "壬", "甲"];
    for (stem, exp) in Stem::ALL.iter().zip(expected) {
        assert_eq!(month_stem(*stem, 1).glyph(), exp, "year stem {}", stem);
    }
}

#[test]
fn test_month_pillar_sequence_for_jia_year() {
    let expected = [
        "丙寅", "丁卯", "戊辰", "己巳", "庚午", "辛未", "壬申", "癸酉", "甲戌", "乙亥", "丙子",
        "丁丑",
    ];
    for (month, exp) in (1..=12).zip(expected) {
        assert_eq!(month_pillar(Stem::Jia, month).unwrap().to_string(), exp);
    }
}

#[test]
fn test_month_pillar_key_cases() {
    assert_eq!(month_pillar(Stem::Ding, 8).unwrap().to_string(), "己酉");
    assert_eq!(month_pillar(Stem::Ding, 9).unwrap().to_string(), "庚戌");
    assert_eq!(month_pillar(Stem::Jia, 12).unwrap().to_string(), "丁丑");
    assert_eq!(month_pillar(Stem::Yi, 1).unwrap().to_string(), "戊寅");
}

#[test]
fn test_month_pillar_rejects_out_of_range_index() {
    for month in [0, 13] {
        assert_eq!(
            month_pillar(Stem::Jia, month),
            Err(BaziError::InvalidInput {
                field: "month index",
                value: month as i64
            })
        );
    }
}

#[test]
fn test_month_branch_follows_solar_month() {
    assert_eq!(Branch::for_solar_month(1), Branch::Yin);
    assert_eq!(Branch::for_solar_month(11), Branch::Zi);
    assert_eq!(Branch::for_solar_month(12), Branch::Chou);
}

// ── Day ──

#[test]
fn test_day_pillar_known_dates() {
    assert_eq!(day_pillar(&date(1900, 1, 1)).to_string(), "甲戌");
    assert_eq!(day_pillar(&date(1970, 1, 1)).to_string(), "辛巳");
    assert_eq!(day_pillar(&date(2000, 1, 1)).to_string(), "戊午");
    assert_eq!(day_pillar(&date(1967, 10, 9)).to_string(), "丙午");
    assert_eq!(day_pillar(&date(2025, 2, 3)).to_string(), "癸卯");
}

#[test]
fn test_day_cycle_index_at_epoch() {
    use chrono::Datelike;
    let epoch = date(1900, 1, 1);
    assert_eq!(epoch.num_days_from_ce(), DAY_EPOCH_ORDINAL);
    assert_eq!(day_cycle_index(&epoch), 10);
}

#[test]
fn test_day_pillar_period_is_sixty_days() {
    let mut d = date(1899, 11, 1);
    while d < date(1900, 3, 1) {
        assert_eq!(day_pillar(&d), day_pillar(&(d + Duration::days(60))), "{}", d);
        d += Duration::days(1);
    }
}

#[test]
fn test_consecutive_days_advance_one_step() {
    let mut d = date(2024, 2, 27);
    for _ in 0..5 {
        let next = d + Duration::days(1);
        assert_eq!(
            day_cycle_index(&next),
            (day_cycle_index(&d) + 1) % 60,
            "{} -> {}",
            d,
            next
        );
        d = next;
    }
}

#[test]
fn test_day_pillar_before_epoch() {
    // 1899-12-31 is the day before 甲戌.
    assert_eq!(day_pillar(&date(1899, 12, 31)).to_string(), "癸酉");
    assert_eq!(day_pillar(&date(1, 1, 1)).cycle_index(), Some(day_cycle_index(&date(1, 1, 1))));
}

// ── Hour ──

#[test]
fn test_double_hour_index() {
    let cases: &[(u32, usize)] = &[
        (23, 0),
        (0, 0),
        (1, 1),
        (2, 1),
        (3, 2),
        (11, 6),
        (12, 6),
        (21, 11),
        (22, 11),
    ];
    for &(hour, exp) in cases {
        assert_eq!(double_hour_index(hour), exp, "hour {}", hour);
    }
}

#[test]
fn test_hour_pillar_zi_hour() {
    let p = hour_pillar(Stem::Jia, 0).unwrap();
    assert_eq!(p.pillar.to_string(), "甲子");
    assert_eq!(p.double_hour, "子時");

    // 23:00 is the 子 hour of the same calendar day.
    assert_eq!(hour_pillar(Stem::Yi, 23).unwrap().pillar.to_string(), "丙子");
    assert_eq!(hour_pillar(Stem::Jia, 1).unwrap().pillar.to_string(), "乙丑");
}

#[test]
fn test_hour_stems_pair_up_across_day_stems() {
    // 甲己還加甲: day stems five apart share their hour stems.
    for (a, b) in Stem::ALL[..5].iter().zip(&Stem::ALL[5..]) {
        for branch in Branch::ALL {
            assert_eq!(hour_stem(*a, branch), hour_stem(*b, branch));
        }
    }
}

#[test]
fn test_hour_pillar_rejects_hour_24() {
    assert_eq!(
        hour_pillar(Stem::Jia, 24),
        Err(BaziError::InvalidInput {
            field: "hour",
            value: 24
        })
    );
}

// ── Elements ──

#[test]
fn test_element_balance_counts_stems_and_branches() {
    let chart = [pair("丁未"), pair("庚戌"), pair("丙午"), pair("癸巳")];
    let balance = element_balance(&chart);
    assert_eq!(balance.counts, [0, 4, 2, 1, 1]);
    assert_eq!(balance.count(Element::Fire), 4);
    assert_eq!(balance.dominant, Element::Fire);
    assert_eq!(balance.missing, vec![Element::Wood]);
    assert_eq!((balance.yang_stems, balance.yin_stems), (2, 2));
}

#[test]
fn test_element_balance_tie_goes_to_first_element() {
    let balance = element_balance(&[pair("甲子"); 4]);
    assert_eq!(balance.count(Element::Wood), 4);
    assert_eq!(balance.count(Element::Water), 4);
    assert_eq!(balance.dominant, Element::Wood);
    assert_eq!(
        balance.missing,
        vec![Element::Fire, Element::Earth, Element::Metal]
    );
    assert_eq!(balance.yang_stems, 4);
}

// ── Cycle ──

#[test]
fn test_stem_branch_attributes() {
    assert_eq!(Stem::Bing.element(), Element::Fire);
    assert_eq!(Stem::Bing.polarity(), Polarity::Yang);
    assert_eq!(Stem::Gui.polarity(), Polarity::Yin);
    assert_eq!(Branch::Wei.animal(), "Goat");
    assert_eq!(Branch::Wei.element(), Element::Earth);
    assert_eq!(Stem::from_index(-1), Stem::Gui);
    assert_eq!(Branch::from_index(13), Branch::Chou);
}

#[test]
fn test_stem_branch_from_cycle_index_wraps() {
    assert_eq!(StemBranch::from_cycle_index(0).to_string(), "甲子");
    assert_eq!(StemBranch::from_cycle_index(59).to_string(), "癸亥");
    assert_eq!(StemBranch::from_cycle_index(60).to_string(), "甲子");
    assert_eq!(StemBranch::from_cycle_index(-1).to_string(), "癸亥");
}
