use std::fmt;

use serde::Serialize;

use crate::types::TermKind;

pub const STEM_COUNT: usize = 10;
pub const BRANCH_COUNT: usize = 12;
pub const CYCLE_LENGTH: usize = 60;
pub const TERM_COUNT: usize = 24;

/// Ecliptic longitude of 立春, where solar month 1 begins.
pub const LI_CHUN_LONGITUDE: f64 = 315.0;
pub const DEGREES_PER_TERM: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    fn from_index(index: usize) -> Self {
        if index % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }
}

/// Heavenly stem, indexed 0 (甲) through 9 (癸).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

impl Stem {
    pub const ALL: [Stem; STEM_COUNT] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    const GLYPHS: [&'static str; STEM_COUNT] =
        ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
    const PINYIN: [&'static str; STEM_COUNT] = [
        "Jiǎ", "Yǐ", "Bǐng", "Dīng", "Wù", "Jǐ", "Gēng", "Xīn", "Rén", "Guǐ",
    ];

    /// Wraps any integer into the 10-stem cycle.
    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(STEM_COUNT as i64) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn glyph(self) -> &'static str {
        Self::GLYPHS[self.index()]
    }

    pub fn pinyin(self) -> &'static str {
        Self::PINYIN[self.index()]
    }

    pub fn element(self) -> Element {
        Element::ALL[self.index() / 2]
    }

    pub fn polarity(self) -> Polarity {
        Polarity::from_index(self.index())
    }

    pub fn from_glyph(glyph: &str) -> Option<Self> {
        Self::GLYPHS
            .iter()
            .position(|g| *g == glyph)
            .map(|i| Self::ALL[i])
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Earthly branch, indexed 0 (子) through 11 (亥).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Branch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

impl Branch {
    pub const ALL: [Branch; BRANCH_COUNT] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    const GLYPHS: [&'static str; BRANCH_COUNT] = [
        "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
    ];
    const PINYIN: [&'static str; BRANCH_COUNT] = [
        "Zǐ", "Chǒu", "Yín", "Mǎo", "Chén", "Sì", "Wǔ", "Wèi", "Shēn", "Yǒu", "Xū", "Hài",
    ];
    const ANIMALS: [&'static str; BRANCH_COUNT] = [
        "Rat", "Ox", "Tiger", "Rabbit", "Dragon", "Snake", "Horse", "Goat", "Monkey",
        "Rooster", "Dog", "Pig",
    ];
    const ANIMAL_GLYPHS: [&'static str; BRANCH_COUNT] = [
        "鼠", "牛", "虎", "兔", "龍", "蛇", "馬", "羊", "猴", "雞", "狗", "豬",
    ];
    const ELEMENTS: [Element; BRANCH_COUNT] = [
        Element::Water,
        Element::Earth,
        Element::Wood,
        Element::Wood,
        Element::Earth,
        Element::Fire,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Metal,
        Element::Earth,
        Element::Water,
    ];
    const DOUBLE_HOURS: [&'static str; BRANCH_COUNT] = [
        "子時", "丑時", "寅時", "卯時", "辰時", "巳時", "午時", "未時", "申時", "酉時", "戌時",
        "亥時",
    ];

    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(BRANCH_COUNT as i64) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn glyph(self) -> &'static str {
        Self::GLYPHS[self.index()]
    }

    pub fn pinyin(self) -> &'static str {
        Self::PINYIN[self.index()]
    }

    pub fn animal(self) -> &'static str {
        Self::ANIMALS[self.index()]
    }

    pub fn animal_glyph(self) -> &'static str {
        Self::ANIMAL_GLYPHS[self.index()]
    }

    pub fn element(self) -> Element {
        Self::ELEMENTS[self.index()]
    }

    pub fn polarity(self) -> Polarity {
        Polarity::from_index(self.index())
    }

    /// Label of the double hour this branch governs, e.g. `子時`.
    pub fn double_hour_name(self) -> &'static str {
        Self::DOUBLE_HOURS[self.index()]
    }

    /// Branch of solar month `month_index` (1 = 寅 … 12 = 丑).
    pub fn for_solar_month(month_index: u32) -> Self {
        Self::from_index(month_index as i64 + 1)
    }

    pub fn from_glyph(glyph: &str) -> Option<Self> {
        Self::GLYPHS
            .iter()
            .position(|g| *g == glyph)
            .map(|i| Self::ALL[i])
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// One of the 60 Jiazi combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StemBranch {
    pub stem: Stem,
    pub branch: Branch,
}

impl StemBranch {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// Position `index` of the sexagenary cycle, 0 = 甲子, wrapping.
    pub fn from_cycle_index(index: i64) -> Self {
        Self {
            stem: Stem::from_index(index),
            branch: Branch::from_index(index),
        }
    }

    /// Position in the sexagenary cycle. Stem and branch of a valid pair share
    /// parity; mismatched pairs do not occur in the cycle and yield `None`.
    pub fn cycle_index(self) -> Option<usize> {
        let (s, b) = (self.stem.index(), self.branch.index());
        if s % 2 != b % 2 {
            return None;
        }
        (0..CYCLE_LENGTH).find(|i| i % STEM_COUNT == s && i % BRANCH_COUNT == b)
    }

    pub fn glyphs(self) -> String {
        format!("{}{}", self.stem.glyph(), self.branch.glyph())
    }
}

impl fmt::Display for StemBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

/// The 24 solar terms in ecliptic order starting at 立春 (315°).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SolarTerm {
    LiChun,
    YuShui,
    JingZhe,
    ChunFen,
    QingMing,
    GuYu,
    LiXia,
    XiaoMan,
    MangZhong,
    XiaZhi,
    XiaoShu,
    DaShu,
    LiQiu,
    ChuShu,
    BaiLu,
    QiuFen,
    HanLu,
    ShuangJiang,
    LiDong,
    XiaoXue,
    DaXue,
    DongZhi,
    XiaoHan,
    DaHan,
}

impl SolarTerm {
    pub const ALL: [SolarTerm; TERM_COUNT] = [
        SolarTerm::LiChun,
        SolarTerm::YuShui,
        SolarTerm::JingZhe,
        SolarTerm::ChunFen,
        SolarTerm::QingMing,
        SolarTerm::GuYu,
        SolarTerm::LiXia,
        SolarTerm::XiaoMan,
        SolarTerm::MangZhong,
        SolarTerm::XiaZhi,
        SolarTerm::XiaoShu,
        SolarTerm::DaShu,
        SolarTerm::LiQiu,
        SolarTerm::ChuShu,
        SolarTerm::BaiLu,
        SolarTerm::QiuFen,
        SolarTerm::HanLu,
        SolarTerm::ShuangJiang,
        SolarTerm::LiDong,
        SolarTerm::XiaoXue,
        SolarTerm::DaXue,
        SolarTerm::DongZhi,
        SolarTerm::XiaoHan,
        SolarTerm::DaHan,
    ];

    const NAMES: [&'static str; TERM_COUNT] = [
        "立春", "雨水", "驚蟄", "春分", "清明", "穀雨", "立夏", "小滿", "芒種", "夏至", "小暑",
        "大暑", "立秋", "處暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至",
        "小寒", "大寒",
    ];
    // Simplified spellings differ only for these five terms.
    const SIMPLIFIED: [(&'static str, SolarTerm); 5] = [
        ("惊蛰", SolarTerm::JingZhe),
        ("谷雨", SolarTerm::GuYu),
        ("小满", SolarTerm::XiaoMan),
        ("芒种", SolarTerm::MangZhong),
        ("处暑", SolarTerm::ChuShu),
    ];
    const ENGLISH: [&'static str; TERM_COUNT] = [
        "Beginning of Spring",
        "Rain Water",
        "Awakening of Insects",
        "Spring Equinox",
        "Pure Brightness",
        "Grain Rain",
        "Beginning of Summer",
        "Grain Full",
        "Grain in Ear",
        "Summer Solstice",
        "Minor Heat",
        "Major Heat",
        "Beginning of Autumn",
        "End of Heat",
        "White Dew",
        "Autumn Equinox",
        "Cold Dew",
        "Frost Descent",
        "Beginning of Winter",
        "Minor Snow",
        "Major Snow",
        "Winter Solstice",
        "Minor Cold",
        "Major Cold",
    ];

    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(TERM_COUNT as i64) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    pub fn english_name(self) -> &'static str {
        Self::ENGLISH[self.index()]
    }

    /// Accepts traditional or simplified spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| Self::ALL[i])
            .or_else(|| {
                Self::SIMPLIFIED
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, term)| *term)
            })
    }

    pub fn kind(self) -> TermKind {
        if self.index() % 2 == 0 {
            TermKind::Jie
        } else {
            TermKind::Qi
        }
    }

    /// Solar month opened by this term, for `jie` terms only.
    pub fn month_index(self) -> Option<u32> {
        match self.kind() {
            TermKind::Jie => Some(self.index() as u32 / 2 + 1),
            TermKind::Qi => None,
        }
    }

    pub fn jie_for_month(month_index: u32) -> Option<Self> {
        (1..=12)
            .contains(&month_index)
            .then(|| Self::ALL[(month_index as usize - 1) * 2])
    }

    /// Apparent solar ecliptic longitude at which the term begins, in degrees.
    pub fn longitude(self) -> f64 {
        (LI_CHUN_LONGITUDE + DEGREES_PER_TERM * self.index() as f64).rem_euclid(360.0)
    }

    /// The term whose 15° band contains `longitude`.
    pub fn from_longitude(longitude: f64) -> Self {
        let offset = (longitude - LI_CHUN_LONGITUDE).rem_euclid(360.0);
        Self::from_index((offset / DEGREES_PER_TERM).floor() as i64)
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() as i64 + 1)
    }

    pub fn previous(self) -> Self {
        Self::from_index(self.index() as i64 - 1)
    }
}

impl fmt::Display for SolarTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
