use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BaziError {
    /// A single table strategy holds no records for the year.
    #[error("no solar-term data for year {year}")]
    NoData { year: i32 },
    /// Neither the table nor the approximation covers the year.
    #[error("year {year} is outside every supported solar-term source")]
    UnsupportedYear { year: i32 },
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: i64 },
    #[error("malformed solar-term table at line {line}: {reason}")]
    MalformedTable { line: usize, reason: String },
}

impl BaziError {
    pub(crate) fn invalid(field: &'static str, value: impl Into<i64>) -> Self {
        BaziError::InvalidInput {
            field,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BaziError>;
