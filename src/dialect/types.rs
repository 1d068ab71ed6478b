//! Dialect-neutral column types
//!
//! Entity definitions declare column types as SQL text (e.g., `VARCHAR(100)`).
//! The text is parsed once with sqlparser's generic dialect and normalised
//! into a [`LogicalType`] that each dialect maps to its own type names.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::ast::{DataType, TimezoneInfo};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

/// Length used for character and binary types declared without one
pub const DEFAULT_LENGTH: u64 = 255;
/// Precision used for decimals declared without one
pub const DEFAULT_PRECISION: u64 = 38;
/// Scale used for decimals declared without one
pub const DEFAULT_SCALE: u64 = 2;
/// Fractional seconds digits used for timestamps declared without them
pub const DEFAULT_TIMESTAMP_PRECISION: u64 = 6;

static TYPE_ARGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").unwrap());

static UNBOUNDED_LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(\s*MAX\s*\)").unwrap());

// sqlparser only accepts MAX as a character length
static UNBOUNDED_BINARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*VARBINARY\s*\(\s*MAX\s*\)\s*$").unwrap());

/// A column type independent of any dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Decimal {
        precision: Option<u64>,
        scale: Option<u64>,
    },
    Real,
    Double,
    Char(Option<u64>),
    Varchar(Option<u64>),
    Text,
    Date,
    Time,
    Timestamp {
        /// Fractional seconds digits, when declared
        precision: Option<u64>,
        with_time_zone: bool,
    },
    Binary(Option<u64>),
    Varbinary(Option<u64>),
    Blob,
    Uuid,
    Json,
    Interval,
    /// Any other type, passed through verbatim
    Custom(String),
}

impl LogicalType {
    /// Parse a declared SQL type such as `VARCHAR(100)` or `TIMESTAMP WITH TIME ZONE`
    pub fn parse(sql_type: &str) -> Result<Self, String> {
        if UNBOUNDED_BINARY.is_match(sql_type) {
            return Ok(LogicalType::Blob);
        }

        let dialect = GenericDialect {};
        let mut parser = Parser::new(&dialect)
            .try_with_sql(sql_type)
            .map_err(|e| format!("cannot parse type '{}': {}", sql_type, e))?;
        let data_type = parser
            .parse_data_type()
            .map_err(|e| format!("cannot parse type '{}': {}", sql_type, e))?;

        let trailing = parser.peek_token();
        if trailing.token != Token::EOF {
            return Err(format!(
                "unexpected '{}' after type in '{}'",
                trailing.token, sql_type
            ));
        }

        Ok(Self::from_data_type(&data_type, sql_type))
    }

    fn from_data_type(data_type: &DataType, source: &str) -> Self {
        let rendered = data_type.to_string();
        let (first, second) = type_args(&rendered);

        match data_type {
            DataType::Boolean | DataType::Bool => LogicalType::Boolean,
            DataType::SmallInt(..) | DataType::Int2(..) | DataType::TinyInt(..) => {
                LogicalType::SmallInt
            }
            DataType::Int(..)
            | DataType::Integer(..)
            | DataType::Int4(..)
            | DataType::MediumInt(..) => LogicalType::Integer,
            DataType::BigInt(..) | DataType::Int8(..) => LogicalType::BigInt,
            DataType::Decimal { .. } | DataType::Numeric { .. } | DataType::Dec { .. } => {
                LogicalType::Decimal {
                    precision: first,
                    scale: second,
                }
            }
            DataType::Real | DataType::Float4 { .. } => LogicalType::Real,
            DataType::Float { .. }
            | DataType::Float8 { .. }
            | DataType::Double { .. }
            | DataType::DoublePrecision => LogicalType::Double,
            DataType::Char { .. } | DataType::Character { .. } => LogicalType::Char(first),
            DataType::Varchar { .. }
            | DataType::Nvarchar { .. }
            | DataType::CharacterVarying { .. }
            | DataType::CharVarying { .. } => {
                if is_unbounded(&rendered) {
                    LogicalType::Text
                } else {
                    LogicalType::Varchar(first)
                }
            }
            DataType::Text
            | DataType::Clob { .. }
            | DataType::CharacterLargeObject { .. }
            | DataType::CharLargeObject { .. } => LogicalType::Text,
            DataType::Date => LogicalType::Date,
            DataType::Time { .. } => LogicalType::Time,
            DataType::Timestamp(_, tz) => LogicalType::Timestamp {
                precision: first,
                with_time_zone: matches!(tz, TimezoneInfo::WithTimeZone | TimezoneInfo::Tz),
            },
            DataType::Datetime { .. } => LogicalType::Timestamp {
                precision: first,
                with_time_zone: false,
            },
            DataType::Binary { .. } => LogicalType::Binary(first),
            DataType::Varbinary { .. } => LogicalType::Varbinary(first),
            DataType::Blob { .. } | DataType::Bytea => LogicalType::Blob,
            DataType::Uuid => LogicalType::Uuid,
            DataType::JSON | DataType::JSONB => LogicalType::Json,
            DataType::Interval { .. } => LogicalType::Interval,
            _ => LogicalType::Custom(source.trim().to_string()),
        }
    }

    /// Length of a character/binary type, falling back to the default
    pub fn length(&self) -> u64 {
        match self {
            LogicalType::Char(len) => len.unwrap_or(1),
            LogicalType::Varchar(len) | LogicalType::Binary(len) | LogicalType::Varbinary(len) => {
                len.unwrap_or(DEFAULT_LENGTH)
            }
            _ => DEFAULT_LENGTH,
        }
    }

    /// Fractional seconds digits of a timestamp, falling back to the default
    pub fn timestamp_precision(&self) -> u64 {
        match self {
            LogicalType::Timestamp {
                precision: Some(p), ..
            } => *p,
            _ => DEFAULT_TIMESTAMP_PRECISION,
        }
    }

    /// Precision and scale of a decimal type, falling back to the defaults
    pub fn precision_and_scale(&self) -> (u64, u64) {
        match self {
            LogicalType::Decimal { precision, scale } => (
                precision.unwrap_or(DEFAULT_PRECISION),
                scale.unwrap_or(if precision.is_some() { 0 } else { DEFAULT_SCALE }),
            ),
            _ => (DEFAULT_PRECISION, DEFAULT_SCALE),
        }
    }
}

/// `VARCHAR(MAX)` and friends have no length limit
fn is_unbounded(rendered: &str) -> bool {
    UNBOUNDED_LENGTH.is_match(rendered)
}

fn type_args(rendered: &str) -> (Option<u64>, Option<u64>) {
    match TYPE_ARGS.captures(rendered) {
        Some(caps) => (
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
        ),
        None => (None, None),
    }
}
