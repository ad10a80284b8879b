//! Column canonicalization.
//!
//! Each [`ColumnRule`] rewrites one column in place, never changing the row
//! count or the row order. Rules are idempotent: applying a rule to a column
//! it already canonicalized leaves the column unchanged.

use crate::error::{PipelineError, Result};
use crate::table::Table;
use crate::value::{ColumnType, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

/// How a column is canonicalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRule {
    /// Text, lowercased; blank becomes null.
    Lowercase,
    /// Nullable integer, rounded half-to-even.
    Integer,
    /// Timestamp parsed from any common textual form.
    Timestamp,
}

impl ColumnRule {
    /// The column type the rule produces.
    #[must_use]
    pub fn output_type(self) -> ColumnType {
        match self {
            ColumnRule::Lowercase => ColumnType::Utf8,
            ColumnRule::Integer => ColumnType::Int64,
            ColumnRule::Timestamp => ColumnType::Timestamp,
        }
    }

    /// Canonicalize a single cell.
    #[must_use]
    pub fn apply_value(self, value: &Value) -> Value {
        match self {
            ColumnRule::Lowercase => lowercase(value),
            ColumnRule::Integer => integer(value),
            ColumnRule::Timestamp => timestamp(value),
        }
    }
}

/// Rules applied to the user batch, in application order.
pub const USER_RULES: [(&str, ColumnRule); 5] = [
    ("user_id", ColumnRule::Integer),
    ("username", ColumnRule::Lowercase),
    ("email", ColumnRule::Lowercase),
    ("age", ColumnRule::Integer),
    ("signup_date", ColumnRule::Timestamp),
];

/// Apply `rule` to `column` of `table`.
///
/// # Errors
/// [`PipelineError::MissingColumn`] if the table has no such column. The
/// table is left untouched in that case.
pub fn apply_rule(table: &mut Table, column: &str, rule: ColumnRule) -> Result<()> {
    let col = table
        .column_mut(column)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: column.to_string(),
        })?;
    for value in &mut col.values {
        *value = rule.apply_value(value);
    }
    col.dtype = rule.output_type();
    Ok(())
}

/// Canonicalize every column of a user batch.
///
/// Known columns get their [`USER_RULES`]; blank text in any other column
/// becomes null.
///
/// # Errors
/// [`PipelineError::MissingColumn`] for the first absent user column.
pub fn transform_users(table: &mut Table) -> Result<()> {
    for (column, _) in USER_RULES {
        table.require(column)?;
    }
    for (column, rule) in USER_RULES {
        apply_rule(table, column, rule)?;
    }
    blank_to_null(table);
    debug!(rows = table.len(), "canonicalized user batch");
    Ok(())
}

/// Replace empty or whitespace-only text cells with null, in every column.
pub fn blank_to_null(table: &mut Table) {
    for col in table.columns_mut() {
        for value in &mut col.values {
            if let Value::Str(s) = value
                && s.trim().is_empty()
            {
                *value = Value::Null;
            }
        }
    }
}

fn lowercase(value: &Value) -> Value {
    let text = match value {
        Value::Null => return Value::Null,
        Value::Str(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    };
    if text.trim().is_empty() {
        Value::Null
    } else {
        Value::Str(text)
    }
}

fn integer(value: &Value) -> Value {
    let number = match value {
        Value::Int(v) => return Value::Int(*v),
        Value::Float(v) => *v,
        Value::Str(s) => match s.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => return Value::Null,
        },
        Value::Null | Value::Timestamp(_) => return Value::Null,
    };
    round_to_int(number).map_or(Value::Null, Value::Int)
}

/// Round half-to-even and narrow to `i64`; `None` when not representable.
#[must_use]
pub fn round_to_int(number: f64) -> Option<i64> {
    if !number.is_finite() {
        return None;
    }
    let rounded = number.round_ties_even();
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

fn timestamp(value: &Value) -> Value {
    match value {
        Value::Timestamp(ts) => Value::Timestamp(*ts),
        Value::Str(s) => parse_timestamp(s).map_or(Value::Null, Value::Timestamp),
        _ => Value::Null,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a timestamp from any of the common textual forms.
///
/// Inputs carrying a UTC offset are normalized to UTC. Date-only inputs
/// resolve to midnight.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
