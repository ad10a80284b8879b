//! Declarative batch schema.
//!
//! A [`Schema`] lists the fields a batch must carry, each with a type, a
//! nullability flag, an optional uniqueness constraint and a set of value
//! [`Check`]s. The schema has two uses:
//!
//! - [`Schema::check_columns`] is the *structural* check run before any row
//!   is looked at. Failing it aborts the run.
//! - The [`Validator`](crate::validation::Validator) evaluates the field rules
//!   against every row and reports violations as data-quality facts.

use crate::error::{PipelineError, Result};
use crate::table::Table;
use crate::validation::Rule;
use crate::value::{ColumnType, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pattern every `email` value must match.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Inclusive bounds for `age`.
pub const AGE_RANGE: (i64, i64) = (-20, 100);

/// How columns the schema does not declare are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnMode {
    /// Undeclared columns are a structural error.
    Strict,
    /// Undeclared columns are carried through untouched.
    #[default]
    Lenient,
}

/// A value-level rule on a field.
#[derive(Debug, Clone)]
pub enum Check {
    /// Integer within `[min, max]`.
    Between { min: i64, max: i64 },
    /// Text matching the pattern.
    Matches(Regex),
}

impl Check {
    /// Rule reported when the check fails.
    #[must_use]
    pub fn rule(&self) -> Rule {
        match self {
            Check::Between { .. } => Rule::Between,
            Check::Matches(_) => Rule::StrMatches,
        }
    }

    /// Explanation for a failing `value`, or `None` if the check passes.
    ///
    /// Values of the wrong kind are left to the type rule and pass here.
    #[must_use]
    pub fn explain_failure(&self, value: &Value) -> Option<String> {
        match (self, value) {
            (Check::Between { min, max }, Value::Int(v)) if v < min || v > max => {
                Some(format!("{v} is not between {min} and {max}"))
            }
            (Check::Matches(re), Value::Str(s)) if !re.is_match(s) => {
                Some(format!("'{s}' does not match {}", re.as_str()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Between { min, max } => write!(f, "between({min}, {max})"),
            Check::Matches(re) => write!(f, "str_matches({})", re.as_str()),
        }
    }
}

/// Declaration of one field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub dtype: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub checks: Vec<Check>,
}

impl FieldSpec {
    /// A required (non-null), non-unique field with no checks.
    pub fn new<S: Into<String>>(name: S, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable: false,
            unique: false,
            checks: Vec::new(),
        }
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

/// A set of field declarations plus the column mode.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    mode: ColumnMode,
}

impl Schema {
    #[must_use]
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            mode: ColumnMode::default(),
        }
    }

    /// The user-record schema.
    ///
    /// # Panics
    /// Never in practice; [`EMAIL_PATTERN`] is a valid regex.
    #[must_use]
    pub fn users() -> Self {
        let email = Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex");
        Self::new(vec![
            FieldSpec::new("user_id", ColumnType::Int64).unique(),
            FieldSpec::new("username", ColumnType::Utf8),
            FieldSpec::new("email", ColumnType::Utf8).check(Check::Matches(email)),
            FieldSpec::new("age", ColumnType::Int64).check(Check::Between {
                min: AGE_RANGE.0,
                max: AGE_RANGE.1,
            }),
            FieldSpec::new("signup_date", ColumnType::Timestamp),
        ])
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ColumnMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn mode(&self) -> ColumnMode {
        self.mode
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Structural check: declared fields present, undeclared ones allowed
    /// only in lenient mode. Column order is irrelevant.
    ///
    /// # Errors
    /// [`PipelineError::MissingColumn`] or [`PipelineError::UnexpectedColumn`].
    pub fn check_columns(&self, table: &Table) -> Result<()> {
        for field in &self.fields {
            table.require(&field.name)?;
        }
        if self.mode == ColumnMode::Strict
            && let Some(extra) = table.column_names().find(|c| self.field(c).is_none())
        {
            return Err(PipelineError::UnexpectedColumn {
                column: extra.to_string(),
            });
        }
        Ok(())
    }
}
