//! Declarative validation of submitted form fields.
//!
//! A [`Schema`] is an ordered list of `(field, rule, message)` checks. Checks
//! run in declaration order; once a field fails, the remaining checks for that
//! field are skipped so each field reports at most its first problem.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Largest amount, in whole currency units, accepted from a form.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Raw string fields submitted by a browser form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(HashMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value for `field`, or `None` when it was not submitted.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns the trimmed value for `field`, treating blank input as missing.
    pub fn trimmed(&self, field: &str) -> Option<&str> {
        self.get(field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Per-field validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for `field`; empty when the field passed.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

/// A single predicate applied to one submitted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The field is present and not blank.
    Required,
    /// The field looks like `local@domain.tld`.
    Email,
    /// Blank input coerces to zero; anything else must be a finite decimal in range.
    Number,
    /// The amount is at least one cent once rounded.
    GreaterThanZero,
    /// The trimmed value is one of the listed options.
    OneOf(&'static [&'static str]),
}

impl Rule {
    /// Returns `true` when `value` satisfies the rule.
    pub fn check(self, value: Option<&str>) -> bool {
        let trimmed = value.map(str::trim).unwrap_or_default();
        match self {
            Self::Required => !trimmed.is_empty(),
            Self::Email => is_email(trimmed),
            Self::Number => parse_number(trimmed).is_some(),
            Self::GreaterThanZero => amount_to_cents(value).is_some_and(|cents| cents > 0),
            Self::OneOf(options) => options.contains(&trimmed),
        }
    }
}

#[derive(Debug, Clone)]
struct Check {
    field: &'static str,
    rule: Rule,
    message: &'static str,
}

/// Ordered collection of field checks.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    checks: Vec<Check>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a check for `field`.
    pub fn rule(mut self, field: &'static str, rule: Rule, message: &'static str) -> Self {
        self.checks.push(Check {
            field,
            rule,
            message,
        });
        self
    }

    /// Runs every check against `form`, aggregating failures per field.
    pub fn validate(&self, form: &FormData) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for check in &self.checks {
            if errors.contains(check.field) {
                continue;
            }
            if !check.rule.check(form.get(check.field)) {
                errors.push(check.field, check.message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Converts a submitted amount into cents, rounding to the nearest cent.
///
/// Missing or blank input coerces to `0`. Returns `None` for input that is
/// not a finite decimal number within [`MAX_AMOUNT`].
pub fn amount_to_cents(value: Option<&str>) -> Option<i64> {
    let amount = parse_number(value.map(str::trim).unwrap_or_default())?;
    Some((amount * 100.0).round() as i64)
}

fn parse_number(trimmed: &str) -> Option<f64> {
    if trimmed.is_empty() {
        return Some(0.0);
    }
    // `f64::from_str` accepts "inf" and "NaN"; only plain decimals are amounts.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    let amount: f64 = trimmed.parse().ok()?;
    (amount.is_finite() && amount.abs() <= MAX_AMOUNT).then_some(amount)
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
