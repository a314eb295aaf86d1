//! Parsing of the values a learner types on the input screen.
//!
//! Bad values never stop a lesson. Each one falls back to something the
//! visualization can draw and leaves an [`InputIssue`] behind to show.

use std::fmt;

use crate::content::InputField;

/// Field names that carry the number sequence.
pub const ARRAY_FIELDS: &[&str] = &["array", "arr", "nums"];
/// Field names that carry the window size.
pub const WINDOW_FIELDS: &[&str] = &["k", "window", "windowSize"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputIssue {
    MalformedArray { raw: String },
    FractionalValues { raw: String },
    InvalidWindow { raw: String },
    NonPositiveWindow { value: i64 },
}

impl fmt::Display for InputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputIssue::MalformedArray { raw } => write!(
                f,
                "Could not read '{}' as a list of numbers; showing an empty array",
                raw
            ),
            InputIssue::FractionalValues { raw } => write!(
                f,
                "'{}' has values that are not whole numbers; rounding toward zero",
                raw
            ),
            InputIssue::InvalidWindow { raw } => {
                write!(f, "Window size '{}' is not a number; using 1", raw)
            }
            InputIssue::NonPositiveWindow { value } => {
                write!(f, "Window size {} must be positive; using 1", value)
            }
        }
    }
}

/// Input values frozen when the learner leaves the input screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonInput {
    pub fields: Vec<InputField>,
    pub array: Vec<i64>,
    pub window: usize,
    pub issues: Vec<InputIssue>,
}

impl LessonInput {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

fn read_numbers(trimmed: &str) -> Option<Vec<f64>> {
    let values = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<f64>>(trimmed).ok()?
    } else if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed
            .split(',')
            .map(|part| part.trim().parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?
    };
    values.iter().all(|v| v.is_finite()).then_some(values)
}

/// Parse `[1, 3, -2]` or a bare `1, 3, -2`.
///
/// Any JSON number is accepted. Values that are not whole numbers are
/// rounded toward zero and reported; anything unreadable gives an empty
/// array and an issue.
pub fn parse_array(raw: &str) -> (Vec<i64>, Option<InputIssue>) {
    let Some(values) = read_numbers(raw.trim()) else {
        return (
            Vec::new(),
            Some(InputIssue::MalformedArray {
                raw: raw.to_string(),
            }),
        );
    };

    let whole = values
        .iter()
        .all(|v| v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64);
    let array = values.iter().map(|v| v.trunc() as i64).collect();
    let issue = (!whole).then(|| InputIssue::FractionalValues {
        raw: raw.to_string(),
    });
    (array, issue)
}

/// Window size, defaulting to 1. Absent is not an issue.
pub fn parse_window(raw: Option<&str>) -> (usize, Option<InputIssue>) {
    let Some(raw) = raw else {
        return (1, None);
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => (usize::try_from(value).unwrap_or(usize::MAX), None),
        Ok(value) => (1, Some(InputIssue::NonPositiveWindow { value })),
        Err(_) => (
            1,
            Some(InputIssue::InvalidWindow {
                raw: raw.to_string(),
            }),
        ),
    }
}

fn lookup<'a>(fields: &'a [InputField], names: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| names.contains(&f.name.as_str()))
        .map(|f| f.value.as_str())
}

pub fn parse_inputs(fields: &[InputField]) -> LessonInput {
    let mut issues = Vec::new();

    let (array, array_issue) = lookup(fields, ARRAY_FIELDS)
        .map(parse_array)
        .unwrap_or_default();
    issues.extend(array_issue);

    let (window, window_issue) = parse_window(lookup(fields, WINDOW_FIELDS));
    issues.extend(window_issue);

    LessonInput {
        fields: fields.to_vec(),
        array,
        window,
        issues,
    }
}
