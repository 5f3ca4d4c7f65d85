//! Schema checks for movie payloads.
//!
//! Both entry points accept any JSON value and never panic: a malformed body
//! comes back as [`ValidationErrors`] listing every problem found, each one
//! attributed to the field (and array index) it concerns.

use axum::http::Uri;
use cinema_http::error::AppError;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{Genre, MoviePatch, NewMovie};

pub const MIN_YEAR: i32 = 1900;
pub const MIN_RATE: f64 = 0.0;
pub const MAX_RATE: f64 = 10.0;
pub const DEFAULT_RATE: f64 = 0.0;

const FIELDS: [&str; 7] = [
    "title", "year", "director", "duration", "poster", "genre", "rate",
];

/// Latest accepted release year: next calendar year (UTC).
pub fn max_year() -> i32 {
    time::OffsetDateTime::now_utc().year() + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    Required,
    TooSmall,
    TooBig,
    InvalidEnumValue,
    InvalidUrl,
    UnrecognizedKeys,
}

/// One step into the payload: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl ValidationIssue {
    fn new(code: IssueCode, path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
        }
    }

    fn at(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, vec![field.into()], message)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("movie payload has {} validation issue(s)", .issues.len())]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors.to_string();
        let details = errors
            .issues
            .iter()
            .map(|issue| serde_json::json!(issue))
            .collect();
        AppError::validation(details, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Partial,
}

/// Full validation: every field except `rate` is required.
pub fn validate_movie(input: &Value) -> Result<NewMovie, ValidationErrors> {
    let patch = check(input, Mode::Full)?;

    match patch {
        MoviePatch {
            title: Some(title),
            year: Some(year),
            director: Some(director),
            duration: Some(duration),
            poster: Some(poster),
            genre: Some(genre),
            rate,
        } => Ok(NewMovie {
            title,
            year,
            director,
            duration,
            poster,
            genre,
            rate: rate.unwrap_or(DEFAULT_RATE),
        }),
        // `check` reports a `required` issue for each of these in full mode
        _ => Err(ValidationErrors {
            issues: vec![ValidationIssue::new(
                IssueCode::Required,
                Vec::new(),
                "movie is missing required fields",
            )],
        }),
    }
}

/// Partial validation: any subset of known fields, no defaults applied.
pub fn validate_partial_movie(input: &Value) -> Result<MoviePatch, ValidationErrors> {
    check(input, Mode::Partial)
}

fn check(input: &Value, mode: Mode) -> Result<MoviePatch, ValidationErrors> {
    let Some(object) = input.as_object() else {
        return Err(ValidationErrors {
            issues: vec![ValidationIssue::new(
                IssueCode::InvalidType,
                Vec::new(),
                format!("expected object, received {}", type_name(input)),
            )],
        });
    };

    let mut issues = Vec::new();

    let unknown: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|key| !FIELDS.contains(key))
        .collect();
    if !unknown.is_empty() {
        let listed = unknown
            .iter()
            .map(|key| format!("'{key}'"))
            .collect::<Vec<_>>()
            .join(", ");
        issues.push(ValidationIssue::new(
            IssueCode::UnrecognizedKeys,
            Vec::new(),
            format!("unrecognized key(s) in object: {listed}"),
        ));
    }

    let patch = MoviePatch {
        title: field(object, "title", mode, true, &mut issues, parse_title),
        year: field(object, "year", mode, true, &mut issues, parse_year),
        director: field(object, "director", mode, true, &mut issues, parse_director),
        duration: field(object, "duration", mode, true, &mut issues, parse_duration),
        poster: field(object, "poster", mode, true, &mut issues, parse_poster),
        genre: field(object, "genre", mode, true, &mut issues, parse_genre),
        rate: field(object, "rate", mode, false, &mut issues, parse_rate),
    };

    if issues.is_empty() {
        Ok(patch)
    } else {
        Err(ValidationErrors { issues })
    }
}

fn field<T>(
    object: &Map<String, Value>,
    name: &'static str,
    mode: Mode,
    required: bool,
    issues: &mut Vec<ValidationIssue>,
    parse: fn(&'static str, &Value) -> Result<T, Vec<ValidationIssue>>,
) -> Option<T> {
    match object.get(name) {
        Some(value) => match parse(name, value) {
            Ok(parsed) => Some(parsed),
            Err(mut found) => {
                issues.append(&mut found);
                None
            }
        },
        None => {
            if mode == Mode::Full && required {
                issues.push(ValidationIssue::at(
                    name,
                    IssueCode::Required,
                    format!("{name} is required"),
                ));
            }
            None
        }
    }
}

fn parse_title(name: &'static str, value: &Value) -> Result<String, Vec<ValidationIssue>> {
    let title = expect_string(name, value)?;
    if title.is_empty() {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::TooSmall,
            "title must not be empty",
        )]);
    }
    Ok(title.to_string())
}

fn parse_director(name: &'static str, value: &Value) -> Result<String, Vec<ValidationIssue>> {
    expect_string(name, value).map(str::to_string)
}

fn parse_year(name: &'static str, value: &Value) -> Result<i32, Vec<ValidationIssue>> {
    let year = expect_integer(name, value)?;
    let max = max_year();
    if year < i64::from(MIN_YEAR) {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::TooSmall,
            format!("year must be greater than or equal to {MIN_YEAR}"),
        )]);
    }
    if year > i64::from(max) {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::TooBig,
            format!("year must be less than or equal to {max}"),
        )]);
    }
    // bounded by the checks above
    Ok(year as i32)
}

fn parse_duration(name: &'static str, value: &Value) -> Result<u32, Vec<ValidationIssue>> {
    let duration = expect_integer(name, value)?;
    if duration <= 0 {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::TooSmall,
            "duration must be a positive number of minutes",
        )]);
    }
    u32::try_from(duration).map_err(|_| {
        vec![ValidationIssue::at(
            name,
            IssueCode::TooBig,
            format!("duration must be less than or equal to {}", u32::MAX),
        )]
    })
}

fn parse_poster(name: &'static str, value: &Value) -> Result<String, Vec<ValidationIssue>> {
    let poster = expect_string(name, value)?;
    if is_http_url(poster) {
        Ok(poster.to_string())
    } else {
        Err(vec![ValidationIssue::at(
            name,
            IssueCode::InvalidUrl,
            "poster must be a valid URL",
        )])
    }
}

fn parse_genre(name: &'static str, value: &Value) -> Result<Vec<Genre>, Vec<ValidationIssue>> {
    let Some(entries) = value.as_array() else {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::InvalidType,
            format!("expected array, received {}", type_name(value)),
        )]);
    };
    if entries.is_empty() {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::TooSmall,
            "genre must contain at least one entry",
        )]);
    }

    let mut genres = Vec::with_capacity(entries.len());
    let mut issues = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let path = vec![name.into(), index.into()];
        let Some(raw) = entry.as_str() else {
            issues.push(ValidationIssue::new(
                IssueCode::InvalidType,
                path,
                format!("expected string, received {}", type_name(entry)),
            ));
            continue;
        };
        match Genre::parse(raw) {
            Some(genre) if !genres.contains(&genre) => genres.push(genre),
            Some(_) => {}
            None => issues.push(ValidationIssue::new(
                IssueCode::InvalidEnumValue,
                path,
                format!(
                    "invalid enum value '{raw}', expected one of {}",
                    Genre::ALL.map(Genre::as_str).join(", ")
                ),
            )),
        }
    }

    if issues.is_empty() {
        Ok(genres)
    } else {
        Err(issues)
    }
}

fn parse_rate(name: &'static str, value: &Value) -> Result<f64, Vec<ValidationIssue>> {
    let Some(rate) = value.as_f64() else {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::InvalidType,
            format!("expected number, received {}", type_name(value)),
        )]);
    };
    if rate < MIN_RATE {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::TooSmall,
            format!("rate must be greater than or equal to {MIN_RATE}"),
        )]);
    }
    if rate > MAX_RATE {
        return Err(vec![ValidationIssue::at(
            name,
            IssueCode::TooBig,
            format!("rate must be less than or equal to {MAX_RATE}"),
        )]);
    }
    Ok(rate)
}

fn expect_string<'v>(
    name: &'static str,
    value: &'v Value,
) -> Result<&'v str, Vec<ValidationIssue>> {
    value.as_str().ok_or_else(|| {
        vec![ValidationIssue::at(
            name,
            IssueCode::InvalidType,
            format!("expected string, received {}", type_name(value)),
        )]
    })
}

/// Integral JSON numbers, including floats without a fractional part.
/// Values outside `i64` saturate so the caller's range check reports them.
fn expect_integer(name: &'static str, value: &Value) -> Result<i64, Vec<ValidationIssue>> {
    if let Some(integer) = value.as_i64() {
        return Ok(integer);
    }
    if value.is_u64() {
        return Ok(i64::MAX);
    }
    let received = match value.as_f64() {
        Some(float) if float.is_finite() && float.fract() == 0.0 => return Ok(float as i64),
        Some(_) => "float",
        None => type_name(value),
    };
    Err(vec![ValidationIssue::at(
        name,
        IssueCode::InvalidType,
        format!("expected integer, received {received}"),
    )])
}

fn is_http_url(raw: &str) -> bool {
    let Ok(uri) = raw.parse::<Uri>() else {
        return false;
    };
    let scheme_ok = matches!(uri.scheme_str(), Some("http" | "https"));
    let host_ok = uri.host().is_some_and(|host| !host.is_empty());
    scheme_ok && host_ok
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
impl ValidationErrors {
    /// Whether any issue is attributed to `field` (or something inside it).
    pub(crate) fn mentions(&self, field: &str) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue.path.first(), Some(PathSegment::Key(key)) if key == field))
    }

    pub(crate) fn codes(&self) -> Vec<IssueCode> {
        self.issues.iter().map(|issue| issue.code).collect()
    }
}
