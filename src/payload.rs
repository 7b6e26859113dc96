//! Shared machinery for payload builders.
//!
//! Builders are pure: the same form state and [`BuildContext`] always yield
//! the same document. Anything time- or identity-dependent comes from the
//! context, which the caller constructs once per build.

use jiff::Zoned;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must be a whole number")]
    NotANumber(&'static str),
}

/// Whether the builder is feeding the live preview or a real submission.
///
/// Preview is lenient: blank required fields pass through as empty strings
/// so the operator sees the document take shape. Submit is strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Preview,
    Submit,
}

/// Clock and identity inputs for a single build.
#[derive(Debug, Clone)]
pub struct BuildContext {
    now: Zoned,
    run_id: Uuid,
}

impl BuildContext {
    pub fn capture() -> Self {
        Self {
            now: Zoned::now(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub fn wall_time(&self) -> String {
        self.now.strftime("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// UTC time in the same space-separated shape.
    pub fn utc_time(&self) -> String {
        self.now
            .timestamp()
            .strftime("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// UTC time as RFC 3339 with a trailing `Z`.
    pub fn iso_time(&self) -> String {
        let ts = self.now.timestamp();
        format!("{}Z", ts.strftime("%Y-%m-%dT%H:%M:%S%.3f"))
    }

    /// Milliseconds since the Unix epoch.
    pub fn epoch_millis(&self) -> i64 {
        self.now.timestamp().as_millisecond()
    }

    /// Short business identifier: first 13 hex digits of the run id.
    pub fn business_no(&self) -> String {
        let simple = self.run_id.simple().to_string();
        simple[..13].to_string()
    }

    /// Fixed context for deterministic builder tests. `when` is an ISO 8601
    /// zoned timestamp such as `2024-03-01T12:30:00+08:00[Asia/Shanghai]`.
    #[cfg(test)]
    pub fn fixed(when: &str, run_id: &str) -> Self {
        Self {
            now: when.parse().unwrap(),
            run_id: run_id.parse().unwrap(),
        }
    }
}

/// Enforces a required field under [`BuildMode::Submit`]; passes blanks
/// through under preview.
pub fn require(mode: BuildMode, value: &str, field: &'static str) -> Result<String, BuildError> {
    let value = value.trim();
    if value.is_empty() && mode == BuildMode::Submit {
        return Err(BuildError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Strict integer parse under submit, lenient fallback under preview.
pub fn require_int(
    mode: BuildMode,
    value: &str,
    field: &'static str,
) -> Result<i64, BuildError> {
    let value = value.trim();
    if value.is_empty() {
        return match mode {
            BuildMode::Submit => Err(BuildError::MissingField(field)),
            BuildMode::Preview => Ok(0),
        };
    }
    match value.parse() {
        Ok(n) => Ok(n),
        Err(_) => match mode {
            BuildMode::Submit => Err(BuildError::NotANumber(field)),
            BuildMode::Preview => Ok(0),
        },
    }
}

/// Lenient integer parse used where the connector tolerates junk: invalid
/// or blank input becomes zero in both modes.
pub fn int_or_zero(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// Pulls the first element out of a template array, cloning it as the
/// per-line skeleton. Missing or empty arrays yield an empty object.
pub fn first_line(template: &serde_json::Value, key: &str) -> serde_json::Value {
    template
        .get(key)
        .and_then(|lines| lines.get(0))
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}))
}
