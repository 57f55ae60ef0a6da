//! Core error types for tanzim-core.
//!
//! One thiserror enum per concern, gathered under [`CoreError`]. Fatal
//! compile errors never leave a partial timeline behind; advisory findings
//! travel as [`Diagnostic`] values next to a still-valid timeline.

use chrono::NaiveTime;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tanzim-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Template parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Schedule compilation errors
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Live reallocation errors
    #[error("Shrink error: {0}")]
    Shrink(#[from] ShrinkError),

    /// Prayer timetable provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Qalib template parsing errors. All fatal: compilation does not proceed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A token could not be read as a time or duration
    #[error("line {line}: malformed token '{token}'")]
    MalformedToken { line: u32, token: String },

    /// A fixed event declares an end at or before its start
    #[error("line {line}: fixed event '{name}' ends at or before its start")]
    EndBeforeStart { line: u32, name: String },

    /// A second bare wake-up time line was found
    #[error("line {line}: duplicate wake-up line")]
    DuplicateWakeup { line: u32 },

    /// A subtask note line with nothing to attach to
    #[error("line {line}: subtask note has no preceding task")]
    OrphanSubtask { line: u32 },

    /// The template never declared a wake-up time
    #[error("template missing wake-up start time")]
    MissingWakeup,
}

/// Fatal structural violations found while compiling a day plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Two fixed events occupy overlapping spans
    #[error("fixed events '{first}' and '{second}' overlap")]
    FixedOverlap { first: String, second: String },

    /// Wake-up time leaves less than the configured margin before Fajr
    #[error(
        "wake-up at {} is less than {margin_minutes} minutes before Fajr at {}",
        wakeup.format("%H:%M"),
        fajr.format("%H:%M")
    )]
    WakeupTooLateForFajr {
        wakeup: NaiveTime,
        fajr: NaiveTime,
        margin_minutes: i64,
    },

    /// A user-forced prayer placement intersects a kerahat window
    #[error(
        "prayer {prayer} at {} falls inside the kerahat window {}-{}",
        placed.format("%H:%M"),
        kerahat_start.format("%H:%M"),
        kerahat_end.format("%H:%M")
    )]
    KerahatViolation {
        prayer: String,
        placed: NaiveTime,
        kerahat_start: NaiveTime,
        kerahat_end: NaiveTime,
    },

    /// A user-forced prayer placement lies outside the canonical window
    #[error(
        "prayer {prayer} placed at {}-{} outside its window {}-{}",
        found_start.format("%H:%M"),
        found_end.format("%H:%M"),
        window_start.format("%H:%M"),
        window_end.format("%H:%M")
    )]
    PrayerWindowMismatch {
        prayer: String,
        window_start: NaiveTime,
        window_end: NaiveTime,
        found_start: NaiveTime,
        found_end: NaiveTime,
    },

    /// Planned time overruns the 24-hour day
    #[error("template exceeds 24 hours of planned time by {overrun_minutes} minutes")]
    Overcommitted { overrun_minutes: i64 },

    /// Prayer timetable could not be obtained
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Shrink-specific failure. The original timeline is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShrinkError {
    /// Remaining flexible time cannot absorb the interruption
    #[error(
        "interruption of {deficit_minutes} minutes cannot be absorbed by \
         {plannable_minutes} minutes of remaining flexible time"
    )]
    Unabsorbable {
        deficit_minutes: i64,
        plannable_minutes: i64,
    },
}

/// Errors propagated from the external prayer-time collaborator.
/// The core never retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("prayer time provider unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Severity of a compile diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Surfaced to the user, timeline still produced
    Advisory,
    /// No timeline produced
    Fatal,
}

/// What a diagnostic is about.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticKind {
    /// A fixed or pre-committed prayer event landed later than declared
    #[error("'{event}' expected at {expected} but compiled at {found}")]
    Drift {
        event: String,
        /// Declared start, formatted HH:MM
        expected: String,
        /// Compiled start, formatted HH:MM
        found: String,
    },

    /// A countdown expression failed to evaluate; the note keeps running unbounded
    #[error("countdown expression '{expression}' is invalid; note treated as unbounded")]
    CountdownDegraded { expression: String },
}

/// A single line-located finding surfaced to the caller.
///
/// Advisory diagnostics are expected to be round-tripped back into the
/// template text as inline trailing comments by the editing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    /// 1-based template line, when the finding maps to one
    pub line: Option<u32>,
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn advisory(line: Option<u32>, kind: DiagnosticKind) -> Self {
        Self {
            line,
            severity: Severity::Advisory,
            kind,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
