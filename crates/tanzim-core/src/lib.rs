//! # Tanzim Core Library
//!
//! This library provides the core scheduling logic for tanzim, a prayer-aware
//! daily planner. It implements a CLI-first philosophy where all operations
//! are available via a standalone CLI binary over the same core library.
//!
//! ## Architecture
//!
//! - **Qalib**: parser and serializer for the plain-text day template format
//! - **Compiler**: pure, deterministic merge of template entries and prayer
//!   windows into a contiguous 24-hour timeline
//! - **Recurrence**: countdown notes carried across days by event name
//! - **Shrinker**: live re-planning after an unplanned interruption
//! - **Storage**: SQLite-based plan/template persistence and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`parse_qalib`]: template text to typed entries
//! - [`compile`]: entries + prayer timetable to a [`Timeline`]
//! - [`shrink`]: absorb an interruption into today's plan
//! - [`advance_day`]: roll countdown notes over a compiled day
//! - [`PlanDb`] / [`Config`]: persistence and configuration

pub mod clock;
pub mod compiler;
pub mod error;
pub mod export;
pub mod prayer;
pub mod qalib;
pub mod recurrence;
pub mod shrink;
pub mod storage;
pub mod timeline;
pub mod timeutil;

pub use clock::InterruptionClock;
pub use compiler::{compile, CompileOptions, CompileOutcome, WAKEUP_NAME};
pub use error::{
    CompileError, ConfigError, CoreError, Diagnostic, DiagnosticKind, ParseError, ProviderError,
    Severity, ShrinkError,
};
pub use export::{export_timeline, ExportEntry};
pub use prayer::{
    KerahatWindow, Prayer, PrayerDurations, PrayerProvider, PrayerTimetable, PrayerWindow,
};
pub use qalib::{annotate, parse_qalib, render, ParsedTemplate};
pub use recurrence::{advance_day, Countdown, NoteBook, SubtaskNote};
pub use shrink::{shrink, InterruptionCause, UnplannedSpan, UNPLANNED_NAME};
pub use storage::{Config, PlanDb};
pub use timeline::{CompiledEvent, EventKind, Timeline};
