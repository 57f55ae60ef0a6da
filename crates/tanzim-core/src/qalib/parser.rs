//! Qalib template parser.
//!
//! The qalib micro-grammar is whitespace-significant: lines are
//! newline-separated, tokens whitespace-delimited, `#` starts a trailing
//! comment. The first non-comment, non-empty line carries the wake-up time;
//! every following line is a relative task, a fixed ("thabbat") task, a
//! pre-committed prayer alias, or a `-` subtask note attached to the
//! preceding task.

use chrono::{Duration, NaiveTime};

use crate::error::{Diagnostic, DiagnosticKind, ParseError};
use crate::prayer::Prayer;
use crate::recurrence::{Countdown, SubtaskNote};
use crate::timeutil::{parse_duration_token, parse_hhmm};

use super::expr::eval_occurrences;

/// Time spec of a pre-committed prayer line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasSpec {
    /// `05:10 05:30 Fajr` -- absolute and immovable
    Absolute { start: NaiveTime, end: NaiveTime },
    /// `.10 Fajr` -- overrides the prayer's configured duration
    Relative(Duration),
}

/// One parsed, typed template line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    RelativeTask {
        duration: Duration,
        /// The duration token exactly as the user wrote it.
        raw_duration: String,
        /// May be empty.
        name: String,
        notes: Vec<SubtaskNote>,
    },
    FixedTask {
        start: NaiveTime,
        end: NaiveTime,
        name: String,
        notes: Vec<SubtaskNote>,
    },
    PrayerAlias {
        prayer: Prayer,
        spec: AliasSpec,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// 1-based source line.
    pub line: u32,
    /// Trailing comment text after `#`, verbatim, for re-serialization.
    pub comment: Option<String>,
    pub kind: EntryKind,
}

impl TemplateEntry {
    pub fn name(&self) -> &str {
        match &self.kind {
            EntryKind::RelativeTask { name, .. } | EntryKind::FixedTask { name, .. } => name,
            EntryKind::PrayerAlias { prayer, .. } => prayer.name(),
        }
    }
}

/// Parse result: the wake-up time, the ordered entries and any advisory
/// diagnostics raised while parsing (a broken countdown expression degrades
/// that note to unbounded instead of failing the parse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    pub wakeup: NaiveTime,
    pub entries: Vec<TemplateEntry>,
    pub advisories: Vec<Diagnostic>,
}

/// Split a raw line into interpreted content and the verbatim trailing
/// comment, if any.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.find('#') {
        Some(idx) => (&line[..idx], Some(&line[idx + 1..])),
        None => (line, None),
    }
}

pub fn parse_qalib(raw: &str) -> Result<ParsedTemplate, ParseError> {
    let mut wakeup: Option<NaiveTime> = None;
    let mut entries: Vec<TemplateEntry> = Vec::new();
    let mut advisories: Vec<Diagnostic> = Vec::new();

    for (idx, raw_line) in raw.lines().enumerate() {
        let line = (idx + 1) as u32;
        let (content, comment) = split_comment(raw_line);
        let stripped = content.trim();
        if stripped.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = stripped.split_whitespace().collect();

        if wakeup.is_none() {
            // First content line must open with HH:MM; its trailing text is
            // ignored entirely and never becomes an event name.
            match parse_hhmm(tokens[0]) {
                Some(time) => {
                    wakeup = Some(time);
                    continue;
                }
                None if stripped.starts_with('-') => {
                    return Err(ParseError::OrphanSubtask { line });
                }
                None => {
                    return Err(ParseError::MalformedToken {
                        line,
                        token: tokens[0].to_string(),
                    });
                }
            }
        }

        if let Some(body) = stripped.strip_prefix('-') {
            attach_note(body.trim_start(), line, &mut entries, &mut advisories)?;
            continue;
        }

        let comment = comment.map(str::to_string);

        if let Some(start) = parse_hhmm(tokens[0]) {
            if tokens.len() == 1 {
                return Err(ParseError::DuplicateWakeup { line });
            }
            let end = parse_hhmm(tokens[1]).ok_or_else(|| ParseError::MalformedToken {
                line,
                token: tokens[1].to_string(),
            })?;
            let name = tokens[2..].join(" ");
            if end <= start {
                return Err(ParseError::EndBeforeStart { line, name });
            }
            let kind = match single_prayer_keyword(&tokens[2..]) {
                Some(prayer) => EntryKind::PrayerAlias {
                    prayer,
                    spec: AliasSpec::Absolute { start, end },
                },
                None => EntryKind::FixedTask {
                    start,
                    end,
                    name,
                    notes: Vec::new(),
                },
            };
            entries.push(TemplateEntry {
                line,
                comment,
                kind,
            });
            continue;
        }

        if let Some(duration) = parse_duration_token(tokens[0]) {
            let kind = match single_prayer_keyword(&tokens[1..]) {
                Some(prayer) => EntryKind::PrayerAlias {
                    prayer,
                    spec: AliasSpec::Relative(duration),
                },
                None => EntryKind::RelativeTask {
                    duration,
                    raw_duration: tokens[0].to_string(),
                    name: tokens[1..].join(" "),
                    notes: Vec::new(),
                },
            };
            entries.push(TemplateEntry {
                line,
                comment,
                kind,
            });
            continue;
        }

        return Err(ParseError::MalformedToken {
            line,
            token: tokens[0].to_string(),
        });
    }

    let wakeup = wakeup.ok_or(ParseError::MissingWakeup)?;
    Ok(ParsedTemplate {
        wakeup,
        entries,
        advisories,
    })
}

/// The free text is a prayer alias only when it is exactly one of the five
/// prayer keywords (case-insensitive).
fn single_prayer_keyword(tokens: &[&str]) -> Option<Prayer> {
    match tokens {
        [single] => Prayer::from_keyword(single),
        _ => None,
    }
}

fn attach_note(
    body: &str,
    line: u32,
    entries: &mut [TemplateEntry],
    advisories: &mut Vec<Diagnostic>,
) -> Result<(), ParseError> {
    let notes = match entries.last_mut().map(|e| &mut e.kind) {
        Some(EntryKind::RelativeTask { notes, .. }) | Some(EntryKind::FixedTask { notes, .. }) => {
            notes
        }
        // Prayer and wake-up events never carry notes.
        _ => return Err(ParseError::OrphanSubtask { line }),
    };

    let (countdown, text) = if let Some(rest) = body.strip_prefix('[') {
        let closing = rest.find(']').ok_or_else(|| ParseError::MalformedToken {
            line,
            token: body.to_string(),
        })?;
        let expression = rest[..closing].trim();
        let text = rest[closing + 1..].trim();
        let countdown = if expression.is_empty() {
            Countdown::Unbounded
        } else {
            match eval_occurrences(expression) {
                Ok(sessions) => Countdown::Remaining(sessions),
                Err(_) => {
                    advisories.push(Diagnostic::advisory(
                        Some(line),
                        DiagnosticKind::CountdownDegraded {
                            expression: expression.to_string(),
                        },
                    ));
                    Countdown::Unbounded
                }
            }
        };
        (Some(countdown), text)
    } else {
        (None, body.trim())
    };

    notes.push(SubtaskNote {
        text: text.to_string(),
        countdown,
    });
    Ok(())
}
