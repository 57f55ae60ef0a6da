//! Canonical qalib rendering and diagnostic annotation.
//!
//! Rendering is lossy only about insignificant whitespace; duration tokens
//! and trailing comments are preserved as written. Annotation is how
//! advisory diagnostics travel back to the user: they become trailing
//! comments on the offending source lines, ready for the external editor.

use crate::error::{Diagnostic, Severity};
use crate::recurrence::Countdown;
use crate::timeutil::{format_duration_token, format_hhmm};

use super::parser::{AliasSpec, EntryKind, ParsedTemplate};

pub fn render(template: &ParsedTemplate) -> String {
    let mut lines: Vec<String> = vec![format_hhmm(template.wakeup)];
    for entry in &template.entries {
        let mut line = match &entry.kind {
            EntryKind::RelativeTask {
                raw_duration, name, ..
            } => format!("{raw_duration} {name}").trim_end().to_string(),
            EntryKind::FixedTask {
                start, end, name, ..
            } => format!("{} {} {name}", format_hhmm(*start), format_hhmm(*end))
                .trim_end()
                .to_string(),
            EntryKind::PrayerAlias { prayer, spec } => match spec {
                AliasSpec::Absolute { start, end } => {
                    format!("{} {} {prayer}", format_hhmm(*start), format_hhmm(*end))
                }
                AliasSpec::Relative(duration) => {
                    format!("{} {prayer}", format_duration_token(*duration))
                }
            },
        };
        if let Some(comment) = &entry.comment {
            line.push_str(" #");
            line.push_str(comment);
        }
        lines.push(line);

        let notes = match &entry.kind {
            EntryKind::RelativeTask { notes, .. } | EntryKind::FixedTask { notes, .. } => {
                notes.as_slice()
            }
            EntryKind::PrayerAlias { .. } => &[],
        };
        for note in notes {
            let prefix = match note.countdown {
                Some(Countdown::Remaining(n)) => format!("- [{n}]"),
                Some(Countdown::Unbounded) => "- []".to_string(),
                None => "-".to_string(),
            };
            lines.push(format!("{prefix} {}", note.text).trim_end().to_string());
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Append advisory diagnostics as trailing comments on their source lines.
/// The text is otherwise returned byte-for-byte.
pub fn annotate(raw: &str, diagnostics: &[Diagnostic]) -> String {
    let mut lines: Vec<String> = raw.lines().map(str::to_string).collect();
    for diagnostic in diagnostics {
        if diagnostic.severity != Severity::Advisory {
            continue;
        }
        let Some(line) = diagnostic.line else { continue };
        let idx = (line as usize).saturating_sub(1);
        if let Some(target) = lines.get_mut(idx) {
            target.push_str(&format!(" # {}", diagnostic.message()));
        }
    }
    let mut out = lines.join("\n");
    if raw.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;
    use crate::qalib::parser::parse_qalib;

    #[test]
    fn render_round_trips_through_the_parser() {
        let raw = "\
05:00
2 Study # deep work
- [14] Read chapter
- [] stretch
- water
.15 Coffee
09:00 11:30 University
.10 Fajr
12:30 12:45 Dhuhr
";
        let parsed = parse_qalib(raw).unwrap();
        let rendered = render(&parsed);
        let reparsed = parse_qalib(&rendered).unwrap();
        assert_eq!(parsed.wakeup, reparsed.wakeup);
        assert_eq!(parsed.entries, reparsed.entries);
    }

    #[test]
    fn annotate_appends_to_the_offending_line_only() {
        let raw = "05:00\n2 Study\n09:00 11:30 University\n";
        let diag = Diagnostic::advisory(
            Some(3),
            DiagnosticKind::Drift {
                event: "University".into(),
                expected: "09:00".into(),
                found: "09:20".into(),
            },
        );
        let annotated = annotate(raw, &[diag]);
        let lines: Vec<&str> = annotated.lines().collect();
        assert_eq!(lines[1], "2 Study");
        assert!(lines[2].starts_with("09:00 11:30 University # "));
        assert!(lines[2].contains("09:20"));
    }
}
