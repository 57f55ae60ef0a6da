//! Qalib template format: parser, countdown expressions and serializer.

mod expr;
mod parser;
mod serializer;

pub use expr::{eval_occurrences, ExprError};
pub use parser::{parse_qalib, AliasSpec, EntryKind, ParsedTemplate, TemplateEntry};
pub use serializer::{annotate, render};

/// Starter template stored by `template init`.
pub const STARTER_QALIB: &str = indoc::indoc! {"
    05:00
    .30 Morning routine
    2 Study
    - [] Review notes
    .15 Coffee
    8 Sleep
"};
