//! Executable patterns backed by regex

use super::{PatternError, PatternFlags, PatternResult};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

/// A pattern ready to scan text
///
/// `\b` and `\B` are ASCII word boundaries, the way browser regexes treat
/// them, while case-insensitive matching folds Unicode letters. Alternation
/// is leftmost-first: at a given position the first listed alternative that
/// matches wins.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    flags: PatternFlags,
}

impl CompiledPattern {
    /// Compile a pattern source with a flag string such as `"gi"`
    pub fn new(source: &str, flags: &str) -> PatternResult<Self> {
        let flags = PatternFlags::parse(flags)?;
        Self::with_flags(source, flags)
    }

    /// Compile a pattern source with parsed flags
    pub fn with_flags(source: &str, flags: PatternFlags) -> PatternResult<Self> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }
        let regex = RegexBuilder::new(&ascii_boundaries(source))
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
            flags,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The source as given, before boundary rewriting
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> PatternFlags {
        self.flags
    }
}

/// Rewrite `\b` and `\B` outside character classes as ASCII assertions
fn ascii_boundaries(source: &str) -> Cow<'_, str> {
    if !source.contains(r"\b") && !source.contains(r"\B") {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len() + 16);
    let mut chars = source.chars();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('b') if !in_class => out.push_str(r"(?-u:\b)"),
                Some('B') if !in_class => out.push_str(r"(?-u:\B)"),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '[' => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
