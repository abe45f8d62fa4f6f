//! Pattern flags in the `"gi"` string form hosts exchange

use super::{PatternError, PatternResult};
use serde::{Deserialize, Serialize};

/// Flags carried alongside a pattern source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFlags {
    /// Find every match rather than the first (`g`)
    pub global: bool,
    /// Case-insensitive matching (`i`)
    pub case_insensitive: bool,
    /// `^`/`$` match at line boundaries (`m`)
    #[serde(default)]
    pub multi_line: bool,
    /// `.` matches newlines (`s`)
    #[serde(default)]
    pub dot_all: bool,
}

impl PatternFlags {
    /// Global and case-insensitive, the flags every term search uses
    pub fn search_default() -> Self {
        Self {
            global: true,
            case_insensitive: true,
            ..Default::default()
        }
    }

    /// Parse a flag string such as `"gi"`
    ///
    /// Each flag may appear once. `u` is accepted and ignored because
    /// haystacks are always UTF-8; sticky (`y`) and any other letter are
    /// rejected.
    pub fn parse(flags: &str) -> PatternResult<Self> {
        let mut parsed = Self::default();
        let mut seen = String::new();
        for c in flags.chars() {
            if seen.contains(c) {
                return Err(PatternError::InvalidFlags(format!("duplicate flag '{}'", c)));
            }
            seen.push(c);
            match c {
                'g' => parsed.global = true,
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                'u' => {}
                other => {
                    return Err(PatternError::InvalidFlags(format!(
                        "unsupported flag '{}'",
                        other
                    )))
                }
            }
        }
        Ok(parsed)
    }
}

impl std::fmt::Display for PatternFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.global {
            write!(f, "g")?;
        }
        if self.case_insensitive {
            write!(f, "i")?;
        }
        if self.multi_line {
            write!(f, "m")?;
        }
        if self.dot_all {
            write!(f, "s")?;
        }
        Ok(())
    }
}
