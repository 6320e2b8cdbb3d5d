//! Patterns: derived matchers describing the byte sequences a node accepts.
//!
//! A pattern is a regex fragment over the *hex text* of the data (two
//! lowercase hex digits per byte), so a fixed literal `b"hello"` becomes
//! `68656c6c6f` and a free run of 5–10 bytes becomes `.{10,20}`. Structural
//! composition is the only thing built here: ordered concatenation for
//! aggregates, grouped alternation for alternatives, bounded repetition for
//! repetitions. Execution is delegated to the `regex` crate.
//!
//! Patterns are immutable values, derived fresh on every call — never cached
//! on the node.

use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("pattern compile: {0}")]
    Compile(#[from] regex::Error),
}

/// A matcher for the set of byte sequences a node's grammar accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    expr: String,
}

/// Hex text of `bytes`: two lowercase digits per byte.
pub fn hex_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

impl Pattern {
    /// Neutral pattern: matches only the empty sequence when alone, and
    /// contributes nothing inside a concatenation.
    pub fn empty() -> Self {
        Pattern {
            expr: String::new(),
        }
    }

    /// Pattern matching exactly the literal `bytes`.
    pub fn fixed(bytes: &[u8]) -> Self {
        Pattern {
            expr: hex_text(bytes),
        }
    }

    /// Pattern matching any run of `min` to `max` bytes.
    pub fn sized(min: usize, max: usize) -> Self {
        assert!(min <= max, "inverted size bounds");
        let expr = if min == max {
            format!(".{{{}}}", min * 2)
        } else {
            format!(".{{{},{}}}", min * 2, max * 2)
        };
        Pattern { expr }
    }

    /// Ordered concatenation: matches P1 immediately followed by P2, and so
    /// on, in declaration order. Each operand is grouped. An empty sequence
    /// yields the neutral pattern.
    pub fn concat(parts: &[Pattern]) -> Self {
        let mut expr = String::new();
        for p in parts {
            expr.push('(');
            expr.push_str(&p.expr);
            expr.push(')');
        }
        Pattern { expr }
    }

    /// Grouped alternation in declaration order: matches whatever any one
    /// operand matches.
    pub fn alternation(parts: &[Pattern]) -> Self {
        if parts.is_empty() {
            return Pattern::empty();
        }
        let inner = parts
            .iter()
            .map(|p| format!("({})", p.expr))
            .collect::<Vec<_>>()
            .join("|");
        Pattern {
            expr: format!("({})", inner),
        }
    }

    /// `inner` repeated `min` to `max` times.
    pub fn repetition(inner: &Pattern, min: usize, max: usize) -> Self {
        assert!(min <= max, "inverted repetition bounds");
        let expr = if min == max {
            format!("({}){{{}}}", inner.expr, min)
        } else {
            format!("({}){{{},{}}}", inner.expr, min, max)
        };
        Pattern { expr }
    }

    /// The hex-text regex expression.
    pub fn as_str(&self) -> &str {
        &self.expr
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    /// Compile the raw (unanchored) expression.
    pub fn compile(&self) -> Result<Regex, PatternError> {
        Ok(Regex::new(&self.expr)?)
    }

    /// Whether `data`, in full, is accepted by this pattern.
    pub fn matches(&self, data: &[u8]) -> Result<bool, PatternError> {
        let re = Regex::new(&format!("^(?:{})$", self.expr))?;
        Ok(re.is_match(&hex_text(data)))
    }

    /// Locate the first instance of this pattern inside `haystack`.
    ///
    /// Returns `(offset, len)` in bytes. Matches are searched on the hex
    /// text; only byte-aligned matches (even hex offset and length) count.
    pub fn find_in(&self, haystack: &[u8]) -> Result<Option<(usize, usize)>, PatternError> {
        let re = self.compile()?;
        let hex = hex_text(haystack);
        for m in re.find_iter(&hex) {
            if m.start() % 2 == 0 && m.end() % 2 == 0 {
                return Ok(Some((m.start() / 2, (m.end() - m.start()) / 2)));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_is_hex_text() {
        assert_eq!(Pattern::fixed(b"hello").as_str(), "68656c6c6f");
    }

    #[test]
    fn concat_groups_in_order() {
        let p = Pattern::concat(&[Pattern::fixed(b"hello"), Pattern::sized(5, 10)]);
        assert_eq!(p.as_str(), "(68656c6c6f)(.{10,20})");
    }

    #[test]
    fn empty_concat_is_neutral() {
        let p = Pattern::concat(&[]);
        assert!(p.is_empty());
        assert!(p.matches(b"").unwrap());
        assert!(!p.matches(b"x").unwrap());
    }

    #[test]
    fn alternation_matches_either() {
        let p = Pattern::alternation(&[Pattern::fixed(b"yes"), Pattern::fixed(b"no")]);
        assert!(p.matches(b"yes").unwrap());
        assert!(p.matches(b"no").unwrap());
        assert!(!p.matches(b"maybe").unwrap());
    }

    #[test]
    fn repetition_bounds() {
        let p = Pattern::repetition(&Pattern::fixed(b"ab"), 1, 3);
        assert!(!p.matches(b"").unwrap());
        assert!(p.matches(b"ab").unwrap());
        assert!(p.matches(b"ababab").unwrap());
        assert!(!p.matches(b"abababab").unwrap());
    }

    #[test]
    fn find_in_reports_byte_offsets() {
        let p = Pattern::fixed(b"lo");
        let found = p.find_in(b"hello").unwrap();
        assert_eq!(found, Some((3, 2)));
    }
}
