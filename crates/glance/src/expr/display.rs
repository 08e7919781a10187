//! Canonical text forms for expressions.
//!
//! The printed form is stable and is what error messages and test golden
//! values use: symbols print their names, `.` is any-terminal, `!` never
//! matches, `#` is epsilon, sequences are `(a b)`, choices `(a | b)`,
//! negations `~(a | b)`, and repetitions carry a quantifier suffix.

use core::fmt;

use super::Expr;
use crate::symbol::{NonTerminal, Terminal};

impl<T, N> Expr<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    /// The canonical text form of this expression.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl<T, N> fmt::Display for Expr<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(t) => f.write_str(t.name()),
            Self::Rule(n) => f.write_str(n.name()),
            Self::Any => f.write_str("."),
            Self::Never => f.write_str("!"),
            Self::Empty => f.write_str("#"),
            Self::Negate(ts) => {
                f.write_str("~(")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    f.write_str(t.name())?;
                }
                f.write_str(")")
            }
            Self::Seq(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Self::Choice(alts) => {
                f.write_str("(")?;
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{alt}")?;
                }
                f.write_str(")")
            }
            Self::Repeat { expr, min, max } => {
                // A directly nested repetition needs parentheses to keep
                // the suffixes from stacking ambiguously.
                if matches!(expr.as_ref(), Self::Repeat { .. }) {
                    write!(f, "({expr})")?;
                } else {
                    write!(f, "{expr}")?;
                }
                write_quantifier(f, *min, *max)
            }
        }
    }
}

fn write_quantifier(f: &mut fmt::Formatter<'_>, min: usize, max: Option<usize>) -> fmt::Result {
    match max {
        Some(max) if max == min => write!(f, "[{min}]"),
        None => match min {
            0 => f.write_str("*"),
            1 => f.write_str("+"),
            _ => write!(f, "[{min}..]"),
        },
        Some(1) if min == 0 => f.write_str("?"),
        Some(max) if min == 0 => write!(f, "[..{max}]"),
        Some(max) => write!(f, "[{min}..{max}]"),
    }
}
