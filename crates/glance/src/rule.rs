//! Production rules: a non-terminal and the expression that rewrites it.

use core::fmt;
use core::slice;

use crate::expr::Expr;
use crate::symbol::{NonTerminal, Terminal};
use crate::{NonterminalSet, SymbolSet, TerminalSet};

/// A production rule, `lhs := rhs`.
///
/// Within a grammar each non-terminal has at most one rule; rules sharing
/// a left-hand side are [merged](Rule::merge) into alternatives when the
/// grammar is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule<T, N> {
    lhs: N,
    rhs: Expr<T, N>,
}

impl<T, N> Rule<T, N> {
    /// Create a rule rewriting `lhs` into `rhs`.
    #[must_use]
    pub const fn new(lhs: N, rhs: Expr<T, N>) -> Self {
        Self { lhs, rhs }
    }

    /// The non-terminal being rewritten.
    #[must_use]
    pub const fn lhs(&self) -> &N {
        &self.lhs
    }

    /// The expression rewriting the non-terminal.
    #[must_use]
    pub const fn rhs(&self) -> &Expr<T, N> {
        &self.rhs
    }

    /// The alternative expressions of the right-hand side: the children
    /// of a top-level [`Choice`](Expr::Choice), otherwise the right-hand
    /// side itself as a one-element slice.
    #[must_use]
    pub fn alternatives(&self) -> &[Expr<T, N>] {
        match &self.rhs {
            Expr::Choice(alts) => alts,
            other => slice::from_ref(other),
        }
    }
}

impl<T, N> Rule<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    /// Every symbol occurring in the right-hand side.
    #[must_use]
    pub fn rhs_symbols(&self) -> SymbolSet<T, N> {
        let mut out = SymbolSet::default();
        self.rhs.collect_symbols(&mut out);
        out
    }

    /// Every terminal occurring in the right-hand side.
    #[must_use]
    pub fn rhs_terminals(&self) -> TerminalSet<T> {
        let mut out = TerminalSet::default();
        self.rhs.collect_terminals(&mut out);
        out
    }

    /// Every non-terminal occurring in the right-hand side.
    #[must_use]
    pub fn rhs_nonterminals(&self) -> NonterminalSet<N> {
        let mut out = NonterminalSet::default();
        self.rhs.collect_nonterminals(&mut out);
        out
    }

    /// A copy of this rule with a [flattened](Expr::flatten) right-hand
    /// side.
    #[must_use]
    pub fn flatten(self) -> Self {
        Self::new(self.lhs, self.rhs.flatten())
    }

    /// Merge another rule into this one, making its right-hand side an
    /// additional list of alternatives: merging `foo := bar` with
    /// `foo := baz` gives `foo := (bar | baz)`.
    ///
    /// # Panics
    ///
    /// Panics if the rules rewrite different non-terminals.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        assert!(
            self.lhs == other.lhs,
            "cannot merge rules with different left-hand side symbols: `{}` and `{}`",
            self.lhs.name(),
            other.lhs.name(),
        );
        let mut alts = self.alternatives().to_vec();
        alts.extend(other.alternatives().iter().cloned());
        Self::new(self.lhs.clone(), Expr::Choice(alts))
    }

    /// The canonical text form of this rule, `lhs := rhs`.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl<T, N> fmt::Display for Rule<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.lhs.name(), self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tok {
        Plus,
        Num,
    }

    impl Terminal for Tok {
        fn name(&self) -> &str {
            match self {
                Self::Plus => "PLUS",
                Self::Num => "NUM",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Nt {
        Sum,
        Term,
    }

    impl NonTerminal for Nt {
        fn name(&self) -> &str {
            match self {
                Self::Sum => "sum",
                Self::Term => "term",
            }
        }
    }

    type E = Expr<Tok, Nt>;

    #[test]
    fn alternatives_of_plain_rhs_is_the_rhs() {
        let rule = Nt::Term.define(E::Terminal(Tok::Num));
        assert_eq!(rule.alternatives(), &[E::Terminal(Tok::Num)]);
    }

    #[test]
    fn alternatives_of_choice_are_its_children() {
        let rule = Nt::Term.define_choice([E::Terminal(Tok::Num), E::Rule(Nt::Sum)]);
        assert_eq!(
            rule.alternatives(),
            &[E::Terminal(Tok::Num), E::Rule(Nt::Sum)],
        );
    }

    #[test]
    fn merge_concatenates_alternatives() {
        let a = Nt::Term.define(E::Terminal(Tok::Num));
        let b = Nt::Term.define_choice([E::Rule(Nt::Sum), E::Empty]);
        let merged = a.merge(&b);
        assert_eq!(
            merged.rhs(),
            &E::Choice(vec![E::Terminal(Tok::Num), E::Rule(Nt::Sum), E::Empty]),
        );
        assert_eq!(merged.lhs(), &Nt::Term);
    }

    #[test]
    #[should_panic(expected = "different left-hand side")]
    fn merge_rejects_different_lhs() {
        let a = Nt::Term.define(E::Terminal(Tok::Num));
        let b = Nt::Sum.define(E::Terminal(Tok::Num));
        let _ = a.merge(&b);
    }

    #[test]
    fn rhs_inventories() {
        let rule = Nt::Sum.define(E::seq([
            E::Rule(Nt::Term),
            E::Terminal(Tok::Plus),
            E::Rule(Nt::Term),
        ]));
        assert_eq!(rule.rhs_terminals().len(), 1);
        assert!(rule.rhs_terminals().contains(&Tok::Plus));
        assert_eq!(rule.rhs_nonterminals().len(), 1);
        assert!(rule.rhs_nonterminals().contains(&Nt::Term));
        assert!(rule.rhs_symbols().contains(&Symbol::Terminal(Tok::Plus)));
        assert!(rule.rhs_symbols().contains(&Symbol::Nonterminal(Nt::Term)));
    }

    #[test]
    fn display_form() {
        let rule = Nt::Sum.define_choice([
            E::seq([E::Rule(Nt::Term), E::Terminal(Tok::Plus), E::Rule(Nt::Term)]),
            E::Rule(Nt::Term),
        ]);
        assert_eq!(rule.to_string(), "sum := ((term PLUS term) | term)");
    }
}
