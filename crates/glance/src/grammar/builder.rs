//! Incremental grammar construction.

use crate::expr::Expr;
use crate::grammar::Grammar;
use crate::rule::Rule;
use crate::symbol::{NonTerminal, Terminal};

/// Builder for constructing grammars rule by rule.
///
/// Adding a rule with [`rule`](Self::rule) flattens its right-hand side;
/// rules sharing a left-hand side become alternatives of one rule when
/// the grammar is built.
pub struct GrammarBuilder<T, N> {
    rules: Vec<Rule<T, N>>,
}

impl<T, N> Default for GrammarBuilder<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, N> GrammarBuilder<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule rewriting `lhs` into the [flattened](Expr::flatten)
    /// form of `rhs`. A rule with the same `lhs` added earlier gains this
    /// right-hand side as an alternative.
    #[must_use]
    pub fn rule(mut self, lhs: N, rhs: Expr<T, N>) -> Self {
        self.rules.push(Rule::new(lhs, rhs.flatten()));
        self
    }

    /// Add a prebuilt rule, keeping its right-hand side as written.
    #[must_use]
    pub fn add(mut self, rule: Rule<T, N>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Build and analyze the grammar.
    ///
    /// Analysis problems are captured in the returned artifact; see
    /// [`Grammar::problem`].
    #[must_use]
    pub fn build(self) -> Grammar<T, N> {
        Grammar::new(self.rules)
    }
}
