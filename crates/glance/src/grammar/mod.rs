//! The grammar artifact: merged rules, symbol inventories, and the frozen
//! results of the emptiness and FIRST-set analyses.
//!
//! A [`Grammar`] is built from a collection of [`Rule`]s and analyzed
//! synchronously during construction. Construction itself never fails:
//! the first problem the pipeline hits is captured into the artifact (see
//! [`Grammar::problem`]) and re-raised by every analytical query, while
//! structural queries stay usable for inspecting the partial result.
//!
//! ```rust
//! use glance::{Expr, Grammar, NonTerminal, Terminal};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Tok {
//!     Num,
//!     Minus,
//! }
//!
//! impl Terminal for Tok {
//!     fn name(&self) -> &str {
//!         match self {
//!             Self::Num => "NUM",
//!             Self::Minus => "MINUS",
//!         }
//!     }
//! }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Nt {
//!     Expr,
//! }
//!
//! impl NonTerminal for Nt {
//!     fn name(&self) -> &str {
//!         "expr"
//!     }
//! }
//!
//! // expr := (MINUS expr) | NUM
//! let grammar = Grammar::builder()
//!     .rule(Nt::Expr, Expr::seq([Expr::Terminal(Tok::Minus), Expr::Rule(Nt::Expr)]))
//!     .rule(Nt::Expr, Expr::Terminal(Tok::Num))
//!     .build();
//!
//! assert!(grammar.problem().is_none());
//! assert!(!grammar.can_match_empty(&Nt::Expr)?);
//! let first = grammar.first_set(&Nt::Expr)?.unwrap();
//! assert!(first.contains(&Tok::Num) && first.contains(&Tok::Minus));
//! # Ok::<(), glance::GrammarError<Nt>>(())
//! ```

mod analyzer;
mod builder;

pub use builder::GrammarBuilder;

use hashbrown::HashMap;

use crate::error::GrammarError;
use crate::expr::{Amount, Expr};
use crate::rule::Rule;
use crate::symbol::{NonTerminal, Symbol, Terminal};
use crate::{NonterminalSet, TerminalSet};

/// A three-valued answer used by the fixed-point analyses.
///
/// `Indecisive` is the transient "not yet determinable" state; after a
/// successful analysis it survives only on rules that sit inside (or
/// behind) left-recursion cycles, and those grammars carry a captured
/// problem anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Definitely yes.
    Positive,
    /// Definitely no.
    Negative,
    /// Not decidable from what is currently known.
    Indecisive,
}

/// Analysis results for one rule.
struct RuleMeta<T, N> {
    rule: Rule<T, N>,
    /// Whether the rule can match empty input.
    empty: Decision,
    /// The rule's FIRST set; `None` while unresolved.
    first: Option<TerminalSet<T>>,
    /// Left-recursion cycles this rule participates in.
    cycles: Vec<Vec<N>>,
}

impl<T, N> RuleMeta<T, N> {
    fn new(rule: Rule<T, N>) -> Self {
        Self {
            rule,
            empty: Decision::Indecisive,
            first: None,
            cycles: Vec::new(),
        }
    }
}

/// An analyzed, frozen grammar.
///
/// Rules are kept in insertion order, with same-LHS rules merged into the
/// first occurrence's slot. All mutation happens inside construction;
/// every public method takes `&self`.
pub struct Grammar<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    metas: Vec<RuleMeta<T, N>>,
    index: HashMap<N, usize, ahash::RandomState>,
    terminals: TerminalSet<T>,
    nonterminals: NonterminalSet<N>,
    /// Referenced non-terminals without a rule, sorted by name.
    undefined: Vec<N>,
    /// Every discovered left-recursion cycle, in discovery order.
    left_recursive: Vec<Vec<N>>,
    problem: Option<GrammarError<N>>,
}

impl<T, N> Grammar<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    /// Build and analyze a grammar from a collection of rules.
    ///
    /// Rules sharing a left-hand side are [merged](Rule::merge) in order.
    /// Analysis problems are captured, not returned; check
    /// [`problem`](Self::problem) or let the first analytical query
    /// surface them.
    #[must_use]
    pub fn new<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = Rule<T, N>>,
    {
        analyzer::analyze(rules.into_iter().collect())
    }

    /// A builder that merges same-LHS rules and flattens right-hand
    /// sides as they are added.
    #[must_use]
    pub fn builder() -> GrammarBuilder<T, N> {
        GrammarBuilder::new()
    }

    pub(crate) fn empty_artifact() -> Self {
        Self {
            metas: Vec::new(),
            index: HashMap::default(),
            terminals: TerminalSet::default(),
            nonterminals: NonterminalSet::default(),
            undefined: Vec::new(),
            left_recursive: Vec::new(),
            problem: None,
        }
    }

    /// The problem encountered while analyzing the grammar, if any.
    #[must_use]
    pub fn problem(&self) -> Option<&GrammarError<N>> {
        self.problem.as_ref()
    }

    /// Fail with the captured problem, or return the grammar for further
    /// chaining.
    ///
    /// # Errors
    ///
    /// Returns the captured problem, if there is one.
    pub fn check(&self) -> Result<&Self, GrammarError<N>> {
        match &self.problem {
            Some(problem) => Err(problem.clone()),
            None => Ok(self),
        }
    }

    /// All rules, in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule<T, N>> {
        self.metas.iter().map(|meta| &meta.rule)
    }

    /// The number of rules (after merging).
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.metas.len()
    }

    /// The rule rewriting the given non-terminal, if there is one.
    #[must_use]
    pub fn rule(&self, lhs: &N) -> Option<&Rule<T, N>> {
        self.meta(lhs).map(|meta| &meta.rule)
    }

    /// Whether the given non-terminal has a rule.
    #[must_use]
    pub fn has_rule(&self, lhs: &N) -> bool {
        self.index.contains_key(lhs)
    }

    /// Every terminal referenced by the grammar.
    #[must_use]
    pub fn terminals(&self) -> &TerminalSet<T> {
        &self.terminals
    }

    /// Every non-terminal referenced or defined by the grammar.
    #[must_use]
    pub fn nonterminals(&self) -> &NonterminalSet<N> {
        &self.nonterminals
    }

    /// Every symbol referenced or defined by the grammar.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol<T, N>> + '_ {
        self.terminals
            .iter()
            .cloned()
            .map(Symbol::Terminal)
            .chain(self.nonterminals.iter().cloned().map(Symbol::Nonterminal))
    }

    /// Whether the given symbol is referenced or defined by the grammar.
    #[must_use]
    pub fn has(&self, symbol: &Symbol<T, N>) -> bool {
        match symbol {
            Symbol::Terminal(t) => self.terminals.contains(t),
            Symbol::Nonterminal(n) => self.nonterminals.contains(n),
        }
    }

    /// Non-terminals referenced by some right-hand side but lacking a
    /// rule, sorted by name. Non-empty iff the captured problem is
    /// [`GrammarError::UndefinedSymbols`].
    #[must_use]
    pub fn undefined(&self) -> &[N] {
        &self.undefined
    }

    /// Every left-recursion cycle the analysis discovered, in discovery
    /// order. Each cycle starts and ends with the same non-terminal.
    #[must_use]
    pub fn left_recursion(&self) -> &[Vec<N>] {
        &self.left_recursive
    }

    /// Whether the given non-terminal can match empty input.
    ///
    /// # Errors
    ///
    /// Returns the captured problem, or a generic error if the
    /// non-terminal has no rule.
    pub fn can_match_empty(&self, nt: &N) -> Result<bool, GrammarError<N>> {
        self.check()?;
        let meta = self
            .meta(nt)
            .ok_or_else(|| GrammarError::unknown_nonterminal(nt))?;
        Ok(meta.empty == Decision::Positive)
    }

    /// The set of terminals that can appear first in an input matched by
    /// the given non-terminal. With one lookahead token this decides
    /// whether a parser should commit to the non-terminal at all.
    ///
    /// `None` is only returned for rules whose FIRST set could not be
    /// resolved because of left recursion.
    ///
    /// # Errors
    ///
    /// Returns the captured problem, or a generic error if the
    /// non-terminal has no rule.
    pub fn first_set(&self, nt: &N) -> Result<Option<&TerminalSet<T>>, GrammarError<N>> {
        self.check()?;
        let meta = self
            .meta(nt)
            .ok_or_else(|| GrammarError::unknown_nonterminal(nt))?;
        Ok(meta.first.as_ref())
    }

    /// Compute whether `expr` can finish matching with no further input
    /// at progress `index`, adding every terminal that could legally come
    /// next to `out`.
    ///
    /// See [`Expr::get`] for how progress through an expression is
    /// measured.
    ///
    /// # Errors
    ///
    /// Returns the captured problem, or a generic error if the expression
    /// references a non-terminal the grammar does not define.
    pub fn next(
        &self,
        expr: &Expr<T, N>,
        index: usize,
        out: &mut TerminalSet<T>,
    ) -> Result<bool, GrammarError<N>> {
        self.check()?;
        self.validate_expr(expr)?;
        Ok(self.next_unchecked(expr, index, out))
    }

    /// Check that every non-terminal in `expr` has a rule here.
    pub(crate) fn validate_expr(&self, expr: &Expr<T, N>) -> Result<(), GrammarError<N>> {
        let mut referenced = NonterminalSet::default();
        expr.collect_nonterminals(&mut referenced);
        for nt in &referenced {
            if !self.has_rule(nt) {
                return Err(GrammarError::unknown_nonterminal(nt));
            }
        }
        Ok(())
    }

    /// `next` without the problem and expression checks; total over any
    /// expression (unknown non-terminals simply cannot match).
    pub(crate) fn next_unchecked(
        &self,
        expr: &Expr<T, N>,
        index: usize,
        out: &mut TerminalSet<T>,
    ) -> bool {
        match expr {
            Expr::Terminal(t) => {
                if index == 0 {
                    out.insert(t.clone());
                    false
                } else {
                    true
                }
            }
            Expr::Negate(ts) => {
                if index == 0 {
                    for t in &self.terminals {
                        if !ts.contains(t) {
                            out.insert(t.clone());
                        }
                    }
                    false
                } else {
                    true
                }
            }
            Expr::Any => {
                if index == 0 {
                    out.extend(self.terminals.iter().cloned());
                    false
                } else {
                    true
                }
            }
            Expr::Never => false,
            Expr::Empty => true,
            Expr::Rule(n) => {
                if index == 0 {
                    match self.meta(n) {
                        Some(meta) => {
                            if let Some(first) = &meta.first {
                                out.extend(first.iter().cloned());
                            }
                            meta.empty == Decision::Positive
                        }
                        None => false,
                    }
                } else {
                    true
                }
            }
            Expr::Repeat { expr, min, max } => {
                let amount = Amount::classify(*min, *max, index);
                let mut matches = amount.valid();
                if !amount.at_max() {
                    // No short-circuit: the inner lookahead must always be
                    // collected when another repetition is allowed.
                    matches |= self.next_unchecked(expr, 0, out);
                }
                matches
            }
            Expr::Seq(items) => {
                // The expression completes here only if every remaining
                // element can match empty; scanning stops at the first
                // that cannot, and nothing past it can come next.
                for item in items.iter().skip(index) {
                    if !self.next_unchecked(item, 0, out) {
                        return false;
                    }
                }
                true
            }
            Expr::Choice(alts) => {
                let mut matches = false;
                for alt in alts {
                    matches |= self.next_unchecked(alt, 0, out);
                }
                matches
            }
        }
    }

    fn meta(&self, nt: &N) -> Option<&RuleMeta<T, N>> {
        self.index.get(nt).map(|&i| &self.metas[i])
    }
}
