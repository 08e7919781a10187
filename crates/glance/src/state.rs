//! A cursor that walks step by step over an expression and reports, at
//! every position, which terminals may come next and whether the
//! expression already matches.

use crate::error::GrammarError;
use crate::expr::Expr;
use crate::grammar::Grammar;
use crate::symbol::{NonTerminal, Terminal};
use crate::TerminalSet;

/// A walking position inside an expression, relative to a grammar.
///
/// The cursor keeps an eagerly recomputed cache of the lookahead set and
/// the completion flags; every [`advance`](State::advance) or
/// [`set_index`](State::set_index) rebuilds it. Construction validates
/// the grammar and the expression once, so moving the cursor afterwards
/// cannot fail.
///
/// A cursor is single-threaded state: share the grammar, not the cursor.
pub struct State<'g, T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    grammar: &'g Grammar<T, N>,
    parent: Option<Box<State<'g, T, N>>>,
    expr: &'g Expr<T, N>,
    index: usize,
    next: TerminalSet<T>,
    matches: bool,
    end: bool,
}

impl<'g, T, N> State<'g, T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    /// Create a cursor over `expr` at index 0.
    ///
    /// # Errors
    ///
    /// Returns the grammar's captured problem, or a generic error if the
    /// expression references a non-terminal the grammar does not define.
    pub fn new(grammar: &'g Grammar<T, N>, expr: &'g Expr<T, N>) -> Result<Self, GrammarError<N>> {
        Self::construct(grammar, None, expr)
    }

    /// Create a cursor over `expr` whose parent is `parent`.
    ///
    /// When a cursor steps into a nested construct (a quantified inner
    /// expression, an alternative), the walker driving it builds a child
    /// cursor; the parent is kept so that, once the child completes, the
    /// walk can resume where it left off.
    ///
    /// # Errors
    ///
    /// As for [`new`](Self::new).
    pub fn with_parent(parent: Self, expr: &'g Expr<T, N>) -> Result<Self, GrammarError<N>> {
        Self::construct(parent.grammar, Some(Box::new(parent)), expr)
    }

    fn construct(
        grammar: &'g Grammar<T, N>,
        parent: Option<Box<Self>>,
        expr: &'g Expr<T, N>,
    ) -> Result<Self, GrammarError<N>> {
        grammar.check()?;
        grammar.validate_expr(expr)?;
        let mut state = Self {
            grammar,
            parent,
            expr,
            index: 0,
            next: TerminalSet::default(),
            matches: false,
            end: false,
        };
        state.update();
        Ok(state)
    }

    /// The grammar this cursor walks against.
    #[must_use]
    pub fn grammar(&self) -> &'g Grammar<T, N> {
        self.grammar
    }

    /// The parent cursor, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// Consume this cursor and hand back its parent.
    #[must_use]
    pub fn into_parent(self) -> Option<Self> {
        self.parent.map(|parent| *parent)
    }

    /// The whole expression this cursor walks over.
    #[must_use]
    pub fn expr(&self) -> &'g Expr<T, N> {
        self.expr
    }

    /// The current progress through the expression.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The sub-expression expected next, or `None` at the end.
    #[must_use]
    pub fn now(&self) -> Option<&'g Expr<T, N>> {
        self.expr.get(self.index)
    }

    /// Advance one step through the expression.
    pub fn advance(&mut self) {
        self.index += 1;
        self.update();
    }

    /// Jump to an arbitrary progress point.
    pub fn set_index(&mut self, index: usize) {
        self.index = index;
        self.update();
    }

    /// The terminals that may legally come next at this position. Empty
    /// once the cursor has progressed past the entire expression.
    #[must_use]
    pub fn next(&self) -> &TerminalSet<T> {
        &self.next
    }

    /// Whether the expression already matches at this position, with no
    /// further input. More input may still be possible at the same time:
    /// a trailing optional part, or a non-terminal that can match empty.
    #[must_use]
    pub const fn matches(&self) -> bool {
        self.matches
    }

    /// Whether the cursor has progressed through the entire expression.
    /// Once true it stays true under [`advance`](Self::advance).
    #[must_use]
    pub const fn end(&self) -> bool {
        self.end
    }

    fn update(&mut self) {
        self.next.clear();
        self.matches = self
            .grammar
            .next_unchecked(self.expr, self.index, &mut self.next);
        self.end = self.now().is_none();
    }
}
