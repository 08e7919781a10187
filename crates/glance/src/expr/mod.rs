//! The pattern algebra: expression trees that rule right-hand sides are
//! made of.
//!
//! An [`Expr`] is a closed sum of combinators. The three singletons
//! [`Empty`](Expr::Empty), [`Never`](Expr::Never) and [`Any`](Expr::Any)
//! are degenerate forms of the structured variants: `Empty` is an empty
//! `Seq`, `Never` an empty `Choice`, `Any` an empty `Negate`. The
//! [`flatten`](Expr::flatten) rewriter exploits those identities.

mod display;
mod flatten;

use smallvec::SmallVec;

use crate::symbol::{NonTerminal, Symbol, Terminal};
use crate::{NonterminalSet, SymbolSet, TerminalSet};

/// A grammar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<T, N> {
    /// Match exactly this terminal.
    Terminal(T),
    /// Match whatever the rule of this non-terminal matches.
    Rule(N),
    /// Match any single terminal not in the list.
    Negate(SmallVec<[T; 4]>),
    /// Match any single terminal.
    Any,
    /// Never match.
    Never,
    /// Match zero input (epsilon).
    Empty,
    /// Match every element, in order.
    Seq(Vec<Expr<T, N>>),
    /// Match exactly one of the alternatives.
    Choice(Vec<Expr<T, N>>),
    /// Match the inner expression repeatedly, between `min` and `max`
    /// times. `max: None` means unbounded.
    Repeat {
        expr: Box<Expr<T, N>>,
        min: usize,
        max: Option<usize>,
    },
}

/// How an iteration count relates to a repetition's bounds.
///
/// Classifies the progress index of a cursor standing inside a
/// [`Expr::Repeat`]: has it matched too few repetitions to stop, enough to
/// stop but not forced to, exactly the maximum, or more than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// Fewer than `min` repetitions so far.
    TooFew,
    /// A valid count, with room for more.
    Enough,
    /// A valid count, and no more are allowed.
    Limit,
    /// More than `max` repetitions.
    TooMany,
}

impl Amount {
    /// Classify `index` repetitions against the bounds `min..=max`.
    #[must_use]
    pub fn classify(min: usize, max: Option<usize>, index: usize) -> Self {
        if index < min {
            return Self::TooFew;
        }
        match max {
            None => Self::Enough,
            Some(max) if index < max => Self::Enough,
            Some(max) if index == max => Self::Limit,
            Some(_) => Self::TooMany,
        }
    }

    /// Whether this many repetitions satisfies the bounds.
    #[must_use]
    pub const fn valid(self) -> bool {
        matches!(self, Self::Enough | Self::Limit)
    }

    /// Whether no further repetition is allowed.
    #[must_use]
    pub const fn at_max(self) -> bool {
        matches!(self, Self::Limit | Self::TooMany)
    }
}

impl<T, N> Expr<T, N> {
    /// An expression matching the given expressions in sequence.
    ///
    /// An empty sequence is [`Empty`](Expr::Empty) and a one-element
    /// sequence is the element itself.
    ///
    /// # Panics
    ///
    /// Panics if the iterator reports a length of 1 but `next()` returns
    /// `None`.
    #[must_use]
    pub fn seq<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut vec: Vec<_> = exprs.into_iter().collect();
        match vec.len() {
            0 => Self::Empty,
            1 => vec.pop().unwrap(),
            _ => Self::Seq(vec),
        }
    }

    /// An expression matching exactly one of the given alternatives.
    ///
    /// An empty choice is [`Never`](Expr::Never) and a one-element choice
    /// is the element itself.
    ///
    /// # Panics
    ///
    /// Panics if the iterator reports a length of 1 but `next()` returns
    /// `None`.
    #[must_use]
    pub fn choice<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut vec: Vec<_> = exprs.into_iter().collect();
        match vec.len() {
            0 => Self::Never,
            1 => vec.pop().unwrap(),
            _ => Self::Choice(vec),
        }
    }

    /// An expression matching any single terminal except the given ones.
    ///
    /// With no terminals this is [`Any`](Expr::Any). Duplicates are
    /// dropped, keeping first-occurrence order.
    #[must_use]
    pub fn none_of<I>(terminals: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: PartialEq,
    {
        let mut set: SmallVec<[T; 4]> = SmallVec::new();
        for t in terminals {
            if !set.contains(&t) {
                set.push(t);
            }
        }
        if set.is_empty() { Self::Any } else { Self::Negate(set) }
    }

    /// A repetition of `expr` between `min` and `max` times, `None`
    /// meaning unbounded.
    ///
    /// # Panics
    ///
    /// Panics if `max` is bounded and smaller than `min`.
    #[must_use]
    pub fn repeat(expr: Self, min: usize, max: Option<usize>) -> Self {
        assert!(
            max.is_none_or(|max| max >= min),
            "repetition bounds out of order: max {max:?} < min {min}",
        );
        Self::Repeat {
            expr: Box::new(expr),
            min,
            max,
        }
    }

    /// `self?`: match zero or one time.
    #[must_use]
    pub fn optional(self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Never => Self::Empty,
            e => Self::repeat(e, 0, Some(1)),
        }
    }

    /// `self*`: match any number of times.
    #[must_use]
    pub fn zero_or_more(self) -> Self {
        match self {
            Self::Empty | Self::Never => Self::Empty,
            e => Self::repeat(e, 0, None),
        }
    }

    /// `self+`: match one or more times.
    #[must_use]
    pub fn one_or_more(self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Never => Self::Never,
            e => Self::repeat(e, 1, None),
        }
    }

    /// `self[min..]`: match at least `min` times.
    #[must_use]
    pub fn at_least(self, min: usize) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Never if min == 0 => Self::Empty,
            Self::Never => Self::Never,
            e => Self::repeat(e, min, None),
        }
    }

    /// `self[..max]`: match at most `max` times.
    #[must_use]
    pub fn at_most(self, max: usize) -> Self {
        match self {
            Self::Empty | Self::Never => Self::Empty,
            e => Self::repeat(e, 0, Some(max)),
        }
    }

    /// `self[1..max]`: match at least once and at most `max` times.
    #[must_use]
    pub fn one_to(self, max: usize) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Never => Self::Never,
            e => Self::repeat(e, 1, Some(max)),
        }
    }

    /// `self[min..max]`: match between `min` and `max` times.
    #[must_use]
    pub fn between(self, min: usize, max: usize) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Never if min == 0 => Self::Empty,
            Self::Never => Self::Never,
            e => Self::repeat(e, min, Some(max)),
        }
    }

    /// `self[amt]`: match exactly `amt` times.
    #[must_use]
    pub fn exactly(self, amt: usize) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Never => Self::Never,
            e => Self::repeat(e, amt, Some(amt)),
        }
    }

    /// `(self | other)` where `other` is the given expressions in
    /// sequence (empty: epsilon, making `self` optional in effect).
    ///
    /// Calling `or` on a [`Choice`](Expr::Choice) appends one alternative
    /// to it; on [`Never`](Expr::Never) the alternative stands alone.
    #[must_use]
    pub fn or<I>(self, exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let alt = Self::seq(exprs);
        match self {
            Self::Never => alt,
            Self::Choice(mut alts) => {
                alts.push(alt);
                Self::Choice(alts)
            }
            e => Self::Choice(vec![e, alt]),
        }
    }

    /// `(self exprs…)`: append expressions to match after this one.
    ///
    /// Calling `then` on a [`Seq`](Expr::Seq) appends to it; on
    /// [`Never`](Expr::Never) the whole sequence can never match.
    #[must_use]
    pub fn then<I>(self, exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut iter = exprs.into_iter().peekable();
        if iter.peek().is_none() {
            return self;
        }
        match self {
            Self::Never => Self::Never,
            Self::Empty => Self::seq(iter),
            Self::Seq(mut items) => {
                items.extend(iter);
                Self::Seq(items)
            }
            e => {
                let mut items = vec![e];
                items.extend(iter);
                Self::Seq(items)
            }
        }
    }

    /// `(exprs… self)`: prepend expressions to match before this one.
    ///
    /// Calling `but_first` on a [`Seq`](Expr::Seq) prepends to it.
    #[must_use]
    pub fn but_first<I>(self, exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut items: Vec<_> = exprs.into_iter().collect();
        if items.is_empty() {
            return self;
        }
        match self {
            Self::Seq(rest) => {
                items.extend(rest);
                Self::Seq(items)
            }
            e => {
                items.push(e);
                Self::Seq(items)
            }
        }
    }

    /// The sub-expression to attempt next at progress `index`, or `None`
    /// when the index is past the expression.
    ///
    /// The index means different things per variant: for single-terminal
    /// and rule references it is 0 before and 1 after the symbol; for a
    /// sequence it addresses the element at that position; for a
    /// repetition it is the number of completed repetitions; a choice is
    /// attempted as a whole at index 0. `Empty` and `Never` expect
    /// nothing at any index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Self> {
        match self {
            Self::Terminal(_) | Self::Rule(_) | Self::Negate(_) | Self::Any | Self::Choice(_) => {
                if index == 0 { Some(self) } else { None }
            }
            Self::Empty | Self::Never => None,
            Self::Seq(items) => items.get(index),
            Self::Repeat { expr, min, max } => {
                if Amount::classify(*min, *max, index).at_max() {
                    None
                } else {
                    Some(expr.as_ref())
                }
            }
        }
    }
}

impl<T, N> Expr<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    /// Add every symbol occurring in this expression to `out`.
    pub fn collect_symbols(&self, out: &mut SymbolSet<T, N>) {
        match self {
            Self::Terminal(t) => {
                out.insert(Symbol::Terminal(t.clone()));
            }
            Self::Rule(n) => {
                out.insert(Symbol::Nonterminal(n.clone()));
            }
            Self::Negate(ts) => {
                out.extend(ts.iter().cloned().map(Symbol::Terminal));
            }
            Self::Any | Self::Never | Self::Empty => {}
            Self::Seq(items) | Self::Choice(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Self::Repeat { expr, .. } => expr.collect_symbols(out),
        }
    }

    /// Add every terminal occurring in this expression to `out`.
    pub fn collect_terminals(&self, out: &mut TerminalSet<T>) {
        match self {
            Self::Terminal(t) => {
                out.insert(t.clone());
            }
            Self::Negate(ts) => {
                out.extend(ts.iter().cloned());
            }
            Self::Rule(_) | Self::Any | Self::Never | Self::Empty => {}
            Self::Seq(items) | Self::Choice(items) => {
                for item in items {
                    item.collect_terminals(out);
                }
            }
            Self::Repeat { expr, .. } => expr.collect_terminals(out),
        }
    }

    /// Add every non-terminal occurring in this expression to `out`.
    pub fn collect_nonterminals(&self, out: &mut NonterminalSet<N>) {
        match self {
            Self::Rule(n) => {
                out.insert(n.clone());
            }
            Self::Terminal(_) | Self::Negate(_) | Self::Any | Self::Never | Self::Empty => {}
            Self::Seq(items) | Self::Choice(items) => {
                for item in items {
                    item.collect_nonterminals(out);
                }
            }
            Self::Repeat { expr, .. } => expr.collect_nonterminals(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tok {
        Foo,
        Bar,
    }

    impl Terminal for Tok {
        fn name(&self) -> &str {
            match self {
                Self::Foo => "FOO",
                Self::Bar => "BAR",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Nt {
        Baz,
    }

    impl NonTerminal for Nt {
        fn name(&self) -> &str {
            "baz"
        }
    }

    type E = Expr<Tok, Nt>;

    #[test]
    fn seq_and_choice_collapse() {
        assert_eq!(E::seq([]), E::Empty);
        assert_eq!(E::choice([]), E::Never);
        assert_eq!(E::seq([E::Any]), E::Any);
        assert_eq!(E::choice([E::Any]), E::Any);
        assert_eq!(
            E::seq([E::Terminal(Tok::Foo), E::Terminal(Tok::Bar)]),
            E::Seq(vec![E::Terminal(Tok::Foo), E::Terminal(Tok::Bar)]),
        );
    }

    #[test]
    fn none_of_dedups_and_collapses() {
        assert_eq!(E::none_of([]), E::Any);
        let e = E::none_of([Tok::Foo, Tok::Bar, Tok::Foo]);
        match e {
            E::Negate(ts) => assert_eq!(ts.as_slice(), &[Tok::Foo, Tok::Bar]),
            other => panic!("expected negation, got {other:?}"),
        }
    }

    #[test]
    fn empty_shortcuts() {
        assert_eq!(E::Empty.optional(), E::Empty);
        assert_eq!(E::Empty.zero_or_more(), E::Empty);
        assert_eq!(E::Empty.one_or_more(), E::Empty);
        assert_eq!(E::Empty.at_least(7), E::Empty);
        assert_eq!(E::Empty.exactly(3), E::Empty);
        assert_eq!(E::Empty.then([E::Terminal(Tok::Foo)]), E::Terminal(Tok::Foo));
    }

    #[test]
    fn never_shortcuts() {
        assert_eq!(E::Never.optional(), E::Empty);
        assert_eq!(E::Never.zero_or_more(), E::Empty);
        assert_eq!(E::Never.one_or_more(), E::Never);
        assert_eq!(E::Never.at_least(0), E::Empty);
        assert_eq!(E::Never.at_least(2), E::Never);
        assert_eq!(E::Never.then([E::Terminal(Tok::Foo)]), E::Never);
        assert_eq!(E::Never.or([E::Terminal(Tok::Foo)]), E::Terminal(Tok::Foo));
    }

    #[test]
    fn or_appends_to_choice() {
        let e = E::Terminal(Tok::Foo)
            .or([E::Terminal(Tok::Bar)])
            .or([E::Rule(Nt::Baz)]);
        assert_eq!(
            e,
            E::Choice(vec![
                E::Terminal(Tok::Foo),
                E::Terminal(Tok::Bar),
                E::Rule(Nt::Baz),
            ]),
        );
    }

    #[test]
    fn or_wraps_multiple_into_sequence() {
        let e = E::Terminal(Tok::Foo).or([E::Terminal(Tok::Bar), E::Rule(Nt::Baz)]);
        assert_eq!(
            e,
            E::Choice(vec![
                E::Terminal(Tok::Foo),
                E::Seq(vec![E::Terminal(Tok::Bar), E::Rule(Nt::Baz)]),
            ]),
        );
    }

    #[test]
    fn then_appends_but_first_prepends() {
        let base = E::Terminal(Tok::Foo).then([E::Terminal(Tok::Bar)]);
        let appended = base.clone().then([E::Rule(Nt::Baz)]);
        assert_eq!(
            appended,
            E::Seq(vec![
                E::Terminal(Tok::Foo),
                E::Terminal(Tok::Bar),
                E::Rule(Nt::Baz),
            ]),
        );
        let prepended = base.but_first([E::Rule(Nt::Baz)]);
        assert_eq!(
            prepended,
            E::Seq(vec![
                E::Rule(Nt::Baz),
                E::Terminal(Tok::Foo),
                E::Terminal(Tok::Bar),
            ]),
        );
    }

    #[test]
    fn amount_classification() {
        assert_eq!(Amount::classify(2, Some(4), 0), Amount::TooFew);
        assert_eq!(Amount::classify(2, Some(4), 2), Amount::Enough);
        assert_eq!(Amount::classify(2, Some(4), 4), Amount::Limit);
        assert_eq!(Amount::classify(2, Some(4), 5), Amount::TooMany);
        assert_eq!(Amount::classify(0, None, 1_000), Amount::Enough);
        assert!(Amount::Limit.valid());
        assert!(Amount::Limit.at_max());
        assert!(!Amount::TooFew.valid());
    }

    #[test]
    fn get_walks_positions() {
        let t = E::Terminal(Tok::Foo);
        assert_eq!(t.get(0), Some(&t));
        assert_eq!(t.get(1), None);

        assert_eq!(E::Empty.get(0), None);
        assert_eq!(E::Never.get(0), None);

        let seq = E::Seq(vec![E::Terminal(Tok::Foo), E::Terminal(Tok::Bar)]);
        assert_eq!(seq.get(0), Some(&E::Terminal(Tok::Foo)));
        assert_eq!(seq.get(1), Some(&E::Terminal(Tok::Bar)));
        assert_eq!(seq.get(2), None);

        let rep = E::repeat(E::Terminal(Tok::Foo), 1, Some(3));
        assert_eq!(rep.get(0), Some(&E::Terminal(Tok::Foo)));
        assert_eq!(rep.get(2), Some(&E::Terminal(Tok::Foo)));
        assert_eq!(rep.get(3), None);

        let unbounded = E::repeat(E::Terminal(Tok::Foo), 0, None);
        assert_eq!(unbounded.get(999), Some(&E::Terminal(Tok::Foo)));
    }

    #[test]
    #[should_panic(expected = "repetition bounds out of order")]
    fn repeat_rejects_inverted_bounds() {
        let _ = E::repeat(E::Any, 3, Some(2));
    }
}
