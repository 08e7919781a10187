//! The grammar error taxonomy.

use thiserror::Error;

use crate::symbol::NonTerminal;

/// A problem with a grammar.
///
/// The analysis pipeline captures the first error it hits into the frozen
/// artifact (see [`Grammar::problem`](crate::Grammar::problem)); every
/// analytical query re-raises it, which is why the type is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError<N: NonTerminal> {
    /// Non-terminals referenced by some right-hand side without a rule of
    /// their own. The payload is sorted by name.
    #[error("the following non-terminal symbols are not defined by the grammar: {}", names(.0))]
    UndefinedSymbols(Vec<N>),

    /// Left-recursion cycles: each is the chain of non-terminals through
    /// which a symbol reaches itself without consuming input, first and
    /// last entries identical.
    #[error("left recursion has been found: {}", cycles(.0))]
    LeftRecursion(Vec<Vec<N>>),

    /// A contract violation outside the two specific failures, e.g.
    /// querying a non-terminal the grammar does not define.
    #[error("{0}")]
    Invalid(String),
}

impl<N: NonTerminal> GrammarError<N> {
    /// A generic error for a query naming an unknown non-terminal.
    #[must_use]
    pub fn unknown_nonterminal(nt: &N) -> Self {
        Self::Invalid(format!(
            "non-terminal `{}` is not defined by the grammar",
            nt.name(),
        ))
    }
}

fn names<N: NonTerminal>(symbols: &[N]) -> String {
    symbols
        .iter()
        .map(NonTerminal::name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn cycles<N: NonTerminal>(cycles: &[Vec<N>]) -> String {
    cycles
        .iter()
        .map(|cycle| {
            cycle
                .iter()
                .map(NonTerminal::name)
                .collect::<Vec<_>>()
                .join(" -> ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Nt {
        Foo,
        Bar,
    }

    impl NonTerminal for Nt {
        fn name(&self) -> &str {
            match self {
                Self::Foo => "foo",
                Self::Bar => "bar",
            }
        }
    }

    #[test]
    fn undefined_message_lists_names() {
        let err = GrammarError::UndefinedSymbols(vec![Nt::Bar, Nt::Foo]);
        assert_eq!(
            err.to_string(),
            "the following non-terminal symbols are not defined by the grammar: bar, foo",
        );
    }

    #[test]
    fn left_recursion_message_renders_cycles() {
        let err = GrammarError::<Nt>::LeftRecursion(vec![
            vec![Nt::Foo, Nt::Foo],
            vec![Nt::Foo, Nt::Bar, Nt::Foo],
        ]);
        assert_eq!(
            err.to_string(),
            "left recursion has been found: foo -> foo; foo -> bar -> foo",
        );
    }
}
