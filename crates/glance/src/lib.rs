//! # Glance
//!
//! Context-free grammar analysis for parsers that look one token ahead.
//!
//! ## Overview
//!
//! Glance takes a grammar built from a small expression algebra over
//! user-supplied terminal and non-terminal types, validates it, and
//! computes the two facts a top-down parser with a single token of
//! lookahead needs about every rule:
//!
//! - **Emptiness**: can the rule derive the empty string?
//! - **FIRST sets**: which terminals can begin a match of the rule?
//!
//! Along the way it rejects grammars that reference undefined
//! non-terminals and grammars with left recursion (reporting the exact
//! cycles). On top of the frozen analysis, a [`State`] cursor walks an
//! expression position by position, reporting the legal lookahead set and
//! whether the expression already matches.
//!
//! Glance is an analysis library only: it never reads a token stream,
//! and defining what symbols *are* — lexing, token kinds, parse trees —
//! is the caller's business. Symbols only need names, equality, and
//! hashing, which a plain enum provides.
//!
//! ## Quick start
//!
//! ```rust
//! use glance::{Expr, Grammar, NonTerminal, State, Terminal};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Tok {
//!     Num,
//!     Plus,
//! }
//!
//! impl Terminal for Tok {
//!     fn name(&self) -> &str {
//!         match self {
//!             Self::Num => "NUM",
//!             Self::Plus => "PLUS",
//!         }
//!     }
//! }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Nt {
//!     Sum,
//! }
//!
//! impl NonTerminal for Nt {
//!     fn name(&self) -> &str {
//!         "sum"
//!     }
//! }
//!
//! // sum := NUM (PLUS NUM)*
//! let grammar = Grammar::builder()
//!     .rule(
//!         Nt::Sum,
//!         Expr::Terminal(Tok::Num).then([Expr::seq([
//!             Expr::Terminal(Tok::Plus),
//!             Expr::Terminal(Tok::Num),
//!         ])
//!         .zero_or_more()]),
//!     )
//!     .build();
//!
//! assert!(!grammar.can_match_empty(&Nt::Sum)?);
//! let first = grammar.first_set(&Nt::Sum)?.unwrap();
//! assert!(first.contains(&Tok::Num));
//!
//! // Walk the rule's right-hand side with a cursor.
//! let rhs = grammar.rule(&Nt::Sum).unwrap().rhs().clone();
//! let mut state = State::new(&grammar, &rhs)?;
//! assert!(state.next().contains(&Tok::Num));
//! assert!(!state.matches());
//! state.advance();
//! assert!(state.next().contains(&Tok::Plus));
//! assert!(state.matches());
//! # Ok::<(), glance::GrammarError<Nt>>(())
//! ```
//!
//! ## Modules
//!
//! - [`expr`] - The expression algebra and its normalizer
//! - [`grammar`] - Grammar construction, analysis, and queries
//! - [`symbol`] - The terminal/non-terminal contracts
//! - [`rule`] - Production rules
//! - [`state`] - The lookahead cursor
//! - [`error`] - The grammar error taxonomy

pub mod error;
pub mod expr;
pub mod grammar;
pub mod rule;
pub mod state;
pub mod symbol;

pub use error::GrammarError;
pub use expr::{Amount, Expr};
pub use grammar::{Decision, Grammar, GrammarBuilder};
pub use rule::Rule;
pub use state::State;
pub use symbol::{NonTerminal, Symbol, Terminal, WithEof};

/// A set of terminal symbols.
pub type TerminalSet<T> = hashbrown::HashSet<T, ahash::RandomState>;

/// A set of non-terminal symbols.
pub type NonterminalSet<N> = hashbrown::HashSet<N, ahash::RandomState>;

/// A set of symbols of either kind.
pub type SymbolSet<T, N> = hashbrown::HashSet<Symbol<T, N>, ahash::RandomState>;
