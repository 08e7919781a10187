//! Symbol model: the terminal and non-terminal contracts.
//!
//! A grammar is built over two user-supplied alphabets, one for terminal
//! symbols and one for non-terminals. The library never inspects symbols
//! beyond their identity and printable name, so both contracts are plain
//! traits that enums implement in a couple of lines:
//!
//! ```rust
//! use glance::{Terminal, NonTerminal};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Tok {
//!     Number,
//!     Plus,
//! }
//!
//! impl Terminal for Tok {
//!     fn name(&self) -> &str {
//!         match self {
//!             Self::Number => "NUMBER",
//!             Self::Plus => "PLUS",
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
//! ```

use core::fmt;
use core::hash::Hash;

use smallvec::smallvec;

use crate::expr::Expr;
use crate::rule::Rule;

/// A terminal symbol: an atomic token kind, a leaf of the grammar.
///
/// Identity is structural: two terminals are the same symbol iff they
/// compare equal, and hashing must agree with equality. Deriving
/// `PartialEq, Eq, Hash` on an enum satisfies this.
pub trait Terminal: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static {
    /// The grammatical name of the symbol, a short identifier.
    fn name(&self) -> &str;

    /// An expression matching any terminal but this one.
    #[must_use]
    fn negate<N>(self) -> Expr<Self, N>
    where
        Self: Sized,
    {
        Expr::Negate(smallvec![self])
    }
}

/// A non-terminal symbol: a symbol defined by a grammar rule, standing in
/// for whatever its rule derives.
///
/// The same identity contract as [`Terminal`] applies.
pub trait NonTerminal: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static {
    /// The grammatical name of the symbol, a short identifier.
    fn name(&self) -> &str;

    /// Define a rule for this non-terminal.
    #[must_use]
    fn define<T>(self, rhs: Expr<T, Self>) -> Rule<T, Self>
    where
        Self: Sized,
    {
        Rule::new(self, rhs)
    }

    /// Define a rule for this non-terminal from a list of alternatives.
    #[must_use]
    fn define_choice<T, I>(self, alts: I) -> Rule<T, Self>
    where
        Self: Sized,
        I: IntoIterator<Item = Expr<T, Self>>,
    {
        Rule::new(self, Expr::choice(alts))
    }
}

/// Either kind of symbol, as reported by whole-grammar inventories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol<T, N> {
    /// A terminal symbol.
    Terminal(T),
    /// A non-terminal symbol.
    Nonterminal(N),
}

impl<T, N> Symbol<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    /// The grammatical name of the symbol.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Terminal(t) => t.name(),
            Self::Nonterminal(n) => n.name(),
        }
    }

    /// Whether this is a terminal symbol.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Whether this is a non-terminal symbol.
    #[must_use]
    pub const fn is_nonterminal(&self) -> bool {
        matches!(self, Self::Nonterminal(_))
    }

    /// This symbol as a terminal, if it is one.
    #[must_use]
    pub const fn as_terminal(&self) -> Option<&T> {
        match self {
            Self::Terminal(t) => Some(t),
            Self::Nonterminal(_) => None,
        }
    }

    /// This symbol as a non-terminal, if it is one.
    #[must_use]
    pub const fn as_nonterminal(&self) -> Option<&N> {
        match self {
            Self::Terminal(_) => None,
            Self::Nonterminal(n) => Some(n),
        }
    }
}

impl<T, N> fmt::Display for Symbol<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A terminal alphabet extended with the end-of-input marker.
///
/// End-of-input is a terminal like any other as far as the analyses are
/// concerned; it only needs to exist in the alphabet. Grammars that want
/// to talk about it use `WithEof<T>` as their terminal type:
///
/// ```rust
/// use glance::{Terminal, WithEof};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// struct Comma;
///
/// impl Terminal for Comma {
///     fn name(&self) -> &str {
///         "COMMA"
///     }
/// }
///
/// assert_eq!(WithEof::Terminal(Comma).name(), "COMMA");
/// assert_eq!(WithEof::<Comma>::Eof.name(), "$");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WithEof<T> {
    /// An ordinary terminal.
    Terminal(T),
    /// The end-of-input marker, named `$`.
    Eof,
}

impl<T: Terminal> Terminal for WithEof<T> {
    fn name(&self) -> &str {
        match self {
            Self::Terminal(t) => t.name(),
            Self::Eof => "$",
        }
    }
}
