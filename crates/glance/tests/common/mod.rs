//! Shared fixture: the smoke grammar used across integration tests.
#![allow(dead_code)]

use glance::{Expr, Grammar, NonTerminal, Terminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tok {
    Gus,
    Hello,
    Bar,
    Baz,
    Lorem,
}

impl Terminal for Tok {
    fn name(&self) -> &str {
        match self {
            Self::Gus => "GUS",
            Self::Hello => "HELLO",
            Self::Bar => "BAR",
            Self::Baz => "BAZ",
            Self::Lorem => "LOREM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nt {
    Foo,
    Bar,
    Baz,
    Gus,
    /// Spare non-terminal for tests that add a rule of their own.
    Probe,
}

impl NonTerminal for Nt {
    fn name(&self) -> &str {
        match self {
            Self::Foo => "foo",
            Self::Bar => "bar",
            Self::Baz => "baz",
            Self::Gus => "gus",
            Self::Probe => "probe",
        }
    }
}

pub type E = Expr<Tok, Nt>;

/// The rules of the smoke grammar:
///
/// ```text
/// foo := bar | baz | LOREM
/// bar := (GUS HELLO) | BAR
/// baz := BAZ | #
/// gus := #
/// ```
pub fn smoke_rules() -> Vec<(Nt, E)> {
    vec![
        (Nt::Foo, E::Rule(Nt::Bar)),
        (Nt::Foo, E::Rule(Nt::Baz)),
        (Nt::Foo, E::Terminal(Tok::Lorem)),
        (
            Nt::Bar,
            E::seq([E::Terminal(Tok::Gus), E::Terminal(Tok::Hello)]),
        ),
        (Nt::Bar, E::Terminal(Tok::Bar)),
        (Nt::Baz, E::Terminal(Tok::Baz)),
        (Nt::Baz, E::Empty),
        (Nt::Gus, E::Empty),
    ]
}

pub fn smoke_grammar() -> Grammar<Tok, Nt> {
    let mut builder = Grammar::builder();
    for (lhs, rhs) in smoke_rules() {
        builder = builder.rule(lhs, rhs);
    }
    builder.build()
}
