//! Algebraic normalization of expressions.
//!
//! `flatten` rewrites an expression to an equivalent but shallower form:
//! nested sequences and choices are spliced into their parent, the
//! `Empty`/`Never`/`Any` identities are applied, and stacked repetitions
//! are merged where the combined repetition range stays contiguous.

use super::Expr;
use crate::symbol::{NonTerminal, Terminal};

impl<T, N> Expr<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    /// Normalize this expression.
    ///
    /// The rewrite is bottom-up and idempotent: flattening a flattened
    /// expression returns it unchanged. The emptiness and FIRST analyses
    /// of an expression are invariant under flattening.
    #[must_use]
    pub fn flatten(self) -> Self {
        match self {
            Self::Seq(items) => flatten_seq(items),
            Self::Choice(alts) => flatten_choice(alts),
            Self::Negate(ts) if ts.is_empty() => Self::Any,
            Self::Repeat { expr, min, max } => flatten_repeat((*expr).flatten(), min, max),
            other => other,
        }
    }
}

fn flatten_seq<T, N>(items: Vec<Expr<T, N>>) -> Expr<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item.flatten() {
            Expr::Empty => {}
            // One element that never matches sinks the whole sequence.
            Expr::Never => return Expr::Never,
            Expr::Seq(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    match out.len() {
        0 => Expr::Empty,
        1 => out.pop().unwrap(),
        _ => Expr::Seq(out),
    }
}

fn flatten_choice<T, N>(alts: Vec<Expr<T, N>>) -> Expr<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    // Duplicate alternatives are dropped; the first occurrence already
    // consumes any match the duplicate could claim.
    let mut out: Vec<Expr<T, N>> = Vec::with_capacity(alts.len());
    let mut push_unique = |out: &mut Vec<Expr<T, N>>, alt: Expr<T, N>| {
        if !out.contains(&alt) {
            out.push(alt);
        }
    };
    for alt in alts {
        match alt.flatten() {
            Expr::Never => {}
            Expr::Choice(inner) => {
                for alt in inner {
                    push_unique(&mut out, alt);
                }
            }
            other => push_unique(&mut out, other),
        }
    }
    match out.len() {
        0 => Expr::Never,
        1 => out.pop().unwrap(),
        _ => Expr::Choice(out),
    }
}

/// Rebuild a repetition around an already-flattened inner expression.
fn flatten_repeat<T, N>(inner: Expr<T, N>, min: usize, max: Option<usize>) -> Expr<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    match inner {
        // Many times nothing is still nothing.
        Expr::Empty => return Expr::Empty,
        // The inner never matches: matching zero times is the only way out.
        Expr::Never => return if min == 0 { Expr::Empty } else { Expr::Never },
        _ => {}
    }

    let inner = match inner {
        Expr::Repeat {
            expr: q_inner,
            min: q_min,
            max: q_max,
        } => {
            // The inner repetition has no upper bound and we repeat it at
            // least once, so our own upper bound is vacuous: any count of
            // at least min*q_min can be split into min inner runs.
            if q_max.is_none() && min >= 1 {
                return Expr::Repeat {
                    expr: q_inner,
                    min: min * q_min,
                    max: None,
                };
            }

            // Merge when every count of k repetitions overlaps (or is
            // adjacent to) the counts of k+1 repetitions, so the union of
            // all repetition ranges is one contiguous range:
            //
            //     min * q_max >= q_min * (min + 1) - 1
            //
            // The left side is the most the inner can match across the
            // fewest allowed outer repetitions; the right side is one
            // less than the least it must match with one repetition more.
            // If the condition holds for min it holds for every larger
            // count, so checking the lower bound suffices. The classic
            // counterexample is (f[5..6])+: five or six match, seven
            // through nine cannot, ten can again.
            let contiguous = match q_max {
                Some(q_max) => (min * q_max) as i64 >= (q_min * (min + 1)) as i64 - 1,
                None => min == 0 && q_min <= 1,
            };
            if contiguous {
                let nmax = if min <= 1 {
                    None
                } else {
                    match (max, q_max) {
                        (Some(max), Some(q_max)) => Some(max * q_max),
                        _ => None,
                    }
                };
                return Expr::Repeat {
                    expr: q_inner,
                    min: min * q_min,
                    max: nmax,
                };
            }

            // Optional wrapper around an unbounded repetition: the outer
            // upper bound never matters, one inner run can absorb any
            // amount, so only the optionality survives.
            if q_max.is_none() && min == 0 {
                return Expr::Repeat {
                    expr: Box::new(Expr::Repeat {
                        expr: q_inner,
                        min: q_min,
                        max: q_max,
                    }),
                    min: 0,
                    max: Some(1),
                };
            }

            // Two fixed counts multiply. The contiguity condition rejects
            // this case for min >= 2 even though the merge is exact.
            if q_max == Some(q_min) && max == Some(min) {
                let n = q_min * min;
                return Expr::Repeat {
                    expr: q_inner,
                    min: n,
                    max: Some(n),
                };
            }

            Expr::Repeat {
                expr: q_inner,
                min: q_min,
                max: q_max,
            }
        }
        other => other,
    };

    if min == 1 && max == Some(1) {
        return inner;
    }
    if min == 0 && max == Some(0) {
        return Expr::Empty;
    }

    Expr::Repeat {
        expr: Box::new(inner),
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Terminal;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tok {
        Foo,
        Bar,
        Baz,
    }

    impl Terminal for Tok {
        fn name(&self) -> &str {
            match self {
                Self::Foo => "FOO",
                Self::Bar => "BAR",
                Self::Baz => "BAZ",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Nt {
        Gus,
    }

    impl crate::symbol::NonTerminal for Nt {
        fn name(&self) -> &str {
            "gus"
        }
    }

    type E = Expr<Tok, Nt>;

    fn foo() -> E {
        E::Terminal(Tok::Foo)
    }

    #[test]
    fn empty_containers_become_singletons() {
        assert_eq!(E::Seq(vec![]).flatten(), E::Empty);
        assert_eq!(E::Choice(vec![]).flatten(), E::Never);
        assert_eq!(E::none_of([]).flatten(), E::Any);
        assert_eq!(E::Negate(smallvec::SmallVec::new()).flatten(), E::Any);
    }

    #[test]
    fn seq_splices_and_drops_epsilon() {
        let e = E::Seq(vec![
            E::Seq(vec![foo(), E::Rule(Nt::Gus)]),
            E::Empty,
            E::Seq(vec![E::Terminal(Tok::Bar), E::Terminal(Tok::Baz)]),
        ]);
        assert_eq!(
            e.flatten(),
            E::Seq(vec![
                foo(),
                E::Rule(Nt::Gus),
                E::Terminal(Tok::Bar),
                E::Terminal(Tok::Baz),
            ]),
        );
    }

    #[test]
    fn seq_with_never_is_never() {
        let e = E::Seq(vec![foo(), E::Never, E::Terminal(Tok::Bar)]);
        assert_eq!(e.flatten(), E::Never);
    }

    #[test]
    fn choice_splices_and_dedups() {
        let e = E::Choice(vec![
            E::Choice(vec![foo(), E::Terminal(Tok::Bar)]),
            E::Terminal(Tok::Baz),
            foo(),
            E::Never,
        ]);
        assert_eq!(
            e.flatten(),
            E::Choice(vec![foo(), E::Terminal(Tok::Bar), E::Terminal(Tok::Baz)]),
        );
    }

    #[test]
    fn choice_of_identical_collapses() {
        let e = E::Choice(vec![foo(), foo()]);
        assert_eq!(e.flatten(), foo());
    }

    #[test]
    fn repetitions_of_never() {
        assert_eq!(E::repeat(E::Never, 0, Some(5)).flatten(), E::Empty);
        assert_eq!(E::repeat(E::Never, 0, None).flatten(), E::Empty);
        assert_eq!(E::repeat(E::Never, 2, Some(5)).flatten(), E::Never);
        assert_eq!(E::repeat(E::Never, 1, None).flatten(), E::Never);
    }

    #[test]
    fn repetitions_of_epsilon() {
        assert_eq!(E::repeat(E::Empty, 3, Some(7)).flatten(), E::Empty);
        assert_eq!(E::repeat(E::Empty, 0, None).flatten(), E::Empty);
    }

    #[test]
    fn trivial_bounds_unwrap() {
        assert_eq!(E::repeat(foo(), 1, Some(1)).flatten(), foo());
        assert_eq!(E::repeat(foo(), 0, Some(0)).flatten(), E::Empty);
    }

    #[test]
    fn infinite_merge() {
        // (FOO[3..])[3] has no reachable upper bound: FOO[9..].
        let e = E::repeat(E::repeat(foo(), 3, None), 3, Some(3)).flatten();
        assert_eq!(e, E::repeat(foo(), 9, None));

        // (FOO+)[2..] likewise: FOO[2..].
        let e = E::repeat(E::repeat(foo(), 1, None), 2, None).flatten();
        assert_eq!(e, E::repeat(foo(), 2, None));
    }

    #[test]
    fn range_merge_applies_when_contiguous() {
        // (FOO[5..6])[10..]: ten repetitions span 50..60, eleven span
        // 55..66, so the union is contiguous.
        let e = E::repeat(E::repeat(foo(), 5, Some(6)), 10, None).flatten();
        assert_eq!(e, E::repeat(foo(), 50, None));

        // (FOO[5..6])[4..5]: 20..24 and 25..30 touch, bounded merge.
        let e = E::repeat(E::repeat(foo(), 5, Some(6)), 4, Some(5)).flatten();
        assert_eq!(e, E::repeat(foo(), 20, Some(30)));
    }

    #[test]
    fn range_merge_refused_when_gapped() {
        // (FOO[5..6])+ can match 5, 6, then nothing until 10.
        let plus = E::repeat(E::repeat(foo(), 5, Some(6)), 1, None);
        assert_eq!(plus.clone().flatten(), plus);

        // (FOO[5..6])[2..6]: two repetitions reach at most 12, three
        // require at least 14.
        let e = E::repeat(E::repeat(foo(), 5, Some(6)), 2, Some(6));
        assert_eq!(e.clone().flatten(), e);
    }

    #[test]
    fn optional_collapses_unbounded_inner() {
        // (FOO+)? and (FOO*)* both flatten to FOO*.
        let e = E::repeat(E::repeat(foo(), 1, None), 0, Some(1)).flatten();
        assert_eq!(e, E::repeat(foo(), 0, None));
        let e = E::repeat(E::repeat(foo(), 0, None), 0, None).flatten();
        assert_eq!(e, E::repeat(foo(), 0, None));
    }

    #[test]
    fn optional_wraps_unbounded_inner_with_high_min() {
        // (FOO[2..])? keeps the inner repetition and only the optionality.
        let e = E::repeat(E::repeat(foo(), 2, None), 0, Some(7)).flatten();
        assert_eq!(e, E::repeat(E::repeat(foo(), 2, None), 0, Some(1)));
    }

    #[test]
    fn fixed_merge_multiplies() {
        // (FOO[3])[4] = FOO[12], even though the contiguity condition
        // rejects it.
        let e = E::repeat(E::repeat(foo(), 3, Some(3)), 4, Some(4)).flatten();
        assert_eq!(e, E::repeat(foo(), 12, Some(12)));
    }

    #[test]
    fn flatten_is_idempotent_on_samples() {
        let samples = vec![
            E::Seq(vec![
                E::Seq(vec![foo(), E::Rule(Nt::Gus)]),
                E::Empty,
                E::Choice(vec![E::Terminal(Tok::Bar), E::Never]),
            ]),
            E::repeat(E::repeat(foo(), 5, Some(6)), 1, None),
            E::repeat(E::repeat(foo(), 5, Some(6)), 10, None),
            E::Choice(vec![E::Choice(vec![foo(), foo()]), E::Terminal(Tok::Bar)]),
            E::repeat(E::repeat(foo(), 2, None), 0, Some(3)),
        ];
        for e in samples {
            let once = e.flatten();
            assert_eq!(once.clone().flatten(), once);
        }
    }
}
