//! The analysis pipeline run at grammar construction.
//!
//! Stages, in order: merge same-LHS rules, collect the symbol inventory,
//! reject undefined non-terminals, decide emptiness per rule, compute
//! FIRST sets per rule. The two fixed points are worklist algorithms over
//! a tri-valued [`Decision`]; both carry the reach path along which a rule
//! was queued so that left recursion is recognized the moment a
//! dependency chain bites its own tail.

use std::collections::VecDeque;

use hashbrown::HashSet;

use super::{Decision, Grammar, RuleMeta};
use crate::error::GrammarError;
use crate::expr::Expr;
use crate::rule::Rule;
use crate::symbol::{NonTerminal, Terminal};
use crate::TerminalSet;

pub(super) fn analyze<T, N>(rules: Vec<Rule<T, N>>) -> Grammar<T, N>
where
    T: Terminal,
    N: NonTerminal,
{
    let mut grammar = Grammar::empty_artifact();
    let result = build(&mut grammar, rules);
    grammar.problem = result.err();
    grammar
}

fn build<T, N>(g: &mut Grammar<T, N>, rules: Vec<Rule<T, N>>) -> Result<(), GrammarError<N>>
where
    T: Terminal,
    N: NonTerminal,
{
    load(g, rules);
    collect_symbols(g);

    // Every referenced non-terminal needs a rule before any analysis can
    // make sense of the grammar.
    check_undefined(g)?;

    // Emptiness first: FIRST-set computation consumes it.
    compute_empty(g)?;
    compute_first(g)
}

/// Install rules in order, merging duplicates into the first occurrence.
fn load<T, N>(g: &mut Grammar<T, N>, rules: Vec<Rule<T, N>>)
where
    T: Terminal,
    N: NonTerminal,
{
    for rule in rules {
        match g.index.get(rule.lhs()) {
            Some(&i) => {
                let merged = g.metas[i].rule.merge(&rule);
                g.metas[i] = RuleMeta::new(merged);
            }
            None => {
                g.index.insert(rule.lhs().clone(), g.metas.len());
                g.metas.push(RuleMeta::new(rule));
            }
        }
    }
}

fn collect_symbols<T, N>(g: &mut Grammar<T, N>)
where
    T: Terminal,
    N: NonTerminal,
{
    for meta in &g.metas {
        g.nonterminals.insert(meta.rule.lhs().clone());
        meta.rule.rhs().collect_terminals(&mut g.terminals);
        meta.rule.rhs().collect_nonterminals(&mut g.nonterminals);
    }
}

fn check_undefined<T, N>(g: &mut Grammar<T, N>) -> Result<(), GrammarError<N>>
where
    T: Terminal,
    N: NonTerminal,
{
    let mut undefined: Vec<N> = g
        .nonterminals
        .iter()
        .filter(|nt| !g.index.contains_key(*nt))
        .cloned()
        .collect();
    undefined.sort_by(|a, b| a.name().cmp(b.name()));
    g.undefined = undefined;

    if g.undefined.is_empty() {
        Ok(())
    } else {
        Err(GrammarError::UndefinedSymbols(g.undefined.clone()))
    }
}

/// An entry of either worklist: a rule (by slot) and the chain of
/// non-terminals through which it was reached from its queue seed.
type QueueItem<N> = (usize, Vec<N>);

/// Record a left-recursion cycle against the grammar and the rule that
/// closed it. Returns whether the cycle is new.
fn record_cycle<T, N>(g: &mut Grammar<T, N>, idx: usize, cycle: Vec<N>) -> bool
where
    T: Terminal,
    N: NonTerminal,
{
    if g.left_recursive.contains(&cycle) {
        return false;
    }
    g.metas[idx].cycles.push(cycle.clone());
    g.left_recursive.push(cycle);
    true
}

/// Walk the indecisive dependencies of the rule just examined: detect
/// cycles against the reach path, queue rules that still might resolve,
/// and requeue the examined rule itself. Returns whether anything new
/// happened (a fresh cycle or a fresh queue entry).
fn propagate<T, N>(
    g: &mut Grammar<T, N>,
    queue: &mut VecDeque<QueueItem<N>>,
    seen: &mut HashSet<QueueItem<N>, ahash::RandomState>,
    idx: usize,
    path: Vec<N>,
    indecisive: &mut Vec<N>,
) -> bool
where
    T: Terminal,
    N: NonTerminal,
{
    let mut changed = false;
    for nt in indecisive.drain(..) {
        let nt_idx = g.index[&nt];
        if let Some(pos) = path.iter().position(|p| *p == nt) {
            // The symbol is already on its own reach path: the chain from
            // there to here is a left-recursion cycle. Do not queue it;
            // its analyses can never resolve.
            let mut cycle = path[pos..].to_vec();
            cycle.push(nt);
            if record_cycle(g, nt_idx, cycle) {
                changed = true;
            }
        } else if g.metas[nt_idx].cycles.is_empty() {
            let mut extended = path.clone();
            extended.push(nt);
            let item = (nt_idx, extended);
            if seen.insert(item.clone()) {
                queue.push_back(item);
                changed = true;
            }
        }
    }
    if g.metas[idx].cycles.is_empty() {
        queue.push_back((idx, path));
    }
    changed
}

/// Decide, for every rule, whether it can match empty input. Left
/// recursion shows up here as dependency chains that can never resolve;
/// discovered cycles abort the pipeline once the worklist settles.
fn compute_empty<T, N>(g: &mut Grammar<T, N>) -> Result<(), GrammarError<N>>
where
    T: Terminal,
    N: NonTerminal,
{
    let mut queue: VecDeque<QueueItem<N>> = g
        .metas
        .iter()
        .enumerate()
        .map(|(i, meta)| (i, vec![meta.rule.lhs().clone()]))
        .collect();
    let mut seen: HashSet<QueueItem<N>, ahash::RandomState> = queue.iter().cloned().collect();
    let mut indecisive: Vec<N> = Vec::new();
    // Consecutive examinations that moved nothing; once every queued
    // entry has been revisited without change, the rest is undecidable.
    let mut stall = 0usize;

    while let Some((idx, path)) = queue.pop_front() {
        if !g.metas[idx].cycles.is_empty() || g.metas[idx].empty != Decision::Indecisive {
            continue;
        }

        indecisive.clear();
        let empty = check_empty_expr(g, g.metas[idx].rule.rhs(), &mut indecisive);
        g.metas[idx].empty = empty;
        if empty != Decision::Indecisive {
            stall = 0;
            continue;
        }

        let changed = propagate(g, &mut queue, &mut seen, idx, path, &mut indecisive);
        stall = if changed { 0 } else { stall + 1 };
        if stall > queue.len() {
            break;
        }
    }

    if g.left_recursive.is_empty() {
        Ok(())
    } else {
        Err(GrammarError::LeftRecursion(g.left_recursive.clone()))
    }
}

/// Decide whether `e` can match empty, from what is known right now.
/// Non-terminals whose own emptiness is still undecided make the answer
/// `Indecisive` and are collected into `indecisive`.
fn check_empty_expr<T, N>(g: &Grammar<T, N>, e: &Expr<T, N>, indecisive: &mut Vec<N>) -> Decision
where
    T: Terminal,
    N: NonTerminal,
{
    match e {
        // All of these match exactly one terminal, or nothing at all.
        Expr::Never | Expr::Any | Expr::Negate(_) | Expr::Terminal(_) => Decision::Negative,

        Expr::Empty => Decision::Positive,

        Expr::Rule(n) => {
            let meta = &g.metas[g.index[n]];
            if meta.empty == Decision::Indecisive {
                push_unique(indecisive, n.clone());
            }
            meta.empty
        }

        // Negative if any element is, positive if all are.
        Expr::Seq(items) => {
            let mut export: Vec<N> = Vec::new();
            let mut result = Decision::Positive;
            let mut exported = false;
            for item in items {
                export.clear();
                let empty = check_empty_expr(g, item, &mut export);
                if empty == Decision::Negative {
                    return Decision::Negative;
                }
                if empty == Decision::Indecisive {
                    result = Decision::Indecisive;
                    // Only the first indecisive element exports its
                    // symbols. Anything the elements after it depend on
                    // cannot be reached without consuming input first, so
                    // chasing those symbols from here could only
                    // manufacture recursion that is not left recursion.
                    if !exported {
                        exported = true;
                        for nt in export.drain(..) {
                            push_unique(indecisive, nt);
                        }
                    }
                }
            }
            result
        }

        // Positive if any alternative is, negative if all are.
        Expr::Choice(alts) => {
            let mut export: Vec<N> = Vec::new();
            let mut result = Decision::Negative;
            for alt in alts {
                let empty = check_empty_expr(g, alt, &mut export);
                if empty == Decision::Positive {
                    return Decision::Positive;
                }
                if empty == Decision::Indecisive {
                    result = Decision::Indecisive;
                }
            }
            for nt in export {
                push_unique(indecisive, nt);
            }
            result
        }

        Expr::Repeat { expr, min, .. } => {
            if *min == 0 {
                Decision::Positive
            } else {
                check_empty_expr(g, expr, indecisive)
            }
        }
    }
}

/// Compute the FIRST set of every rule that is not trapped in left
/// recursion. The worklist carries the same reach paths as the emptiness
/// pass: rules whose emptiness resolved cleanly can still be left
/// recursive (`foo := foo BAR | BAZ` is negative on emptiness), and their
/// cycles surface here, through the FIRST dependency chains.
fn compute_first<T, N>(g: &mut Grammar<T, N>) -> Result<(), GrammarError<N>>
where
    T: Terminal,
    N: NonTerminal,
{
    let mut queue: VecDeque<QueueItem<N>> = g
        .metas
        .iter()
        .enumerate()
        .map(|(i, meta)| (i, vec![meta.rule.lhs().clone()]))
        .collect();
    let mut seen: HashSet<QueueItem<N>, ahash::RandomState> = queue.iter().cloned().collect();
    let mut indecisive: Vec<N> = Vec::new();
    let mut stall = 0usize;

    while let Some((idx, path)) = queue.pop_front() {
        if !g.metas[idx].cycles.is_empty() || g.metas[idx].first.is_some() {
            continue;
        }

        indecisive.clear();
        let mut first = TerminalSet::default();
        let empty = compute_first_expr(g, g.metas[idx].rule.rhs(), &mut first, &mut indecisive);
        if empty != Decision::Indecisive {
            g.metas[idx].first = Some(first);
            stall = 0;
            continue;
        }

        let changed = propagate(g, &mut queue, &mut seen, idx, path, &mut indecisive);
        stall = if changed { 0 } else { stall + 1 };
        if stall > queue.len() {
            // The remaining rules cannot make progress; they keep their
            // FIRST sets absent.
            break;
        }
    }

    if g.left_recursive.is_empty() {
        Ok(())
    } else {
        Err(GrammarError::LeftRecursion(g.left_recursive.clone()))
    }
}

/// Accumulate into `first` the terminals that can begin a match of `e`,
/// returning whether `e` can match empty. Epsilon is never a member of a
/// FIRST set; the emptiness decision carries that bit instead.
fn compute_first_expr<T, N>(
    g: &Grammar<T, N>,
    e: &Expr<T, N>,
    first: &mut TerminalSet<T>,
    indecisive: &mut Vec<N>,
) -> Decision
where
    T: Terminal,
    N: NonTerminal,
{
    match e {
        Expr::Terminal(t) => {
            first.insert(t.clone());
            Decision::Negative
        }

        // Matches nothing, so it contributes nothing.
        Expr::Never => Decision::Negative,

        Expr::Any => {
            first.extend(g.terminals.iter().cloned());
            Decision::Negative
        }

        Expr::Negate(ts) => {
            for t in &g.terminals {
                if !ts.contains(t) {
                    first.insert(t.clone());
                }
            }
            Decision::Negative
        }

        Expr::Empty => Decision::Positive,

        Expr::Rule(n) => {
            let meta = &g.metas[g.index[n]];
            match &meta.first {
                None => {
                    push_unique(indecisive, n.clone());
                    Decision::Indecisive
                }
                Some(set) => {
                    first.extend(set.iter().cloned());
                    meta.empty
                }
            }
        }

        Expr::Repeat { expr, min, max } => {
            if *max == Some(0) {
                return Decision::Positive;
            }
            let empty = compute_first_expr(g, expr, first, indecisive);
            if *min == 0 { Decision::Positive } else { empty }
        }

        // Leading elements that can match empty all contribute; the
        // first one that cannot is the last contributor.
        Expr::Seq(items) => {
            let mut inner = TerminalSet::default();
            for item in items {
                let empty = compute_first_expr(g, item, &mut inner, indecisive);
                match empty {
                    Decision::Indecisive => return Decision::Indecisive,
                    Decision::Negative => {
                        first.extend(inner);
                        return Decision::Negative;
                    }
                    Decision::Positive => {}
                }
            }
            first.extend(inner);
            Decision::Positive
        }

        // The union over all alternatives.
        Expr::Choice(alts) => {
            let mut inner = TerminalSet::default();
            let mut result = Decision::Negative;
            for alt in alts {
                let empty = compute_first_expr(g, alt, &mut inner, indecisive);
                match empty {
                    Decision::Indecisive => return Decision::Indecisive,
                    Decision::Positive => result = Decision::Positive,
                    Decision::Negative => {}
                }
            }
            first.extend(inner);
            result
        }
    }
}

fn push_unique<N: PartialEq>(out: &mut Vec<N>, nt: N) {
    if !out.contains(&nt) {
        out.push(nt);
    }
}
