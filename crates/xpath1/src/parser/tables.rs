//! LALR(1) table construction for the grammar in [`super::grammar`].
//!
//! Canonical LR(1) item sets are built with their cores merged on the fly,
//! which yields the LALR(1) automaton directly; lookahead growth re-queues
//! the affected state until the fixpoint. The resulting ACTION/GOTO tables
//! are dense arrays, generated once per process and cached.
//!
//! The grammar is conflict-free under LALR(1) once the lexer has
//! disambiguated `*` and the operator names, so conflicts here would be a
//! construction bug; resolution is deterministic (shift wins, then the
//! lowest production) to keep any such bug diagnosable rather than
//! order-dependent.

use std::collections::{BTreeMap, HashMap, VecDeque};

use once_cell::sync::Lazy;

use crate::lexer::TOKEN_KIND_COUNT;
use crate::parser::grammar::{NONTERM_COUNT, NonTerm, PRODUCTIONS, Sym};

/// Lookahead set over terminals, as a bit mask.
type TermSet = u64;

const _: () = assert!(TOKEN_KIND_COUNT <= 64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Shift(u32),
    Reduce(u32),
    Accept,
    Error,
}

pub(crate) struct Tables {
    /// Indexed `[state][terminal]`.
    pub action: Vec<Vec<Action>>,
    /// Indexed `[state][nonterminal]`.
    pub goto_: Vec<Vec<Option<u32>>>,
}

pub(crate) fn tables() -> &'static Tables {
    static TABLES: Lazy<Tables> = Lazy::new(build);
    &TABLES
}

/// Kernel or closure item set: (production, dot) -> lookaheads.
type ItemSet = BTreeMap<(usize, usize), TermSet>;

struct Builder {
    first: Vec<TermSet>,
    nullable: Vec<bool>,
}

fn build() -> Tables {
    let builder = Builder::new();

    let mut kernel = ItemSet::new();
    kernel.insert((0, 0), 1 << (crate::lexer::TokenKind::Eof as usize));

    let mut states: Vec<ItemSet> = vec![kernel];
    let mut cores: HashMap<Vec<(usize, usize)>, usize> = HashMap::new();
    cores.insert(states[0].keys().cloned().collect(), 0);
    let mut transitions: Vec<BTreeMap<Sym, usize>> = vec![BTreeMap::new()];

    let mut queue: VecDeque<usize> = VecDeque::from([0]);
    while let Some(si) = queue.pop_front() {
        let closure = builder.closure(&states[si]);

        // Partition by the symbol after the dot.
        let mut successors: BTreeMap<Sym, ItemSet> = BTreeMap::new();
        for (&(p, d), &la) in &closure {
            let rhs = PRODUCTIONS[p].rhs;
            if d < rhs.len() {
                *successors
                    .entry(rhs[d])
                    .or_default()
                    .entry((p, d + 1))
                    .or_insert(0) |= la;
            }
        }

        for (sym, kernel) in successors {
            let core: Vec<(usize, usize)> = kernel.keys().cloned().collect();
            let ti = match cores.get(&core).copied() {
                Some(ti) => {
                    let mut grew = false;
                    for ((p, d), la) in kernel {
                        let entry = states[ti].entry((p, d)).or_insert(0);
                        let merged = *entry | la;
                        if merged != *entry {
                            *entry = merged;
                            grew = true;
                        }
                    }
                    if grew && !queue.contains(&ti) {
                        queue.push_back(ti);
                    }
                    ti
                }
                None => {
                    states.push(kernel);
                    transitions.push(BTreeMap::new());
                    let ti = states.len() - 1;
                    cores.insert(core, ti);
                    queue.push_back(ti);
                    ti
                }
            };
            transitions[si].insert(sym, ti);
        }
    }

    let mut action = vec![vec![Action::Error; TOKEN_KIND_COUNT]; states.len()];
    let mut goto_ = vec![vec![None; NONTERM_COUNT]; states.len()];

    for (si, kernel) in states.iter().enumerate() {
        for (&sym, &ti) in &transitions[si] {
            match sym {
                Sym::T(t) => action[si][t as usize] = Action::Shift(ti as u32),
                Sym::N(nt) => goto_[si][nt as usize] = Some(ti as u32),
            }
        }
        for (&(p, d), &la) in &builder.closure(kernel) {
            if d != PRODUCTIONS[p].rhs.len() {
                continue;
            }
            for t in bits(la) {
                let new = if p == 0 {
                    Action::Accept
                } else {
                    Action::Reduce(p as u32)
                };
                match action[si][t] {
                    Action::Error => action[si][t] = new,
                    // Shift/reduce: shift wins.
                    Action::Shift(_) => {}
                    // Reduce/reduce: lowest production wins.
                    Action::Reduce(q) => {
                        if let Action::Reduce(np) = new {
                            if np < q {
                                action[si][t] = new;
                            }
                        } else {
                            action[si][t] = new;
                        }
                    }
                    Action::Accept => {}
                }
            }
        }
    }

    Tables { action, goto_ }
}

fn bits(set: TermSet) -> impl Iterator<Item = usize> {
    (0..TOKEN_KIND_COUNT).filter(move |i| set & (1 << i) != 0)
}

impl Builder {
    fn new() -> Self {
        let mut first = vec![0u64; NONTERM_COUNT];
        let mut nullable = vec![false; NONTERM_COUNT];
        loop {
            let mut changed = false;
            for p in PRODUCTIONS {
                let lhs = p.lhs as usize;
                let mut all_nullable = true;
                let mut add = 0u64;
                for sym in p.rhs {
                    match *sym {
                        Sym::T(t) => {
                            add |= 1 << (t as usize);
                            all_nullable = false;
                        }
                        Sym::N(nt) => {
                            add |= first[nt as usize];
                            if !nullable[nt as usize] {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                let merged = first[lhs] | add;
                if merged != first[lhs] {
                    first[lhs] = merged;
                    changed = true;
                }
                if all_nullable && !nullable[lhs] {
                    nullable[lhs] = true;
                    changed = true;
                }
            }
            if !changed {
                return Self { first, nullable };
            }
        }
    }

    /// FIRST of a symbol sequence, falling through to `cont` when the whole
    /// sequence is nullable.
    fn first_of_seq(&self, syms: &[Sym], cont: TermSet) -> TermSet {
        let mut out = 0u64;
        for sym in syms {
            match *sym {
                Sym::T(t) => {
                    out |= 1 << (t as usize);
                    return out;
                }
                Sym::N(nt) => {
                    out |= self.first[nt as usize];
                    if !self.nullable[nt as usize] {
                        return out;
                    }
                }
            }
        }
        out | cont
    }

    fn closure(&self, kernel: &ItemSet) -> ItemSet {
        let mut items = kernel.clone();
        loop {
            let mut changed = false;
            let snapshot: Vec<((usize, usize), TermSet)> =
                items.iter().map(|(&k, &v)| (k, v)).collect();
            for ((p, d), la) in snapshot {
                let rhs = PRODUCTIONS[p].rhs;
                if d >= rhs.len() {
                    continue;
                }
                let Sym::N(b) = rhs[d] else { continue };
                let cont = self.first_of_seq(&rhs[d + 1..], la);
                for (qi, q) in PRODUCTIONS.iter().enumerate() {
                    if q.lhs != b {
                        continue;
                    }
                    let entry = items.entry((qi, 0)).or_insert(0);
                    let merged = *entry | cont;
                    if merged != *entry {
                        *entry = merged;
                        changed = true;
                    }
                }
            }
            if !changed {
                return items;
            }
        }
    }
}

const _: () = {
    // NonTerm discriminants index the GOTO rows directly.
    assert!(NonTerm::Start as usize == 0);
};
