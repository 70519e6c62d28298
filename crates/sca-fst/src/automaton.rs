// Rule automata: state storage and Thompson-style construction.
//
// Every automaton built by the combinators has a distinguished start and
// end state, and the end state has no outgoing transitions of its own until
// a combinator deliberately adds one. States are addressed by index and
// removed by moving the last state into the freed slot, so indices stay
// dense.

use std::fmt;

use hashbrown::HashMap;

use crate::FstError;
use crate::symbols::{Symbol, TriggerSet, ZERO};
use crate::transition::{GroupId, Transition, TransitionKind};

/// Index of a state within its automaton.
pub type StateId = usize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub accept: bool,
    pub transitions: Vec<Transition>,
}

/// A nondeterministic rule automaton, or the transducer determinized from
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    pub(crate) states: Vec<State>,
    pub(crate) start: StateId,
    pub(crate) end: StateId,
    /// Start and end of the automaton most recently merged in, tracked
    /// through renumbering until the combinator that merged it is done.
    merged: Option<(StateId, StateId)>,
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

impl Automaton {
    /// A single state that is both start and end.
    pub fn new() -> Self {
        Self {
            states: vec![State::default()],
            start: 0,
            end: 0,
            merged: None,
        }
    }

    /// An automaton with no states at all, to be filled in by a builder.
    pub(crate) fn without_states() -> Self {
        Self {
            states: Vec::new(),
            start: 0,
            end: 0,
            merged: None,
        }
    }

    /// Two states joined by one transition.
    pub fn from_transition(kind: TransitionKind, defines: Option<GroupId>) -> Self {
        let mut a = Self::new();
        let end = a.add_state();
        a.end = end;
        a.states[0].transitions.push(Transition { kind, dest: end, defines });
        a
    }

    /// Identity on one symbol. `symbol(ZERO)` is the empty word.
    pub fn symbol(symbol: &str) -> Self {
        Self::from_transition(
            TransitionKind::Constant {
                symbols: vec![symbol.to_string()],
            },
            None,
        )
    }

    /// Rewrite of one symbol into another.
    pub fn rewrite(input: &str, output: &str) -> Self {
        Self::correspondence(vec![input.to_string()], vec![output.to_string()])
    }

    /// One member of a category, or (`positive == false`) any symbol outside it.
    pub fn category(symbols: Vec<Symbol>, positive: bool, group: Option<GroupId>) -> Self {
        let kind = if positive {
            TransitionKind::Constant { symbols }
        } else {
            TransitionKind::Negated { excluded: symbols }
        };
        Self::from_transition(kind, group)
    }

    /// Member-wise rewrite of one category into another of equal length.
    pub fn correspondence(inputs: Vec<Symbol>, outputs: Vec<Symbol>) -> Self {
        Self::from_transition(TransitionKind::Positional { inputs, outputs }, None)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn end(&self) -> StateId {
        self.end
    }

    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    pub fn add_transition(&mut self, from: StateId, transition: Transition) {
        self.states[from].transitions.push(transition);
    }

    pub fn set_accepting(&mut self, state: StateId, accept: bool) {
        self.states[state].accept = accept;
    }

    fn add_zero(&mut self, from: StateId, to: StateId) {
        self.add_transition(
            from,
            Transition::new(
                TransitionKind::Constant {
                    symbols: vec![ZERO.to_string()],
                },
                to,
            ),
        );
    }

    /// Append the states of `other`, shifting its state ids past ours.
    ///
    /// The merged automaton's start and end are remembered for the
    /// combinator that called this.
    pub fn merge(&mut self, other: Automaton) {
        let offset = self.states.len();
        self.states.extend(other.states.into_iter().map(|mut s| {
            for t in &mut s.transitions {
                t.dest += offset;
            }
            s
        }));
        self.merged = Some((other.start + offset, other.end + offset));
    }

    /// Point every reference to `from` at `to`.
    fn redirect(&mut self, from: StateId, to: StateId) {
        for state in &mut self.states {
            for t in &mut state.transitions {
                if t.dest == from {
                    t.dest = to;
                }
            }
        }
        if self.start == from {
            self.start = to;
        }
        if self.end == from {
            self.end = to;
        }
        if let Some((s, e)) = &mut self.merged {
            if *s == from {
                *s = to;
            }
            if *e == from {
                *e = to;
            }
        }
    }

    /// Remove the state in `slot`, moving the last state into its place.
    ///
    /// Nothing may still refer to the removed state.
    fn compact(&mut self, slot: StateId) {
        let last = self.states.len() - 1;
        self.states.swap_remove(slot);
        if slot != last {
            self.redirect(last, slot);
        }
    }

    /// Fold state `drop` into `keep`: its transitions move over, references
    /// to it are redirected, and its slot is reclaimed.
    pub fn unify_states(&mut self, keep: StateId, drop: StateId) {
        if keep == drop {
            return;
        }
        let moved = std::mem::take(&mut self.states[drop].transitions);
        self.states[keep].transitions.extend(moved);
        if self.states[drop].accept {
            self.states[keep].accept = true;
        }
        self.redirect(drop, keep);
        self.compact(drop);
    }

    /// Remove a state together with every transition into it.
    ///
    /// Must not be called on the start or end state.
    pub fn delete_state(&mut self, state: StateId) {
        for s in &mut self.states {
            s.transitions.retain(|t| t.dest != state);
        }
        self.states[state].transitions.clear();
        self.compact(state);
    }

    fn take_merged(&mut self) -> (StateId, StateId) {
        self.merged.take().unwrap_or((self.start, self.end))
    }

    /// `self` followed by `other`.
    pub fn catenate(&mut self, other: Automaton) {
        self.merge(other);
        let (start, _) = self.merged.unwrap_or((self.start, self.end));
        self.unify_states(self.end, start);
        let (_, end) = self.take_merged();
        self.end = end;
    }

    /// Zero or more repetitions.
    pub fn kleene_star(&mut self) {
        self.unify_states(self.start, self.end);
        let end = self.add_state();
        self.add_zero(self.start, end);
        self.end = end;
    }

    /// One or more repetitions.
    pub fn kleene_plus(&mut self) {
        self.add_zero(self.end, self.start);
        let end = self.add_state();
        self.add_zero(self.end, end);
        self.end = end;
    }

    /// Zero or one occurrence.
    pub fn optionalize(&mut self) {
        self.add_zero(self.start, self.end);
    }

    /// Either `self` or `other`.
    pub fn alternate(&mut self, other: Automaton) {
        self.merge(other);
        let (_, end) = self.merged.unwrap_or((self.start, self.end));
        self.unify_states(self.end, end);
        let (start, _) = self.take_merged();
        let fresh = self.add_state();
        self.add_zero(fresh, self.start);
        self.add_zero(fresh, start);
        self.start = fresh;
    }

    /// Reverse the direction of every transition and swap start and end.
    pub fn reflect(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
        if let Some((s, e)) = &mut self.merged {
            std::mem::swap(s, e);
        }
        let mut reversed: Vec<Vec<Transition>> = vec![Vec::new(); self.states.len()];
        for (from, state) in self.states.iter_mut().enumerate() {
            for mut t in state.transitions.drain(..) {
                let to = t.dest;
                t.dest = from;
                reversed[to].push(t);
            }
        }
        for (state, transitions) in self.states.iter_mut().zip(reversed) {
            state.transitions = transitions;
        }
    }

    /// Swap input and output of every transition.
    ///
    /// Fails without changing anything if some transition rewrites an
    /// unbounded set into one symbol.
    pub fn invert(&mut self) -> Result<(), FstError> {
        let inverted = self
            .states
            .iter()
            .map(|s| {
                s.transitions
                    .iter()
                    .map(|t| t.kind.inverted())
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (state, kinds) in self.states.iter_mut().zip(inverted) {
            for (t, kind) in state.transitions.iter_mut().zip(kinds) {
                t.kind = kind;
            }
        }
        Ok(())
    }

    /// States reachable from `from`, as a membership vector.
    pub fn reachable_from(&self, from: StateId) -> Vec<bool> {
        let mut seen = vec![false; self.states.len()];
        let mut stack = vec![from];
        seen[from] = true;
        while let Some(s) = stack.pop() {
            for t in &self.states[s].transitions {
                if !seen[t.dest] {
                    seen[t.dest] = true;
                    stack.push(t.dest);
                }
            }
        }
        seen
    }

    /// Delete every state the start cannot reach. Start and end are kept.
    pub fn remove_unreachable(&mut self) {
        let seen = self.reachable_from(self.start);
        let doomed: Vec<StateId> = (0..self.states.len())
            .rev()
            .filter(|&s| !seen[s] && s != self.start && s != self.end)
            .collect();
        for s in doomed {
            self.delete_state(s);
        }
    }

    /// Replace correlated categories by one branch per member.
    ///
    /// A transition defining a split group over a finite set becomes one
    /// transition per witness, each leading into a private copy of what
    /// follows it; inside a copy, transitions selecting that group are
    /// reduced to the witness. The end state is shared by all copies.
    /// A group defined over an infinite set cannot be split: its definition
    /// is dropped and its selections never fire.
    pub fn resolve_splits(&mut self) {
        let mut groups: Vec<GroupId> = self
            .states
            .iter()
            .flat_map(|s| s.transitions.iter().filter_map(|t| t.defines))
            .collect();
        groups.sort_unstable();
        groups.dedup();

        for group in groups {
            while let Some((from, index)) = self.find_definition(group) {
                self.split_definition(from, index, group);
            }
        }
        self.remove_unreachable();
    }

    fn find_definition(&self, group: GroupId) -> Option<(StateId, usize)> {
        self.states.iter().enumerate().find_map(|(s, state)| {
            state
                .transitions
                .iter()
                .position(|t| t.defines == Some(group))
                .map(|i| (s, i))
        })
    }

    fn split_definition(&mut self, from: StateId, index: usize, group: GroupId) {
        let definition = self.states[from].transitions.remove(index);
        let witnesses = match definition.trigger_set() {
            TriggerSet::Only(symbols) => symbols,
            TriggerSet::AllBut(_) => {
                let plain = Transition::new(definition.kind, definition.dest);
                self.states[from].transitions.insert(index, plain);
                return;
            }
        };

        let seen = self.reachable_from(definition.dest);
        let region: Vec<StateId> = (0..self.states.len())
            .filter(|&s| seen[s] && s != self.end)
            .collect();

        for witness in &witnesses {
            let base = self.states.len();
            let copy_of: HashMap<StateId, StateId> = region
                .iter()
                .enumerate()
                .map(|(i, &s)| (s, base + i))
                .collect();
            let target = |s: StateId| copy_of.get(&s).copied().unwrap_or(s);

            let copies: Vec<State> = region
                .iter()
                .map(|&s| State {
                    accept: self.states[s].accept,
                    transitions: self.states[s]
                        .transitions
                        .iter()
                        .map(|t| Transition {
                            kind: if t.kind.selects() == Some(group) {
                                t.kind.for_witness(witness)
                            } else {
                                t.kind.clone()
                            },
                            dest: target(t.dest),
                            defines: t.defines.filter(|&g| g != group),
                        })
                        .collect(),
                })
                .collect();
            self.states.extend(copies);

            let branch = Transition::new(definition.kind.for_witness(witness), target(definition.dest));
            self.states[from].transitions.push(branch);
        }
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.states.iter().enumerate() {
            write!(f, "{id}")?;
            if id == self.start {
                f.write_str(" start")?;
            }
            if id == self.end {
                f.write_str(" end")?;
            }
            if state.accept {
                f.write_str(" accepting")?;
            }
            writeln!(f)?;
            for t in &state.transitions {
                writeln!(f, "    {t}")?;
            }
        }
        Ok(())
    }
}
