// Determinization of rule automata into rewriting transducers.
//
// A rule automaton describes one occurrence of a change in context. The
// determinizer runs it from every position of the word at once, tracking
// each thread as a node: a rule state plus the form the thread is in.
//
//   Open       the thread may still rewrite; it has not committed
//   Required   the thread has rewritten and must now reach the end
//   Forbidden  the thread declined a rewrite; reaching the end is a
//              violation (or, for sporadic changes, simply ends it)
//
// A determinized state is a set of nodes. Zero transitions are closed over
// eagerly, except zero rewrites (insertions), which are expanded into
// explicit output chains when a set is settled.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hashbrown::{HashMap, HashSet};

use crate::FstError;
use crate::automaton::{Automaton, StateId};
use crate::config::DeterminizeOptions;
use crate::symbols::{OTHER, Symbol, TriggerSet, ZERO};
use crate::transition::{Transition, TransitionKind};

/// Commitment of a thread running through a rule automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Form {
    Open,
    Required,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Node {
    form: Form,
    state: StateId,
}

impl Node {
    fn new(form: Form, state: StateId) -> Self {
        Self { form, state }
    }
}

/// An entry of a zero closure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Reached {
    /// A node, with the output emitted on the way to it.
    Node(Node, Vec<Symbol>),
    /// A node whose zero rewrites have not been expanded yet.
    Pending(Node),
}

type Closure = BTreeSet<Reached>;

/// What a class of input symbols is rewritten to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Identity,
    /// One output per class member (a single one for co-finite classes).
    Rewrite(Vec<Symbol>),
}

impl Automaton {
    /// Build a deterministic rewriting transducer from this rule automaton.
    ///
    /// The rule automaton is left untouched: split groups are resolved and
    /// the start loop is added on a private copy. The returned transducer
    /// has a single distinguished state serving as both start and end.
    ///
    /// Fails with [`FstError::AmbiguousRewrite`] if two threads claim the
    /// same input and `respecting_conflicts` is set.
    pub fn determinise(&self, options: DeterminizeOptions) -> Result<Automaton, FstError> {
        let mut source = self.clone();
        source.resolve_splits();
        let start = source.start;
        source.add_transition(
            start,
            Transition::new(TransitionKind::Negated { excluded: Vec::new() }, start),
        );
        Determinizer::new(&source, options).run()
    }
}

struct Determinizer<'a> {
    source: &'a Automaton,
    options: DeterminizeOptions,
    /// Closures that stop at zero rewrites met from open or required nodes.
    stopping: Vec<Closure>,
    /// Closures that carry required nodes through zero rewrites.
    through: Vec<Closure>,
    labels: HashMap<BTreeSet<Node>, StateId>,
    queue: VecDeque<(BTreeSet<Node>, StateId)>,
    out: Automaton,
}

impl<'a> Determinizer<'a> {
    fn new(source: &'a Automaton, options: DeterminizeOptions) -> Self {
        let mut stopping = Vec::new();
        let mut through = Vec::new();
        for form in [Form::Open, Form::Required, Form::Forbidden] {
            for state in 0..source.states.len() {
                let node = Node::new(form, state);
                stopping.push(zero_closure(source, node, true));
                through.push(zero_closure(source, node, false));
            }
        }
        Self {
            source,
            options,
            stopping,
            through,
            labels: HashMap::new(),
            queue: VecDeque::new(),
            out: Automaton::without_states(),
        }
    }

    fn slot(&self, form: Form, state: StateId) -> usize {
        form as usize * self.source.states.len() + state
    }

    fn stopping(&self, form: Form, state: StateId) -> &Closure {
        &self.stopping[self.slot(form, state)]
    }

    fn through(&self, form: Form, state: StateId) -> &Closure {
        &self.through[self.slot(form, state)]
    }

    fn run(mut self) -> Result<Automaton, FstError> {
        let closure = self
            .stopping(self.options.initial_form, self.source.start)
            .clone();
        let start = match self.zero_reach(closure) {
            Some(s) => s,
            None => self.out.add_state(),
        };
        self.out.start = start;
        self.out.end = start;

        while let Some((set, from)) = self.queue.pop_front() {
            for class in self.partition(&set) {
                self.expand_class(&set, from, &class)?;
            }
        }

        self.clean_up();
        Ok(self.out)
    }

    /// Split the non-zero alphabet into classes no transition of `set`
    /// distinguishes. Classes a required node cannot consume are dropped.
    fn partition(&self, set: &BTreeSet<Node>) -> Vec<TriggerSet> {
        let mut classes = vec![TriggerSet::all_but([ZERO])];
        for node in set {
            let mut uncovered = TriggerSet::universal();
            for t in &self.source.states[node.state].transitions {
                let trigger = t.trigger_set();
                let mut next = Vec::with_capacity(classes.len() * 2);
                for class in &classes {
                    let inside = class.intersection(&trigger);
                    let outside = class.difference(&trigger);
                    if !inside.is_empty() {
                        next.push(inside);
                    }
                    if !outside.is_empty() {
                        next.push(outside);
                    }
                }
                uncovered = uncovered.difference(&trigger);
                classes = next;
            }
            if node.form == Form::Required {
                classes.retain(|c| !c.difference(&uncovered).is_empty());
            }
        }
        classes
    }

    /// Emit the transitions of state `from` on one input class.
    fn expand_class(
        &mut self,
        set: &BTreeSet<Node>,
        from: StateId,
        class: &TriggerSet,
    ) -> Result<(), FstError> {
        let witness = class.witness();
        let respecting = self.options.respecting_conflicts;
        let ambiguous = || FstError::AmbiguousRewrite {
            witness: witness.to_string(),
        };

        // Nodes every successor carries.
        let mut plain = Closure::new();
        // Obligations: each successor picks one entry from every choice.
        let mut choices: Vec<Closure> = Vec::new();
        // Competing rewrites of the current claimant, with where each leads.
        let mut pending: Vec<(Outcome, Closure)> = Vec::new();
        let mut claimant: Option<Node> = None;
        // The last pending entry is the claimant declining its rewrite.
        let mut declined_last = false;
        let mut settled: Option<Outcome> = None;

        for &node in set {
            let mut declined = Closure::new();
            let mut rewrote = false;
            let mut obligations = Closure::new();
            // Outcomes of this node's first rewrite, and where its entries start.
            let mut own: Option<(Vec<Outcome>, usize)> = None;

            for t in &self.source.states[node.state].transitions {
                if !t.matches(witness) {
                    continue;
                }
                if node.form != Form::Forbidden && t.is_rewriting() {
                    if claimant.is_some_and(|c| c != node) {
                        if respecting {
                            return Err(ambiguous());
                        }
                        pending.clear();
                        declined_last = false;
                    }
                    claimant = Some(node);
                    let these = outcomes(t, class);
                    let start = own.as_ref().map_or(pending.len(), |(_, s)| *s);
                    if own.as_ref().is_some_and(|(first, _)| *first != these) {
                        if respecting {
                            return Err(ambiguous());
                        }
                        pending.truncate(start);
                        declined.clear();
                    }
                    own = Some((these.clone(), start));
                    let accepted = self.stopping(Form::Required, t.dest).clone();
                    declined.extend(self.stopping(Form::Forbidden, t.dest).iter().cloned());
                    rewrote |= node.form == Form::Open;
                    for outcome in these {
                        pending.push((outcome, accepted.clone()));
                    }
                } else {
                    let reached = self.stopping(node.form, t.dest).iter().cloned();
                    if node.form == Form::Required {
                        obligations.extend(reached);
                    } else {
                        plain.extend(reached);
                    }
                }
            }

            if !obligations.is_empty() {
                choices.push(obligations);
            }
            if rewrote {
                pending.push((Outcome::Identity, declined));
                declined_last = true;
            }
            if let Some(outcome) = &settled {
                let disagrees = pending.len() > 1
                    || pending.first().is_some_and(|(o, _)| o != outcome);
                if disagrees {
                    if respecting {
                        return Err(ambiguous());
                    }
                    pending.clear();
                    claimant = None;
                    declined_last = false;
                }
            }
            if pending.len() == 1 {
                if let Some((outcome, reached)) = pending.pop() {
                    if declined_last {
                        plain.extend(reached);
                    } else {
                        choices.push(reached);
                    }
                    settled = Some(outcome);
                }
                claimant = None;
                declined_last = false;
            }
        }

        if claimant.is_some() && !pending.is_empty() {
            let last = pending.len() - 1;
            for (k, (outcome, reached)) in pending.into_iter().enumerate() {
                let mut plain = plain.clone();
                let mut choices = choices.clone();
                if declined_last && k == last {
                    plain.extend(reached);
                } else {
                    choices.push(reached);
                }
                self.emit(from, class, &outcome, &plain, &choices);
            }
        } else {
            let outcome = settled.unwrap_or(Outcome::Identity);
            self.emit(from, class, &outcome, &plain, &choices);
        }
        Ok(())
    }

    /// Add one transition per way of meeting every obligation.
    fn emit(
        &mut self,
        from: StateId,
        class: &TriggerSet,
        outcome: &Outcome,
        plain: &Closure,
        choices: &[Closure],
    ) {
        let options: Vec<Vec<&Reached>> = choices.iter().map(|c| c.iter().collect()).collect();
        if options.iter().any(Vec::is_empty) {
            return;
        }
        let kind = transition_kind(class, outcome);
        let mut picks = vec![0usize; options.len()];
        loop {
            let mut reached = plain.clone();
            for (option, &i) in options.iter().zip(&picks) {
                reached.insert(option[i].clone());
            }
            if let Some(dest) = self.zero_reach(reached) {
                let t = Transition::new(kind.clone(), dest);
                if !self.out.states[from].transitions.contains(&t) {
                    self.out.add_transition(from, t);
                }
            }
            if !advance(&mut picks, &options) {
                break;
            }
        }
    }

    /// The state a closure leads to, or `None` if every branch of it
    /// completes a forbidden match.
    fn zero_reach(&mut self, reached: Closure) -> Option<StateId> {
        let simple = reached
            .iter()
            .all(|r| matches!(r, Reached::Node(_, out) if out.is_empty()));
        if simple {
            let nodes = reached
                .into_iter()
                .filter_map(|r| match r {
                    Reached::Node(n, _) => Some(n),
                    Reached::Pending(_) => None,
                })
                .collect();
            let nodes = self.settle_end(nodes)?;
            return Some(self.state_for(nodes));
        }

        let mut branches: BTreeMap<Vec<Symbol>, BTreeSet<Node>> = BTreeMap::new();
        let mut pending = Vec::new();
        for r in reached {
            match r {
                Reached::Node(n, out) => {
                    branches.entry(out).or_default().insert(n);
                }
                Reached::Pending(n) => pending.push(n),
            }
        }
        if branches.is_empty() {
            branches.insert(Vec::new(), BTreeSet::new());
        }
        for p in pending {
            let alternatives = self.pending_alternatives(p);
            let mut next: BTreeMap<Vec<Symbol>, BTreeSet<Node>> = BTreeMap::new();
            for (prefix, nodes) in &branches {
                for (suffix, extra) in &alternatives {
                    let mut output = prefix.clone();
                    output.extend(suffix.iter().cloned());
                    let entry = next.entry(output).or_default();
                    entry.extend(nodes.iter().copied());
                    entry.extend(extra.iter().copied());
                }
            }
            branches = next;
        }

        let home = self.out.add_state();
        for (output, nodes) in branches {
            let Some(nodes) = self.settle_end(nodes) else {
                continue;
            };
            let target = self.state_for(nodes);
            self.emit_chain(home, &output, target);
        }
        Some(home)
    }

    /// Ways to continue from a node waiting on zero rewrites: take one of
    /// them (emitting its output), or, for an open node, decline them all.
    fn pending_alternatives(&self, pending: Node) -> Vec<(Vec<Symbol>, BTreeSet<Node>)> {
        let mut alternatives = Vec::new();
        let mut declined = BTreeSet::new();
        for t in &self.source.states[pending.state].transitions {
            if !(t.fires_on_zero() && t.is_rewriting()) {
                continue;
            }
            for u in t.all_outcomes(ZERO) {
                for r in self.through(Form::Required, t.dest) {
                    if let Reached::Node(node, out) = r {
                        let mut emitted = Vec::with_capacity(out.len() + 1);
                        if u != ZERO {
                            emitted.push(u.clone());
                        }
                        emitted.extend(out.iter().cloned());
                        alternatives.push((emitted, BTreeSet::from([*node])));
                    }
                }
            }
            if pending.form == Form::Open {
                declined.extend(self.through(Form::Forbidden, t.dest).iter().filter_map(
                    |r| match r {
                        Reached::Node(n, _) => Some(*n),
                        Reached::Pending(_) => None,
                    },
                ));
            }
        }
        if pending.form == Form::Open {
            alternatives.push((Vec::new(), declined));
        }
        alternatives
    }

    /// Threads at the end state are finished: open and required ones are
    /// dropped, a forbidden one kills the branch unless the change is
    /// sporadic.
    fn settle_end(&self, mut nodes: BTreeSet<Node>) -> Option<BTreeSet<Node>> {
        let end = self.source.end;
        nodes.remove(&Node::new(Form::Open, end));
        nodes.remove(&Node::new(Form::Required, end));
        if nodes.remove(&Node::new(Form::Forbidden, end)) && self.options.not_sporadic {
            return None;
        }
        Some(nodes)
    }

    fn state_for(&mut self, nodes: BTreeSet<Node>) -> StateId {
        if let Some(&s) = self.labels.get(&nodes) {
            return s;
        }
        let s = self.out.add_state();
        self.out.states[s].accept = !nodes.iter().any(|n| n.form == Form::Required);
        self.labels.insert(nodes.clone(), s);
        self.queue.push_back((nodes, s));
        s
    }

    /// Connect `home` to `target` through zero transitions emitting `output`.
    fn emit_chain(&mut self, home: StateId, output: &[Symbol], target: StateId) {
        if output.is_empty() {
            self.out.add_transition(
                home,
                Transition::new(
                    TransitionKind::Constant {
                        symbols: vec![ZERO.to_string()],
                    },
                    target,
                ),
            );
            return;
        }
        let mut from = home;
        for (i, symbol) in output.iter().enumerate() {
            let to = if i + 1 == output.len() {
                target
            } else {
                self.out.add_state()
            };
            self.out.add_transition(
                from,
                Transition::new(
                    TransitionKind::Positional {
                        inputs: vec![ZERO.to_string()],
                        outputs: vec![symbol.clone()],
                    },
                    to,
                ),
            );
            from = to;
        }
    }

    fn clean_up(&mut self) {
        for (id, state) in self.out.states.iter_mut().enumerate() {
            state
                .transitions
                .retain(|t| !(t.dest == id && t.kind.is_zero_identity()));
        }
        loop {
            let start = self.out.start;
            let dead: Vec<StateId> = (0..self.out.states.len())
                .rev()
                .filter(|&s| {
                    let state = &self.out.states[s];
                    s != start && !state.accept && state.transitions.iter().all(|t| t.dest == s)
                })
                .collect();
            if dead.is_empty() {
                break;
            }
            for s in dead {
                self.out.delete_state(s);
            }
        }
    }
}

fn zero_closure(source: &Automaton, node: Node, stop: bool) -> Closure {
    let mut acc = Closure::new();
    let mut visited = HashSet::new();
    close(source, node, &[], stop, &mut visited, &mut acc);
    acc
}

fn close(
    source: &Automaton,
    node: Node,
    output: &[Symbol],
    stop: bool,
    visited: &mut HashSet<Node>,
    acc: &mut Closure,
) {
    if !visited.insert(node) {
        return;
    }
    acc.insert(Reached::Node(node, output.to_vec()));
    for t in &source.states[node.state].transitions {
        if !t.fires_on_zero() {
            continue;
        }
        if !t.is_rewriting() {
            close(source, Node::new(node.form, t.dest), output, stop, visited, acc);
            continue;
        }
        match node.form {
            Form::Open => {
                acc.insert(Reached::Pending(node));
            }
            Form::Required if stop => {
                acc.insert(Reached::Pending(node));
            }
            form => {
                for u in t.all_outcomes(ZERO) {
                    let mut next = output.to_vec();
                    if form == Form::Required && u != ZERO {
                        next.push(u);
                    }
                    close(source, Node::new(form, t.dest), &next, stop, visited, acc);
                }
            }
        }
    }
}

/// Every combination of outcomes `t` offers for the members of `class`.
fn outcomes(t: &Transition, class: &TriggerSet) -> Vec<Outcome> {
    match class {
        TriggerSet::Only(members) => {
            let mut combos: Vec<Vec<Symbol>> = vec![Vec::new()];
            for m in members {
                let outs = t.all_outcomes(m);
                combos = combos
                    .iter()
                    .flat_map(|c| {
                        outs.iter().map(move |o| {
                            let mut c = c.clone();
                            c.push(o.clone());
                            c
                        })
                    })
                    .collect();
            }
            combos
                .into_iter()
                .map(|c| {
                    if &c == members {
                        Outcome::Identity
                    } else {
                        Outcome::Rewrite(c)
                    }
                })
                .collect()
        }
        TriggerSet::AllBut(_) => t
            .all_outcomes(OTHER)
            .into_iter()
            .map(|o| Outcome::Rewrite(vec![o]))
            .collect(),
    }
}

fn transition_kind(class: &TriggerSet, outcome: &Outcome) -> TransitionKind {
    match (class, outcome) {
        (TriggerSet::Only(s), Outcome::Identity) => TransitionKind::Constant { symbols: s.clone() },
        (TriggerSet::Only(s), Outcome::Rewrite(out)) => TransitionKind::Positional {
            inputs: s.clone(),
            outputs: out.clone(),
        },
        (TriggerSet::AllBut(s), Outcome::Identity) => TransitionKind::Negated { excluded: s.clone() },
        (TriggerSet::AllBut(s), Outcome::Rewrite(out)) => TransitionKind::NegatedRewrite {
            excluded: s.clone(),
            output: out.first().cloned().unwrap_or_else(|| ZERO.to_string()),
        },
    }
}

/// Step a mixed-radix counter; false once it wraps around.
fn advance(picks: &mut [usize], options: &[Vec<&Reached>]) -> bool {
    for i in (0..picks.len()).rev() {
        picks[i] += 1;
        if picks[i] < options[i].len() {
            return true;
        }
        picks[i] = 0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChangeParameters;

    fn word(s: &str) -> Vec<Symbol> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn words(list: &[&str]) -> BTreeSet<Vec<Symbol>> {
        list.iter().map(|w| word(w)).collect()
    }

    fn category(s: &str) -> Automaton {
        Automaton::category(word(s), true, None)
    }

    fn obligatory() -> DeterminizeOptions {
        DeterminizeOptions::default()
    }

    /// `k > g / V _ V` with V = {a i}
    fn intervocalic_voicing() -> Automaton {
        let mut a = category("a i");
        a.catenate(Automaton::rewrite("k", "g"));
        a.catenate(category("a i"));
        a
    }

    #[test]
    fn rewrites_in_context() {
        let t = intervocalic_voicing().determinise(obligatory()).unwrap();
        assert_eq!(t.transduce(&word("# a k a #"), 1, false), words(&["# a g a #"]));
        assert_eq!(t.transduce(&word("# k a #"), 1, false), words(&["# k a #"]));
        assert_eq!(t.transduce(&word("# a k #"), 1, false), words(&["# a k #"]));
        assert_eq!(
            t.transduce(&word("# a k i k a #"), 1, false),
            words(&["# a g i g a #"])
        );
    }

    #[test]
    fn source_is_not_modified() {
        let a = intervocalic_voicing();
        let before = a.clone();
        a.determinise(obligatory()).unwrap();
        assert_eq!(a, before);
    }

    #[test]
    fn sporadic_change_may_be_skipped() {
        let options = ChangeParameters {
            not_sporadic: false,
            ..ChangeParameters::default()
        }
        .determinize_options(Form::Open);
        let t = intervocalic_voicing().determinise(options).unwrap();
        assert_eq!(
            t.transduce(&word("# a k a #"), 1, false),
            words(&["# a g a #", "# a k a #"])
        );
    }

    #[test]
    fn deletion_before_boundary() {
        let mut a = Automaton::rewrite("h", ZERO);
        a.catenate(Automaton::symbol("#"));
        let t = a.determinise(obligatory()).unwrap();
        assert_eq!(t.transduce(&word("# b a h #"), 1, false), words(&["# b a #"]));
        assert_eq!(t.transduce(&word("# h a #"), 1, false), words(&["# h a #"]));
    }

    #[test]
    fn epenthesis_between_consonants() {
        let mut a = category("k t");
        a.catenate(Automaton::rewrite(ZERO, "e"));
        a.catenate(category("k t"));
        let t = a.determinise(obligatory()).unwrap();
        assert_eq!(t.transduce(&word("# k t #"), 1, false), words(&["# k e t #"]));
        assert_eq!(t.transduce(&word("# k a t #"), 1, false), words(&["# k a t #"]));
        assert_eq!(t.transduce(&word("# t k t #"), 1, false), words(&["# t e k e t #"]));
    }

    #[test]
    fn dead_states_are_pruned() {
        let mut a = category("k t");
        a.catenate(Automaton::rewrite(ZERO, "e"));
        a.catenate(category("k t"));
        let t = a.determinise(obligatory()).unwrap();
        assert_eq!(t.start(), t.end());
        for (id, state) in t.states().iter().enumerate() {
            if id != t.start() && !state.accept {
                assert!(state.transitions.iter().any(|tr| tr.dest != id), "state {id} is dead");
            }
            assert!(!state
                .transitions
                .iter()
                .any(|tr| tr.dest == id && tr.kind.is_zero_identity()));
        }
    }

    /// `a > b / _ x` alongside `a > c / _ y`.
    fn competing_rewrites() -> Automaton {
        let mut a = Automaton::rewrite("a", "b");
        a.catenate(Automaton::symbol("x"));
        let mut b = Automaton::rewrite("a", "c");
        b.catenate(Automaton::symbol("y"));
        a.alternate(b);
        a
    }

    #[test]
    fn conflicting_rewrites_are_ambiguous() {
        let err = competing_rewrites().determinise(obligatory()).unwrap_err();
        assert_eq!(
            err,
            FstError::AmbiguousRewrite {
                witness: "a".to_string()
            }
        );
    }

    #[test]
    fn later_rewrite_wins_when_conflicts_are_ignored() {
        let options = DeterminizeOptions {
            respecting_conflicts: false,
            ..obligatory()
        };
        let t = competing_rewrites().determinise(options).unwrap();
        assert_eq!(t.transduce(&word("a y"), 1, false), words(&["c y"]));
        assert_eq!(t.transduce(&word("a x"), 1, false), words(&["a x"]));
    }

    /// `a > b` and `a > c` leaving the same state.
    fn rewrites_from_one_state(second: &str) -> Automaton {
        let mut a = Automaton::rewrite("a", "b");
        let (start, end) = (a.start(), a.end());
        a.add_transition(
            start,
            Transition::new(
                TransitionKind::Positional {
                    inputs: word("a"),
                    outputs: word(second),
                },
                end,
            ),
        );
        a
    }

    #[test]
    fn rewrites_from_one_state_conflict() {
        let err = rewrites_from_one_state("c").determinise(obligatory()).unwrap_err();
        assert_eq!(
            err,
            FstError::AmbiguousRewrite {
                witness: "a".to_string()
            }
        );
    }

    #[test]
    fn later_rewrite_from_one_state_wins() {
        let options = DeterminizeOptions {
            respecting_conflicts: false,
            ..obligatory()
        };
        let t = rewrites_from_one_state("c").determinise(options).unwrap();
        assert_eq!(t.transduce(&word("# a #"), 1, false), words(&["# c #"]));
    }

    #[test]
    fn agreeing_rewrites_from_one_state() {
        let t = rewrites_from_one_state("b").determinise(obligatory()).unwrap();
        assert_eq!(t.transduce(&word("# a #"), 1, false), words(&["# b #"]));
    }

    #[test]
    fn identity_without_rewrites() {
        let t = Automaton::symbol("x").determinise(obligatory()).unwrap();
        assert_eq!(t.transduce(&word("# x q #"), 1, false), words(&["# x q #"]));
        assert_eq!(t.transduce(&[], 1, false), BTreeSet::from([Vec::new()]));
    }

    #[test]
    fn forbidden_pattern_rejects_words() {
        let mut pattern = Automaton::symbol("k");
        pattern.catenate(Automaton::symbol("a"));
        let forbid = DeterminizeOptions {
            initial_form: Form::Forbidden,
            ..obligatory()
        };
        let t = pattern.determinise(forbid).unwrap();
        assert!(t.transduce(&word("# k a #"), 1, false).is_empty());
        assert!(t.transduce(&word("# t a k k a #"), 1, false).is_empty());
        assert_eq!(t.transduce(&word("# a k #"), 1, false), words(&["# a k #"]));

        let open = pattern.determinise(obligatory()).unwrap();
        assert_eq!(open.transduce(&word("# k a #"), 1, false), words(&["# k a #"]));
    }

    #[test]
    fn negated_rewrite_covers_unlisted_symbols() {
        let a = Automaton::from_transition(
            TransitionKind::NegatedRewrite {
                excluded: word("a"),
                output: "x".into(),
            },
            None,
        );
        let t = a.determinise(obligatory()).unwrap();
        assert_eq!(t.transduce(&word("b a q"), 1, false), words(&["x a x"]));
    }

    #[test]
    fn correlated_categories() {
        // V:1 h > V:1: the h becomes a copy of the preceding vowel.
        let mut a = Automaton::category(word("a i"), true, Some(1));
        a.catenate(Automaton::from_transition(
            TransitionKind::DoubleRewriteSelect {
                label: "V".into(),
                group: 1,
                input: "h".into(),
            },
            None,
        ));
        let t = a.determinise(obligatory()).unwrap();
        assert_eq!(t.transduce(&word("# a h #"), 1, false), words(&["# a a #"]));
        assert_eq!(t.transduce(&word("# i h #"), 1, false), words(&["# i i #"]));
        assert_eq!(t.transduce(&word("# h #"), 1, false), words(&["# h #"]));
    }
}
