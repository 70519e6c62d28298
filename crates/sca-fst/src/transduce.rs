// Application of a transducer to a tokenized word.
//
// Breadth first over input positions: the frontier holds every
// (output so far, state) pair alive after consuming a prefix. Zero
// transitions are closed over between symbols, with each state allowed to
// be re-entered a bounded number of times along any one zero path.

use std::collections::BTreeSet;

use crate::automaton::{Automaton, StateId};
use crate::symbols::{Symbol, ZERO};

/// A partial application: what has been emitted and where it stands.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Application {
    output: Vec<Symbol>,
    state: StateId,
}

impl Automaton {
    /// Every output of this transducer for `input`.
    ///
    /// `max_epenthesis` bounds how often one state may be entered along a
    /// single chain of zero transitions (values below 1 are treated as 1).
    /// With `reflect`, the input is read back to front and each output is
    /// reversed before it is returned.
    pub fn transduce(
        &self,
        input: &[Symbol],
        max_epenthesis: usize,
        reflect: bool,
    ) -> BTreeSet<Vec<Symbol>> {
        let max_epenthesis = max_epenthesis.max(1);
        let symbols: Vec<&Symbol> = if reflect {
            input.iter().rev().collect()
        } else {
            input.iter().collect()
        };

        let mut frontier = BTreeSet::from([Application {
            output: Vec::new(),
            state: self.start,
        }]);
        let mut visits = vec![0usize; self.states.len()];
        let mut position = 0;
        let settled = loop {
            let mut closed = BTreeSet::new();
            for app in &frontier {
                self.apply_zeros(app, &mut visits, max_epenthesis, &mut closed);
            }
            let Some(symbol) = symbols.get(position) else {
                break closed;
            };
            frontier = self.consume(&closed, symbol);
            position += 1;
        };

        settled
            .into_iter()
            .filter(|app| self.states[app.state].accept)
            .map(|app| {
                let mut output = app.output;
                if reflect {
                    output.reverse();
                }
                output
            })
            .collect()
    }

    fn apply_zeros(
        &self,
        app: &Application,
        visits: &mut [usize],
        max_epenthesis: usize,
        closed: &mut BTreeSet<Application>,
    ) {
        visits[app.state] += 1;
        if visits[app.state] <= max_epenthesis {
            for t in &self.states[app.state].transitions {
                if !t.fires_on_zero() {
                    continue;
                }
                for out in t.all_outcomes(ZERO) {
                    let mut output = app.output.clone();
                    if out != ZERO {
                        output.push(out);
                    }
                    let next = Application {
                        output,
                        state: t.dest,
                    };
                    self.apply_zeros(&next, visits, max_epenthesis, closed);
                }
            }
        }
        visits[app.state] -= 1;
        closed.insert(app.clone());
    }

    fn consume(&self, closed: &BTreeSet<Application>, symbol: &str) -> BTreeSet<Application> {
        let mut next = BTreeSet::new();
        for app in closed {
            for t in &self.states[app.state].transitions {
                if !t.matches(symbol) {
                    continue;
                }
                for out in t.all_outcomes(symbol) {
                    let mut output = app.output.clone();
                    if out != ZERO {
                        output.push(out);
                    }
                    next.insert(Application {
                        output,
                        state: t.dest,
                    });
                }
            }
        }
        next
    }
}
