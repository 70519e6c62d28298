// Word pipeline
//
// A word is tokenised, wrapped in boundaries, and passed through every
// change in order. Each change maps the current set of forms to a new set;
// a form no change accepts drops out. Every step is recorded so callers can
// print derivations.

use std::collections::BTreeSet;

use sca_fst::{BOUNDARY, Symbol};

use crate::TokenizeError;
use crate::compile::{RuleSet, SoundChange};
use crate::tokenizer::tokenise;

/// One form passed through one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Index into [`RuleSet::changes`].
    pub change: usize,
    pub input: Vec<Symbol>,
    pub outputs: BTreeSet<Vec<Symbol>>,
}

impl Step {
    /// The change left this form as it was.
    pub fn is_identity(&self) -> bool {
        self.outputs.len() == 1 && self.outputs.contains(&self.input)
    }

    /// The change rejected this form.
    pub fn failed(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Everything that happened to one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub input: Vec<Symbol>,
    pub steps: Vec<Step>,
    pub outputs: BTreeSet<Vec<Symbol>>,
}

impl SoundChange {
    /// Run this change over one boundary-wrapped form.
    pub fn apply(&self, form: &[Symbol]) -> BTreeSet<Vec<Symbol>> {
        self.transducer
            .transduce(form, self.params.max_epenthesis, self.params.reflect)
            .into_iter()
            .filter_map(fix_boundaries)
            .collect()
    }
}

impl RuleSet {
    /// Tokenise `word` and run every change over it.
    pub fn apply(&self, word: &str) -> Result<Derivation, TokenizeError> {
        let symbols = tokenise(word, &self.modifiers)?;
        Ok(self.apply_symbols(symbols))
    }

    /// Run every change over an already tokenised form.
    pub fn apply_symbols(&self, input: Vec<Symbol>) -> Derivation {
        let mut forms = BTreeSet::from([input.clone()]);
        let mut steps = Vec::new();
        for (index, change) in self.changes.iter().enumerate() {
            let mut next = BTreeSet::new();
            for form in forms {
                let outputs = change.apply(&form);
                next.extend(outputs.iter().cloned());
                steps.push(Step {
                    change: index,
                    input: form,
                    outputs,
                });
            }
            forms = next;
        }
        Derivation {
            input,
            steps,
            outputs: forms,
        }
    }
}

/// Restore a form to `# ... #` shape.
///
/// A change may rewrite or insert material outside the word boundaries;
/// such a form is cut down to the span between its first two boundaries.
/// Returns `None` when there is no such span.
pub fn fix_boundaries(form: Vec<Symbol>) -> Option<Vec<Symbol>> {
    let wrapped = form.len() >= 2
        && form.first().is_some_and(|s| s == BOUNDARY)
        && form.last().is_some_and(|s| s == BOUNDARY);
    if wrapped {
        return Some(form);
    }
    let open = form.iter().position(|s| s == BOUNDARY)?;
    let close = open + 1 + form[open + 1..].iter().position(|s| s == BOUNDARY)?;
    Some(form[open..=close].to_vec())
}

/// The written form of a symbol string, boundaries removed.
pub fn surface(form: &[Symbol]) -> String {
    form.iter().filter(|s| *s != BOUNDARY).map(String::as_str).collect()
}
