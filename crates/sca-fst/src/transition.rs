// Transitions of a rule automaton.
//
// Besides plain identity and rewrite transitions there are "splitting"
// kinds that refer to a correlated category: a later occurrence of `V:1`
// must match the same vowel as the earlier one. They fire on nothing until
// the automaton is split per witness (see `Automaton::resolve_splits`).

use std::fmt;

use crate::FstError;
use crate::automaton::StateId;
use crate::symbols::{Symbol, TriggerSet, ZERO};

/// Identifier of a split group (the `1` of `V:1`).
pub type GroupId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionKind {
    /// Rewrites `inputs[i]` to `outputs[i]`; fires on any listed input.
    Positional {
        inputs: Vec<Symbol>,
        outputs: Vec<Symbol>,
    },
    /// Identity on the listed symbols.
    Constant { symbols: Vec<Symbol> },
    /// Identity on everything except the listed symbols.
    Negated { excluded: Vec<Symbol> },
    /// Rewrites everything except the listed symbols to `output`.
    NegatedRewrite { excluded: Vec<Symbol>, output: Symbol },
    /// Identity on the witness chosen for `group`.
    Select { label: String, group: GroupId },
    /// Rewrites the witness chosen for `group` to `output`.
    RewriteSelect {
        label: String,
        group: GroupId,
        output: Symbol,
    },
    /// Rewrites `input` to the witness chosen for `group`.
    DoubleRewriteSelect {
        label: String,
        group: GroupId,
        input: Symbol,
    },
}

/// An edge of an [`Automaton`](crate::Automaton).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub dest: StateId,
    /// The split group whose witness is chosen by this transition.
    pub defines: Option<GroupId>,
}

impl Transition {
    pub fn new(kind: TransitionKind, dest: StateId) -> Self {
        Self {
            kind,
            dest,
            defines: None,
        }
    }

    pub fn trigger_set(&self) -> TriggerSet {
        self.kind.trigger_set()
    }

    pub fn matches(&self, symbol: &str) -> bool {
        self.kind.matches(symbol)
    }

    pub fn all_outcomes(&self, symbol: &str) -> Vec<Symbol> {
        self.kind.all_outcomes(symbol)
    }

    pub fn is_rewriting(&self) -> bool {
        self.kind.is_rewriting()
    }

    /// True for a transition that may fire without consuming input.
    ///
    /// Only identity and positional transitions are ever taken on zero;
    /// a negated set that happens to admit `0` is not.
    pub fn fires_on_zero(&self) -> bool {
        matches!(
            self.kind,
            TransitionKind::Positional { .. } | TransitionKind::Constant { .. }
        ) && self.kind.matches(ZERO)
    }
}

impl TransitionKind {
    /// The set of input symbols this transition fires on.
    ///
    /// Splitting kinds fire on nothing until they are resolved.
    pub fn trigger_set(&self) -> TriggerSet {
        match self {
            TransitionKind::Positional { inputs, .. } => TriggerSet::only(inputs.iter().cloned()),
            TransitionKind::Constant { symbols } => TriggerSet::only(symbols.iter().cloned()),
            TransitionKind::Negated { excluded } | TransitionKind::NegatedRewrite { excluded, .. } => {
                TriggerSet::all_but(excluded.iter().cloned())
            }
            TransitionKind::Select { .. }
            | TransitionKind::RewriteSelect { .. }
            | TransitionKind::DoubleRewriteSelect { .. } => TriggerSet::empty(),
        }
    }

    /// Membership test on the trigger set without building it.
    pub fn matches(&self, symbol: &str) -> bool {
        match self {
            TransitionKind::Positional { inputs: s, .. } | TransitionKind::Constant { symbols: s } => {
                s.iter().any(|x| x == symbol)
            }
            TransitionKind::Negated { excluded } | TransitionKind::NegatedRewrite { excluded, .. } => {
                !excluded.iter().any(|x| x == symbol)
            }
            _ => false,
        }
    }

    /// Every output this transition may produce for `symbol`.
    ///
    /// Assumes `symbol` is in the trigger set.
    pub fn all_outcomes(&self, symbol: &str) -> Vec<Symbol> {
        match self {
            TransitionKind::Positional { inputs, outputs } => inputs
                .iter()
                .zip(outputs)
                .filter(|(x, _)| *x == symbol)
                .map(|(_, y)| y.clone())
                .collect(),
            TransitionKind::Constant { .. } | TransitionKind::Negated { .. } => vec![symbol.to_string()],
            TransitionKind::NegatedRewrite { output, .. } => vec![output.clone()],
            _ => Vec::new(),
        }
    }

    /// Rewriting kinds are the ones a determinized rule may apply or decline.
    pub fn is_rewriting(&self) -> bool {
        matches!(
            self,
            TransitionKind::Positional { .. } | TransitionKind::NegatedRewrite { .. }
        )
    }

    /// Reduce this transition to a non-splitting kind that fires on the
    /// single symbol `witness`.
    pub fn for_witness(&self, witness: &str) -> TransitionKind {
        let s = witness.to_string();
        match self {
            TransitionKind::Positional { .. } => {
                let outputs = self.all_outcomes(witness);
                TransitionKind::Positional {
                    inputs: vec![s; outputs.len()],
                    outputs,
                }
            }
            TransitionKind::Constant { .. }
            | TransitionKind::Negated { .. }
            | TransitionKind::Select { .. } => TransitionKind::Constant { symbols: vec![s] },
            TransitionKind::NegatedRewrite { output, .. }
            | TransitionKind::RewriteSelect { output, .. } => TransitionKind::Positional {
                inputs: vec![s],
                outputs: vec![output.clone()],
            },
            TransitionKind::DoubleRewriteSelect { input, .. } => TransitionKind::Positional {
                inputs: vec![input.clone()],
                outputs: vec![s],
            },
        }
    }

    /// The split group this transition refers to, if it is a splitting kind.
    pub fn selects(&self) -> Option<GroupId> {
        match self {
            TransitionKind::Select { group, .. }
            | TransitionKind::RewriteSelect { group, .. }
            | TransitionKind::DoubleRewriteSelect { group, .. } => Some(*group),
            _ => None,
        }
    }

    /// The same relation read from output to input.
    pub fn inverted(&self) -> Result<TransitionKind, FstError> {
        Ok(match self {
            TransitionKind::Positional { inputs, outputs } => TransitionKind::Positional {
                inputs: outputs.clone(),
                outputs: inputs.clone(),
            },
            TransitionKind::NegatedRewrite { .. } => {
                return Err(FstError::NotInvertible {
                    transition: self.to_string(),
                });
            }
            TransitionKind::RewriteSelect {
                label,
                group,
                output,
            } => TransitionKind::DoubleRewriteSelect {
                label: label.clone(),
                group: *group,
                input: output.clone(),
            },
            TransitionKind::DoubleRewriteSelect { label, group, input } => {
                TransitionKind::RewriteSelect {
                    label: label.clone(),
                    group: *group,
                    output: input.clone(),
                }
            }
            other => other.clone(),
        })
    }

    /// Identity on zero: a no-op when it loops on its own state.
    pub fn is_zero_identity(&self) -> bool {
        match self {
            TransitionKind::Constant { symbols } => symbols.len() == 1 && symbols[0] == ZERO,
            TransitionKind::Positional { inputs, outputs } => {
                inputs.len() == 1 && inputs[0] == ZERO && outputs.first().is_some_and(|y| y == ZERO)
            }
            _ => false,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Positional { inputs, outputs } => {
                write!(f, "{{{}}} > {{{}}}", inputs.join(" "), outputs.join(" "))
            }
            TransitionKind::Constant { symbols } => write!(f, "{{{}}}", symbols.join(" ")),
            TransitionKind::Negated { excluded } => write!(f, "^{{{}}}", excluded.join(" ")),
            TransitionKind::NegatedRewrite { excluded, output } => {
                write!(f, "^{{{}}} > {output}", excluded.join(" "))
            }
            TransitionKind::Select { label, group } => write!(f, "{label}:{group}"),
            TransitionKind::RewriteSelect {
                label,
                group,
                output,
            } => write!(f, "{label}:{group} > {output}"),
            TransitionKind::DoubleRewriteSelect { label, group, input } => {
                write!(f, "{input} > {label}:{group}")
            }
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.kind, self.dest)?;
        if let Some(group) = self.defines {
            write!(f, " [defines {group}]")?;
        }
        Ok(())
    }
}
