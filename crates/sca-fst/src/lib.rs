//! Finite state transducers for sound-change rules.
//!
//! A sound change is compiled into a nondeterministic automaton whose
//! transitions carry symbol sets and rewrites, then determinized into a
//! transducer that applies the change to every position of a word at once.
//!
//! # Architecture
//!
//! - [`symbols`] -- Reserved symbols and [`TriggerSet`](symbols::TriggerSet) algebra
//! - [`transition`] -- The seven transition kinds and their outcomes
//! - [`automaton`] -- States, construction combinators, split-group resolution
//! - [`config`] -- Per-change parameters and determinization options
//! - [`determinize`] -- Conversion of a rule automaton into a rewriting transducer
//! - [`transduce`] -- Breadth-first application of a transducer to a word

pub mod automaton;
pub mod config;
pub mod determinize;
pub mod symbols;
pub mod transduce;
pub mod transition;

pub use automaton::{Automaton, State, StateId};
pub use config::{ChangeParameters, DeterminizeOptions};
pub use determinize::Form;
pub use symbols::{BOUNDARY, OTHER, Symbol, TriggerSet, ZERO};
pub use transition::{GroupId, Transition, TransitionKind};

/// Error type for automaton operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FstError {
    #[error("ambiguous rewrite: more than one rewriting thread claims {witness:?}")]
    AmbiguousRewrite { witness: String },
    #[error("transition `{transition}` has no inverse")]
    NotInvertible { transition: String },
}

/// Default bound on how often a single state may be re-entered through
/// zero transitions while applying a transducer.
pub const DEFAULT_MAX_EPENTHESIS: usize = 1;
