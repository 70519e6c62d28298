//! Rule files and the word pipeline of the sound-change applier.
//!
//! - [`tokenizer`] -- Splitting words into phone symbols, honouring modifier characters
//! - [`lexer`] -- Line tokens of the rule language
//! - [`parser`] -- Rule-file syntax: categories, modifiers, changes, constraints
//! - [`compile`] -- Building and determinizing an automaton for every rule
//! - [`pipeline`] -- Running a compiled rule set over words

pub mod compile;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod tokenizer;

pub use compile::{CompileWarning, Direction, RuleSet, SoundChange, compile};
pub use pipeline::{Derivation, Step};
pub use tokenizer::{ModifierKind, ModifierTable, tokenise};

/// Error type for reading a rule file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: unknown option `{option}`")]
    UnknownOption { line: usize, option: String },
    #[error("line {line}: `{name}` is not a category")]
    UnknownCategory { line: usize, name: String },
}

/// Error type for splitting a word into symbols.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("couldn't tokenise input word {word:?}: modifier {modifier:?} lacks a following character")]
    MissingContext { word: String, modifier: char },
    #[error("couldn't tokenise input word {word:?}: modifier {modifier:?} has nothing to attach to")]
    DanglingModifier { word: String, modifier: char },
}
