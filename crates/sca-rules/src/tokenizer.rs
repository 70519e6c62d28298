// Word tokenizer
//
// Every character is a symbol of its own unless it is a declared modifier,
// which glues itself to its neighbours: aspiration marks, tie bars, length
// marks and the like belong to the phone they modify. The word is scanned
// right to left so that a prefix modifier always finds its cluster ready.

use hashbrown::HashMap;
use sca_fst::{BOUNDARY, Symbol};

use crate::TokenizeError;

/// How a modifier character attaches to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    /// Binds to the following character.
    Prefix,
    /// Binds to the following two characters.
    Prefix2,
    /// Binds to the preceding character.
    Suffix,
    /// Binds the preceding and following characters together.
    Join,
}

impl ModifierKind {
    /// Whether the character to the left joins this cluster.
    fn takes_left(self) -> bool {
        matches!(self, ModifierKind::Suffix | ModifierKind::Join)
    }

    /// How many clusters to the right are absorbed.
    fn gathers(self) -> usize {
        match self {
            ModifierKind::Prefix | ModifierKind::Join => 1,
            ModifierKind::Prefix2 => 2,
            ModifierKind::Suffix => 0,
        }
    }
}

/// Declared modifier characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierTable {
    kinds: HashMap<char, ModifierKind>,
}

impl ModifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `c` a modifier. A later declaration replaces an earlier one.
    pub fn declare(&mut self, c: char, kind: ModifierKind) {
        self.kinds.insert(c, kind);
    }

    pub fn kind(&self, c: char) -> Option<ModifierKind> {
        self.kinds.get(&c).copied()
    }
}

/// Split `word` into symbols and wrap it in boundaries.
pub fn tokenise(word: &str, modifiers: &ModifierTable) -> Result<Vec<Symbol>, TokenizeError> {
    // Built right to left: the last element is the leftmost cluster so far.
    let mut clusters: Vec<Symbol> = Vec::new();
    let mut append_next = false;
    let mut pending_modifier = None;

    for c in word.chars().rev() {
        match clusters.last_mut() {
            Some(cluster) if append_next => cluster.insert(0, c),
            _ => clusters.push(c.to_string()),
        }

        let kind = modifiers.kind(c);
        append_next = kind.is_some_and(ModifierKind::takes_left);
        if append_next {
            pending_modifier = Some(c);
        }
        let gather = kind.map_or(0, ModifierKind::gathers);
        if clusters.len() <= gather {
            return Err(TokenizeError::MissingContext {
                word: word.to_string(),
                modifier: c,
            });
        }
        for _ in 0..gather {
            let head = clusters.pop().unwrap_or_default();
            if let Some(next) = clusters.last_mut() {
                next.insert_str(0, &head);
            }
        }
    }

    if append_next {
        return Err(TokenizeError::DanglingModifier {
            word: word.to_string(),
            modifier: pending_modifier.unwrap_or_default(),
        });
    }

    let mut symbols = Vec::with_capacity(clusters.len() + 2);
    symbols.push(BOUNDARY.to_string());
    symbols.extend(clusters.into_iter().rev());
    symbols.push(BOUNDARY.to_string());
    Ok(symbols)
}
