// Reserved symbols and trigger-set algebra.
//
// A trigger set is the set of input symbols a transition fires on. Rules
// talk about "any vowel" as well as "anything but a vowel", so a set is
// either a finite list or the complement of one.

use std::fmt;

/// A symbol of the transducer alphabet: one tokenized phone.
pub type Symbol = String;

/// Word boundary. Every tokenized word starts and ends with it.
pub const BOUNDARY: &str = "#";

/// The zero (epsilon) symbol. As input it matches without consuming; as
/// output it emits nothing.
pub const ZERO: &str = "0";

/// Representative used for a class that contains every unlisted symbol.
///
/// It never appears in rule text, so any set that contains it is infinite.
pub const OTHER: &str = "*";

/// A finite or co-finite set of symbols.
///
/// Members keep the order in which they were first listed; the first member
/// of a finite set is its [`witness`](TriggerSet::witness).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriggerSet {
    /// Exactly the listed symbols.
    Only(Vec<Symbol>),
    /// Every symbol except the listed ones.
    AllBut(Vec<Symbol>),
}

impl TriggerSet {
    /// The set of every symbol.
    pub fn universal() -> Self {
        TriggerSet::AllBut(Vec::new())
    }

    /// The empty set.
    pub fn empty() -> Self {
        TriggerSet::Only(Vec::new())
    }

    /// A finite set built from `symbols`, duplicates dropped.
    pub fn only<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        TriggerSet::Only(dedup(symbols))
    }

    /// The complement of a finite set built from `symbols`.
    pub fn all_but<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        TriggerSet::AllBut(dedup(symbols))
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, TriggerSet::Only(_))
    }

    /// A set is empty only when it is finite and lists nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, TriggerSet::Only(s) if s.is_empty())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        match self {
            TriggerSet::Only(s) => s.iter().any(|x| x == symbol),
            TriggerSet::AllBut(s) => !s.iter().any(|x| x == symbol),
        }
    }

    /// The listed symbols: the members of a finite set, or the exclusions
    /// of a co-finite one.
    pub fn symbols(&self) -> &[Symbol] {
        match self {
            TriggerSet::Only(s) | TriggerSet::AllBut(s) => s,
        }
    }

    /// A symbol known to be in a non-empty set: its first member, or
    /// [`OTHER`] for a co-finite set.
    pub fn witness(&self) -> &str {
        match self {
            TriggerSet::Only(s) => s.first().map_or(OTHER, String::as_str),
            TriggerSet::AllBut(_) => OTHER,
        }
    }

    pub fn complement(&self) -> Self {
        match self {
            TriggerSet::Only(s) => TriggerSet::AllBut(s.clone()),
            TriggerSet::AllBut(s) => TriggerSet::Only(s.clone()),
        }
    }

    pub fn intersection(&self, other: &TriggerSet) -> Self {
        use TriggerSet::{AllBut, Only};
        match (self, other) {
            (Only(a), Only(b)) => Only(a.iter().filter(|x| b.contains(x)).cloned().collect()),
            (Only(a), AllBut(e)) | (AllBut(e), Only(a)) => {
                Only(a.iter().filter(|x| !e.contains(x)).cloned().collect())
            }
            (AllBut(e), AllBut(f)) => {
                let mut union = e.clone();
                union.extend(f.iter().filter(|x| !e.contains(x)).cloned());
                AllBut(union)
            }
        }
    }

    /// `self` minus `other`, computed as the intersection with the
    /// complement of `other`.
    pub fn difference(&self, other: &TriggerSet) -> Self {
        self.intersection(&other.complement())
    }
}

impl fmt::Display for TriggerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_finite() {
            f.write_str("^")?;
        }
        write!(f, "{{{}}}", self.symbols().join(" "))
    }
}

fn dedup<I, S>(symbols: I) -> Vec<Symbol>
where
    I: IntoIterator<Item = S>,
    S: Into<Symbol>,
{
    let mut out: Vec<Symbol> = Vec::new();
    for s in symbols {
        let s = s.into();
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}
