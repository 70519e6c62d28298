// Per-change configuration
//
// `ChangeParameters` is what a rule file says about one change;
// `DeterminizeOptions` is the subset the determinizer consumes, together
// with the form its start thread begins in.

use crate::DEFAULT_MAX_EPENTHESIS;
use crate::determinize::Form;

/// Parameters of a single sound change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeParameters {
    /// Name used in traces and warnings.
    pub name: String,
    /// How often one state may be re-entered through zero transitions
    /// while applying the change. At least 1.
    pub max_epenthesis: usize,
    /// Whether the change must apply wherever it can (obligatory) rather
    /// than optionally at each site.
    pub not_sporadic: bool,
    /// Whether two rewrites claiming the same input is an error rather than
    /// resolved in favour of the later one.
    pub respecting_conflicts: bool,
    /// Whether the change is matched right to left.
    pub reflect: bool,
}

impl Default for ChangeParameters {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_epenthesis: DEFAULT_MAX_EPENTHESIS,
            not_sporadic: true,
            respecting_conflicts: true,
            reflect: false,
        }
    }
}

impl ChangeParameters {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Options for determinizing this change with its start thread in
    /// `initial_form`.
    pub fn determinize_options(&self, initial_form: Form) -> DeterminizeOptions {
        DeterminizeOptions {
            not_sporadic: self.not_sporadic,
            initial_form,
            respecting_conflicts: self.respecting_conflicts,
        }
    }
}

/// Options consumed by [`Automaton::determinise`](crate::Automaton::determinise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterminizeOptions {
    pub not_sporadic: bool,
    pub initial_form: Form,
    pub respecting_conflicts: bool,
}

impl Default for DeterminizeOptions {
    fn default() -> Self {
        ChangeParameters::default().determinize_options(Form::Open)
    }
}
