// Rule compilation
//
// Each rule becomes `left · change · right` as a rule automaton, which is
// inverted when running backwards, reflected for right-to-left rules, and
// determinized. A rule that cannot be determinized or inverted is reported
// and left out; the rest of the file still compiles.

use std::fmt;

use hashbrown::HashSet;
use sca_fst::{Automaton, ChangeParameters, FstError, Form, GroupId, Symbol, TransitionKind, ZERO};

use crate::RulesError;
use crate::parser::{Atom, Pattern, Rule, RuleBody, parse};
use crate::tokenizer::ModifierTable;

/// Which way the rule set is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    /// Undo the changes: every rule is inverted and the order reversed.
    Reverse,
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct SoundChange {
    pub params: ChangeParameters,
    pub transducer: Automaton,
    /// Whether this is a must-not constraint rather than a rewrite.
    pub constraint: bool,
}

/// A rule file ready to run over words.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub modifiers: ModifierTable,
    pub changes: Vec<SoundChange>,
    pub direction: Direction,
}

/// A rule that was left out of the compiled set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileWarning {
    pub line: usize,
    pub name: String,
    pub error: FstError,
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: skipping {}: {}", self.line, self.name, self.error)
    }
}

/// Parse and compile a rule file.
pub fn compile(source: &str, direction: Direction) -> Result<(RuleSet, Vec<CompileWarning>), RulesError> {
    let file = parse(source)?;
    let mut changes = Vec::with_capacity(file.rules.len());
    let mut warnings = Vec::new();

    for rule in &file.rules {
        match compile_rule(rule, direction) {
            Ok(change) => changes.push(change),
            Err(CompileFailure::Rules(e)) => return Err(e),
            Err(CompileFailure::Fst(error)) => warnings.push(CompileWarning {
                line: rule.line,
                name: rule.params.name.clone(),
                error,
            }),
        }
    }
    if direction == Direction::Reverse {
        changes.reverse();
    }

    Ok((
        RuleSet {
            modifiers: file.modifiers,
            changes,
            direction,
        },
        warnings,
    ))
}

enum CompileFailure {
    Rules(RulesError),
    Fst(FstError),
}

impl From<RulesError> for CompileFailure {
    fn from(e: RulesError) -> Self {
        CompileFailure::Rules(e)
    }
}

impl From<FstError> for CompileFailure {
    fn from(e: FstError) -> Self {
        CompileFailure::Fst(e)
    }
}

fn compile_rule(rule: &Rule, direction: Direction) -> Result<SoundChange, CompileFailure> {
    let (mut automaton, form) = match &rule.body {
        RuleBody::Change {
            target,
            replacement,
            left,
            right,
        } => (
            change_automaton(target, replacement, left, right, rule.line)?,
            Form::Open,
        ),
        RuleBody::Constraint { pattern } => {
            (build(pattern, &mut Groups::default()), Form::Forbidden)
        }
    };

    if direction == Direction::Reverse {
        automaton.invert()?;
    }
    if rule.params.reflect {
        automaton.reflect();
    }
    let transducer = automaton.determinise(rule.params.determinize_options(form))?;

    Ok(SoundChange {
        params: rule.params.clone(),
        transducer,
        constraint: form == Form::Forbidden,
    })
}

/// Split groups seen so far in the current rule, in reading order.
#[derive(Debug, Default)]
struct Groups {
    bound: HashSet<GroupId>,
}

impl Groups {
    fn is_bound(&self, group: GroupId) -> bool {
        self.bound.contains(&group)
    }

    /// Record `group` as bound; true if this is its first occurrence.
    fn bind(&mut self, group: GroupId) -> bool {
        self.bound.insert(group)
    }
}

/// Automaton for a context pattern or constraint.
fn build(pattern: &Pattern, groups: &mut Groups) -> Automaton {
    match pattern {
        Pattern::Atom(atom) => atom_automaton(atom, groups),
        Pattern::Seq(items) => fold(items, groups, Automaton::catenate),
        Pattern::Alt(branches) => fold(branches, groups, Automaton::alternate),
        Pattern::Star(inner) => {
            let mut a = build(inner, groups);
            a.kleene_star();
            a
        }
        Pattern::Plus(inner) => {
            let mut a = build(inner, groups);
            a.kleene_plus();
            a
        }
        Pattern::Optional(inner) => {
            let mut a = build(inner, groups);
            a.optionalize();
            a
        }
    }
}

fn fold(items: &[Pattern], groups: &mut Groups, join: fn(&mut Automaton, Automaton)) -> Automaton {
    let mut items = items.iter();
    let Some(first) = items.next() else {
        return Automaton::symbol(ZERO);
    };
    let mut a = build(first, groups);
    for item in items {
        let next = build(item, groups);
        join(&mut a, next);
    }
    a
}

fn atom_automaton(atom: &Atom, groups: &mut Groups) -> Automaton {
    match atom {
        Atom::Symbol(s) => Automaton::symbol(s),
        Atom::Zero => Automaton::symbol(ZERO),
        Atom::Not(excluded) => Automaton::category(excluded.clone(), false, None),
        Atom::Category {
            members,
            group: None,
            ..
        } => Automaton::category(members.clone(), true, None),
        Atom::Category {
            name,
            members,
            group: Some(g),
        } => {
            if groups.bind(*g) {
                Automaton::category(members.clone(), true, Some(*g))
            } else {
                Automaton::from_transition(
                    TransitionKind::Select {
                        label: name.clone(),
                        group: *g,
                    },
                    None,
                )
            }
        }
    }
}

fn change_automaton(
    target: &[Atom],
    replacement: &[Atom],
    left: &Pattern,
    right: &Pattern,
    line: usize,
) -> Result<Automaton, RulesError> {
    let mut groups = Groups::default();
    let mut parts = Vec::with_capacity(target.len() + 2);
    if !left.is_empty() {
        parts.push(build(left, &mut groups));
    }
    let width = target.len().max(replacement.len());
    for i in 0..width {
        let t = target.get(i).unwrap_or(&Atom::Zero);
        let r = replacement.get(i).unwrap_or(&Atom::Zero);
        let (kind, defines) = pair_transition(t, r, &mut groups, line)?;
        parts.push(Automaton::from_transition(kind, defines));
    }
    if !right.is_empty() {
        parts.push(build(right, &mut groups));
    }

    let mut parts = parts.into_iter();
    let mut automaton = parts.next().unwrap_or_default();
    for part in parts {
        automaton.catenate(part);
    }
    Ok(automaton)
}

/// The transition rewriting target atom `t` into replacement atom `r`.
fn pair_transition(
    t: &Atom,
    r: &Atom,
    groups: &mut Groups,
    line: usize,
) -> Result<(TransitionKind, Option<GroupId>), RulesError> {
    let error = |message: String| RulesError::Syntax { line, message };

    // A bound group on the left: rewrite whichever member was matched.
    if let Atom::Category {
        name,
        group: Some(g),
        ..
    } = t
    {
        if groups.is_bound(*g) {
            let kind = match r {
                Atom::Symbol(y) => TransitionKind::RewriteSelect {
                    label: name.clone(),
                    group: *g,
                    output: y.clone(),
                },
                Atom::Zero => TransitionKind::RewriteSelect {
                    label: name.clone(),
                    group: *g,
                    output: ZERO.to_string(),
                },
                Atom::Category { group: Some(h), .. } if h == g => TransitionKind::Select {
                    label: name.clone(),
                    group: *g,
                },
                _ => return Err(error(format!("`{name}:{g}` can only become a single symbol"))),
            };
            return Ok((kind, None));
        }
    }

    // A bound group on the right: produce a copy of the matched member.
    if let Atom::Category {
        name,
        group: Some(g),
        ..
    } = r
    {
        let same_group = matches!(t, Atom::Category { group: Some(h), .. } if h == g);
        if !same_group {
            if !groups.is_bound(*g) {
                return Err(error(format!("`{name}:{g}` is used before it is bound")));
            }
            let input = match t {
                Atom::Symbol(x) => x.clone(),
                Atom::Zero => ZERO.to_string(),
                _ => return Err(error(format!("only a single symbol can become `{name}:{g}`"))),
            };
            return Ok((
                TransitionKind::DoubleRewriteSelect {
                    label: name.clone(),
                    group: *g,
                    input,
                },
                None,
            ));
        }
    }

    match (t, r) {
        (Atom::Zero, Atom::Zero) => Err(error("`0 > 0` rewrites nothing".to_string())),
        (Atom::Not(excluded), Atom::Symbol(y)) => Ok((
            TransitionKind::NegatedRewrite {
                excluded: excluded.clone(),
                output: y.clone(),
            },
            None,
        )),
        (Atom::Not(excluded), Atom::Zero) => Ok((
            TransitionKind::NegatedRewrite {
                excluded: excluded.clone(),
                output: ZERO.to_string(),
            },
            None,
        )),
        (Atom::Not(a), Atom::Not(b)) if a == b => Ok((
            TransitionKind::Negated {
                excluded: a.clone(),
            },
            None,
        )),
        (Atom::Not(_), _) | (_, Atom::Not(_)) => Err(error(
            "a negated set can only be kept or become a single symbol".to_string(),
        )),
        _ => {
            let inputs = finite_members(t);
            let outputs = finite_members(r);
            let defines = match t {
                Atom::Category { group: Some(g), .. } => {
                    groups.bind(*g);
                    Some(*g)
                }
                _ => None,
            };
            let (inputs, outputs) = correspond(inputs, outputs)
                .ok_or_else(|| error("categories of different sizes cannot correspond".to_string()))?;
            let kind = if inputs == outputs {
                TransitionKind::Constant { symbols: inputs }
            } else {
                TransitionKind::Positional { inputs, outputs }
            };
            Ok((kind, defines))
        }
    }
}

fn finite_members(atom: &Atom) -> Vec<Symbol> {
    match atom {
        Atom::Symbol(s) => vec![s.clone()],
        Atom::Zero => vec![ZERO.to_string()],
        Atom::Category { members, .. } | Atom::Not(members) => members.clone(),
    }
}

/// Pair up inputs and outputs member-wise, spreading a single symbol over
/// the other side.
fn correspond(inputs: Vec<Symbol>, outputs: Vec<Symbol>) -> Option<(Vec<Symbol>, Vec<Symbol>)> {
    match (inputs.len(), outputs.len()) {
        (n, m) if n == m => Some((inputs, outputs)),
        (n, 1) => Some((inputs, vec![outputs[0].clone(); n])),
        (1, m) => Some((vec![inputs[0].clone(); m], outputs)),
        _ => None,
    }
}
