//! End-to-end tests: rule text in, surface forms out.

use sca_rules::pipeline::surface;
use sca_rules::{Direction, RuleSet, compile};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rules(source: &str) -> RuleSet {
    let (set, warnings) = compile(source, Direction::Forward).expect("rules should parse");
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    set
}

fn reverse_rules(source: &str) -> RuleSet {
    let (set, warnings) = compile(source, Direction::Reverse).expect("rules should parse");
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    set
}

/// Every surface form `word` ends up as, sorted.
fn derive(set: &RuleSet, word: &str) -> Vec<String> {
    set.apply(word)
        .expect("word should tokenise")
        .outputs
        .iter()
        .map(|form| surface(form))
        .collect()
}

// ---------------------------------------------------------------------------
// Changes
// ---------------------------------------------------------------------------

#[test]
fn unconditioned_change() {
    let set = rules("p > f");
    assert_eq!(derive(&set, "pap"), ["faf"]);
    assert_eq!(derive(&set, "tat"), ["tat"]);
}

#[test]
fn intervocalic_voicing() {
    let set = rules("V = a i\n[voicing] k > g / V _ V");
    assert_eq!(derive(&set, "aka"), ["aga"]);
    assert_eq!(derive(&set, "akika"), ["agiga"]);
    assert_eq!(derive(&set, "kak"), ["kak"]);
}

#[test]
fn word_final_deletion() {
    let set = rules("h > 0 / _ #");
    assert_eq!(derive(&set, "bah"), ["ba"]);
    assert_eq!(derive(&set, "hab"), ["hab"]);
}

#[test]
fn epenthesis_between_consonants() {
    let set = rules("C = k t\n0 > e / C _ C");
    assert_eq!(derive(&set, "kt"), ["ket"]);
    assert_eq!(derive(&set, "tkt"), ["teket"]);
    assert_eq!(derive(&set, "kat"), ["kat"]);
}

#[test]
fn vowel_copy() {
    let set = rules("V = a e o\nh > V:1 / V:1 _");
    assert_eq!(derive(&set, "ah"), ["aa"]);
    assert_eq!(derive(&set, "oh"), ["oo"]);
    assert_eq!(derive(&set, "h"), ["h"]);
}

#[test]
fn sporadic_change_keeps_both_forms() {
    let set = rules("p > f ; sporadic");
    assert_eq!(derive(&set, "pa"), ["fa", "pa"]);
}

#[test]
fn right_to_left_rule() {
    let set = rules("p > f ; rtl");
    assert_eq!(derive(&set, "pap"), ["faf"]);
}

#[test]
fn chained_changes_feed_each_other() {
    let set = rules("// lenition, then loss\np > f\nf > h / _ #\nh > 0 / _ #");
    assert_eq!(derive(&set, "pap"), ["fa"]);
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

#[test]
fn constraint_rejects_words() {
    let set = rules("[no-geminate] ! a a");
    assert!(derive(&set, "baab").is_empty());
    assert_eq!(derive(&set, "baba"), ["baba"]);
}

#[test]
fn constraint_after_change() {
    let set = rules("e > a\n! a a");
    assert!(derive(&set, "ea").is_empty());
    assert_eq!(derive(&set, "eb"), ["ab"]);
}

// ---------------------------------------------------------------------------
// Modifiers and direction
// ---------------------------------------------------------------------------

#[test]
fn modifiers_form_single_symbols() {
    let set = rules("%suffix ʰ\ntʰ > d");
    assert_eq!(derive(&set, "atʰa"), ["ada"]);
    assert_eq!(derive(&set, "ata"), ["ata"]);
}

#[test]
fn reverse_undoes_changes() {
    let set = reverse_rules("p > b\nb > v / a _");
    assert_eq!(derive(&set, "ava"), ["apa"]);
    assert_eq!(derive(&set, "bo"), ["po"]);
}

#[test]
fn rejected_word_reports_tokenise_error() {
    let set = rules("%prefix ⁿ\np > f");
    assert!(set.apply("taⁿ").is_err());
}
