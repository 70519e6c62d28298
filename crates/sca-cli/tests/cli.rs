use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn rule_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create rule file");
    file.write_all(source.as_bytes()).expect("write rule file");
    file
}

const VOICING: &str = "V = a e i o u\n[voicing] k > g / V _ V\n[lenition] p > f\n";

#[test]
fn applies_rules_to_stdin() {
    let rules = rule_file(VOICING);
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg(rules.path()).write_stdin("aka\n  paka \n\n");
    cmd.assert().success().stdout("aga\nfaga\n");
}

#[test]
fn wedges_and_brackets() {
    let rules = rule_file(VOICING);
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg("-B").arg("-b").arg(rules.path()).write_stdin("aka\n");
    cmd.assert().success().stdout("aka > aga [aka]\n");
}

#[test]
fn reverse_mode() {
    let rules = rule_file("[lenition] p > f\n");
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg("-r").arg("-B").arg(rules.path()).write_stdin("faf\n");
    cmd.assert().success().stdout("faf < pap\n");
}

#[test]
fn debug_output() {
    let rules = rule_file(VOICING);
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg("-d").arg(rules.path()).write_stdin("aka\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("voicing applies to \"aka\", yielding \"aga\""))
        .stdout(predicate::str::contains("lenition").not());
}

#[test]
fn first_word_only() {
    let rules = rule_file(VOICING);
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg("-f").arg(rules.path()).write_stdin("aka gloss text\n");
    cmd.assert().success().stdout("aga\n");
}

#[test]
fn constraint_failures_warn_unless_quiet() {
    let rules = rule_file("[no-kk] ! k k\n");
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg(rules.path()).write_stdin("akka\n");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("\"akka\" doesn't satisfy constraint no-kk"));

    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg("-q").arg(rules.path()).write_stdin("akka\n");
    cmd.assert().success().stderr(predicate::str::is_empty());
}

#[test]
fn input_and_output_files() {
    let rules = rule_file(VOICING);
    let input = rule_file("aka\npip\n");
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = dir.path().join("out.txt");

    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg("-i")
        .arg(input.path())
        .arg("-o")
        .arg(&output)
        .arg(rules.path());
    cmd.assert().success().stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&output).expect("read output");
    assert_eq!(written, "aga\nfif\n");
}

#[test]
fn dump_prints_transducers() {
    let rules = rule_file("[lenition] p > f\n");
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg("-D").arg(rules.path()).write_stdin("");
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("lenition:\n"));
}

#[test]
fn syntax_errors_are_fatal() {
    let rules = rule_file("V = a e\nk g\n");
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg(rules.path()).write_stdin("aka\n");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn missing_rule_file() {
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg("/nonexistent/rules.sc");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("couldn't open"));
}

#[test]
fn skipped_rules_are_reported() {
    let rules = rule_file("[clash] a a > b b\n[lenition] p > f\n");
    let mut cmd = cargo_bin_cmd!("sca");
    cmd.arg(rules.path()).write_stdin("pa\n");
    cmd.assert()
        .success()
        .stdout("fa\n")
        .stderr(predicate::str::contains("skipping clash"));
}
