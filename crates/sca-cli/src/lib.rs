// sca-cli: shared utilities for the sound-change applier.
//
// The binary only parses arguments and opens streams; rule loading, the
// per-line loop and every output format live here so they can be tested
// without spawning a process.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

use sca_fst::Symbol;
use sca_rules::pipeline::surface;
use sca_rules::{CompileWarning, Derivation, Direction, RuleSet, Step, compile};

/// How words are read and results shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub direction: Direction,
    /// Print every change that altered a form (`-d`).
    pub debug: bool,
    /// Warn when a form fails a constraint.
    pub complain: bool,
    /// Append ` [word]` to each output line (`-b`).
    pub brackets: bool,
    /// Prefix `word > ` or `word < ` to each output line (`-B`).
    pub wedges: bool,
    /// Only the first word of each input line is processed (`-f`).
    pub first_word: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            debug: false,
            complain: true,
            brackets: false,
            wedges: false,
            first_word: false,
        }
    }
}

/// Read and compile a rule file.
pub fn load_rules(path: &Path, direction: Direction) -> Result<(RuleSet, Vec<CompileWarning>), String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("couldn't open \"{}\": {e}", path.display()))?;
    compile(&source, direction).map_err(|e| format!("{}: {e}", path.display()))
}

/// The word to process on an input line, if any.
pub fn input_word(line: &str, first_word: bool) -> Option<&str> {
    let line = line.trim();
    let word = if first_word {
        line.split([' ', '\t']).next().unwrap_or_default()
    } else {
        line
    };
    (!word.is_empty()).then_some(word)
}

/// Process every line of `input`, writing results to `out` and
/// diagnostics to `err`.
pub fn run<R: BufRead, W: Write, E: Write>(
    set: &RuleSet,
    input: R,
    out: &mut W,
    err: &mut E,
    settings: &Settings,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let Some(word) = input_word(&line, settings.first_word) else {
            continue;
        };
        let derivation = match set.apply(word) {
            Ok(d) => d,
            Err(e) => {
                writeln!(err, "{e}")?;
                continue;
            }
        };
        if settings.debug {
            for step in &derivation.steps {
                if let Some(trace) = describe_step(set, step, settings.direction) {
                    writeln!(out, "{trace}")?;
                }
            }
        }
        if settings.complain {
            for step in derivation.steps.iter().filter(|s| s.failed()) {
                writeln!(
                    err,
                    "warning: \"{}\" doesn't satisfy constraint {}",
                    surface(&step.input),
                    change_name(set, step)
                )?;
            }
        }
        writeln!(out, "{}", format_line(word, &derivation, settings))?;
    }
    out.flush()
}

fn change_name<'a>(set: &'a RuleSet, step: &Step) -> &'a str {
    set.changes
        .get(step.change)
        .map_or("", |c| c.params.name.as_str())
}

/// A `-d` trace line for one step, or `None` if the step changed nothing.
pub fn describe_step(set: &RuleSet, step: &Step, direction: Direction) -> Option<String> {
    if step.is_identity() {
        return None;
    }
    let name = change_name(set, step);
    let mut line = match direction {
        Direction::Forward => format!("{name} applies to \"{}\", yielding", surface(&step.input)),
        Direction::Reverse => format!("{name} yields \"{}\" when applied to", surface(&step.input)),
    };
    for output in &step.outputs {
        line.push_str(&format!(" \"{}\"", surface(output)));
    }
    Some(line)
}

/// The output line for one word.
pub fn format_line(word: &str, derivation: &Derivation, settings: &Settings) -> String {
    let mut line = match (settings.wedges, settings.direction) {
        (false, _) => String::new(),
        (true, Direction::Forward) => format!("{word} > "),
        (true, Direction::Reverse) => format!("{word} < "),
    };
    line.push_str(&join_outputs(derivation.outputs.iter()));
    if settings.brackets {
        line.push_str(&format!(" [{word}]"));
    }
    line
}

fn join_outputs<'a>(outputs: impl Iterator<Item = &'a Vec<Symbol>>) -> String {
    outputs.map(|o| surface(o)).collect::<Vec<_>>().join(" ")
}

/// Print a dump of every compiled transducer (`-D`).
pub fn dump_transducers<W: Write>(set: &RuleSet, out: &mut W) -> io::Result<()> {
    for change in &set.changes {
        writeln!(out, "{}:", change.params.name)?;
        write!(out, "{}", change.transducer)?;
    }
    Ok(())
}

/// Print a warning to stderr.
pub fn warn(msg: &str) {
    eprintln!("warning: {msg}");
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(source: &str, direction: Direction) -> RuleSet {
        compile(source, direction).unwrap().0
    }

    fn run_lines(set: &RuleSet, input: &str, settings: &Settings) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        run(set, input.as_bytes(), &mut out, &mut err, settings).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn input_word_trims_and_skips_blank_lines() {
        assert_eq!(input_word("  pata \t", false), Some("pata"));
        assert_eq!(input_word("pata kala", false), Some("pata kala"));
        assert_eq!(input_word("pata kala", true), Some("pata"));
        assert_eq!(input_word("   ", true), None);
        assert_eq!(input_word("", false), None);
    }

    #[test]
    fn plain_output() {
        let set = rules("p > f", Direction::Forward);
        let (out, err) = run_lines(&set, "pap\n\ntat\n", &Settings::default());
        assert_eq!(out, "faf\ntat\n");
        assert!(err.is_empty());
    }

    #[test]
    fn wedges_and_brackets() {
        let set = rules("p > f ; sporadic", Direction::Forward);
        let settings = Settings {
            wedges: true,
            brackets: true,
            ..Settings::default()
        };
        let (out, _) = run_lines(&set, "pa\n", &settings);
        assert_eq!(out, "pa > fa pa [pa]\n");

        let set = rules("p > f", Direction::Reverse);
        let settings = Settings {
            direction: Direction::Reverse,
            wedges: true,
            ..Settings::default()
        };
        let (out, _) = run_lines(&set, "fa\n", &settings);
        assert_eq!(out, "fa < pa\n");
    }

    #[test]
    fn debug_traces() {
        let set = rules("[lenition] p > f\n[voicing] t > d", Direction::Forward);
        let settings = Settings {
            debug: true,
            ..Settings::default()
        };
        let (out, _) = run_lines(&set, "pa\n", &settings);
        assert_eq!(out, "lenition applies to \"pa\", yielding \"fa\"\nfa\n");

        let set = rules("[lenition] p > f", Direction::Reverse);
        let settings = Settings {
            direction: Direction::Reverse,
            debug: true,
            ..Settings::default()
        };
        let (out, _) = run_lines(&set, "fa\n", &settings);
        assert_eq!(out, "lenition yields \"fa\" when applied to \"pa\"\npa\n");
    }

    #[test]
    fn constraint_warnings() {
        let set = rules("[no-kk] ! k k", Direction::Forward);
        let (out, err) = run_lines(&set, "akka\n", &Settings::default());
        assert_eq!(out, "\n");
        assert_eq!(err, "warning: \"akka\" doesn't satisfy constraint no-kk\n");

        let quiet = Settings {
            complain: false,
            ..Settings::default()
        };
        let (_, err) = run_lines(&set, "akka\n", &quiet);
        assert!(err.is_empty());
    }

    #[test]
    fn untokenisable_words_are_reported_and_skipped() {
        let set = rules("%prefix ⁿ\np > f", Direction::Forward);
        let (out, err) = run_lines(&set, "taⁿ\npa\n", &Settings::default());
        assert_eq!(out, "fa\n");
        assert!(err.starts_with("couldn't tokenise input word \"taⁿ\""));
    }

    #[test]
    fn dump_names_each_transducer() {
        let set = rules("[lenition] p > f", Direction::Forward);
        let mut out = Vec::new();
        dump_transducers(&set, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("lenition:\n"));
    }
}
