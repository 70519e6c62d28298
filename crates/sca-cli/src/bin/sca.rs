// sca: Apply sound changes to words.
//
// Reads words from stdin (one per line), runs every change of the rule
// file over each, and prints the resulting forms space-separated on one
// line.
//
// Usage:
//   sca [OPTIONS] RULES
//
// Options:
//   -r          apply sound changes in reverse
//   -d          print intermediate sound change results
//   -D          print generated transducers
//   -q          don't complain when a constraint fails
//   -i FILE     read input words from file
//   -o FILE     write output words to file
//   -b          repeat the input word in brackets []
//   -B          repeat the input word with a wedge < >
//   -f          only process the first word on each line

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use clap::{Arg, ArgAction, Command};
use sca_rules::Direction;

fn flag(id: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(id).short(short).help(help).action(ArgAction::SetTrue)
}

fn main() {
    let matches = Command::new("sca")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Apply sound changes to words")
        .arg_required_else_help(true)
        .arg(Arg::new("rules").help("Sound change file").required(true).index(1))
        .arg(flag("reverse", 'r', "Apply sound changes in reverse"))
        .arg(flag("debug", 'd', "Print intermediate sound change results"))
        .arg(flag("dump", 'D', "Print generated transducers"))
        .arg(flag("quiet", 'q', "Don't complain when a constraint fails"))
        .arg(flag("brackets", 'b', "Repeat the input word in brackets []"))
        .arg(flag("wedges", 'B', "Repeat the input word with a wedge < >"))
        .arg(flag("first-word", 'f', "Only process the first word on each line"))
        .arg(Arg::new("input").short('i').value_name("FILE").help("Read input words from file"))
        .arg(Arg::new("output").short('o').value_name("FILE").help("Write output words to file"))
        .get_matches();

    let reverse = matches.get_flag("reverse");
    let settings = sca_cli::Settings {
        direction: if reverse { Direction::Reverse } else { Direction::Forward },
        debug: matches.get_flag("debug"),
        complain: !reverse && !matches.get_flag("quiet"),
        brackets: matches.get_flag("brackets"),
        wedges: matches.get_flag("wedges"),
        first_word: matches.get_flag("first-word"),
    };

    let Some(rules_path) = matches.get_one::<String>("rules") else {
        sca_cli::fatal("no sound change file given");
    };
    let (set, warnings) = sca_cli::load_rules(Path::new(rules_path), settings.direction)
        .unwrap_or_else(|e| sca_cli::fatal(&e));
    for warning in &warnings {
        sca_cli::warn(&warning.to_string());
    }

    let mut out: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(path) => match File::create(path) {
            Ok(f) => Box::new(BufWriter::new(f)),
            Err(e) => sca_cli::fatal(&format!("couldn't open \"{path}\": {e}")),
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if matches.get_flag("dump") {
        if let Err(e) = sca_cli::dump_transducers(&set, &mut out) {
            sca_cli::fatal(&format!("error writing output: {e}"));
        }
    }

    let result = match matches.get_one::<String>("input") {
        Some(path) => match File::open(path) {
            Ok(f) => sca_cli::run(&set, BufReader::new(f), &mut out, &mut io::stderr(), &settings),
            Err(e) => sca_cli::fatal(&format!("couldn't open \"{path}\": {e}")),
        },
        None => sca_cli::run(&set, io::stdin().lock(), &mut out, &mut io::stderr(), &settings),
    };
    if let Err(e) = result {
        sca_cli::fatal(&format!("error processing words: {e}"));
    }
}
