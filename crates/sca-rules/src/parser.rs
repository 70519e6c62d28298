// Rule-file parser
//
// Line kinds:
//
//   %suffix ʰ ː            modifier declarations (%prefix, %prefix2, %suffix, %join)
//   V = a e i o u          category; members may name earlier categories
//   [name] k > g / V _ V ; options
//   [name] ! C C C         must-not constraint
//
// `//` starts a comment. Options follow a `;` and are separated by commas
// or spaces: `sporadic`, `ambiguous`, `rtl`, `epenthesis=N`.

use hashbrown::HashMap;
use sca_fst::{ChangeParameters, GroupId, Symbol, ZERO};

use crate::RulesError;
use crate::lexer::{Token, lex, strip_comment};
use crate::tokenizer::{ModifierKind, ModifierTable};

/// One position of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Symbol(Symbol),
    /// The empty string; as a target, an insertion site.
    Zero,
    Category {
        name: String,
        members: Vec<Symbol>,
        group: Option<GroupId>,
    },
    /// Any symbol outside the listed ones.
    Not(Vec<Symbol>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Atom(Atom),
    Seq(Vec<Pattern>),
    Alt(Vec<Pattern>),
    Star(Box<Pattern>),
    Plus(Box<Pattern>),
    Optional(Box<Pattern>),
}

impl Pattern {
    pub fn is_empty(&self) -> bool {
        matches!(self, Pattern::Seq(items) if items.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleBody {
    /// `target > replacement / left _ right`
    Change {
        target: Vec<Atom>,
        replacement: Vec<Atom>,
        left: Pattern,
        right: Pattern,
    },
    /// `! pattern`
    Constraint { pattern: Pattern },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// 1-based source line.
    pub line: usize,
    pub params: ChangeParameters,
    pub body: RuleBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFile {
    pub modifiers: ModifierTable,
    pub categories: HashMap<String, Vec<Symbol>>,
    pub rules: Vec<Rule>,
}

/// Parse a whole rule file.
pub fn parse(source: &str) -> Result<RuleFile, RulesError> {
    let mut file = RuleFile::default();
    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }
        if let Some(directive) = text.strip_prefix('%') {
            parse_directive(directive, line, &mut file.modifiers)?;
            continue;
        }
        let (body, options) = match text.split_once(';') {
            Some((body, options)) => (body.trim(), Some(options)),
            None => (text, None),
        };
        let (name, body) = split_name(body, line)?;
        let tokens = lex(body);
        if let [Token::Word(cat), eq, members @ ..] = tokens.as_slice() {
            if eq.is_punct('=') {
                if options.is_some() {
                    return Err(syntax(line, "a category takes no options"));
                }
                let members = category_members(members, &file.categories, line)?;
                file.categories.insert(cat.clone(), members);
                continue;
            }
        }

        let mut params = ChangeParameters::named(name.unwrap_or(body));
        if let Some(options) = options {
            apply_options(options, line, &mut params)?;
        }
        let body = parse_rule_body(&tokens, &file.categories, line)?;
        file.rules.push(Rule { line, params, body });
    }
    Ok(file)
}

fn syntax(line: usize, message: impl Into<String>) -> RulesError {
    RulesError::Syntax {
        line,
        message: message.into(),
    }
}

fn parse_directive(directive: &str, line: usize, modifiers: &mut ModifierTable) -> Result<(), RulesError> {
    let mut words = directive.split_whitespace();
    let kind = match words.next() {
        Some("prefix") => ModifierKind::Prefix,
        Some("prefix2") => ModifierKind::Prefix2,
        Some("suffix") => ModifierKind::Suffix,
        Some("join") => ModifierKind::Join,
        Some(other) => return Err(syntax(line, format!("unknown directive `%{other}`"))),
        None => return Err(syntax(line, "empty directive")),
    };
    for word in words {
        let mut chars = word.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => modifiers.declare(c, kind),
            _ => return Err(syntax(line, format!("modifier `{word}` is not a single character"))),
        }
    }
    Ok(())
}

fn split_name(body: &str, line: usize) -> Result<(Option<&str>, &str), RulesError> {
    let Some(rest) = body.strip_prefix('[') else {
        return Ok((None, body));
    };
    match rest.split_once(']') {
        Some((name, rest)) => Ok((Some(name.trim()), rest.trim())),
        None => Err(syntax(line, "unterminated rule name")),
    }
}

fn apply_options(options: &str, line: usize, params: &mut ChangeParameters) -> Result<(), RulesError> {
    for option in options.split([',', ' ', '\t']).filter(|o| !o.is_empty()) {
        match option {
            "sporadic" => params.not_sporadic = false,
            "ambiguous" => params.respecting_conflicts = false,
            "rtl" => params.reflect = true,
            _ => match option.strip_prefix("epenthesis=").map(str::parse::<usize>) {
                Some(Ok(n)) if n >= 1 => params.max_epenthesis = n,
                Some(_) => return Err(syntax(line, format!("bad epenthesis depth in `{option}`"))),
                None => {
                    return Err(RulesError::UnknownOption {
                        line,
                        option: option.to_string(),
                    });
                }
            },
        }
    }
    Ok(())
}

fn category_members(
    tokens: &[Token],
    categories: &HashMap<String, Vec<Symbol>>,
    line: usize,
) -> Result<Vec<Symbol>, RulesError> {
    let mut members: Vec<Symbol> = Vec::new();
    for token in tokens {
        let Token::Word(word) = token else {
            return Err(syntax(line, "category members must be symbols or categories"));
        };
        if word == ZERO {
            return Err(syntax(line, "`0` cannot be a category member"));
        }
        let expanded = match categories.get(word) {
            Some(inner) => inner.clone(),
            None => vec![word.clone()],
        };
        for m in expanded {
            if !members.contains(&m) {
                members.push(m);
            }
        }
    }
    Ok(members)
}

fn parse_rule_body(
    tokens: &[Token],
    categories: &HashMap<String, Vec<Symbol>>,
    line: usize,
) -> Result<RuleBody, RulesError> {
    let parser = |tokens| PatternParser::new(tokens, line, categories);

    if let Some(rest) = tokens.strip_prefix(&[Token::Punct('!')]) {
        let pattern = parser(rest).parse_all()?;
        if pattern.is_empty() {
            return Err(syntax(line, "empty constraint"));
        }
        return Ok(RuleBody::Constraint { pattern });
    }

    let arrow = tokens
        .iter()
        .position(|t| t.is_punct('>'))
        .ok_or_else(|| syntax(line, "expected `>` or `!`"))?;
    let (target, rest) = (&tokens[..arrow], &tokens[arrow + 1..]);
    let (replacement, environment) = match rest.iter().position(|t| t.is_punct('/')) {
        Some(slash) => (&rest[..slash], Some(&rest[slash + 1..])),
        None => (rest, None),
    };

    let target = parser(target).parse_atoms()?;
    if target.is_empty() {
        return Err(syntax(line, "empty target; write `0` for an insertion"));
    }
    let replacement = parser(replacement).parse_atoms()?;

    let (left, right) = match environment {
        None => (Pattern::Seq(Vec::new()), Pattern::Seq(Vec::new())),
        Some(env) => {
            let mut holes = env.iter().enumerate().filter(|(_, t)| t.is_punct('_'));
            let (Some((hole, _)), None) = (holes.next(), holes.next()) else {
                return Err(syntax(line, "environment needs exactly one `_`"));
            };
            (
                parser(&env[..hole]).parse_all()?,
                parser(&env[hole + 1..]).parse_all()?,
            )
        }
    };

    Ok(RuleBody::Change {
        target,
        replacement,
        left,
        right,
    })
}

// ============================================================================
// Patterns
// ============================================================================

struct PatternParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
    categories: &'a HashMap<String, Vec<Symbol>>,
}

impl<'a> PatternParser<'a> {
    fn new(tokens: &'a [Token], line: usize, categories: &'a HashMap<String, Vec<Symbol>>) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
            categories,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn error(&self, message: impl Into<String>) -> RulesError {
        syntax(self.line, message)
    }

    /// A sequence of plain atoms, as allowed on either side of `>`.
    fn parse_atoms(mut self) -> Result<Vec<Atom>, RulesError> {
        let mut atoms = Vec::new();
        while self.peek().is_some() {
            match self.atom()? {
                Pattern::Atom(atom) => atoms.push(atom),
                _ => return Err(self.error("only symbols and categories can be rewritten")),
            }
        }
        Ok(atoms)
    }

    fn parse_all(mut self) -> Result<Pattern, RulesError> {
        let pattern = self.sequence()?;
        match self.peek() {
            None => Ok(pattern),
            Some(t) => Err(self.error(format!("unexpected {}", describe(t)))),
        }
    }

    /// Items up to the end or a closing `)`, `|` or `}`.
    fn sequence(&mut self) -> Result<Pattern, RulesError> {
        let mut items = Vec::new();
        while let Some(t) = self.peek() {
            if t.is_punct(')') || t.is_punct('|') || t.is_punct('}') {
                break;
            }
            items.push(self.item()?);
        }
        Ok(match items.len() {
            1 => items.remove(0),
            _ => Pattern::Seq(items),
        })
    }

    fn item(&mut self) -> Result<Pattern, RulesError> {
        let mut pattern = self.atom()?;
        loop {
            let wrap: fn(Box<Pattern>) -> Pattern = match self.peek() {
                Some(t) if t.is_punct('?') => Pattern::Optional,
                Some(t) if t.is_punct('*') => Pattern::Star,
                Some(t) if t.is_punct('+') => Pattern::Plus,
                _ => return Ok(pattern),
            };
            self.pos += 1;
            pattern = wrap(Box::new(pattern));
        }
    }

    fn atom(&mut self) -> Result<Pattern, RulesError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("unexpected end of line"));
        };
        self.pos += 1;
        match token {
            Token::Word(word) => Ok(Pattern::Atom(self.word_atom(&word)?)),
            Token::Punct('^') => match self.peek().cloned() {
                Some(Token::Word(word)) => {
                    self.pos += 1;
                    match self.word_atom(&word)? {
                        Atom::Symbol(s) => Ok(Pattern::Atom(Atom::Not(vec![s]))),
                        Atom::Category {
                            members,
                            group: None,
                            ..
                        } => Ok(Pattern::Atom(Atom::Not(members))),
                        _ => Err(self.error(format!("`^{word}` cannot be negated"))),
                    }
                }
                _ => Err(self.error("`^` must be followed by a symbol or category")),
            },
            Token::Punct('(') => {
                let inner = self.sequence()?;
                self.expect(')')?;
                Ok(inner)
            }
            Token::Punct('{') => {
                let mut branches = vec![self.sequence()?];
                while self.peek().is_some_and(|t| t.is_punct('|')) {
                    self.pos += 1;
                    branches.push(self.sequence()?);
                }
                self.expect('}')?;
                Ok(Pattern::Alt(branches))
            }
            other => Err(self.error(format!("unexpected {}", describe(&other)))),
        }
    }

    fn expect(&mut self, c: char) -> Result<(), RulesError> {
        match self.peek() {
            Some(t) if t.is_punct(c) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(format!("expected `{c}`"))),
        }
    }

    fn word_atom(&self, word: &str) -> Result<Atom, RulesError> {
        if word == ZERO {
            return Ok(Atom::Zero);
        }
        if let Some((name, group)) = word.split_once(':') {
            let members = self
                .categories
                .get(name)
                .ok_or_else(|| RulesError::UnknownCategory {
                    line: self.line,
                    name: name.to_string(),
                })?;
            let group = group
                .parse::<GroupId>()
                .map_err(|_| self.error(format!("bad group number in `{word}`")))?;
            return Ok(Atom::Category {
                name: name.to_string(),
                members: members.clone(),
                group: Some(group),
            });
        }
        Ok(match self.categories.get(word) {
            Some(members) => Atom::Category {
                name: word.to_string(),
                members: members.clone(),
                group: None,
            },
            None => Atom::Symbol(word.to_string()),
        })
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("`{w}`"),
        Token::Punct(c) => format!("`{c}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Atom {
        Atom::Symbol(s.to_string())
    }

    fn strings(s: &str) -> Vec<Symbol> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn categories_expand_earlier_categories() {
        let file = parse("S = p t k\nZ = b d g\nC = S Z s").unwrap();
        assert_eq!(file.categories["C"], strings("p t k b d g s"));
        assert!(file.rules.is_empty());
    }

    #[test]
    fn change_with_environment() {
        let file = parse("V = a i\n[voicing] k > g / V _ V").unwrap();
        let rule = &file.rules[0];
        assert_eq!(rule.line, 2);
        assert_eq!(rule.params.name, "voicing");
        let vowel = Pattern::Atom(Atom::Category {
            name: "V".into(),
            members: strings("a i"),
            group: None,
        });
        assert_eq!(
            rule.body,
            RuleBody::Change {
                target: vec![sym("k")],
                replacement: vec![sym("g")],
                left: vowel.clone(),
                right: vowel,
            }
        );
    }

    #[test]
    fn unnamed_rule_is_named_by_its_text() {
        let file = parse("h > 0 / _ #  // final h").unwrap();
        assert_eq!(file.rules[0].params.name, "h > 0 / _ #");
        assert!(matches!(
            &file.rules[0].body,
            RuleBody::Change { replacement, .. } if replacement == &vec![Atom::Zero]
        ));
    }

    #[test]
    fn options() {
        let file = parse("p > f ; sporadic, rtl epenthesis=3, ambiguous").unwrap();
        let p = &file.rules[0].params;
        assert!(!p.not_sporadic);
        assert!(p.reflect);
        assert!(!p.respecting_conflicts);
        assert_eq!(p.max_epenthesis, 3);

        assert_eq!(
            parse("p > f ; loud").unwrap_err(),
            RulesError::UnknownOption {
                line: 1,
                option: "loud".into()
            }
        );
        assert!(parse("p > f ; epenthesis=0").is_err());
    }

    #[test]
    fn constraint_with_repetition_and_alternation() {
        let file = parse("C = p t\n! C {a | e}+ (C)?").unwrap();
        let RuleBody::Constraint { pattern } = &file.rules[0].body else {
            panic!("expected a constraint");
        };
        let Pattern::Seq(items) = pattern else {
            panic!("expected a sequence");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[1], Pattern::Plus(inner) if matches!(**inner, Pattern::Alt(ref b) if b.len() == 2)));
        assert!(matches!(&items[2], Pattern::Optional(_)));
    }

    #[test]
    fn negation_and_groups() {
        let file = parse("V = a e\n^V > x / V:1 _ V:1").unwrap();
        let RuleBody::Change { target, left, .. } = &file.rules[0].body else {
            panic!("expected a change");
        };
        assert_eq!(target, &vec![Atom::Not(strings("a e"))]);
        assert!(matches!(left, Pattern::Atom(Atom::Category { group: Some(1), .. })));
    }

    #[test]
    fn modifier_directives() {
        let file = parse("%suffix ʰ ː\n%join ͡").unwrap();
        assert_eq!(file.modifiers.kind('ʰ'), Some(ModifierKind::Suffix));
        assert_eq!(file.modifiers.kind('ː'), Some(ModifierKind::Suffix));
        assert_eq!(file.modifiers.kind('͡'), Some(ModifierKind::Join));
        assert!(parse("%suffix ab").is_err());
        assert!(parse("%bogus x").is_err());
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let err = parse("V = a\n\nk g").unwrap_err();
        assert!(matches!(err, RulesError::Syntax { line: 3, .. }));
        assert!(matches!(parse("k > g / V V").unwrap_err(), RulesError::Syntax { .. }));
        assert!(matches!(parse("k* > g").unwrap_err(), RulesError::Syntax { .. }));
        assert!(matches!(parse("> g").unwrap_err(), RulesError::Syntax { .. }));
        assert!(matches!(
            parse("k > g / X:1 _").unwrap_err(),
            RulesError::UnknownCategory { .. }
        ));
        assert!(matches!(parse("! a (b").unwrap_err(), RulesError::Syntax { .. }));
    }
}
