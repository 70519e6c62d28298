// Line lexer for the rule language
//
// Rule files are line oriented. Within a line, whitespace separates words
// and each punctuation character below is a token of its own; everything
// else (including `#` and `0`) is part of a word.

/// Punctuation with meaning in patterns and rule heads.
const PUNCTUATION: &[char] = &[
    '(', ')', '{', '}', '|', '?', '*', '+', '^', '_', '>', '/', '!', '=',
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Punct(char),
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        matches!(self, Token::Punct(p) if *p == c)
    }
}

/// Strip a trailing `//` comment.
pub fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(i) => &line[..i],
        None => line,
    }
}

/// Split one line (comment already stripped) into tokens.
pub fn lex(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in line.chars() {
        if c.is_whitespace() || PUNCTUATION.contains(&c) {
            if !word.is_empty() {
                tokens.push(Token::Word(std::mem::take(&mut word)));
            }
            if !c.is_whitespace() {
                tokens.push(Token::Punct(c));
            }
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}
