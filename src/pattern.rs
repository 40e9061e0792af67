//! File name patterns with `*` and `?` wildcards.
//!
//! Patterns are matched against a bare file name. There are no character
//! classes, no escapes and no recursive `**`.

use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    raw: String,
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyOne,
    AnyRun,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Self {
        let mut tokens = Vec::with_capacity(pattern.len());
        for c in pattern.chars() {
            let token = match c {
                '*' => Token::AnyRun,
                '?' => Token::AnyOne,
                other => Token::Literal(other),
            };
            // Consecutive stars are equivalent to one
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }

        Self {
            raw: pattern.to_string(),
            tokens,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Does `name` match the whole pattern?
    pub fn matches(&self, name: &str) -> bool {
        let name: Vec<char> = name.chars().collect();
        let (mut t, mut n) = (0, 0);
        // Position of the last star and the name index it was tried at
        let mut backtrack: Option<(usize, usize)> = None;

        while n < name.len() {
            match self.tokens.get(t) {
                Some(Token::AnyRun) => {
                    backtrack = Some((t, n));
                    t += 1;
                    continue;
                }
                Some(Token::AnyOne) => {
                    t += 1;
                    n += 1;
                    continue;
                }
                Some(Token::Literal(c)) if *c == name[n] => {
                    t += 1;
                    n += 1;
                    continue;
                }
                _ => {}
            }

            match backtrack {
                Some((star, from)) => {
                    // Let the star swallow one more character and retry
                    t = star + 1;
                    n = from + 1;
                    backtrack = Some((star, from + 1));
                }
                None => return false,
            }
        }

        self.tokens[t..].iter().all(|token| *token == Token::AnyRun)
    }
}

impl Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
