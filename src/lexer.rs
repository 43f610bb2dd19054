//! Lexical analysis: splitting a raw input line into argument strings.
//!
//! Quoting follows the usual shell rules. Single quotes preserve every
//! character between them, backslash included. Double quotes preserve
//! whitespace but let `\"` and `\\` escape a quote or a backslash; any
//! other backslash pair is kept verbatim. Outside quotes a backslash
//! escapes the next character. Tokenization is permissive: an unclosed
//! quote or a trailing backslash is not an error, the accumulated text is
//! simply emitted as the final token.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Normal,
    InSingleQuote,
    InDoubleQuote,
    Escaping,
}

struct LexFsm {
    input: Vec<char>,
    pos: usize,
    state: LexState,
    buffer: String,
    tokens: Vec<String>,
}

impl LexFsm {
    fn new(line: &str) -> Self {
        LexFsm {
            input: line.chars().collect(),
            pos: 0,
            state: LexState::Normal,
            buffer: String::new(),
            tokens: Vec::new(),
        }
    }

    fn make_tokens(mut self) -> Vec<String> {
        while let Some(ch) = self.read_char() {
            match self.state {
                LexState::Normal => self.handle_normal(ch),
                LexState::InSingleQuote => self.handle_single_quote(ch),
                LexState::InDoubleQuote => self.handle_double_quote(ch),
                LexState::Escaping => {
                    self.buffer.push(ch);
                    self.state = LexState::Normal;
                }
            }
        }

        // Whatever state we ended in, flush the remainder. A dangling
        // backslash escapes nothing and disappears.
        self.flush_token();
        self.tokens
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_normal(&mut self, ch: char) {
        match ch {
            c if c.is_whitespace() => self.flush_token(),
            '\'' => self.state = LexState::InSingleQuote,
            '"' => self.state = LexState::InDoubleQuote,
            '\\' => self.state = LexState::Escaping,
            c => self.buffer.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexState::Normal,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexState::Normal,
            '\\' => match self.peek_char() {
                Some(next @ ('"' | '\\')) => {
                    self.buffer.push(next);
                    self.pos += 1;
                }
                // `\n`, `\t` and friends stay two literal characters.
                _ => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }

    /// A quoted empty string still yields no token; only lines that put
    /// characters into the buffer produce one.
    fn flush_token(&mut self) {
        if !self.buffer.is_empty() {
            self.tokens.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Tokenize one input line.
///
/// Returns the ordered argument strings, possibly none for a blank line.
/// Quoting affects only how characters are accumulated; the returned
/// tokens carry no quoting metadata.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    LexFsm::new(line).make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<String> {
        split_into_tokens(line)
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(toks("echo hello  world"), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn blank_line_yields_nothing() {
        assert!(toks("").is_empty());
        assert!(toks("   \t ").is_empty());
    }

    #[test]
    fn single_quotes_preserve_whitespace() {
        assert_eq!(toks("echo 'a b' c"), vec!["echo", "a b", "c"]);
    }

    #[test]
    fn single_quotes_keep_backslash_literal() {
        assert_eq!(toks(r"echo 'a\nb'"), vec!["echo", r"a\nb"]);
    }

    #[test]
    fn double_quotes_preserve_whitespace() {
        assert_eq!(toks("echo \"foo  bar\""), vec!["echo", "foo  bar"]);
    }

    #[test]
    fn double_quote_escapes_quote_and_backslash() {
        assert_eq!(toks(r#"echo "a\"b""#), vec!["echo", "a\"b"]);
        assert_eq!(toks(r#"echo "a\\b""#), vec!["echo", r"a\b"]);
    }

    #[test]
    fn double_quote_keeps_other_escapes_verbatim() {
        assert_eq!(toks(r#"echo "a\nb""#), vec!["echo", r"a\nb"]);
    }

    #[test]
    fn backslash_escapes_outside_quotes() {
        assert_eq!(toks(r"echo a\ b"), vec!["echo", "a b"]);
        assert_eq!(toks(r"echo \'x\'"), vec!["echo", "'x'"]);
    }

    #[test]
    fn adjacent_quoted_pieces_form_one_token() {
        assert_eq!(toks(r#""a"'b'c"#), vec!["abc"]);
    }

    #[test]
    fn empty_quotes_contribute_no_token() {
        assert_eq!(toks("echo '' x"), vec!["echo", "x"]);
        assert_eq!(toks("\"\""), Vec::<String>::new());
    }

    #[test]
    fn unterminated_quote_is_emitted_as_is() {
        assert_eq!(toks("echo 'foo"), vec!["echo", "foo"]);
        assert_eq!(toks("echo \"foo bar"), vec!["echo", "foo bar"]);
    }

    #[test]
    fn trailing_backslash_is_dropped() {
        assert_eq!(toks("echo foo\\"), vec!["echo", "foo"]);
    }

    #[test]
    fn redirection_operators_are_plain_tokens() {
        assert_eq!(
            toks("echo a > b 2>> c"),
            vec!["echo", "a", ">", "b", "2>>", "c"]
        );
        // Glued to a word the operator loses its meaning downstream.
        assert_eq!(toks("echo a>b"), vec!["echo", "a>b"]);
    }
}
