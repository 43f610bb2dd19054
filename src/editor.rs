//! Raw line input with inline tab completion over builtin names.
//!
//! The editor knows nothing about tokenization or execution; it turns
//! keystrokes into a completed line and hands it to the caller. Completion
//! is single-level: when the text before the cursor is a prefix of exactly
//! one completable builtin, the line becomes `"<name> "`. With zero or
//! multiple candidates nothing visible happens.

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// Builtin names offered to tab completion.
const COMPLETABLE_BUILTINS: &[&str] = &["echo", "exit"];

/// Compute the completed line for a buffer prefix, if the match is unique.
fn completion_for(prefix: &str) -> Option<String> {
    let mut candidates = COMPLETABLE_BUILTINS
        .iter()
        .filter(|name| name.starts_with(prefix));
    match (candidates.next(), candidates.next()) {
        (Some(name), None) => Some(format!("{name} ")),
        _ => None,
    }
}

/// rustyline helper providing the completion rule above and nothing else.
#[derive(Default)]
pub struct BuiltinCompleter;

impl Completer for BuiltinCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = match completion_for(&line[..pos]) {
            Some(completed) => vec![Pair {
                display: completed.trim_end().to_string(),
                replacement: completed,
            }],
            None => Vec::new(),
        };
        // Replacement starts at column zero: the whole buffer is the prefix.
        Ok((0, candidates))
    }
}

impl Hinter for BuiltinCompleter {
    type Hint = String;
}

impl Highlighter for BuiltinCompleter {}

impl Validator for BuiltinCompleter {}

impl Helper for BuiltinCompleter {}

/// Interactive line reader for the REPL.
///
/// Echoes characters as they are typed, completes builtin names on tab and
/// reports end-of-input so the caller can wind the session down. History
/// is deliberately not recorded.
pub struct LineEditor {
    rl: Editor<BuiltinCompleter, DefaultHistory>,
}

impl LineEditor {
    pub fn new() -> rustyline::Result<Self> {
        let mut rl = Editor::new()?;
        rl.set_helper(Some(BuiltinCompleter));
        Ok(Self { rl })
    }

    /// Read one line, blocking until newline or end-of-input.
    ///
    /// Returns `Ok(None)` when the input stream is exhausted (Ctrl-D on an
    /// empty line); an interrupt (Ctrl-C) yields an empty line so the
    /// prompt simply reappears.
    pub fn read_line(&mut self, prompt: &str) -> rustyline::Result<Option<String>> {
        match self.rl.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(e) => Err(e),
        }
    }
}
