//! Extraction of stream-redirection operators from a token sequence.
//!
//! Operators are recognized only as standalone tokens: `>` and `1>`
//! truncate stdout, `>>` and `1>>` append to it, `2>` and `2>>` do the
//! same for stderr. The operator and the token after it (the target path)
//! are removed from the argument list. An operator with nothing after it
//! is left in place as an ordinary argument rather than rejected.

use std::fs::{File, OpenOptions};
use std::io::Result as IoResult;
use std::path::{Path, PathBuf};

/// A single redirection destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    /// Target path exactly as written on the command line.
    pub path: PathBuf,
    /// Append to the file instead of truncating it.
    pub append: bool,
}

impl RedirectTarget {
    /// Open (and thereby create) the target file.
    ///
    /// Relative paths resolve against `base`, the session's working
    /// directory; the interpreter process itself never changes directory.
    /// Opening happens before the command runs, so a declared target
    /// exists even when the command writes nothing to that stream.
    pub fn open(&self, base: &Path) -> IoResult<File> {
        let path = if self.path.is_absolute() {
            self.path.clone()
        } else {
            base.join(&self.path)
        };
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        if self.append {
            options.append(true);
        } else {
            options.truncate(true);
        }
        options.open(path)
    }
}

/// Redirections requested by one command invocation, at most one per stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectSpec {
    pub stdout: Option<RedirectTarget>,
    pub stderr: Option<RedirectTarget>,
}

enum Stream {
    Out,
    Err,
}

fn operator(token: &str) -> Option<(Stream, bool)> {
    match token {
        ">" | "1>" => Some((Stream::Out, false)),
        ">>" | "1>>" => Some((Stream::Out, true)),
        "2>" => Some((Stream::Err, false)),
        "2>>" => Some((Stream::Err, true)),
        _ => None,
    }
}

/// Split a token sequence into the command's argument list and its
/// redirections.
///
/// One left-to-right pass; when the same stream is redirected twice the
/// later operator overwrites the earlier one.
pub fn extract(tokens: Vec<String>) -> (Vec<String>, RedirectSpec) {
    let mut argv = Vec::new();
    let mut spec = RedirectSpec::default();

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        match operator(&token) {
            Some((stream, append)) => match iter.next() {
                Some(path) => {
                    let target = RedirectTarget {
                        path: PathBuf::from(path),
                        append,
                    };
                    match stream {
                        Stream::Out => spec.stdout = Some(target),
                        Stream::Err => spec.stderr = Some(target),
                    }
                }
                // Dangling operator: keep it as a plain argument.
                None => argv.push(token),
            },
            None => argv.push(token),
        }
    }

    (argv, spec)
}
