use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// The interpreter session: the mutable state shared by every component.
///
/// It contains:
/// - `vars`: a snapshot of the process environment, used to look up `PATH`
///   and `HOME` and to seed the environment of spawned children. The
///   interpreter never mutates variables on behalf of the user; the map is
///   writable only so tests and embedders can pin values.
/// - `current_dir`: the working directory commands run against. It is an
///   absolute path, owned exclusively by the session and changed only by
///   the `cd` builtin; the process-wide working directory is left alone.
/// - `should_exit`: set by the `exit` builtin and checked by the REPL loop,
///   which is the single place the session ends.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value view of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new session.
    ///
    /// Variables come from `std::env::vars()` and `current_dir` from
    /// `std::env::current_dir()`. The `should_exit` flag starts false.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
