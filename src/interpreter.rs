use crate::builtin::{Cd, Echo, Exit, Pwd, Type};
use crate::command::{CommandFactory, ExitCode, NOT_FOUND, Stdin, Stdout};
use crate::editor::LineEditor;
use crate::env::Environment;
use crate::external::ExternalCommand;
use crate::{lexer, redirect};
use anyhow::{Context as _, Result};
use std::io::{Read, Write};
use std::process::Stdio;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate — builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The interpreter: a session plus an ordered list of command factories.
///
/// Each input line runs through the same pipeline: tokenize
/// ([`lexer`]), peel off redirections ([`redirect`]), then hand the
/// remaining argv to the first factory that recognizes the command name.
/// Builtin factories are queried before the external launcher, so builtins
/// always shadow executables on `PATH`.
///
/// Example
/// ```
/// use minishell::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run("echo", &["hello", "world"]).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    /// Run a single command invocation by name with arguments, without
    /// redirections, against the interpreter's own standard streams.
    pub fn run(&mut self, name: &str, args: &[&str]) -> Result<ExitCode> {
        self.dispatch(
            name,
            args,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Execute one raw input line: tokenize, extract redirections, dispatch.
    ///
    /// A line that tokenizes to nothing succeeds silently. Errors returned
    /// here are scoped to this one command; the caller's loop survives them.
    pub fn execute_line(&mut self, line: &str) -> Result<ExitCode> {
        self.execute_line_with_output(
            line,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Like [`execute_line`](Self::execute_line), but with caller-supplied
    /// fallback streams. Redirections declared on the line still win over
    /// the supplied streams; this is the seam tests and embedders use to
    /// capture output.
    pub fn execute_line_with_output(
        &mut self,
        line: &str,
        default_stdout: Box<dyn Stdout>,
        default_stderr: Box<dyn Stdout>,
    ) -> Result<ExitCode> {
        let tokens = lexer::split_into_tokens(line);
        let (argv, spec) = redirect::extract(tokens);
        if argv.is_empty() {
            return Ok(0);
        }

        // Declared targets are opened before dispatch, so the file exists
        // even when the command writes nothing to that stream.
        let stdout: Box<dyn Stdout> = match &spec.stdout {
            Some(target) => Box::new(
                target
                    .open(&self.env.current_dir)
                    .with_context(|| format!("cannot open {}", target.path.display()))?,
            ),
            None => default_stdout,
        };
        let stderr: Box<dyn Stdout> = match &spec.stderr {
            Some(target) => Box::new(
                target
                    .open(&self.env.current_dir)
                    .with_context(|| format!("cannot open {}", target.path.display()))?,
            ),
            None => default_stderr,
        };

        let args: Vec<&str> = argv[1..].iter().map(String::as_str).collect();
        self.dispatch(&argv[0], &args, stdout, stderr)
    }

    /// The interactive Read-Eval-Print Loop.
    ///
    /// Prints the `$ ` prompt, reads a line through the [`LineEditor`],
    /// executes it and repeats until end-of-input or the `exit` builtin.
    /// Command-scoped failures are printed to standard output and the loop
    /// continues; only the two normal exit paths end the session.
    pub fn repl(&mut self) -> Result<()> {
        let mut editor = LineEditor::new()?;

        loop {
            let line = match editor.read_line("$ ")? {
                Some(line) => line,
                None => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Err(e) = self.execute_line(&line) {
                println!("{e}");
            }
            if self.env.should_exit {
                break;
            }
        }

        Ok(())
    }

    fn dispatch(
        &mut self,
        name: &str,
        args: &[&str],
        stdout: Box<dyn Stdout>,
        stderr: Box<dyn Stdout>,
    ) -> Result<ExitCode> {
        let stdin = InheritedStdin(std::io::stdin().lock());
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(Box::new(stdin), stdout, stderr, &mut self.env);
            }
        }

        let mut stdout = stdout;
        writeln!(stdout, "{name}: command not found")?;
        Ok(NOT_FOUND)
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default command set: the builtins
    /// `cd`, `echo`, `exit`, `pwd` and `type`, followed by the external
    /// command launcher.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Type>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

struct InheritedStdin<'a>(std::io::StdinLock<'a>);

impl Read for InheritedStdin<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl Stdin for InheritedStdin<'_> {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}
