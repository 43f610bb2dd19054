use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::external;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::ffi::OsStr;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Names the dispatcher treats as builtins, in the order `type` reports
/// them. Checked before any PATH search, so a builtin always shadows an
/// executable of the same name.
pub(crate) const BUILTIN_NAMES: &[&str] = &["cd", "echo", "exit", "pwd", "type"];

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command using provided IO streams and session state.
    ///
    /// Return value should follow shell conventions: 0 for success,
    /// non-zero for error. User-facing failures are written to `stdout`
    /// (this interpreter reports every error on standard output); `stderr`
    /// exists so that a declared redirection target is part of the call
    /// even though no current builtin writes to it.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        mut stderr: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match T::execute(*self, &mut stdin, &mut stdout, &mut stderr, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{e}")?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        _stderr: Box<dyn Stdout>,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Print the session's current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.display())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the session's working directory.
/// A lone `~` expands to $HOME, as does an omitted target.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let original = match self.target {
            Some(t) if !t.is_empty() => t,
            _ => env.get_var("HOME").context("cd: HOME not set")?,
        };

        let expanded = if original == "~" {
            PathBuf::from(env.get_var("HOME").context("cd: HOME not set")?)
        } else {
            PathBuf::from(&original)
        };

        let joined = if expanded.is_absolute() {
            expanded
        } else {
            env.current_dir.join(expanded)
        };

        // Only the session field moves; the process-wide working
        // directory is never touched.
        match fs::canonicalize(&joined) {
            Ok(canonical) if canonical.is_dir() => {
                env.current_dir = canonical;
                Ok(0)
            }
            _ => {
                writeln!(stdout, "cd: {original}: No such file or directory")?;
                Ok(1)
            }
        }
    }
}

#[derive(FromArgs)]
/// Leave the shell with a success status. Arguments are accepted and ignored.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; present so `exit 0` and friends parse.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// write the arguments to standard output, separated by spaces.
/// by default, a trailing newline is printed.
pub struct Echo {
    #[argh(switch, short = 'n')]
    /// do not output the trailing newline.
    pub no_newline: bool,

    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(stdout, "{s}")?;
        } else {
            writeln!(stdout, "{s}")?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Report how a command name would be interpreted: as a shell builtin or
/// as an executable found on PATH.
pub struct Type {
    #[argh(positional)]
    /// command name to look up; defaults to `type` itself.
    pub name: Option<String>,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let name = self.name.unwrap_or_else(|| Self::name().to_string());

        if BUILTIN_NAMES.contains(&name.as_str()) {
            writeln!(stdout, "{name} is a shell builtin")?;
            return Ok(0);
        }

        // Same search the external launcher performs.
        let search_paths = env.get_var("PATH").unwrap_or_default();
        match external::find_command_path(
            OsStr::new(&search_paths),
            &env.current_dir,
            Path::new(&name),
        ) {
            Some(path) => {
                writeln!(stdout, "{} is {}", name, path.display())?;
                Ok(0)
            }
            None => {
                writeln!(stdout, "{name}: not found")?;
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env as stdenv;
    use std::io::Cursor;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = stdenv::temp_dir().join(format!(
            "minishell_builtin_{}_{}_{}",
            tag,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn session_at(dir: PathBuf) -> Environment {
        Environment {
            vars: HashMap::new(),
            current_dir: dir,
            should_exit: false,
        }
    }

    fn run<T: BuiltinCommand>(cmd: T, env: &mut Environment) -> (String, ExitCode) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = cmd
            .execute(&mut Cursor::new(Vec::new()), &mut out, &mut err, env)
            .expect("builtin execution");
        (String::from_utf8(out).unwrap(), code)
    }

    #[test]
    fn pwd_prints_session_dir() {
        let dir = make_unique_temp_dir("pwd");
        let mut env = session_at(dir.clone());

        let (out, code) = run(Pwd {}, &mut env);
        assert_eq!(code, 0);
        assert_eq!(out, format!("{}\n", dir.display()));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn echo_joins_with_single_spaces() {
        let mut env = session_at(stdenv::temp_dir());
        let echo = Echo {
            no_newline: false,
            args: vec!["hello".to_string(), "world".to_string()],
        };
        let (out, code) = run(echo, &mut env);
        assert_eq!(code, 0);
        assert_eq!(out, "hello world\n");
    }

    #[test]
    fn echo_without_args_prints_blank_line() {
        let mut env = session_at(stdenv::temp_dir());
        let echo = Echo {
            no_newline: false,
            args: Vec::new(),
        };
        let (out, _) = run(echo, &mut env);
        assert_eq!(out, "\n");
    }

    #[test]
    fn echo_n_suppresses_newline() {
        let mut env = session_at(stdenv::temp_dir());
        let echo = Echo {
            no_newline: true,
            args: vec!["foo".to_string(), "bar".to_string()],
        };
        let (out, _) = run(echo, &mut env);
        assert_eq!(out, "foo bar");
    }

    #[test]
    fn cd_to_absolute_path() {
        let dir = make_unique_temp_dir("cd_abs");
        let canonical = fs::canonicalize(&dir).unwrap();
        let mut env = session_at(stdenv::temp_dir());

        let cd = Cd {
            target: Some(dir.to_string_lossy().to_string()),
        };
        let (out, code) = run(cd, &mut env);
        assert_eq!(code, 0);
        assert!(out.is_empty());
        assert_eq!(env.current_dir, canonical);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn cd_relative_resolves_against_session_dir() {
        let dir = make_unique_temp_dir("cd_rel");
        fs::create_dir_all(dir.join("nested")).unwrap();
        let mut env = session_at(fs::canonicalize(&dir).unwrap());

        let cd = Cd {
            target: Some("nested".to_string()),
        };
        let (_, code) = run(cd, &mut env);
        assert_eq!(code, 0);
        assert_eq!(env.current_dir, fs::canonicalize(dir.join("nested")).unwrap());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn cd_tilde_goes_home() {
        let home = make_unique_temp_dir("cd_home");
        let mut env = session_at(stdenv::temp_dir());
        env.set_var("HOME", home.to_string_lossy().to_string());

        let cd = Cd {
            target: Some("~".to_string()),
        };
        let (_, code) = run(cd, &mut env);
        assert_eq!(code, 0);
        assert_eq!(env.current_dir, fs::canonicalize(&home).unwrap());

        let _ = fs::remove_dir_all(home);
    }

    #[test]
    fn cd_without_target_defaults_to_home() {
        let home = make_unique_temp_dir("cd_default");
        let mut env = session_at(stdenv::temp_dir());
        env.set_var("HOME", home.to_string_lossy().to_string());

        let (_, code) = run(Cd { target: None }, &mut env);
        assert_eq!(code, 0);
        assert_eq!(env.current_dir, fs::canonicalize(&home).unwrap());

        let _ = fs::remove_dir_all(home);
    }

    #[test]
    fn cd_nonexistent_reports_and_keeps_dir() {
        let before = stdenv::temp_dir();
        let mut env = session_at(before.clone());

        let cd = Cd {
            target: Some("nonexistent".to_string()),
        };
        let (out, code) = run(cd, &mut env);
        assert_eq!(code, 1);
        assert_eq!(out, "cd: nonexistent: No such file or directory\n");
        assert_eq!(env.current_dir, before);
    }

    #[test]
    fn cd_to_regular_file_reports_and_keeps_dir() {
        let dir = make_unique_temp_dir("cd_file");
        fs::write(dir.join("plain.txt"), b"x").unwrap();
        let before = fs::canonicalize(&dir).unwrap();
        let mut env = session_at(before.clone());

        let cd = Cd {
            target: Some("plain.txt".to_string()),
        };
        let (out, code) = run(cd, &mut env);
        assert_eq!(code, 1);
        assert_eq!(out, "cd: plain.txt: No such file or directory\n");
        assert_eq!(env.current_dir, before);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn exit_sets_session_flag() {
        let mut env = session_at(stdenv::temp_dir());
        let exit = Exit {
            _args: vec!["0".to_string()],
        };
        let (out, code) = run(exit, &mut env);
        assert_eq!(code, 0);
        assert!(out.is_empty());
        assert!(env.should_exit);
    }

    #[test]
    fn type_reports_builtins() {
        let mut env = session_at(stdenv::temp_dir());
        for name in BUILTIN_NAMES {
            let t = Type {
                name: Some(name.to_string()),
            };
            let (out, code) = run(t, &mut env);
            assert_eq!(code, 0);
            assert_eq!(out, format!("{name} is a shell builtin\n"));
        }
    }

    #[test]
    fn type_without_argument_reports_itself() {
        let mut env = session_at(stdenv::temp_dir());
        let (out, code) = run(Type { name: None }, &mut env);
        assert_eq!(code, 0);
        assert_eq!(out, "type is a shell builtin\n");
    }

    #[test]
    #[cfg(unix)]
    fn type_finds_executables_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = make_unique_temp_dir("type_path");
        let tool = dir.join("sometool");
        fs::write(&tool, b"").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let mut env = session_at(stdenv::temp_dir());
        env.set_var("PATH", dir.to_string_lossy().to_string());

        let t = Type {
            name: Some("sometool".to_string()),
        };
        let (out, code) = run(t, &mut env);
        assert_eq!(code, 0);
        assert_eq!(out, format!("sometool is {}\n", tool.display()));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn type_reports_misses() {
        let dir = make_unique_temp_dir("type_miss");
        let mut env = session_at(stdenv::temp_dir());
        env.set_var("PATH", dir.to_string_lossy().to_string());

        let t = Type {
            name: Some("definitely-not-a-real-binary".to_string()),
        };
        let (out, code) = run(t, &mut env);
        assert_eq!(code, 1);
        assert_eq!(out, "definitely-not-a-real-binary: not found\n");

        let _ = fs::remove_dir_all(dir);
    }
}
