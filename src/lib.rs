//! A tiny interactive shell: read a line, run a builtin or an external
//! program, repeat.
//!
//! The crate is organized as a pipeline of small components. A
//! [`LineEditor`](editor::LineEditor) produces a raw line, [`lexer`]
//! splits it into tokens honoring quoting and escapes, [`redirect`] peels
//! off stream-redirection operators, and [`Interpreter`] dispatches what
//! remains to a builtin or to an executable found on `PATH`. The public
//! modules [`command`] and [`env`] expose the traits and session state
//! needed to embed the interpreter or add commands of your own.

mod builtin;
pub mod command;
pub mod editor;
pub mod env;
mod external;
mod interpreter;
mod io_adapters;
pub mod lexer;
pub mod redirect;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

pub use io_adapters::MemWriter;
