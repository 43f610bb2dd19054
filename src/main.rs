use minishell::Interpreter;

fn main() -> anyhow::Result<()> {
    Interpreter::default().repl()
}
