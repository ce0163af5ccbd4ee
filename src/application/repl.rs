use std::io::{self, BufRead, Write};

use colored::Colorize;
use loopy::Tree;
use loopy::shell::{Shell, ShellOutput};
use supports_color::Stream;

/// Reads command lines and prints what the shell makes of them
pub struct Repl {
    shell: Shell,
    tree: Tree,
    color: bool,
}

impl Repl {
    /// Colors error lines when stderr supports it
    pub fn new(shell: Shell, tree: Tree) -> Self {
        Self {
            shell,
            tree,
            color: supports_color::on(Stream::Stderr).is_some(),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Runs one line and returns its status
    pub fn run_line(
        &mut self,
        line: &str,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<i32> {
        let output = self.shell.run(line, &mut self.tree);
        self.print(&output, out, err)?;
        Ok(output.status)
    }

    /// Prompts for lines until `exit`, `quit` or the end of the input.
    pub fn run(
        &mut self,
        input: impl BufRead,
        mut out: impl Write,
        mut err: impl Write,
    ) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "{}", self.shell.config().prompt)?;
            out.flush()?;

            let Some(line) = lines.next().transpose()? else {
                writeln!(out)?;
                break;
            };
            match line.trim() {
                "" => continue,
                "exit" | "quit" => break,
                line => {
                    self.run_line(line, &mut out, &mut err)?;
                }
            }
        }
        Ok(())
    }

    fn print(&self, output: &ShellOutput, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        if !output.stdout.is_empty() {
            writeln!(out, "{}", output.stdout)?;
        }
        for line in output.stderr.lines() {
            match self.color {
                true => writeln!(err, "{}", line.red())?,
                false => writeln!(err, "{line}")?,
            }
        }
        out.flush()?;
        err.flush()
    }
}
