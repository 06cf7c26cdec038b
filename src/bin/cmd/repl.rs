use std::io::{self, Write};

use miette::IntoDiagnostic;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tapelisp::tape::Memory;
use tapelisp::{Dialect, brackets};

const PROMPT: &str = "| ";
const CONTINUATION_PROMPT: &str = "..| ";

/// Read programs line by line and run them against one shared tape
#[derive(clap::Args)]
pub struct Args {}

impl Args {
    pub fn exec(self, options: &super::Options) -> miette::Result<()> {
        let dialect = options.dialect.unwrap_or(Dialect::Beta);
        let mut rl = DefaultEditor::new().into_diagnostic()?;
        let mut memory = Memory::with_size(options.memory_size);
        let mut buffer = String::new();

        println!("tapelisp {dialect:?} REPL. Type :quit or press Ctrl-D to leave.");

        loop {
            let prompt = if buffer.is_empty() {
                PROMPT
            } else {
                CONTINUATION_PROMPT
            };

            let line = match rl.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    buffer.clear();
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).into_diagnostic(),
            };

            if buffer.is_empty() {
                match line.trim() {
                    "" => continue,
                    ":quit" | ":exit" => break,
                    _ => {}
                }
            }

            buffer.push_str(&line);
            buffer.push('\n');
            if needs_more(dialect, &buffer) {
                continue;
            }

            let source = std::mem::take(&mut buffer);
            let _ = rl.add_history_entry(source.trim_end());
            run_turn(dialect, &source, &mut memory);
        }

        println!("Goodbye!");
        Ok(())
    }
}

/// Keep reading only while some opening delimiter is still waiting for
/// its partner. A stray closer is submitted so its error is reported.
fn needs_more(dialect: Dialect, buffer: &str) -> bool {
    if tapelisp::is_syntactically_complete(dialect, buffer) {
        return false;
    }
    let delims = dialect.delimiters();
    brackets::first_unmatched(buffer.as_bytes(), delims)
        .is_some_and(|i| buffer.as_bytes()[i] == delims.open)
}

fn run_turn(dialect: Dialect, source: &str, memory: &mut Memory) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let result = tapelisp::compile_and_run(
        dialect,
        source,
        memory,
        0,
        &mut stdin.lock(),
        &mut stdout,
    );

    match result {
        Ok(output) => {
            if !output.is_empty() && !output.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            let _ = stdout.flush();
            println!();
            println!("Error: {e}");
        }
    }
    println!("{memory}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_waits_for_open_delimiters_only() {
        let cases = [
            (Dialect::Beta, "(progn (output)\n", true),
            (Dialect::Beta, "(progn (output))\n", false),
            (Dialect::Beta, "(output))\n", false),
            (Dialect::Beta, ")(\n", false),
            (Dialect::Base, "+[->\n", true),
            (Dialect::Base, "]\n", false),
            (Dialect::Alpha, "=3 [\n", true),
        ];
        for (dialect, buffer, expected) in cases {
            assert_eq!(needs_more(dialect, buffer), expected, "{buffer:?}");
        }
    }
}
