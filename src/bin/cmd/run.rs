use std::io;
use std::path::PathBuf;

use miette::{IntoDiagnostic, WrapErr};
use tapelisp::tape::Memory;

/// Compile a source file and run it on a fresh tape
#[derive(clap::Args)]
pub struct Args {
    /// The program to run
    file: PathBuf,
}

impl Args {
    pub fn exec(self, options: &super::Options) -> miette::Result<()> {
        let dialect = options.dialect_for(&self.file)?;
        let source = std::fs::read_to_string(&self.file)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading {}", self.file.display()))?;

        let mut memory = Memory::with_size(options.memory_size);
        let stdin = io::stdin();
        let stdout = io::stdout();
        tapelisp::compile_and_run(
            dialect,
            &source,
            &mut memory,
            0,
            &mut stdin.lock(),
            &mut stdout.lock(),
        )
        .into_diagnostic()?;

        tracing::debug!(pointer = memory.pointer(), tape = %memory, "run finished");
        Ok(())
    }
}
