use std::path::PathBuf;

use miette::{IntoDiagnostic, WrapErr};

/// Lower a source file to base tape instructions and print them
#[derive(clap::Args)]
pub struct Args {
    file: PathBuf,

    /// Print the program after pair removal
    #[clap(long)]
    minimize: bool,
}

impl Args {
    pub fn exec(self, options: &super::Options) -> miette::Result<()> {
        let dialect = options.dialect_for(&self.file)?;
        let source = std::fs::read_to_string(&self.file)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading {}", self.file.display()))?;

        let code = tapelisp::compile(dialect, &source).into_diagnostic()?;
        if self.minimize {
            println!("{}", tapelisp::tape::minimize(&code));
        } else {
            println!("{code}");
        }
        Ok(())
    }
}
