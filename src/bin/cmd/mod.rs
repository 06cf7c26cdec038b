use std::path::Path;

use clap::Parser;
use miette::miette;
use tapelisp::Dialect;
use tracing::Level;

mod compile;
mod encode;
mod repl;
mod run;

/// Run and compile programs for the layered tape machine.
#[derive(Parser)]
#[clap(version, about)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,

    /// Source dialect; guessed from the file extension when omitted
    #[clap(long, global = true, value_enum)]
    dialect: Option<DialectArg>,

    /// Number of tape cells
    #[clap(long, global = true, default_value_t = tapelisp::MEMORY_SIZE)]
    memory_size: usize,

    /// Log each pipeline stage to stderr
    #[clap(short, long, global = true)]
    verbose: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self::parse()
    }
}

impl Cli {
    pub fn exec(self) -> miette::Result<()> {
        init_tracing(if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        });

        let options = Options {
            dialect: self.dialect.map(Dialect::from),
            memory_size: self.memory_size,
        };
        self.cmd.exec(&options)
    }
}

#[derive(clap::Subcommand)]
pub enum Cmd {
    Run(run::Args),
    Repl(repl::Args),
    Compile(compile::Args),
    Encode(encode::Args),
}

impl Cmd {
    pub fn exec(self, options: &Options) -> miette::Result<()> {
        match self {
            Cmd::Run(args) => args.exec(options),
            Cmd::Repl(args) => args.exec(options),
            Cmd::Compile(args) => args.exec(options),
            Cmd::Encode(args) => args.exec(),
        }
    }
}

/// Settings shared by every subcommand
pub struct Options {
    pub dialect: Option<Dialect>,
    pub memory_size: usize,
}

impl Options {
    /// The explicit dialect, else the one named by the file extension.
    pub fn dialect_for(&self, path: &Path) -> miette::Result<Dialect> {
        if let Some(dialect) = self.dialect {
            return Ok(dialect);
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Dialect::from_extension)
            .ok_or_else(|| {
                miette!(
                    help = "pass --dialect base|alpha|beta",
                    "cannot tell the dialect of {}",
                    path.display()
                )
            })
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DialectArg {
    Base,
    Alpha,
    Beta,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Base => Dialect::Base,
            DialectArg::Alpha => Dialect::Alpha,
            DialectArg::Beta => Dialect::Beta,
        }
    }
}

fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .try_init();
}
