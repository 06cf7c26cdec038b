/// Generate a base program that prints the given text
#[derive(clap::Args)]
pub struct Args {
    text: String,

    #[clap(long, value_enum, default_value = "loop")]
    method: Method,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Method {
    /// One increment per unit of each character code
    Naive,
    /// Cells filled ten at a time by counted loops
    Loop,
}

impl Args {
    pub fn exec(self) -> miette::Result<()> {
        let program = match self.method {
            Method::Naive => tapelisp::encode::naive(&self.text),
            Method::Loop => tapelisp::encode::looped(&self.text),
        };
        println!("{program}");
        Ok(())
    }
}
