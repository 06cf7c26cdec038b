//! tapelisp - a three-layer language pipeline over a minimal tape machine
//!
//! Source text is lowered step by step until only the eight base tape
//! instructions remain, and is then executed against a [`tape::Memory`].
//!
//! ## Layers
//!
//! ```text
//! ;; Beta: s-expressions
//! (progn (set-to 3) (add!-relative 2) (> 2) (output))
//! ```
//!
//! ```text
//! ;; Alpha: macro tokens with numerals and families
//! =3 af2 >2 .
//! ```
//!
//! ```text
//! ;; Base: the tape instructions
//! [-]+++[->>+<<]>>.
//! ```
//!
//! Each layer accepts everything the layer below it accepts: Alpha text may
//! contain plain base instructions, and Beta functions compile to Alpha
//! tokens.
//!
//! ## Modules
//!
//! - `brackets`: paired-delimiter matching shared by the tape and the parser
//! - `tape`: memory, minimizer and interpreter for base instructions
//! - `alpha`: macro tokens, family templates, fixed-point translation
//! - `sexpr`: s-expression parsing into atoms and lists
//! - `beta`: compilation of s-expressions into Alpha tokens
//! - `encode`: generators of base programs that print a given text

use std::fmt;
use std::io::{BufRead, Write};

/// Number of cells in a freshly created tape.
pub const MEMORY_SIZE: usize = 30_000;

/// Cells hold values modulo this number; all cell arithmetic wraps.
pub const CELL_MODULUS: u64 = 1 << 32;

/// Maximum number of whole-text translation passes before the fixed-point
/// driver gives up.
pub const MAX_TRANSLATION_PASSES: usize = 16;

/// Maximum number of family templates a single macro token may unfold into.
pub const MAX_TEMPLATE_EXPANSIONS: usize = 64;

/// Maximum nesting depth accepted by the s-expression parser.
pub const MAX_PARSE_DEPTH: usize = 512;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Nothing but whitespace was given
    Empty,
    /// Extra input found after a complete expression
    TrailingContent,
    /// Expression nesting exceeded [`MAX_PARSE_DEPTH`]
    TooDeeplyNested,
}

/// A parse failure other than an unmatched delimiter.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
        }
    }
}

/// Error types for every stage of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A loop bracket or parenthesis has no structural partner
    UnmatchedDelimiter { delimiter: char, position: usize },
    /// The head of a compiled list names no known function
    UnknownFunction(String),
    /// A bare atom was found where a function call was expected
    ExpectedCall(String),
    /// A function argument is not usable (wrong shape or not a numeral)
    InvalidArgument { function: String, argument: String },
    /// A numeral is too large for an opcode that cannot reduce it
    NumeralOutOfRange(String),
    /// Macro translation kept changing past the pass limit
    NoFixedPoint { limit: usize },
    /// An input instruction ran with no input left
    InputExhausted,
    /// Reading input or writing output failed
    Io(String),
    Parse(ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnmatchedDelimiter {
                delimiter,
                position,
            } => write!(f, "Unmatched delimiter '{delimiter}' at position {position}"),
            Error::UnknownFunction(name) => write!(f, "Unknown function: {name}"),
            Error::ExpectedCall(atom) => {
                write!(f, "Expected a function call, found atom: {atom}")
            }
            Error::InvalidArgument { function, argument } => {
                write!(f, "Invalid argument to {function}: {argument}")
            }
            Error::NumeralOutOfRange(text) => write!(f, "Numeral out of range: {text}"),
            Error::NoFixedPoint { limit } => {
                write!(f, "Macro translation did not reach a fixed point within {limit} steps")
            }
            Error::InputExhausted => write!(f, "Input exhausted"),
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
            Error::Parse(e) => write!(f, "ParseError: {}", e.message),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// Surface language of a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Raw tape instructions
    Base,
    /// Macro layer: numerals, `=` and relative families
    Alpha,
    /// S-expression layer
    #[cfg(feature = "sexpr")]
    Beta,
}

impl Dialect {
    /// Guess the dialect from a file extension (`bf`, `bfa`, `bfb`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "bf" | "b" => Some(Dialect::Base),
            "bfa" => Some(Dialect::Alpha),
            #[cfg(feature = "sexpr")]
            "bfb" | "lisp" => Some(Dialect::Beta),
            _ => None,
        }
    }

    /// The structural delimiter pair of this dialect
    pub fn delimiters(self) -> brackets::Delimiters {
        match self {
            Dialect::Base | Dialect::Alpha => brackets::LOOP,
            #[cfg(feature = "sexpr")]
            Dialect::Beta => brackets::PAREN,
        }
    }
}

/// Lower `source` to base tape instructions.
pub fn compile(dialect: Dialect, source: &str) -> Result<String, Error> {
    match dialect {
        Dialect::Base => Ok(source.to_owned()),
        Dialect::Alpha => alpha::translate_to_base(source),
        #[cfg(feature = "sexpr")]
        Dialect::Beta => {
            let tree = sexpr::parse(source)?;
            let tokens = beta::compile(&tree)?;
            tracing::debug!(tokens = %tokens, "compiled s-expression to macro tokens");
            alpha::translate_to_base(&tokens)
        }
    }
}

/// Compile `source` and run it on `memory`, starting at instruction
/// `start`. Output is streamed to `output` and also returned; `memory` is
/// left mutated so a session can keep using it.
pub fn compile_and_run<R: BufRead, W: Write>(
    dialect: Dialect,
    source: &str,
    memory: &mut tape::Memory,
    start: usize,
    input: &mut R,
    output: &mut W,
) -> Result<String, Error> {
    let code = compile(dialect, source)?;
    tape::execute(&code, memory, start, input, output)
}

/// Check whether every structural delimiter in `partial` is balanced.
///
/// Used by interactive front ends to keep reading lines until a complete
/// unit has been entered.
pub fn is_syntactically_complete(dialect: Dialect, partial: &str) -> bool {
    brackets::all_matched(partial, dialect.delimiters())
}

pub mod alpha;
pub mod brackets;
pub mod encode;
pub mod tape;

#[cfg(feature = "sexpr")]
pub mod beta;

#[cfg(feature = "sexpr")]
pub mod sexpr;
