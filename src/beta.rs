//! Beta: an s-expression surface over the Alpha macro layer.
//!
//! | Beta                     | Alpha          |
//! |--------------------------|----------------|
//! | `(+ n)` `(- n)`          | `+n` `-n`      |
//! | `(> n)` `(< n)`          | `>n` `<n`      |
//! | `(input)` `(output)`     | `,` `.`        |
//! | `(set-to n)`             | `=n`           |
//! | `(add!-relative n)`      | `afn` (`abn` for `-n`) |
//! | `(sub!-relative n)`      | `sfn` (`sbn` for `-n`) |
//! | `(move-relative n)`      | `mfn` (`mbn` for `-n`) |
//! | `(while-n-0 body...)`    | `[body]`       |
//! | `(progn body...)`        | `body`         |
//!
//! Numeric arguments default to 1. The relative functions take a signed
//! distance whose sign picks the direction. A `!` marks functions that
//! consume the current cell's value.

use crate::Error;
use crate::alpha::{Family, MacroToken, Numeral};
use crate::sexpr::SExpr;

/// Every function the compiler knows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Progn,
    WhileNonzero,
    Input,
    Output,
    SetTo,
    AddRelative,
    SubRelative,
    MoveRelative,
    Increment,
    Decrement,
    Right,
    Left,
}

/// Surface names, in lookup order
const FUNCTIONS: &[(&str, Function)] = &[
    ("progn", Function::Progn),
    ("while-n-0", Function::WhileNonzero),
    ("input", Function::Input),
    ("output", Function::Output),
    ("set-to", Function::SetTo),
    ("add!-relative", Function::AddRelative),
    ("sub!-relative", Function::SubRelative),
    ("move-relative", Function::MoveRelative),
    ("+", Function::Increment),
    ("-", Function::Decrement),
    (">", Function::Right),
    ("<", Function::Left),
];

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        FUNCTIONS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|&(_, function)| function)
    }

    pub fn name(self) -> &'static str {
        FUNCTIONS
            .iter()
            .find(|(_, function)| *function == self)
            .map_or("?", |&(name, _)| name)
    }
}

fn invalid(function: Function, arg: &SExpr) -> Error {
    Error::InvalidArgument {
        function: function.name().to_owned(),
        argument: arg.to_string(),
    }
}

/// The optional first argument, which must be an atom.
fn atom_arg(function: Function, args: &[SExpr]) -> Result<Option<&str>, Error> {
    match args.first() {
        None => Ok(None),
        Some(SExpr::Atom(atom)) => Ok(Some(atom.as_str())),
        Some(list) => Err(invalid(function, list)),
    }
}

/// An unsigned count, defaulting to 1.
fn count_arg(function: Function, args: &[SExpr]) -> Result<Numeral<'_>, Error> {
    match atom_arg(function, args)? {
        None => Ok(Numeral::ONE),
        Some(text) => Numeral::parse(text).ok_or_else(|| invalid(function, &args[0])),
    }
}

/// A signed distance, defaulting to 1.
fn distance_arg(function: Function, args: &[SExpr]) -> Result<i64, Error> {
    match atom_arg(function, args)? {
        None => Ok(1),
        Some(text) => text.parse().map_err(|_| invalid(function, &args[0])),
    }
}

fn emit(expr: &SExpr, out: &mut String) -> Result<(), Error> {
    let head = match expr {
        SExpr::Atom(atom) => return Err(Error::ExpectedCall(atom.to_string())),
        SExpr::List(items) => items.first(),
    };
    let function = match head {
        Some(SExpr::Atom(name)) => Function::from_name(name.as_str())
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))?,
        Some(list @ SExpr::List(_)) => return Err(Error::UnknownFunction(list.to_string())),
        None => return Err(Error::UnknownFunction(expr.to_string())),
    };
    let args = expr.tail();

    let token = match function {
        Function::Progn => {
            for arg in args {
                emit(arg, out)?;
            }
            return Ok(());
        }
        Function::WhileNonzero => {
            out.push('[');
            emit(&SExpr::progn(args), out)?;
            out.push(']');
            return Ok(());
        }
        Function::Input => MacroToken::Base(',', 1),
        Function::Output => MacroToken::Base('.', 1),
        // Cells wrap and the cursor clamps, so oversized counts reduce
        Function::SetTo => MacroToken::Set(count_arg(function, args)?.wrapping()),
        Function::AddRelative => MacroToken::relative(Family::Add, distance_arg(function, args)?)?,
        Function::SubRelative => MacroToken::relative(Family::Sub, distance_arg(function, args)?)?,
        Function::MoveRelative => {
            MacroToken::relative(Family::Move, distance_arg(function, args)?)?
        }
        Function::Increment => MacroToken::Base('+', count_arg(function, args)?.wrapping()),
        Function::Decrement => MacroToken::Base('-', count_arg(function, args)?.wrapping()),
        Function::Right => MacroToken::Base('>', count_arg(function, args)?.saturating()),
        Function::Left => MacroToken::Base('<', count_arg(function, args)?.saturating()),
    };

    out.push_str(&token.to_string());
    Ok(())
}

/// Compile a syntax tree into Alpha macro text.
///
/// Nothing is emitted unless the whole tree compiles.
pub fn compile(tree: &SExpr) -> Result<String, Error> {
    let mut out = String::new();
    emit(tree, &mut out)?;
    Ok(out)
}
