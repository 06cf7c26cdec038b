//! Alpha: a macro layer over the base tape instructions.
//!
//! Every base instruction accepts a decimal argument that repeats it:
//! `+3` is `+++` and `>5` is `>>>>>`. A missing argument means 1.
//! Numerals may be any length: arguments of `+`, `-` and `=` are taken
//! modulo 2^32 and cursor moves saturate at `u32::MAX`.
//!
//! `=N` sets the current cell to `N` (`[-]` followed by `N` increments).
//!
//! The remaining commands are *families*, a letter followed by a direction
//! (`f` forward, `b` backward) and a distance:
//!
//! - `afN` / `abN` add the current cell onto the cell `N` ahead / behind,
//!   leaving the current cell zero
//! - `sfN` / `sbN` subtract it instead
//! - `mfN` / `mbN` move it: zero the target first, then add onto it
//!
//! Characters that start no token are ignored, so whitespace and prose can
//! be used freely as comments.
//!
//! Family templates are data. A template may refer to another family (`m`
//! is defined through `a`), so each token is unfolded through a work-list
//! until only base text is left, and the whole translation is repeated
//! until it reaches a fixed point.

use std::fmt;

use nom::{
    IResult, Parser,
    bytes::complete::take_while,
    character::complete::digit1,
    combinator::opt,
    sequence::preceded,
};

use crate::{Error, MAX_TEMPLATE_EXPANSIONS, MAX_TRANSLATION_PASSES};

/// The eight base opcodes
pub const BASE_OPCODES: &str = "+-<>[],.";

/// Cell-setting extension
pub const SET: char = '=';

/// Relative command families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Add the current cell onto another, zeroing it
    Add,
    /// Subtract the current cell from another, zeroing it
    Sub,
    /// Replace another cell with the current one, zeroing it
    Move,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Add, Family::Sub, Family::Move];

    pub fn letter(self) -> char {
        match self {
            Family::Add => 'a',
            Family::Sub => 's',
            Family::Move => 'm',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.letter() == c)
    }
}

/// Direction of a family command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn letter(self) -> char {
        match self {
            Direction::Forward => 'f',
            Direction::Backward => 'b',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'f' => Some(Direction::Forward),
            'b' => Some(Direction::Backward),
            _ => None,
        }
    }

    /// Positive distances go forward; zero and negative go backward.
    pub fn from_sign(n: i64) -> Self {
        if n > 0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

/// One element of a family template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Base text emitted as is
    Literal(&'static str),
    /// A base opcode repeated by the token's argument
    Repeat(char),
    /// Another family, in the given direction, with the same argument
    Family(Family, Direction),
}

/// A parametrized skeleton for one (family, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template(&'static [Step]);

const ADD_FORWARD: &[Step] = &[
    Step::Literal("[-"),
    Step::Repeat('>'),
    Step::Literal("+"),
    Step::Repeat('<'),
    Step::Literal("]"),
];
const ADD_BACKWARD: &[Step] = &[
    Step::Literal("[-"),
    Step::Repeat('<'),
    Step::Literal("+"),
    Step::Repeat('>'),
    Step::Literal("]"),
];
const SUB_FORWARD: &[Step] = &[
    Step::Literal("[-"),
    Step::Repeat('>'),
    Step::Literal("-"),
    Step::Repeat('<'),
    Step::Literal("]"),
];
const SUB_BACKWARD: &[Step] = &[
    Step::Literal("[-"),
    Step::Repeat('<'),
    Step::Literal("-"),
    Step::Repeat('>'),
    Step::Literal("]"),
];
const MOVE_FORWARD: &[Step] = &[
    Step::Repeat('>'),
    Step::Literal("[-]"),
    Step::Repeat('<'),
    Step::Family(Family::Add, Direction::Forward),
];
const MOVE_BACKWARD: &[Step] = &[
    Step::Repeat('<'),
    Step::Literal("[-]"),
    Step::Repeat('>'),
    Step::Family(Family::Add, Direction::Backward),
];

impl Template {
    pub fn of(family: Family, direction: Direction) -> Self {
        Template(match (family, direction) {
            (Family::Add, Direction::Forward) => ADD_FORWARD,
            (Family::Add, Direction::Backward) => ADD_BACKWARD,
            (Family::Sub, Direction::Forward) => SUB_FORWARD,
            (Family::Sub, Direction::Backward) => SUB_BACKWARD,
            (Family::Move, Direction::Forward) => MOVE_FORWARD,
            (Family::Move, Direction::Backward) => MOVE_BACKWARD,
        })
    }

    pub fn steps(self) -> &'static [Step] {
        self.0
    }
}

impl fmt::Display for Template {
    /// Macro-text form with `*` standing for the argument: `>*[-]<*af*`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.0 {
            match step {
                Step::Literal(text) => write!(f, "{text}")?,
                Step::Repeat(op) => write!(f, "{op}*")?,
                Step::Family(family, direction) => {
                    write!(f, "{}{}*", family.letter(), direction.letter())?
                }
            }
        }
        Ok(())
    }
}

/// A single Alpha token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroToken {
    /// A base opcode and its repeat count; a count of 1 renders bare
    Base(char, u32),
    /// `=N`
    Set(u32),
    Family {
        family: Family,
        direction: Direction,
        magnitude: u32,
    },
}

impl MacroToken {
    /// Build a family token from a signed distance.
    ///
    /// The sign picks the direction, the absolute value becomes the
    /// magnitude: `relative(Family::Add, -3)` is `ab3`.
    pub fn relative(family: Family, distance: i64) -> Result<Self, Error> {
        let magnitude = u32::try_from(distance.unsigned_abs())
            .map_err(|_| Error::NumeralOutOfRange(distance.to_string()))?;
        Ok(MacroToken::Family {
            family,
            direction: Direction::from_sign(distance),
            magnitude,
        })
    }
}

impl fmt::Display for MacroToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroToken::Base(op, 1) => write!(f, "{op}"),
            MacroToken::Base(op, n) => write!(f, "{op}{n}"),
            MacroToken::Set(n) => write!(f, "{SET}{n}"),
            MacroToken::Family {
                family,
                direction,
                magnitude,
            } => write!(f, "{}{}{magnitude}", family.letter(), direction.letter()),
        }
    }
}

fn is_token_start(c: char) -> bool {
    BASE_OPCODES.contains(c) || c == SET || Family::from_letter(c).is_some()
}

/// Skip characters that are neither digits nor token starts, then take
/// the digits that follow, if any.
fn numeral(input: &str) -> IResult<&str, Option<&str>> {
    preceded(
        take_while(|c: char| !c.is_ascii_digit() && !is_token_start(c)),
        opt(digit1),
    )
    .parse(input)
}

/// A decimal argument of any length.
///
/// How a numeral too large for a cell is read depends on the opcode: cell
/// arithmetic wraps, cursor moves clamp, everything else must be exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numeral<'a>(&'a str);

impl Numeral<'static> {
    /// The value of a missing argument
    pub const ONE: Numeral<'static> = Numeral("1");
}

impl<'a> Numeral<'a> {
    /// Accept a non-empty run of ASCII digits.
    pub fn parse(text: &'a str) -> Option<Self> {
        (!text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())).then_some(Numeral(text))
    }

    pub fn as_str(self) -> &'a str {
        self.0
    }

    fn digits(self) -> impl Iterator<Item = u32> + 'a {
        self.0.bytes().map(|b| u32::from(b - b'0'))
    }

    /// The value modulo 2^32
    pub fn wrapping(self) -> u32 {
        self.digits()
            .fold(0u32, |acc, d| acc.wrapping_mul(10).wrapping_add(d))
    }

    /// The value, capped at `u32::MAX`
    pub fn saturating(self) -> u32 {
        self.digits()
            .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d))
    }

    /// The value, or [`Error::NumeralOutOfRange`] if it does not fit.
    pub fn exact(self) -> Result<u32, Error> {
        self.0
            .parse()
            .map_err(|_| Error::NumeralOutOfRange(self.0.to_owned()))
    }
}

/// Read the argument following a token. A missing numeral means 1.
fn argument(input: &str) -> (&str, Numeral<'_>) {
    match numeral(input) {
        Ok((rest, Some(digits))) => (rest, Numeral(digits)),
        Ok((rest, None)) => (rest, Numeral::ONE),
        Err(_) => (input, Numeral::ONE),
    }
}

/// Repeat count of a base opcode's argument.
fn repeat_count(op: char, n: Numeral<'_>) -> Result<u32, Error> {
    match op {
        '+' | '-' => Ok(n.wrapping()),
        '>' | '<' => Ok(n.saturating()),
        _ => n.exact(),
    }
}

/// Looks up the steps of a family template.
type TemplateTable = fn(Family, Direction) -> Template;

/// Unfold a family token into base text through an explicit work-list.
fn expand_family(
    templates: TemplateTable,
    family: Family,
    direction: Direction,
    magnitude: u32,
    out: &mut String,
) -> Result<(), Error> {
    if magnitude == 0 {
        // A transfer onto the current cell itself has no meaning
        return Ok(());
    }

    let n = magnitude as usize;
    let mut expansions = 1;
    let mut pending: Vec<Step> = templates(family, direction)
        .steps()
        .iter()
        .rev()
        .copied()
        .collect();

    while let Some(step) = pending.pop() {
        match step {
            Step::Literal(text) => out.push_str(text),
            Step::Repeat(op) => out.extend(std::iter::repeat_n(op, n)),
            Step::Family(family, direction) => {
                expansions += 1;
                if expansions > MAX_TEMPLATE_EXPANSIONS {
                    return Err(Error::NoFixedPoint {
                        limit: MAX_TEMPLATE_EXPANSIONS,
                    });
                }
                pending.extend(templates(family, direction).steps().iter().rev());
            }
        }
    }
    Ok(())
}

/// One left-to-right translation pass over `source`.
pub fn translate(source: &str) -> Result<String, Error> {
    translate_with(Template::of, source)
}

fn translate_with(templates: TemplateTable, source: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        let after = &rest[c.len_utf8()..];

        if BASE_OPCODES.contains(c) {
            let (next, n) = argument(after);
            out.extend(std::iter::repeat_n(c, repeat_count(c, n)? as usize));
            rest = next;
        } else if c == SET {
            let (next, n) = argument(after);
            out.push_str("[-]");
            out.extend(std::iter::repeat_n('+', n.wrapping() as usize));
            rest = next;
        } else if let Some(family) = Family::from_letter(c)
            && let Some(direction) = after.chars().next().and_then(Direction::from_letter)
        {
            let (next, n) = argument(&after[1..]);
            let n = n.exact()?;
            tracing::trace!(family = ?family, direction = ?direction, n, "expanding family");
            expand_family(templates, family, direction, n, &mut out)?;
            rest = next;
        } else {
            rest = after;
        }
    }

    Ok(out)
}

/// Translate until the output no longer changes.
///
/// Fails with [`Error::NoFixedPoint`] after [`MAX_TRANSLATION_PASSES`]
/// passes.
pub fn fixed_point_translation(source: &str) -> Result<String, Error> {
    fixed_point_with(Template::of, source)
}

fn fixed_point_with(templates: TemplateTable, source: &str) -> Result<String, Error> {
    let mut current = translate_with(templates, source)?;
    for pass in 1..MAX_TRANSLATION_PASSES {
        let next = translate_with(templates, &current)?;
        if next == current {
            tracing::debug!(passes = pass + 1, len = current.len(), "reached fixed point");
            return Ok(current);
        }
        current = next;
    }
    Err(Error::NoFixedPoint {
        limit: MAX_TRANSLATION_PASSES,
    })
}

/// Lower Alpha text to base instructions.
pub fn translate_to_base(tokens: &str) -> Result<String, Error> {
    fixed_point_translation(tokens)
}
