//! Tape memory, peephole minimizer and the base-instruction interpreter.
//!
//! The base instruction set is
//!
//! | op  | effect                                         |
//! |-----|------------------------------------------------|
//! | `>` | move the cursor right (clamped at the last cell) |
//! | `<` | move the cursor left (clamped at cell 0)       |
//! | `+` | increment the current cell, wrapping           |
//! | `-` | decrement the current cell, wrapping           |
//! | `[` | jump past the matching `]` if the cell is zero |
//! | `]` | jump back to the matching `[` if it is not     |
//! | `,` | read one character into the current cell       |
//! | `.` | write the current cell as a character          |
//!
//! Every other character is a comment.

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::brackets::{self, Direction, LOOP};
use crate::{Error, MEMORY_SIZE};

const REPLACEMENT: u32 = char::REPLACEMENT_CHARACTER as u32;

/// Fixed-length array of wrapping `u32` cells plus a cursor.
///
/// The cursor always stays within `[0, len)`: moves past either end are
/// clamped, never wrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<u32>,
    ptr: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// A zeroed tape of [`MEMORY_SIZE`] cells with the cursor on cell 0.
    pub fn new() -> Self {
        Self::with_size(MEMORY_SIZE)
    }

    /// A zeroed tape of `size` cells. A size of zero is raised to one.
    pub fn with_size(size: usize) -> Self {
        Memory {
            cells: vec![0; size.max(1)],
            ptr: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn pointer(&self) -> usize {
        self.ptr
    }

    /// Place the cursor, clamping to the last cell.
    pub fn set_pointer(&mut self, ptr: usize) {
        self.ptr = ptr.min(self.cells.len() - 1);
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Value of cell `index`, or `None` past the end of the tape.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.cells.get(index).copied()
    }

    /// Store `value` in cell `index`; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: u32) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
        }
    }

    pub fn current(&self) -> u32 {
        self.cells[self.ptr]
    }

    pub fn set_current(&mut self, value: u32) {
        self.cells[self.ptr] = value;
    }

    fn right(&mut self, n: usize) {
        self.set_pointer(self.ptr.saturating_add(n));
    }

    fn left(&mut self, n: usize) {
        self.ptr = self.ptr.saturating_sub(n);
    }

    fn add(&mut self, n: u32) {
        let cell = &mut self.cells[self.ptr];
        *cell = cell.wrapping_add(n);
    }

    fn sub(&mut self, n: u32) {
        let cell = &mut self.cells[self.ptr];
        *cell = cell.wrapping_sub(n);
    }
}

impl fmt::Display for Memory {
    /// Shows cells up to the cursor or the last non-zero cell, whichever is
    /// further, with the current cell marked: `1 *0* 3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last_nonzero = self.cells.iter().rposition(|&c| c != 0).unwrap_or(0);
        let end = self.ptr.max(last_nonzero);
        for (i, cell) in self.cells[..=end].iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if i == self.ptr {
                write!(f, "*{cell}*")?;
            } else {
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}

/// Collapse runs made only of the two opcodes in `pair`.
///
/// A maximal run of `pair.0` and `pair.1` characters is replaced by the
/// majority opcode repeated by the difference of their counts; `+++--`
/// becomes `+`, `+-` disappears. Any other character ends a run.
pub fn remove_pairs(code: &str, pair: (char, char)) -> String {
    let mut result = String::with_capacity(code.len());
    let (mut firsts, mut seconds) = (0usize, 0usize);

    let flush = |result: &mut String, firsts: &mut usize, seconds: &mut usize| {
        let (op, n) = if *firsts > *seconds {
            (pair.0, *firsts - *seconds)
        } else {
            (pair.1, *seconds - *firsts)
        };
        result.extend(std::iter::repeat_n(op, n));
        *firsts = 0;
        *seconds = 0;
    };

    for c in code.chars() {
        if c == pair.0 {
            firsts += 1;
        } else if c == pair.1 {
            seconds += 1;
        } else {
            flush(&mut result, &mut firsts, &mut seconds);
            result.push(c);
        }
    }
    flush(&mut result, &mut firsts, &mut seconds);
    result
}

/// Fold cancelling `+`/`-` runs, then cancelling `>`/`<` runs.
///
/// Never adds or removes any character other than those four. Cell values
/// wrap, so the `+`/`-` fold is always exact. The `>`/`<` fold is exact
/// unless the cursor would be clamped inside a run: `<>+` at cell 0
/// increments cell 1, its minimized form `+` increments cell 0.
pub fn minimize(code: &str) -> String {
    let minimized = remove_pairs(&remove_pairs(code, ('+', '-')), ('>', '<'));
    tracing::debug!(
        before = code.len(),
        after = minimized.len(),
        "minimized tape program"
    );
    minimized
}

/// Read one UTF-8 encoded character and return its code point.
///
/// A malformed sequence reads as U+FFFD. Only its longest valid prefix is
/// consumed, so the byte that broke it is read again by the next `,`.
fn read_char<R: BufRead>(input: &mut R) -> Result<u32, Error> {
    let lead = peek_byte(input)?.ok_or(Error::InputExhausted)?;
    input.consume(1);

    // Sequence width and the allowed range of the second byte
    let (width, mut low, mut high) = match lead {
        0x00..=0x7F => return Ok(u32::from(lead)),
        0xC2..=0xDF => (2, 0x80, 0xBF),
        0xE0 => (3, 0xA0, 0xBF),
        0xED => (3, 0x80, 0x9F),
        0xE1..=0xEF => (3, 0x80, 0xBF),
        0xF0 => (4, 0x90, 0xBF),
        0xF4 => (4, 0x80, 0x8F),
        0xF1..=0xF3 => (4, 0x80, 0xBF),
        _ => return Ok(REPLACEMENT),
    };

    let mut code = u32::from(lead) & (0x7F >> width);
    for _ in 1..width {
        match peek_byte(input)? {
            Some(b) if (low..=high).contains(&b) => {
                input.consume(1);
                code = (code << 6) | u32::from(b & 0x3F);
                (low, high) = (0x80, 0xBF);
            }
            _ => return Ok(REPLACEMENT),
        }
    }
    Ok(code)
}

fn peek_byte<R: BufRead>(input: &mut R) -> Result<Option<u8>, Error> {
    loop {
        match input.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Run base instructions against `memory`, beginning at instruction `start`
/// of the minimized program.
///
/// Characters produced by `.` are written to `output` as they happen and
/// are also collected into the returned string. Loop brackets are checked
/// before anything runs, so an unbalanced program fails without effects.
pub fn execute<R: BufRead, W: Write>(
    instructions: &str,
    memory: &mut Memory,
    start: usize,
    input: &mut R,
    output: &mut W,
) -> Result<String, Error> {
    let code = minimize(instructions);
    let code = code.as_bytes();

    if let Some(position) = brackets::first_unmatched(code, LOOP) {
        return Err(Error::UnmatchedDelimiter {
            delimiter: char::from(code[position]),
            position,
        });
    }

    let mut produced = String::new();
    let mut pc = start;
    while pc < code.len() {
        match code[pc] {
            b'>' => memory.right(1),
            b'<' => memory.left(1),
            b'+' => memory.add(1),
            b'-' => memory.sub(1),
            b'.' => {
                let c = char::from_u32(memory.current()).unwrap_or(char::REPLACEMENT_CHARACTER);
                write!(output, "{c}")?;
                produced.push(c);
            }
            b',' => {
                output.flush()?;
                let value = read_char(input)?;
                memory.set_current(value);
            }
            b'[' if memory.current() == 0 => {
                pc = jump(code, pc, Direction::Forward)?;
            }
            b']' if memory.current() != 0 => {
                pc = jump(code, pc, Direction::Backward)?;
            }
            _ => {}
        }
        pc += 1;
    }

    output.flush()?;
    Ok(produced)
}

fn jump(code: &[u8], pc: usize, direction: Direction) -> Result<usize, Error> {
    brackets::match_index(code, pc, direction, LOOP).ok_or(Error::UnmatchedDelimiter {
        delimiter: char::from(code[pc]),
        position: pc,
    })
}
