//! Paired-delimiter matching.
//!
//! Both the tape interpreter (`[`/`]`) and the s-expression parser
//! (`(`/`)`) need to find the structural partner of a delimiter. The
//! delimiters are ASCII, so scanning works on bytes and every index
//! returned is also a valid `str` slice boundary.

/// An open/close delimiter pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: u8,
    pub close: u8,
}

/// Tape loop brackets
pub const LOOP: Delimiters = Delimiters {
    open: b'[',
    close: b']',
};

/// S-expression parentheses
pub const PAREN: Delimiters = Delimiters {
    open: b'(',
    close: b')',
};

/// Which way to scan from the starting delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From an open delimiter towards its close
    Forward,
    /// From a close delimiter back towards its open
    Backward,
}

/// Find the index of the delimiter structurally matching the one at `index`.
///
/// Scanning `Forward` requires `code[index]` to be `delims.open`; scanning
/// `Backward` requires it to be `delims.close`. Calling with anything else
/// is a programming error. Returns `None` when the scan runs off the end of
/// `code` without the nesting count returning to zero.
pub fn match_index(
    code: &[u8],
    index: usize,
    direction: Direction,
    delims: Delimiters,
) -> Option<usize> {
    let (open, close) = match direction {
        Direction::Forward => (delims.open, delims.close),
        Direction::Backward => (delims.close, delims.open),
    };
    debug_assert_eq!(code.get(index), Some(&open), "not a delimiter at {index}");

    let mut depth = 1usize;
    let mut step = |i: usize| {
        if code[i] == open {
            depth += 1;
        } else if code[i] == close {
            depth -= 1;
        }
        depth == 0
    };

    match direction {
        Direction::Forward => (index + 1..code.len()).find(|&i| step(i)),
        Direction::Backward => (0..index).rev().find(|&i| step(i)),
    }
}

/// Report whether the net nesting depth of `code` returns exactly to zero.
///
/// This is the lenient check used while input is accumulated line by line;
/// it does not reject a close delimiter preceding its open.
pub fn all_matched(code: &str, delims: Delimiters) -> bool {
    let depth = code.bytes().fold(0isize, |depth, b| {
        if b == delims.open {
            depth + 1
        } else if b == delims.close {
            depth - 1
        } else {
            depth
        }
    });
    depth == 0
}

/// Find the first delimiter in `code` that has no partner.
///
/// Unlike [`all_matched`] this rejects a close that appears before any
/// open. Returns the offending byte position.
pub fn first_unmatched(code: &[u8], delims: Delimiters) -> Option<usize> {
    let mut open_positions = Vec::new();
    for (i, &b) in code.iter().enumerate() {
        if b == delims.open {
            open_positions.push(i);
        } else if b == delims.close && open_positions.pop().is_none() {
            return Some(i);
        }
    }
    open_positions.first().copied()
}
