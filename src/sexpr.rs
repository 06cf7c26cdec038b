//! S-expression parsing.
//!
//! The notation is fully parenthesized prefix lists of space-separated
//! atoms: `(progn (set-to 3) (add!-relative 2))`. Atoms are opaque symbol
//! strings; numerals stay atoms until a compiler gives them meaning.
//!
//! Parsing works top-down on the text: the outer parentheses are stripped,
//! then top-level children are split off one at a time, a nested list being
//! delimited with [`crate::brackets::match_index`]. Children are parsed
//! recursively.

use std::fmt;

use nom::{IResult, Parser, bytes::complete::take_till1};

use crate::brackets::{self, Direction, PAREN};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// An immutable symbol. Two atoms are equal when their text is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom(String);

impl Atom {
    pub fn new(text: impl Into<String>) -> Self {
        Atom(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A syntax tree node: an atom or a list of nodes. The empty list is `()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExpr {
    Atom(Atom),
    List(Vec<SExpr>),
}

impl SExpr {
    /// The empty list
    pub fn nil() -> Self {
        SExpr::List(Vec::new())
    }

    pub fn atom(text: impl Into<String>) -> Self {
        SExpr::Atom(Atom::new(text))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, SExpr::List(items) if items.is_empty())
    }

    /// First element of a non-empty list
    pub fn head(&self) -> Option<&SExpr> {
        match self {
            SExpr::List(items) => items.first(),
            SExpr::Atom(_) => None,
        }
    }

    /// Every element after the first; empty for atoms and `()`
    pub fn tail(&self) -> &[SExpr] {
        match self {
            SExpr::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    /// Wrap `body` as `(progn body...)`.
    pub fn progn(body: &[SExpr]) -> Self {
        let mut items = Vec::with_capacity(body.len() + 1);
        items.push(SExpr::atom("progn"));
        items.extend_from_slice(body);
        SExpr::List(items)
    }
}

impl From<&str> for SExpr {
    fn from(text: &str) -> Self {
        SExpr::atom(text)
    }
}

impl<T: Into<SExpr>> From<Vec<T>> for SExpr {
    fn from(items: Vec<T>) -> Self {
        SExpr::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExpr::Atom(atom) => write!(f, "{atom}"),
            SExpr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Replace newlines, tabs and carriage returns by spaces and trim.
fn normalize(text: &str) -> String {
    text.replace(['\n', '\t', '\r'], " ").trim().to_owned()
}

/// Atom text: everything up to a space or a parenthesis.
fn atom_text(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c == ' ' || c == '(' || c == ')').parse(input)
}

/// Split the inside of a list into the source text of its children.
fn split_children(mut inner: &str, offset: usize) -> Result<Vec<(&str, usize)>, Error> {
    let mut children = Vec::new();
    let mut position = offset;

    loop {
        let trimmed = inner.trim_start_matches(' ');
        position += inner.len() - trimmed.len();
        inner = trimmed;
        if inner.is_empty() {
            return Ok(children);
        }

        let len = if inner.starts_with('(') {
            let close = brackets::match_index(inner.as_bytes(), 0, Direction::Forward, PAREN)
                .ok_or(Error::UnmatchedDelimiter {
                    delimiter: '(',
                    position,
                })?;
            close + 1
        } else {
            match atom_text(inner) {
                Ok((_, atom)) => atom.len(),
                Err(_) => {
                    return Err(Error::UnmatchedDelimiter {
                        delimiter: ')',
                        position,
                    });
                }
            }
        };

        children.push((&inner[..len], position));
        inner = &inner[len..];
        position += len;
    }
}

fn parse_at(text: &str, offset: usize, depth: usize) -> Result<SExpr, Error> {
    if depth >= MAX_PARSE_DEPTH {
        return Err(ParseError::new(
            ParseErrorKind::TooDeeplyNested,
            format!("Expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
        )
        .into());
    }

    if !text.starts_with('(') {
        return match atom_text(text) {
            Ok(("", atom)) => Ok(SExpr::atom(atom)),
            Ok((rest, _)) => Err(trailing(rest)),
            Err(_) => Err(Error::UnmatchedDelimiter {
                delimiter: ')',
                position: offset,
            }),
        };
    }

    let close = brackets::match_index(text.as_bytes(), 0, Direction::Forward, PAREN).ok_or(
        Error::UnmatchedDelimiter {
            delimiter: '(',
            position: offset,
        },
    )?;
    if close + 1 < text.len() {
        return Err(trailing(&text[close + 1..]));
    }

    split_children(&text[1..close], offset + 1)?
        .into_iter()
        .map(|(child, position)| parse_at(child, position, depth + 1))
        .collect::<Result<Vec<_>, _>>()
        .map(SExpr::List)
}

fn trailing(rest: &str) -> Error {
    ParseError::new(
        ParseErrorKind::TrailingContent,
        format!("Unexpected remaining input: '{}'", rest.trim()),
    )
    .into()
}

/// Parse one s-expression.
///
/// `()` (with any interior whitespace) is the empty list; text not
/// starting with `(` is a single atom. Positions in errors refer to the
/// whitespace-normalized text.
pub fn parse(text: &str) -> Result<SExpr, Error> {
    let text = normalize(text);
    if text.is_empty() {
        return Err(ParseError::new(ParseErrorKind::Empty, "Unexpected end of input").into());
    }
    parse_at(&text, 0, 0)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(items: Vec<SExpr>) -> SExpr {
        SExpr::List(items)
    }

    fn a(text: &str) -> SExpr {
        SExpr::atom(text)
    }

    #[derive(Debug)]
    enum Expect {
        Tree(SExpr),
        Unmatched(char),
        Kind(ParseErrorKind),
    }
    use Expect::*;

    #[test]
    fn test_parse_comprehensive() {
        let cases = vec![
            ("()", Tree(SExpr::nil())),
            ("(  )", Tree(SExpr::nil())),
            ("(\n\t)", Tree(SExpr::nil())),
            ("output", Tree(a("output"))),
            ("  -12  ", Tree(a("-12"))),
            ("(output)", Tree(list(vec![a("output")]))),
            ("(+ 3)", Tree(list(vec![a("+"), a("3")]))),
            (
                "(progn (set-to 3) (add!-relative 2) (output))",
                Tree(list(vec![
                    a("progn"),
                    list(vec![a("set-to"), a("3")]),
                    list(vec![a("add!-relative"), a("2")]),
                    list(vec![a("output")]),
                ])),
            ),
            (
                "(while-n-0\n\t(- 1)\n\t(> 1))",
                Tree(list(vec![
                    a("while-n-0"),
                    list(vec![a("-"), a("1")]),
                    list(vec![a(">"), a("1")]),
                ])),
            ),
            ("(())", Tree(list(vec![SExpr::nil()]))),
            ("((a) b)", Tree(list(vec![list(vec![a("a")]), a("b")]))),
            // Parentheses end an atom even without a space
            ("(a(b)c)", Tree(list(vec![a("a"), list(vec![a("b")]), a("c")]))),
            ("(a   b)", Tree(list(vec![a("a"), a("b")]))),
            // Errors
            ("(output", Unmatched('(')),
            ("(progn (output)", Unmatched('(')),
            ("((a) (b)", Unmatched('(')),
            (")", Unmatched(')')),
            ("", Kind(ParseErrorKind::Empty)),
            ("   \n", Kind(ParseErrorKind::Empty)),
            ("(a) (b)", Kind(ParseErrorKind::TrailingContent)),
            ("(a))", Kind(ParseErrorKind::TrailingContent)),
            ("a b", Kind(ParseErrorKind::TrailingContent)),
        ];

        for (i, (input, expected)) in cases.into_iter().enumerate() {
            let result = parse(input);
            match (result, expected) {
                (Ok(tree), Tree(expected)) => assert_eq!(tree, expected, "case #{}", i + 1),
                (Err(Error::UnmatchedDelimiter { delimiter, .. }), Unmatched(expected)) => {
                    assert_eq!(delimiter, expected, "case #{}", i + 1)
                }
                (Err(Error::Parse(e)), Kind(kind)) => assert_eq!(e.kind, kind, "case #{}", i + 1),
                (result, expected) => {
                    panic!("case #{} {input:?}: expected {expected:?}, got {result:?}", i + 1)
                }
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let inputs = [
            "()",
            "atom",
            "(output)",
            "(progn (set-to 3) (add!-relative 2) (output))",
            "(while-n-0 (- 1) (> 1) (while-n-0 (+ 2)))",
            "((a (b (c))) () d)",
        ];

        for input in inputs {
            let tree = parse(input).unwrap();
            let rendered = tree.to_string();
            assert_eq!(rendered, input);
            assert_eq!(parse(&rendered).unwrap(), tree);
        }
    }

    #[test]
    fn test_depth_limit() {
        let under = format!(
            "{}x{}",
            "(".repeat(MAX_PARSE_DEPTH - 1),
            ")".repeat(MAX_PARSE_DEPTH - 1)
        );
        assert!(parse(&under).is_ok());

        let over = format!("{}x{}", "(".repeat(MAX_PARSE_DEPTH), ")".repeat(MAX_PARSE_DEPTH));
        match parse(&over) {
            Err(Error::Parse(e)) => assert_eq!(e.kind, ParseErrorKind::TooDeeplyNested),
            other => panic!("expected depth error, got {other:?}"),
        }
    }

    #[test]
    fn test_head_and_tail() {
        let tree = parse("(set-to 3 extra)").unwrap();
        assert_eq!(tree.head(), Some(&a("set-to")));
        assert_eq!(tree.tail(), &[a("3"), a("extra")]);
        assert_eq!(SExpr::nil().head(), None);
        assert!(SExpr::nil().tail().is_empty());
        assert!(SExpr::nil().is_nil());
        assert_eq!(
            SExpr::progn(tree.tail()),
            SExpr::from(vec!["progn", "3", "extra"])
        );
    }
}
