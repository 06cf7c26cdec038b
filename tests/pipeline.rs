#![expect(clippy::unwrap_used)] // test code OK

use pretty_assertions::assert_eq;
use std::io;
use tapelisp::alpha::{Direction, Family, MacroToken};
use tapelisp::tape::Memory;
use tapelisp::{Dialect, Error, compile, compile_and_run, is_syntactically_complete};

fn run(dialect: Dialect, source: &str, memory: &mut Memory) -> Result<String, Error> {
    compile_and_run(dialect, source, memory, 0, &mut io::empty(), &mut io::sink())
}

#[test]
fn scenario_output_prints_current_cell() {
    let mut memory = Memory::new();
    memory.set_current(65);
    let mut written = Vec::new();
    let output = compile_and_run(
        Dialect::Beta,
        "(output)",
        &mut memory,
        0,
        &mut io::empty(),
        &mut written,
    )
    .unwrap();

    assert_eq!(output, "A");
    assert_eq!(written, b"A");
}

#[test]
fn scenario_set_add_then_read_destination() {
    let mut memory = Memory::new();
    let output = run(
        Dialect::Beta,
        "(progn (set-to 3) (add!-relative 2) (output))",
        &mut memory,
    )
    .unwrap();

    assert_eq!(output, "\0");
    assert_eq!(memory.get(0), Some(0));
    assert_eq!(memory.get(2), Some(3));
    assert_eq!(memory.pointer(), 0);

    let output = run(Dialect::Beta, "(progn (> 2) (output))", &mut memory).unwrap();
    assert_eq!(output, "\u{3}");
    assert_eq!(memory.pointer(), 2);
}

#[test]
fn scenario_nested_head_is_unknown_function() {
    let mut memory = Memory::new();
    let mut written = Vec::new();
    let result = compile_and_run(
        Dialect::Beta,
        "((output) (output))",
        &mut memory,
        0,
        &mut io::empty(),
        &mut written,
    );

    assert_eq!(result, Err(Error::UnknownFunction("(output)".into())));
    assert!(written.is_empty());
    assert_eq!(memory, Memory::new());
}

#[test]
fn scenario_unclosed_loop_fails_before_output() {
    for source in ["[", ".[", "+.["] {
        let mut memory = Memory::new();
        let mut written = Vec::new();
        let result = compile_and_run(
            Dialect::Base,
            source,
            &mut memory,
            0,
            &mut io::empty(),
            &mut written,
        );

        assert!(
            matches!(
                result,
                Err(Error::UnmatchedDelimiter { delimiter: '[', .. })
            ),
            "{source:?}: {result:?}"
        );
        assert!(written.is_empty(), "{source:?}");
    }
}

/// Run one family token from `origin` holding `value`, with `prior` at the
/// destination cell.
fn relative_effect(
    family: Family,
    direction: Direction,
    magnitude: u32,
    value: u32,
    prior: u32,
) -> (Memory, usize) {
    let origin = 5;
    let destination = match direction {
        Direction::Forward => origin + magnitude as usize,
        Direction::Backward => origin - magnitude as usize,
    };
    let token = MacroToken::Family {
        family,
        direction,
        magnitude,
    };

    let mut memory = Memory::with_size(16);
    memory.set_pointer(origin);
    memory.set(origin, value);
    memory.set(destination, prior);
    run(Dialect::Alpha, &token.to_string(), &mut memory).unwrap();
    assert_eq!(memory.pointer(), origin, "{token} moved the cursor");
    (memory, destination)
}

#[test]
fn test_relative_families() {
    let origin = 5;
    for direction in [Direction::Forward, Direction::Backward] {
        for magnitude in 1..=4 {
            let (memory, dest) = relative_effect(Family::Add, direction, magnitude, 7, 2);
            assert_eq!(memory.get(dest), Some(9), "add {direction:?} {magnitude}");
            assert_eq!(memory.get(origin), Some(0));

            let (memory, dest) = relative_effect(Family::Sub, direction, magnitude, 7, 10);
            assert_eq!(memory.get(dest), Some(3), "sub {direction:?} {magnitude}");
            assert_eq!(memory.get(origin), Some(0));

            // Subtraction wraps below zero
            let (memory, dest) = relative_effect(Family::Sub, direction, magnitude, 1, 0);
            assert_eq!(memory.get(dest), Some(u32::MAX));

            let (memory, dest) = relative_effect(Family::Move, direction, magnitude, 7, 40);
            assert_eq!(memory.get(dest), Some(7), "move {direction:?} {magnitude}");
            assert_eq!(memory.get(origin), Some(0));
        }
    }
}

#[test]
fn test_relative_families_leave_other_cells() {
    let (memory, dest) = relative_effect(Family::Move, Direction::Forward, 2, 4, 9);
    for (i, &cell) in memory.cells().iter().enumerate() {
        if i != dest {
            assert_eq!(cell, 0, "cell {i}");
        }
    }
}

#[test]
fn test_dialects_agree() {
    let programs = [
        (Dialect::Base, "[-]+++[->>+<<]>>."),
        (Dialect::Alpha, "=3 af2 >2 ."),
        (
            Dialect::Beta,
            "(progn (set-to 3) (add!-relative 2) (> 2) (output))",
        ),
    ];
    for (dialect, source) in programs {
        let mut memory = Memory::new();
        assert_eq!(run(dialect, source, &mut memory).unwrap(), "\u{3}", "{dialect:?}");
        assert_eq!(memory.get(2), Some(3));
    }
}

#[test]
fn test_compile_lowers_to_base_only() {
    let code = compile(
        Dialect::Beta,
        "(progn (set-to 2) (while-n-0 (- 1) (move-relative -1)) (sub!-relative 3))",
    )
    .unwrap();
    assert!(code.chars().all(|c| "+-<>[],.".contains(c)), "{code}");
    assert_eq!(compile(Dialect::Base, "+ comment .").unwrap(), "+ comment .");
}

#[test]
fn test_input_echo() {
    let mut memory = Memory::new();
    let output = compile_and_run(
        Dialect::Beta,
        "(progn (input) (output) (> 1) (input) (output))",
        &mut memory,
        0,
        &mut "ok".as_bytes(),
        &mut io::sink(),
    )
    .unwrap();
    assert_eq!(output, "ok");

    let result = run(Dialect::Beta, "(input)", &mut Memory::new());
    assert_eq!(result, Err(Error::InputExhausted));
}

#[test]
fn test_syntactic_completeness() {
    let cases = [
        (Dialect::Base, "+[->+<]", true),
        (Dialect::Base, "+[->+<", false),
        (Dialect::Alpha, "=3 [ af1", false),
        (Dialect::Alpha, "(not a delimiter here", true),
        (Dialect::Beta, "(progn (output)", false),
        (Dialect::Beta, "(progn (output))", true),
        (Dialect::Beta, "[", true),
        (Dialect::Beta, "", true),
    ];
    for (dialect, text, expected) in cases {
        assert_eq!(
            is_syntactically_complete(dialect, text),
            expected,
            "{dialect:?} {text:?}"
        );
    }
}

#[test]
fn test_dialect_from_extension() {
    let cases = [
        ("bf", Some(Dialect::Base)),
        ("bfa", Some(Dialect::Alpha)),
        ("bfb", Some(Dialect::Beta)),
        ("rs", None),
        ("", None),
    ];
    for (ext, expected) in cases {
        assert_eq!(Dialect::from_extension(ext), expected, "{ext:?}");
    }
}

#[test]
fn test_errors_leave_memory_usable() {
    let mut memory = Memory::new();
    run(Dialect::Beta, "(set-to 9)", &mut memory).unwrap();
    assert!(run(Dialect::Beta, "(bogus)", &mut memory).is_err());
    assert!(run(Dialect::Base, "]", &mut memory).is_err());
    assert_eq!(memory.current(), 9);

    run(Dialect::Alpha, "+", &mut memory).unwrap();
    assert_eq!(memory.current(), 10);
}

#[test]
fn test_encoded_programs_run() {
    let mut memory = Memory::new();
    let program = tapelisp::encode::looped("Hello");
    assert_eq!(run(Dialect::Base, &program, &mut memory).unwrap(), "Hello\n");
}

#[test]
fn test_large_set_values_wrap_in_every_dialect() {
    let programs = [
        (Dialect::Alpha, "=4294967297"),
        (Dialect::Beta, "(set-to 4294967297)"),
        (Dialect::Beta, "(progn (set-to 4294967296) (+ 4294967297))"),
    ];
    for (dialect, source) in programs {
        let mut memory = Memory::new();
        memory.set_current(9);
        run(dialect, source, &mut memory).unwrap();
        assert_eq!(memory.current(), 1, "{source}");
    }
}
