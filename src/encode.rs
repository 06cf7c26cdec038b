//! Generators of base programs that print a fixed text.

/// Round `code / 10` to the nearest integer, ties to even.
fn tens(code: u32) -> u32 {
    let (q, r) = (code / 10, code % 10);
    match r {
        0..5 => q,
        5 if q % 2 == 0 => q,
        _ => q + 1,
    }
}

/// One cell per character, each built with plain increments, followed by
/// a newline cell and a print loop.
///
/// ```
/// let program = tapelisp::encode::naive("Hi");
/// assert!(program.ends_with("<<[.>]"));
/// ```
pub fn naive(text: &str) -> String {
    let mut program = String::new();
    for c in text.chars() {
        program.extend(std::iter::repeat_n('+', c as usize));
        program.push('>');
    }
    program.push_str(&"+".repeat(10));
    program.push_str(&"<".repeat(text.chars().count()));
    program.push_str("[.>]");
    program
}

/// A shorter encoding that fills cells ten at a time.
///
/// Characters are grouped by their code rounded to tens. Each group is
/// raised to `10 * group` with one counted loop from cell 0, then every
/// cell is nudged to its exact code. A trailing newline is added when the
/// text does not already end with one. Cells start at 1; a code of 0 would
/// cut the print loop short.
pub fn looped(text: &str) -> String {
    let mut codes: Vec<u32> = text.chars().map(u32::from).collect();
    if codes.last() != Some(&u32::from('\n')) {
        codes.push(u32::from('\n'));
    }

    // Highest codes first; among equal codes, later cells first
    let mut cells: Vec<(usize, u32)> = codes
        .into_iter()
        .enumerate()
        .map(|(i, code)| (i + 1, code))
        .collect();
    cells.sort_by_key(|&(_, code)| code);
    cells.reverse();

    let mut program = String::new();
    let mut start = 0;
    while start < cells.len() {
        let group = tens(cells[start].1);
        let end = start
            + cells[start..]
                .iter()
                .take_while(|&&(_, code)| tens(code) == group)
                .count();
        let mut members = cells[start..end].to_vec();
        members.sort_by_key(|&(index, _)| index);
        let base = 10 * group;

        program.push_str(&"+".repeat(group as usize));
        program.push_str("[>");
        let mut last = 1;
        for &(index, _) in &members {
            program.push_str(&">".repeat(index - last));
            program.push_str(&"+".repeat(10));
            last = index;
        }
        program.push_str(&"<".repeat(last));
        program.push_str("-]");

        let mut last = 0;
        for &(index, code) in &members {
            program.push_str(&">".repeat(index - last));
            let op = if code > base { "+" } else { "-" };
            program.push_str(&op.repeat(code.abs_diff(base) as usize));
            last = index;
        }
        program.push_str(&"<".repeat(last));

        start = end;
    }

    program.push_str(">[.>]");
    program
}
