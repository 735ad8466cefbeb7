//! Splitting of a raw input line into an argument vector.
//!
//! There is no quoting, escaping or substitution: a token is any maximal run of
//! characters that are not delimiters.

/// Characters separating arguments: space, tab, carriage return, newline and bell.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

/// Split `line` into its arguments.
///
/// The returned slices borrow from `line`. A line made only of delimiters (or an empty
/// line) produces an empty vector, which the interpreter treats as a no-op.
pub fn split_line(line: &str) -> Vec<&str> {
    line.split(|c: char| DELIMITERS.contains(&c))
        .filter(|token| !token.is_empty())
        .collect()
}
