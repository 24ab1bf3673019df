mod code;
mod logger;
mod position;
use once_cell::unsync::OnceCell;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// The line and column information at a code point offset.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A wrapper for an input text addressed by code point offsets, with lazily computed
/// line information.
pub struct Code<'c> {
    pub text: &'c str,
    value: Vec<char>,
    line_breaks: OnceCell<Vec<usize>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign multiple level debugging to the grammar parser and validator.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}
