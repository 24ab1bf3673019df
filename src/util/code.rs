use super::{Code, Position};
use once_cell::unsync::OnceCell;

impl<'c> From<&'c str> for Code<'c> {
    fn from(text: &'c str) -> Self {
        Code::new(text)
    }
}

impl<'c> Code<'c> {
    pub fn new(text: &'c str) -> Self {
        Self {
            text,
            value: text.chars().collect(),
            line_breaks: OnceCell::new(),
        }
    }

    /// Length of the input in code points.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The code point at `pointer`, or [None] past the end of the input.
    pub fn char_at(&self, pointer: usize) -> Option<char> {
        self.value.get(pointer).copied()
    }

    /// The input text between the code point offsets `start` and `end`.
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.value[start..end].iter().collect()
    }

    pub fn obtain_line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.value
                .iter()
                .enumerate()
                .filter_map(|(index, c)| if *c == '\n' { Some(index) } else { None })
                .collect()
        })
    }

    pub fn obtain_position(&self, pointer: usize) -> Position {
        let line_breaks = self.obtain_line_breaks();
        let index = match line_breaks.binary_search(&pointer) {
            Ok(index) | Err(index) => index,
        };

        if index == 0 {
            Position::new(1, pointer + 1)
        } else {
            let break_point = line_breaks[index - 1] + 1;
            Position::new(index + 1, pointer - break_point + 1)
        }
    }
}
