//! A hand-written recursive descent parser for the RFC 5234 §4 meta-grammar.
//!
//! The parser works on code point offsets through [Code] and threads the moved pointer
//! through each parsing function.
//! Backtracking happens at two choice points: between a rule and a blank/comment line at
//! the top level, and before each further repetition inside a concatenation.

use crate::element::MAX_CODE_POINT;
use crate::util::Code;
use crate::{Element, Encoding, Grammar, GrammarParser, ParserError, ParserOptions, Radix, Rule};
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

#[cfg(test)]
mod __tests__;

/// Rules collected during a parse, with the bookkeeping for `=/` folding.
struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleSet {
    fn new() -> Self {
        Self {
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn define(
        &mut self,
        name: String,
        element: Arc<Element>,
        incremental: bool,
        pointer: usize,
    ) -> Result<(), ParserError> {
        let key = name.to_ascii_lowercase();
        match self.index.get(&key).copied() {
            Some(existing_index) => {
                if !incremental {
                    return Err(ParserError::new(
                        pointer,
                        format!("Rule '{}' is already defined.", name),
                    ));
                }
                let existing = self.rules[existing_index].element.clone();
                let mut branches = match existing.as_ref() {
                    Element::Alternation(children) => children.clone(),
                    _ => vec![existing],
                };
                branches.push(element);
                self.rules[existing_index].element = Arc::new(Element::Alternation(branches));
            }
            None => {
                if incremental {
                    return Err(ParserError::new(
                        pointer,
                        format!("Incremental alternative for undefined rule '{}'.", name),
                    ));
                }
                self.index.insert(key, self.rules.len());
                self.rules.push(Rule { name, element });
            }
        }
        Ok(())
    }
}

impl GrammarParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse ABNF grammar text into a [Grammar].
    ///
    /// Text consisting only of blank and comment lines parses to an empty grammar;
    /// validating against an empty grammar then fails.
    pub fn parse(&self, text: &str) -> Result<Grammar, ParserError> {
        let code = Code::new(text);
        self.parse_rule_list(&code).map_err(|mut err| {
            let position = code.obtain_position(err.pointer);
            write!(err.message, "\nFailed to parse grammar at {}.", position).unwrap();
            err
        })
    }

    /// `rulelist = 1*( rule / (*c-wsp c-nl) )`
    fn parse_rule_list(&self, code: &Code) -> Result<Grammar, ParserError> {
        let mut rule_set = RuleSet::new();
        let mut pointer = 0;
        while pointer < code.len() {
            if let Some(next) = self.try_blank_line(code, pointer)? {
                pointer = next;
                continue;
            }
            pointer = self.parse_rule(code, pointer, &mut rule_set)?;
        }
        Ok(Grammar::from_rule_list(rule_set.rules))
    }

    /// The `(*c-wsp c-nl)` branch of the rule list; [None] means the line must be a rule.
    fn try_blank_line(&self, code: &Code, pointer: usize) -> Result<Option<usize>, ParserError> {
        let p = self.skip_c_wsp(code, pointer)?;
        if let Some(next) = self.try_c_nl(code, p)? {
            return Ok(Some(next));
        }
        if !self.options.allow_omitting_final_newline {
            return Ok(None);
        }
        if p >= code.len() && p > pointer {
            return Ok(Some(p));
        }
        // A comment on the last line of input with no trailing newline.
        if code.char_at(p) == Some(';') {
            let q = self.scan_comment(code, p)?;
            if q >= code.len() {
                return Ok(Some(q));
            }
        }
        Ok(None)
    }

    /// `rule = rulename defined-as elements c-nl`
    fn parse_rule(
        &self,
        code: &Code,
        pointer: usize,
        rule_set: &mut RuleSet,
    ) -> Result<usize, ParserError> {
        let (name, p) = self.parse_rule_name(code, pointer)?;
        let (incremental, p) = self.parse_defined_as(code, p)?;
        let (element, p) = self.parse_alternation(code, p)?;
        let p = self.skip_c_wsp(code, p)?;
        let p = self.parse_rule_end(code, p)?;
        rule_set.define(name, element, incremental, pointer)?;
        Ok(p)
    }

    /// `rulename = ALPHA *(ALPHA / DIGIT / "-")`
    fn parse_rule_name(&self, code: &Code, pointer: usize) -> Result<(String, usize), ParserError> {
        match code.char_at(pointer) {
            Some(c) if c.is_ascii_alphabetic() => {
                let mut name = String::from(c);
                let mut p = pointer + 1;
                while let Some(c) = code.char_at(p) {
                    if c.is_ascii_alphanumeric() || c == '-' {
                        name.push(c);
                        p += 1;
                    } else {
                        break;
                    }
                }
                Ok((name, p))
            }
            _ => Err(ParserError::new(pointer, "Expected a rule name.".into())),
        }
    }

    /// `defined-as = *c-wsp ("=" / "=/") *c-wsp`
    fn parse_defined_as(&self, code: &Code, pointer: usize) -> Result<(bool, usize), ParserError> {
        let p = self.skip_c_wsp(code, pointer)?;
        match code.char_at(p) {
            Some('=') => {
                let (incremental, p) = if code.char_at(p + 1) == Some('/') {
                    (true, p + 2)
                } else {
                    (false, p + 1)
                };
                Ok((incremental, self.skip_c_wsp(code, p)?))
            }
            _ => Err(ParserError::new(
                p,
                "Expected '=' or '=/' after the rule name.".into(),
            )),
        }
    }

    /// `alternation = concatenation *(*c-wsp "/" *c-wsp concatenation)`
    fn parse_alternation(
        &self,
        code: &Code,
        pointer: usize,
    ) -> Result<(Arc<Element>, usize), ParserError> {
        let (first, mut p) = self.parse_concatenation(code, pointer)?;
        let mut children = vec![first];
        loop {
            let q = self.skip_c_wsp(code, p)?;
            if code.char_at(q) != Some('/') {
                break;
            }
            let q = self.skip_c_wsp(code, q + 1)?;
            let (child, q) = self.parse_concatenation(code, q)?;
            children.push(child);
            p = q;
        }
        Ok((collapse(children, Element::Alternation), p))
    }

    /// `concatenation = repetition *(1*c-wsp repetition)`
    fn parse_concatenation(
        &self,
        code: &Code,
        pointer: usize,
    ) -> Result<(Arc<Element>, usize), ParserError> {
        let (first, mut p) = self.parse_repetition(code, pointer)?;
        let mut children = vec![first];
        loop {
            let q = self.skip_c_wsp(code, p)?;
            if q == p {
                break;
            }
            match code.char_at(q) {
                Some(c) if starts_element(c) => {
                    let (child, q) = self.parse_repetition(code, q)?;
                    children.push(child);
                    p = q;
                }
                _ => break,
            }
        }
        Ok((collapse(children, Element::Concatenation), p))
    }

    /// `repetition = [repeat] element`
    fn parse_repetition(
        &self,
        code: &Code,
        pointer: usize,
    ) -> Result<(Arc<Element>, usize), ParserError> {
        let (repeat, p) = self.parse_repeat(code, pointer)?;
        let (element, p) = self.parse_element(code, p)?;
        match repeat {
            None => Ok((element, p)),
            Some((at_least, at_most)) => Ok((
                Arc::new(Element::Repetition {
                    element,
                    at_least,
                    at_most,
                }),
                p,
            )),
        }
    }

    /// `repeat = 1*DIGIT / (*DIGIT "*" *DIGIT)`
    ///
    /// A bare integer means an exact count; a missing bound beside `*` means 0 below
    /// and unbounded above.
    fn parse_repeat(
        &self,
        code: &Code,
        pointer: usize,
    ) -> Result<(Option<(usize, Option<usize>)>, usize), ParserError> {
        let (first, p) = self.scan_integer(code, pointer)?;
        if code.char_at(p) == Some('*') {
            let (second, q) = self.scan_integer(code, p + 1)?;
            let at_least = first.unwrap_or(0);
            if let Some(at_most) = second {
                if at_least > at_most {
                    return Err(ParserError::new(
                        pointer,
                        format!(
                            "Lower repetition bound {} exceeds upper bound {}.",
                            at_least, at_most
                        ),
                    ));
                }
            }
            Ok((Some((at_least, second)), q))
        } else {
            match first {
                Some(count) => Ok((Some((count, Some(count))), p)),
                None => Ok((None, pointer)),
            }
        }
    }

    fn scan_integer(
        &self,
        code: &Code,
        pointer: usize,
    ) -> Result<(Option<usize>, usize), ParserError> {
        let mut digits = String::new();
        let mut p = pointer;
        while let Some(c) = code.char_at(p) {
            if c.is_ascii_digit() {
                digits.push(c);
                p += 1;
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Ok((None, pointer));
        }
        match digits.parse::<usize>() {
            Ok(count) => Ok((Some(count), p)),
            Err(_) => Err(ParserError::new(
                pointer,
                format!("Repetition count '{}' is out of range.", digits),
            )),
        }
    }

    /// `element = rulename / group / option / char-val / num-val`
    fn parse_element(
        &self,
        code: &Code,
        pointer: usize,
    ) -> Result<(Arc<Element>, usize), ParserError> {
        match code.char_at(pointer) {
            Some(c) if c.is_ascii_alphabetic() => {
                let (name, p) = self.parse_rule_name(code, pointer)?;
                Ok((Arc::new(Element::RuleRef(name)), p))
            }
            Some('(') => {
                // A group is transparent: it yields the enclosed alternation unwrapped.
                let p = self.skip_c_wsp(code, pointer + 1)?;
                let (element, p) = self.parse_alternation(code, p)?;
                let p = self.skip_c_wsp(code, p)?;
                if code.char_at(p) != Some(')') {
                    return Err(ParserError::new(p, "Expected ')' to close the group.".into()));
                }
                Ok((element, p + 1))
            }
            Some('[') => {
                let p = self.skip_c_wsp(code, pointer + 1)?;
                let (element, p) = self.parse_alternation(code, p)?;
                let p = self.skip_c_wsp(code, p)?;
                if code.char_at(p) != Some(']') {
                    return Err(ParserError::new(
                        p,
                        "Expected ']' to close the optional element.".into(),
                    ));
                }
                Ok((Arc::new(Element::Optional(element)), p + 1))
            }
            Some('"') => self.parse_quoted(code, pointer, false),
            Some('%') => match code.char_at(pointer + 1) {
                Some('s') | Some('S') => self.parse_quoted(code, pointer + 2, true),
                Some('i') | Some('I') => self.parse_quoted(code, pointer + 2, false),
                Some('b') | Some('B') => self.parse_num_val(code, pointer + 2, Radix::Binary),
                Some('d') | Some('D') => self.parse_num_val(code, pointer + 2, Radix::Decimal),
                Some('x') | Some('X') => self.parse_num_val(code, pointer + 2, Radix::Hexadecimal),
                _ => Err(ParserError::new(
                    pointer,
                    "Expected 'b', 'd', 'x', 's' or 'i' after '%'.".into(),
                )),
            },
            Some('<') => Err(ParserError::new(
                pointer,
                "Prose values ('<...>') are not supported.".into(),
            )),
            _ => Err(ParserError::new(pointer, "Expected an element.".into())),
        }
    }

    /// `char-val = DQUOTE *char DQUOTE`, with the admitted characters depending on the
    /// configured encoding. The empty string is rejected.
    fn parse_quoted(
        &self,
        code: &Code,
        pointer: usize,
        case_sensitive: bool,
    ) -> Result<(Arc<Element>, usize), ParserError> {
        if code.char_at(pointer) != Some('"') {
            return Err(ParserError::new(
                pointer,
                "Expected '\"' to open a quoted string.".into(),
            ));
        }
        let mut value = String::new();
        let mut p = pointer + 1;
        loop {
            match code.char_at(p) {
                Some('"') => {
                    p += 1;
                    break;
                }
                Some('\r') | Some('\n') | None => {
                    return Err(ParserError::new(p, "Unterminated quoted string.".into()));
                }
                Some(c) if self.is_quoted_char(c) => {
                    value.push(c);
                    p += 1;
                }
                Some(c) => {
                    return Err(ParserError::new(
                        p,
                        format!(
                            "Character {:?} is not allowed in a quoted string under the {:?} encoding.",
                            c, self.options.encoding
                        ),
                    ));
                }
            }
        }
        if value.is_empty() {
            return Err(ParserError::new(
                pointer,
                "Empty quoted strings are not allowed.".into(),
            ));
        }
        Ok((
            Arc::new(Element::Literal {
                value,
                case_sensitive,
            }),
            p,
        ))
    }

    /// The quoted string alphabet is `VCHAR` plus the space, minus the closing `"`.
    fn is_quoted_char(&self, c: char) -> bool {
        c != '"' && (c == ' ' || self.is_vchar(c))
    }

    /// `num-val` after the radix letter: a single numeral, a `.`-separated series or a
    /// `-` range, with the radix tag preserved on the emitted element.
    fn parse_num_val(
        &self,
        code: &Code,
        pointer: usize,
        radix: Radix,
    ) -> Result<(Arc<Element>, usize), ParserError> {
        let (first, mut p) = self.scan_code_point(code, pointer, radix)?;
        match code.char_at(p) {
            Some('.') => {
                let mut values = vec![first];
                while code.char_at(p) == Some('.') {
                    let (value, q) = self.scan_code_point(code, p + 1, radix)?;
                    values.push(value);
                    p = q;
                }
                Ok((Arc::new(Element::NumericSeries { values, radix }), p))
            }
            Some('-') => {
                let (max, q) = self.scan_code_point(code, p + 1, radix)?;
                if first > max {
                    return Err(ParserError::new(
                        pointer,
                        format!("Range minimum {:#X} exceeds maximum {:#X}.", first, max),
                    ));
                }
                Ok((
                    Arc::new(Element::NumericRange {
                        min: first,
                        max,
                        radix,
                    }),
                    q,
                ))
            }
            _ => Ok((
                Arc::new(Element::Numeric {
                    value: first,
                    radix,
                }),
                p,
            )),
        }
    }

    fn scan_code_point(
        &self,
        code: &Code,
        pointer: usize,
        radix: Radix,
    ) -> Result<(u32, usize), ParserError> {
        let base = match radix {
            Radix::Binary => 2,
            Radix::Decimal => 10,
            Radix::Hexadecimal => 16,
        };
        let mut value: u32 = 0;
        let mut p = pointer;
        let mut scanned = false;
        while let Some(digit) = code.char_at(p).and_then(|c| c.to_digit(base)) {
            scanned = true;
            value = value * base + digit;
            if value > MAX_CODE_POINT {
                return Err(ParserError::new(
                    pointer,
                    "Numeral exceeds the code point space.".into(),
                ));
            }
            p += 1;
        }
        if !scanned {
            return Err(ParserError::new(
                p,
                format!("Expected a {} numeral.", radix.name()),
            ));
        }
        Ok((value, p))
    }

    /// `c-wsp = WSP / (c-nl WSP)`, consumed greedily. A line ending not followed by
    /// space or tab is left alone, since it terminates the rule instead.
    fn skip_c_wsp(&self, code: &Code, mut pointer: usize) -> Result<usize, ParserError> {
        loop {
            match code.char_at(pointer) {
                Some(' ') | Some('\t') => pointer += 1,
                _ => match self.try_c_nl(code, pointer)? {
                    Some(after) if matches!(code.char_at(after), Some(' ') | Some('\t')) => {
                        pointer = after + 1;
                    }
                    _ => return Ok(pointer),
                },
            }
        }
    }

    /// `c-nl = comment / CRLF`. A `;` always commits to a comment, so a disallowed
    /// comment character is a hard error rather than a backtrack.
    fn try_c_nl(&self, code: &Code, pointer: usize) -> Result<Option<usize>, ParserError> {
        match code.char_at(pointer) {
            Some(';') => {
                let p = self.scan_comment(code, pointer)?;
                Ok(self.try_newline(code, p))
            }
            _ => Ok(self.try_newline(code, pointer)),
        }
    }

    /// `comment = ";" *(WSP / VCHAR) CRLF`, scanned up to (not including) the line
    /// ending. `VCHAR` widens with the configured encoding.
    fn scan_comment(&self, code: &Code, pointer: usize) -> Result<usize, ParserError> {
        let mut p = pointer + 1;
        while let Some(c) = code.char_at(p) {
            if c == '\r' || c == '\n' {
                break;
            }
            if !self.is_comment_char(c) {
                return Err(ParserError::new(
                    p,
                    format!(
                        "Character {:?} is not allowed in a comment under the {:?} encoding.",
                        c, self.options.encoding
                    ),
                ));
            }
            p += 1;
        }
        Ok(p)
    }

    fn is_comment_char(&self, c: char) -> bool {
        c == ' ' || c == '\t' || self.is_vchar(c)
    }

    fn is_vchar(&self, c: char) -> bool {
        let value = c as u32;
        let ascii = (0x21..=0x7E).contains(&value);
        match self.options.encoding {
            Encoding::Ascii => ascii,
            Encoding::Latin1 => ascii || (0xA0..=0xFF).contains(&value),
            Encoding::Unicode => ascii || (0xA0..=0x10FFFD).contains(&value),
        }
    }

    fn try_newline(&self, code: &Code, pointer: usize) -> Option<usize> {
        match code.char_at(pointer) {
            Some('\r') if code.char_at(pointer + 1) == Some('\n') => Some(pointer + 2),
            Some('\n') if self.options.allow_unix_newlines => Some(pointer + 1),
            _ => None,
        }
    }

    fn parse_rule_end(&self, code: &Code, pointer: usize) -> Result<usize, ParserError> {
        if let Some(next) = self.try_c_nl(code, pointer)? {
            return Ok(next);
        }
        if self.options.allow_omitting_final_newline {
            if pointer >= code.len() {
                return Ok(pointer);
            }
            if code.char_at(pointer) == Some(';') {
                let p = self.scan_comment(code, pointer)?;
                if p >= code.len() {
                    return Ok(p);
                }
            }
        }
        Err(ParserError::new(
            pointer,
            "Expected a line ending after the rule.".into(),
        ))
    }
}

fn starts_element(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '(' | '[' | '"' | '%' | '*' | '<')
}

fn collapse(mut children: Vec<Arc<Element>>, wrap: fn(Vec<Arc<Element>>) -> Element) -> Arc<Element> {
    if children.len() == 1 {
        children.swap_remove(0)
    } else {
        Arc::new(wrap(children))
    }
}
