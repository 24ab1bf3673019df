use crate::{Element, ImplementationError, Radix};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Largest valid code point value for numeric elements.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

static RULE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[A-Za-z][A-Za-z0-9-]*$").expect("rule name pattern is a valid regex")
});

pub(crate) fn is_valid_rule_name(name: &str) -> bool {
    RULE_NAME.is_match(name)
}

impl Element {
    /// Create a reference to a named rule.
    /// ### Arguments
    /// * `name` - A rule name matching `[A-Za-z][A-Za-z0-9-]*`.
    pub fn rule_ref(name: &str) -> Result<Self, ImplementationError> {
        if !is_valid_rule_name(name) {
            return Err(ImplementationError::new(
                "InvalidRuleName".into(),
                format!("'{}' is not a valid ABNF rule name.", name),
            ));
        }
        Ok(Element::RuleRef(name.to_string()))
    }

    /// Create a quoted string element.
    /// ### Arguments
    /// * `value` - The literal text; non-empty, without control characters or `"`.
    /// * `case_sensitive` - Whether matching compares exactly (RFC 7405 `%s`).
    pub fn literal(value: &str, case_sensitive: bool) -> Result<Self, ImplementationError> {
        if value.is_empty() {
            return Err(ImplementationError::new(
                "EmptyLiteral".into(),
                "A quoted string element can not be empty.".into(),
            ));
        }
        if let Some(c) = value.chars().find(|c| c.is_control() || *c == '"') {
            return Err(ImplementationError::new(
                "InvalidLiteral".into(),
                format!("Character {:?} is not allowed in a quoted string.", c),
            ));
        }
        Ok(Element::Literal {
            value: value.to_string(),
            case_sensitive,
        })
    }

    /// Create an ordered choice between alternatives.
    ///
    /// A single alternative is returned as-is, so the emitted tree never contains an
    /// alternation with exactly one child.
    pub fn alternation(mut children: Vec<Element>) -> Result<Self, ImplementationError> {
        match children.len() {
            0 => Err(ImplementationError::new(
                "EmptyAlternation".into(),
                "An alternation requires at least one alternative.".into(),
            )),
            1 => Ok(children.swap_remove(0)),
            _ => Ok(Element::Alternation(
                children.into_iter().map(Arc::new).collect(),
            )),
        }
    }

    /// Create a sequence of elements which must match in order.
    ///
    /// A single element is returned as-is, so the emitted tree never contains a
    /// concatenation with exactly one child.
    pub fn concatenation(mut children: Vec<Element>) -> Result<Self, ImplementationError> {
        match children.len() {
            0 => Err(ImplementationError::new(
                "EmptyConcatenation".into(),
                "A concatenation requires at least one element.".into(),
            )),
            1 => Ok(children.swap_remove(0)),
            _ => Ok(Element::Concatenation(
                children.into_iter().map(Arc::new).collect(),
            )),
        }
    }

    /// Create a repetition of `element`.
    /// ### Arguments
    /// * `at_least` - Minimum number of iterations.
    /// * `at_most` - Maximum number of iterations, or [None] for unbounded.
    pub fn repetition(
        element: Element,
        at_least: usize,
        at_most: Option<usize>,
    ) -> Result<Self, ImplementationError> {
        if let Some(at_most) = at_most {
            if at_least > at_most {
                return Err(ImplementationError::new(
                    "InvalidRepetition".into(),
                    format!(
                        "Lower repetition bound {} exceeds upper bound {}.",
                        at_least, at_most
                    ),
                ));
            }
        }
        Ok(Element::Repetition {
            element: Arc::new(element),
            at_least,
            at_most,
        })
    }

    pub fn optional(element: Element) -> Self {
        Element::Optional(Arc::new(element))
    }

    /// Create a single code point element.
    pub fn numeric(value: u32, radix: Radix) -> Result<Self, ImplementationError> {
        check_code_point(value)?;
        Ok(Element::Numeric { value, radix })
    }

    /// Create a code point sequence element, e.g. `%x41.42.43`.
    pub fn numeric_series(values: Vec<u32>, radix: Radix) -> Result<Self, ImplementationError> {
        if values.is_empty() {
            return Err(ImplementationError::new(
                "EmptySeries".into(),
                "A numeric series requires at least one value.".into(),
            ));
        }
        for value in &values {
            check_code_point(*value)?;
        }
        Ok(Element::NumericSeries { values, radix })
    }

    /// Create an inclusive code point range element, e.g. `%x41-5A`.
    pub fn numeric_range(min: u32, max: u32, radix: Radix) -> Result<Self, ImplementationError> {
        check_code_point(max)?;
        if min > max {
            return Err(ImplementationError::new(
                "InvalidRange".into(),
                format!("Range minimum {} exceeds maximum {}.", min, max),
            ));
        }
        Ok(Element::NumericRange { min, max, radix })
    }

    /// A short label for this element, used when rendering parse trees.
    pub(crate) fn describe(&self) -> String {
        match self {
            Element::RuleRef(name) => name.clone(),
            Element::Alternation(_) => "alternation".into(),
            Element::Concatenation(_) => "concatenation".into(),
            Element::Repetition { element, .. } => match element.as_ref() {
                Element::Alternation(_)
                | Element::Concatenation(_)
                | Element::Repetition { .. }
                | Element::Optional(_) => "repetition".into(),
                _ => self.to_string(),
            },
            Element::Optional(_) => "option".into(),
            Element::Literal { .. }
            | Element::Numeric { .. }
            | Element::NumericSeries { .. }
            | Element::NumericRange { .. } => self.to_string(),
        }
    }
}

fn check_code_point(value: u32) -> Result<(), ImplementationError> {
    if value > MAX_CODE_POINT {
        return Err(ImplementationError::new(
            "InvalidCodePoint".into(),
            format!("Value {:#X} exceeds the code point space.", value),
        ));
    }
    Ok(())
}

impl Radix {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Radix::Binary => "binary",
            Radix::Decimal => "decimal",
            Radix::Hexadecimal => "hexadecimal",
        }
    }

    fn prefix(&self) -> char {
        match self {
            Radix::Binary => 'b',
            Radix::Decimal => 'd',
            Radix::Hexadecimal => 'x',
        }
    }

    fn write_value(&self, f: &mut Formatter<'_>, value: u32) -> std::fmt::Result {
        match self {
            Radix::Binary => write!(f, "{:b}", value),
            Radix::Decimal => write!(f, "{}", value),
            Radix::Hexadecimal => write!(f, "{:X}", value),
        }
    }
}

/// Write `element`, parenthesizing it when its top-level operator binds looser than the
/// surrounding context allows.
fn write_operand(
    f: &mut Formatter<'_>,
    element: &Element,
    group_alternation: bool,
    group_concatenation: bool,
    group_repetition: bool,
) -> std::fmt::Result {
    let grouped = match element {
        Element::Alternation(_) => group_alternation,
        Element::Concatenation(_) => group_concatenation,
        Element::Repetition { .. } => group_repetition,
        _ => false,
    };
    if grouped {
        write!(f, "({})", element)
    } else {
        write!(f, "{}", element)
    }
}

impl Display for Element {
    /// Serialize the element back to RFC 5234 text.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::RuleRef(name) => write!(f, "{}", name),
            Element::Alternation(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index != 0 {
                        write!(f, " / ")?;
                    }
                    write_operand(f, child, true, false, false)?;
                }
                Ok(())
            }
            Element::Concatenation(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index != 0 {
                        write!(f, " ")?;
                    }
                    write_operand(f, child, true, true, false)?;
                }
                Ok(())
            }
            Element::Repetition {
                element,
                at_least,
                at_most,
            } => {
                match at_most {
                    Some(at_most) if at_least == at_most => write!(f, "{}", at_least)?,
                    _ => {
                        if *at_least > 0 {
                            write!(f, "{}", at_least)?;
                        }
                        write!(f, "*")?;
                        if let Some(at_most) = at_most {
                            write!(f, "{}", at_most)?;
                        }
                    }
                }
                write_operand(f, element, true, true, true)
            }
            Element::Optional(element) => write!(f, "[{}]", element),
            Element::Literal {
                value,
                case_sensitive,
            } => {
                if *case_sensitive {
                    write!(f, "%s")?;
                }
                write!(f, "\"{}\"", value)
            }
            Element::Numeric { value, radix } => {
                write!(f, "%{}", radix.prefix())?;
                radix.write_value(f, *value)
            }
            Element::NumericSeries { values, radix } => {
                write!(f, "%{}", radix.prefix())?;
                for (index, value) in values.iter().enumerate() {
                    if index != 0 {
                        write!(f, ".")?;
                    }
                    radix.write_value(f, *value)?;
                }
                Ok(())
            }
            Element::NumericRange { min, max, radix } => {
                write!(f, "%{}", radix.prefix())?;
                radix.write_value(f, *min)?;
                write!(f, "-")?;
                radix.write_value(f, *max)
            }
        }
    }
}
