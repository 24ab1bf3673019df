//! The predefined rules of RFC 5234 appendix B.1, built as element trees.

use crate::{Element, Encoding, Radix, Rule};
use once_cell::sync::Lazy;
use std::sync::Arc;

static DEFAULT_CORE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| build_core_rules(Encoding::Ascii, true));

/// The core rule table for a validator configuration.
///
/// `VCHAR` widens with `encoding`, and `CRLF` additionally accepts a bare `\n` or `\r`
/// when `allow_unix_newlines` is set.
/// Core rules are merged underneath user rules, so a user definition of the same name wins.
pub fn core_rules(encoding: Encoding, allow_unix_newlines: bool) -> Vec<Rule> {
    if encoding == Encoding::Ascii && allow_unix_newlines {
        return DEFAULT_CORE_RULES.clone();
    }
    build_core_rules(encoding, allow_unix_newlines)
}

fn build_core_rules(encoding: Encoding, allow_unix_newlines: bool) -> Vec<Rule> {
    let strict_crlf = Element::Concatenation(vec![refer("CR"), refer("LF")]);
    let crlf = if allow_unix_newlines {
        // Preserved behavior: a bare CR is accepted alongside the bare LF.
        Element::Alternation(vec![Arc::new(strict_crlf), refer("LF"), refer("CR")])
    } else {
        strict_crlf
    };

    let ascii_vchar = Element::NumericRange {
        min: 0x21,
        max: 0x7E,
        radix: Radix::Hexadecimal,
    };
    let vchar = match encoding {
        Encoding::Ascii => ascii_vchar,
        Encoding::Latin1 => Element::Alternation(vec![Arc::new(ascii_vchar), hex_range(0xA0, 0xFF)]),
        Encoding::Unicode => {
            Element::Alternation(vec![Arc::new(ascii_vchar), hex_range(0xA0, 0x10FFFD)])
        }
    };

    vec![
        rule(
            "ALPHA",
            Element::Alternation(vec![hex_range(0x41, 0x5A), hex_range(0x61, 0x7A)]),
        ),
        rule("BIT", Element::Alternation(vec![lit("0"), lit("1")])),
        rule(
            "CHAR",
            Element::NumericRange {
                min: 0x01,
                max: 0x7F,
                radix: Radix::Hexadecimal,
            },
        ),
        rule("CR", hex(0x0D)),
        rule("CRLF", crlf),
        rule(
            "CTL",
            Element::Alternation(vec![
                hex_range(0x00, 0x1F),
                Arc::new(hex(0x7F)),
            ]),
        ),
        rule(
            "DIGIT",
            Element::NumericRange {
                min: 0x30,
                max: 0x39,
                radix: Radix::Hexadecimal,
            },
        ),
        rule("DQUOTE", hex(0x22)),
        rule(
            "HEXDIG",
            Element::Alternation(vec![
                refer("DIGIT"),
                lit("A"),
                lit("B"),
                lit("C"),
                lit("D"),
                lit("E"),
                lit("F"),
            ]),
        ),
        rule("HTAB", hex(0x09)),
        rule("LF", hex(0x0A)),
        rule(
            "LWSP",
            Element::Repetition {
                element: Arc::new(Element::Alternation(vec![
                    refer("WSP"),
                    Arc::new(Element::Concatenation(vec![refer("CRLF"), refer("WSP")])),
                ])),
                at_least: 0,
                at_most: None,
            },
        ),
        rule(
            "OCTET",
            Element::NumericRange {
                min: 0x00,
                max: 0xFF,
                radix: Radix::Hexadecimal,
            },
        ),
        rule("SP", hex(0x20)),
        rule("VCHAR", vchar),
        rule(
            "WSP",
            Element::Alternation(vec![refer("SP"), refer("HTAB")]),
        ),
    ]
}

fn rule(name: &str, element: Element) -> Rule {
    Rule {
        name: name.to_string(),
        element: Arc::new(element),
    }
}

fn refer(name: &str) -> Arc<Element> {
    Arc::new(Element::RuleRef(name.to_string()))
}

fn hex(value: u32) -> Element {
    Element::Numeric {
        value,
        radix: Radix::Hexadecimal,
    }
}

fn hex_range(min: u32, max: u32) -> Arc<Element> {
    Arc::new(Element::NumericRange {
        min,
        max,
        radix: Radix::Hexadecimal,
    })
}

fn lit(value: &str) -> Arc<Element> {
    Arc::new(Element::Literal {
        value: value.to_string(),
        case_sensitive: false,
    })
}
