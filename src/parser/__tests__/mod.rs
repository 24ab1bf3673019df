use crate::{Element, Encoding, Grammar, GrammarParser, ParserOptions, Radix};

fn parse(text: &str) -> Grammar {
    match Grammar::parse(text) {
        Ok(grammar) => grammar,
        Err(err) => {
            println!("Failed part:{:?}", text);
            panic!("{}", err);
        }
    }
}

#[test]
pub fn basic_rule_test() {
    let grammar = parse("greeting = \"hello\"\r\n");
    assert_eq!(grammar.len(), 1);
    let rule = &grammar.rules()[0];
    assert_eq!(rule.name, "greeting");
    assert_eq!(
        rule.element.as_ref(),
        &Element::Literal {
            value: "hello".into(),
            case_sensitive: false,
        }
    );
}

#[test]
pub fn rule_order_test() {
    let grammar = parse(concat!(
        "third  = first\r\n",
        "first  = \"a\"\r\n",
        "second = \"b\"\r\n",
        "third  =/ second\r\n",
    ));
    let names: Vec<&str> = grammar.rules().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["third", "first", "second"]);
}

#[test]
pub fn incremental_alternative_test() {
    let grammar = parse("a = \"x\"\r\na =/ \"y\"\r\n");
    assert_eq!(grammar.len(), 1);
    match grammar.rules()[0].element.as_ref() {
        Element::Alternation(children) => {
            assert_eq!(children.len(), 2);
            assert_eq!(
                children[0].as_ref(),
                &Element::Literal {
                    value: "x".into(),
                    case_sensitive: false,
                }
            );
        }
        other => panic!("Expected an alternation, found {:?}", other),
    }

    // An existing alternation is extended in place rather than nested.
    let grammar = parse("a = \"x\" / \"y\"\r\na =/ \"z\"\r\n");
    match grammar.rules()[0].element.as_ref() {
        Element::Alternation(children) => assert_eq!(children.len(), 3),
        other => panic!("Expected an alternation, found {:?}", other),
    }

    // The incremental body is appended as one branch, even when it is an alternation
    // itself.
    let grammar = parse("a = \"x\"\r\na =/ \"y\" / \"z\"\r\n");
    match grammar.rules()[0].element.as_ref() {
        Element::Alternation(children) => {
            assert_eq!(children.len(), 2);
            assert!(matches!(children[1].as_ref(), Element::Alternation(inner) if inner.len() == 2));
        }
        other => panic!("Expected an alternation, found {:?}", other),
    }
}

#[test]
pub fn canonical_unwrap_test() {
    // A group around a single element is transparent.
    let grammar = parse("a = (\"x\")\r\n");
    assert_eq!(
        grammar.rules()[0].element.as_ref(),
        &Element::Literal {
            value: "x".into(),
            case_sensitive: false,
        }
    );

    // No emitted alternation or concatenation has exactly one child.
    let grammar = parse("a = (\"x\" / (\"y\" \"z\")) [\"w\"]\r\n");
    fn assert_canonical(element: &Element) {
        match element {
            Element::Alternation(children) | Element::Concatenation(children) => {
                assert!(children.len() > 1, "found a single child container");
                children.iter().for_each(|c| assert_canonical(c));
            }
            Element::Repetition { element, .. } | Element::Optional(element) => {
                assert_canonical(element)
            }
            _ => {}
        }
    }
    assert_canonical(grammar.rules()[0].element.as_ref());
}

#[test]
pub fn repeat_forms_test() {
    let forms = [
        ("a = 2\"x\"\r\n", 2, Some(2)),
        ("a = 2*\"x\"\r\n", 2, None),
        ("a = *3\"x\"\r\n", 0, Some(3)),
        ("a = 2*3\"x\"\r\n", 2, Some(3)),
        ("a = *\"x\"\r\n", 0, None),
    ];
    for (text, expected_least, expected_most) in forms {
        let grammar = parse(text);
        match grammar.rules()[0].element.as_ref() {
            Element::Repetition {
                at_least, at_most, ..
            } => {
                assert_eq!((*at_least, *at_most), (expected_least, expected_most), "{}", text);
            }
            other => panic!("Expected a repetition for {}, found {:?}", text, other),
        }
    }
}

#[test]
pub fn numeric_forms_test() {
    let grammar = parse("a = %b100000\r\n");
    assert_eq!(
        grammar.rules()[0].element.as_ref(),
        &Element::Numeric {
            value: 0x20,
            radix: Radix::Binary,
        }
    );

    let grammar = parse("a = %d32.32\r\n");
    assert_eq!(
        grammar.rules()[0].element.as_ref(),
        &Element::NumericSeries {
            values: vec![32, 32],
            radix: Radix::Decimal,
        }
    );

    let grammar = parse("a = %x41-5A\r\n");
    assert_eq!(
        grammar.rules()[0].element.as_ref(),
        &Element::NumericRange {
            min: 0x41,
            max: 0x5A,
            radix: Radix::Hexadecimal,
        }
    );

    // The radix changes equality even for the same code point.
    let decimal = parse("a = %d32\r\n");
    let hexadecimal = parse("a = %x20\r\n");
    assert_ne!(
        decimal.rules()[0].element.as_ref(),
        hexadecimal.rules()[0].element.as_ref()
    );
}

#[test]
pub fn literal_flags_test() {
    let sensitive = parse("a = %s\"Hello\"\r\n");
    assert_eq!(
        sensitive.rules()[0].element.as_ref(),
        &Element::Literal {
            value: "Hello".into(),
            case_sensitive: true,
        }
    );

    let explicit_insensitive = parse("a = %i\"Hello\"\r\n");
    let plain = parse("a = \"Hello\"\r\n");
    assert_eq!(
        explicit_insensitive.rules()[0].element,
        plain.rules()[0].element
    );
}

#[test]
pub fn comment_and_continuation_test() {
    let grammar = parse(concat!(
        "; a leading comment line\r\n",
        "\r\n",
        "pair = \"x\" ; trailing comment\r\n",
        "       \"y\"\r\n",
        "last = pair\r\n",
    ));
    assert_eq!(grammar.len(), 2);
    match grammar.rules()[0].element.as_ref() {
        Element::Concatenation(children) => assert_eq!(children.len(), 2),
        other => panic!("Expected the continuation line to concatenate, found {:?}", other),
    }

    // A grammar of only comments and blank lines is empty.
    let empty = parse("; nothing here\r\n\r\n");
    assert!(empty.is_empty());
}

#[test]
pub fn newline_options_test() {
    parse("a = \"x\"\n");
    parse("a = \"x\"");
    parse("a = \"x\" ; final comment without newline");

    let strict = GrammarParser::new(ParserOptions {
        allow_unix_newlines: false,
        allow_omitting_final_newline: false,
        encoding: Encoding::Ascii,
    });
    strict
        .parse("a = \"x\"\n")
        .expect_err("A bare LF should fail when unix newlines are disabled.");
    strict
        .parse("a = \"x\"")
        .expect_err("A missing final newline should fail when disabled.");
    strict.parse("a = \"x\"\r\n").unwrap();
}

#[test]
pub fn comment_character_test() {
    Grammar::parse("a = \"x\" ; bell \u{0007} rings\r\n")
        .expect_err("A control character in a comment should fail.");
    Grammar::parse("a = \"x\" ; caf\u{E9}\r\n")
        .expect_err("A Latin-1 character in a comment should fail under ASCII.");

    let latin = GrammarParser::new(ParserOptions {
        encoding: Encoding::Latin1,
        ..ParserOptions::default()
    });
    latin.parse("a = \"x\" ; caf\u{E9}\r\n").unwrap();

    // Tabs are WSP and stay legal in comments.
    Grammar::parse("a = \"x\" ; tab\there\r\n").unwrap();
}

#[test]
pub fn encoding_literal_test() {
    let latin = GrammarParser::new(ParserOptions {
        encoding: Encoding::Latin1,
        ..ParserOptions::default()
    });
    let unicode = GrammarParser::new(ParserOptions {
        encoding: Encoding::Unicode,
        ..ParserOptions::default()
    });

    Grammar::parse("a = \"héllo\"\r\n")
        .expect_err("A Latin-1 character should fail under the ASCII encoding.");
    latin.parse("a = \"héllo\"\r\n").unwrap();
    latin
        .parse("a = \"h😀llo\"\r\n")
        .expect_err("A character beyond Latin-1 should fail under the Latin1 encoding.");
    unicode.parse("a = \"h😀llo\"\r\n").unwrap();
}

#[test]
pub fn parser_error_test() {
    let failures = [
        "a \"x\"\r\n",
        "a = \r\n",
        "a = \"x\r\n",
        "a = \"\"\r\n",
        "a = <prose>\r\n",
        "a = %q41\r\n",
        "a = %x5A-41\r\n",
        "a = 3*2\"x\"\r\n",
        "a = %x110000\r\n",
        "1a = \"x\"\r\n",
    ];
    for text in failures {
        let err = Grammar::parse(text).expect_err(text);
        println!("{}", err);
    }

    // Plain '=' can not redefine, and '=/' can not introduce, a rule.
    Grammar::parse("a = \"x\"\r\na = \"y\"\r\n")
        .expect_err("Redefinition with '=' should fail.");
    Grammar::parse("a =/ \"x\"\r\n")
        .expect_err("An incremental alternative needs an existing rule.");
}

#[test]
pub fn error_offset_test() {
    let err = Grammar::parse("a = \"x\" %q\r\n").expect_err("Unknown radix should fail.");
    assert_eq!(err.pointer, 8);
}

#[test]
pub fn display_round_trip_test() {
    let text = concat!(
        "a = %b100000 / %d32 / %x20\r\n",
        "b = 2*3%x20 [\"opt\"] (\"x\" \"y\") / %s\"Hello\"\r\n",
        "c = *(a \"-\") 2b\r\n",
    );
    let grammar = parse(text);
    let serialized = grammar.to_string();
    let reparsed = parse(&serialized);
    assert_eq!(grammar.rules(), reparsed.rules());

    // Radix tags and the case-sensitivity flag survive the round trip verbatim.
    assert_eq!(
        serialized.lines().next(),
        Some("a = %b100000 / %d32 / %x20")
    );
}
