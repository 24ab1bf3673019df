use crate::{
    Element, Encoding, Grammar, GrammarParser, ParseTree, ParserOptions, ValidateError, Validator,
    ValidatorOptions,
};

fn validator(text: &str) -> Validator {
    let grammar = Grammar::parse(text).unwrap();
    Validator::new(&grammar, ValidatorOptions::default())
}

/// Walk a tree asserting the span invariants: `matched` equals the input slice, children
/// of concatenations and repetitions tile the parent span, and single-child wrappers
/// share their child's span.
fn assert_spans(tree: &ParseTree, input: &str) {
    let chars: Vec<char> = input.chars().collect();
    assert!(tree.end >= tree.start);
    let expected: String = chars[tree.start..tree.end].iter().collect();
    assert_eq!(tree.matched, expected);
    match tree.element.as_ref() {
        Element::Concatenation(_) | Element::Repetition { .. } => {
            let mut pointer = tree.start;
            for child in &tree.children {
                assert_eq!(child.start, pointer);
                pointer = child.end;
            }
            assert_eq!(pointer, tree.end);
        }
        Element::RuleRef(_) | Element::Alternation(_) | Element::Optional(_) => {
            match tree.children.first() {
                Some(child) => assert_eq!((child.start, child.end), (tree.start, tree.end)),
                None => assert_eq!(tree.start, tree.end),
            }
        }
        _ => assert!(tree.children.is_empty()),
    }
    for child in &tree.children {
        assert_spans(child, input);
    }
}

#[test]
pub fn single_space_test() {
    let validator = validator("single-space = %b100000\r\n");
    let tree = validator.validate(" ").unwrap();
    assert_eq!((tree.start, tree.end), (0, 1));
    assert_spans(&tree, " ");

    match validator.validate("  ") {
        Err(ValidateError::Mismatch(err)) => assert_eq!(err.pointer, 1),
        other => panic!("Expected a mismatch, found {:?}", other),
    }
}

#[test]
pub fn double_space_test() {
    let validator = validator("double-space = %d32.32\r\n");
    let tree = validator.validate("  ").unwrap();
    assert_eq!(tree.rule_name(), Some("double-space"));

    // The root's only child is the two code point wide series leaf.
    assert_eq!(tree.children.len(), 1);
    let series = &tree.children[0];
    assert!(matches!(
        series.element.as_ref(),
        Element::NumericSeries { .. }
    ));
    assert_eq!((series.start, series.end), (0, 2));
    assert!(series.children.is_empty());
}

#[test]
pub fn any_space_test() {
    let validator = validator("any-space = *%x20\r\n");
    for input in ["", " ", "    "] {
        let tree = validator.validate(input).unwrap();
        assert_eq!(tree.matched, input);
        assert_spans(&tree, input);
    }
}

#[test]
pub fn bounded_repetition_test() {
    let validator = validator("two-or-three = 2*3%x20\r\n");
    validator.validate(" ").expect_err("One space is too few.");
    validator.validate("  ").unwrap();
    validator.validate("   ").unwrap();
    validator
        .validate("    ")
        .expect_err("Four spaces are too many.");
}

#[test]
pub fn case_sensitivity_test() {
    let sensitive = validator("hello = %s\"hello\"\r\n");
    sensitive.validate("hello").unwrap();
    sensitive
        .validate("Hello")
        .expect_err("A case sensitive literal should reject a differing case.");

    let insensitive = validator("hello = \"hello\"\r\n");
    insensitive.validate("hello").unwrap();
    insensitive.validate("HeLLo").unwrap();
}

#[test]
pub fn determinism_test() {
    let validator = validator(concat!(
        "expr   = term *(\"+\" term)\r\n",
        "term   = 1*DIGIT / \"(\" expr \")\"\r\n",
    ));
    let input = "12+(3+45)+6";
    let first = validator.validate(input).unwrap();
    let second = validator.validate(input).unwrap();
    assert_eq!(first, second);
    assert_spans(&first, input);
}

#[test]
pub fn default_entry_test() {
    let validator = validator("top = \"a\" rest\r\nrest = \"b\"\r\n");
    let tree = validator.validate("ab").unwrap();
    assert_eq!(tree.rule_name(), Some("top"));

    let tree = validator.validate_entry("b", "rest").unwrap();
    assert_eq!(tree.rule_name(), Some("rest"));
    // Entry lookup ignores case.
    validator.validate_entry("b", "REST").unwrap();
}

#[test]
pub fn core_rule_shadowing_test() {
    let plain = validator("num = 1*DIGIT\r\n");
    plain.validate("123").unwrap();

    let shadowed = validator("num = 1*DIGIT\r\nDIGIT = \"x\"\r\n");
    shadowed.validate("xxx").unwrap();
    shadowed
        .validate("123")
        .expect_err("The user rule should shadow the core DIGIT rule.");
}

#[test]
pub fn relaxed_crlf_test() {
    let relaxed = validator("line = \"a\" CRLF\r\n");
    relaxed.validate("a\r\n").unwrap();
    relaxed.validate("a\n").unwrap();
    relaxed.validate("a\r").unwrap();

    let grammar = Grammar::parse("line = \"a\" CRLF\r\n").unwrap();
    let strict = Validator::new(
        &grammar,
        ValidatorOptions {
            allow_unix_newlines: false,
            encoding: Encoding::Ascii,
        },
    );
    strict.validate("a\r\n").unwrap();
    strict
        .validate("a\n")
        .expect_err("A bare LF should fail the strict CRLF rule.");
}

#[test]
pub fn encoding_widening_test() {
    let grammar = Grammar::parse("sym = VCHAR\r\n").unwrap();
    let ascii = Validator::new(&grammar, ValidatorOptions::default());
    let latin = Validator::new(
        &grammar,
        ValidatorOptions {
            allow_unix_newlines: true,
            encoding: Encoding::Latin1,
        },
    );
    let unicode = Validator::new(
        &grammar,
        ValidatorOptions {
            allow_unix_newlines: true,
            encoding: Encoding::Unicode,
        },
    );

    // Anything ASCII accepts is accepted by the wider encodings too.
    for input in ["a", "!", "~"] {
        ascii.validate(input).unwrap();
        latin.validate(input).unwrap();
        unicode.validate(input).unwrap();
    }
    ascii.validate("é").expect_err("Beyond ASCII VCHAR.");
    latin.validate("é").unwrap();
    unicode.validate("é").unwrap();
    latin.validate("😀").expect_err("Beyond Latin-1 VCHAR.");
    unicode.validate("😀").unwrap();
}

#[test]
pub fn code_point_offset_test() {
    let parser = GrammarParser::new(ParserOptions {
        encoding: Encoding::Unicode,
        ..ParserOptions::default()
    });
    let grammar = parser.parse("s = \"é\" %x1F600 \"!\"\r\n").unwrap();
    let validator = Validator::new(&grammar, ValidatorOptions::default());

    let input = "é😀!";
    let tree = validator.validate(input).unwrap();
    // Offsets count code points, not bytes.
    assert_eq!(tree.end, 3);
    assert_spans(&tree, input);

    match validator.validate("é😀?") {
        Err(ValidateError::Mismatch(err)) => assert_eq!(err.pointer, 2),
        other => panic!("Expected a mismatch, found {:?}", other),
    }
}

#[test]
pub fn error_taxonomy_test() {
    let branched = validator("ab = \"a\" / \"b\"\r\n");
    match branched.validate("c") {
        Err(ValidateError::Collection(collection)) => {
            // Both branch failures survive, flattened to leaves.
            assert_eq!(collection.len(), 2);
            assert!(collection.errors().iter().all(|e| e.pointer == 0));
        }
        other => panic!("Expected a collection, found {:?}", other),
    }

    let single = validator("a = \"a\"\r\n");
    match single.validate("b") {
        Err(ValidateError::Mismatch(err)) => assert_eq!(err.pointer, 0),
        other => panic!("Expected a mismatch, found {:?}", other),
    }

    let undefined = validator("a = missing\r\n");
    match undefined.validate("x") {
        Err(ValidateError::Mismatch(err)) => {
            assert!(err.message.contains("missing"), "{}", err.message)
        }
        other => panic!("Expected a mismatch, found {:?}", other),
    }

    let empty = validator("; only a comment\r\n");
    match empty.validate("") {
        Err(ValidateError::Mismatch(err)) => assert_eq!(err.pointer, 0),
        other => panic!("Expected a mismatch, found {:?}", other),
    }
}

#[test]
pub fn trailing_input_test() {
    let validator = validator("ab = \"ab\"\r\n");
    match validator.validate("abc") {
        Err(ValidateError::Mismatch(err)) => {
            assert_eq!(err.pointer, 2);
            assert!(err.message.contains("Unexpected 'c'"), "{}", err.message);
        }
        other => panic!("Expected a mismatch, found {:?}", other),
    }
}

#[test]
pub fn zero_width_repetition_test() {
    // The inner repetition can match zero characters; the outer one must not chain it
    // forever.
    let validator = validator("stars = *(*\"x\")\r\n");
    validator.validate("").unwrap();
    validator.validate("xxx").unwrap();
}

#[test]
pub fn left_recursion_test() {
    let validator = validator("expr = expr \"x\" / \"y\"\r\n");
    // The left recursive branch fails, its sibling still matches.
    validator.validate("y").unwrap();
    // Derivations that need the left recursive branch are not supported.
    validator.validate("yx").expect_err("Left recursion is not supported.");
}

#[test]
pub fn nested_tree_shape_test() {
    let validator = validator(concat!(
        "word   = prefix [\"-\" suffix]\r\n",
        "prefix = 1*ALPHA\r\n",
        "suffix = 1*DIGIT\r\n",
    ));
    let tree = validator.validate("abc-12").unwrap();
    tree.print().unwrap();
    assert_spans(&tree, "abc-12");

    assert_eq!(tree.find_rule("prefix").unwrap().matched, "abc");
    assert_eq!(tree.find_rule("suffix").unwrap().matched, "12");
    assert_eq!(tree.list_rules("ALPHA").len(), 3);
    assert!(tree.contains_rule("DIGIT"));

    let tree = validator.validate("abc").unwrap();
    assert!(tree.find_rule("suffix").is_none());
}

#[test]
pub fn constructed_grammar_test() {
    use crate::{Radix, Rule};

    let flag = Rule::new(
        "flag",
        Element::concatenation(vec![
            Element::optional(Element::literal("+", false).unwrap()),
            Element::alternation(vec![
                Element::numeric_range(0x30, 0x39, Radix::Hexadecimal).unwrap(),
                Element::numeric(0x23, Radix::Hexadecimal).unwrap(),
            ])
            .unwrap(),
            Element::numeric_series(vec![0x21, 0x21], Radix::Decimal).unwrap(),
        ])
        .unwrap(),
    )
    .unwrap();
    let grammar = Grammar::from_rules(vec![flag]).unwrap();
    let validator = Validator::new(&grammar, ValidatorOptions::default());

    validator.validate("+5!!").unwrap();
    validator.validate("#!!").unwrap();
    validator
        .validate("+x!!")
        .expect_err("'x' is neither a digit nor '#'.");

    Element::rule_ref("1bad").expect_err("Rule names start with a letter.");
    Element::literal("", false).expect_err("Literals are non-empty.");
    Element::repetition(Element::literal("x", false).unwrap(), 3, Some(2))
        .expect_err("Inverted repetition bounds.");
    Element::numeric(0x110000, Radix::Hexadecimal).expect_err("Beyond the code point space.");
    Element::numeric_range(5, 1, Radix::Decimal).expect_err("Inverted range bounds.");

    let duplicate = Rule::new("Flag", Element::literal("y", false).unwrap()).unwrap();
    let original = Rule::new("flag", Element::literal("x", false).unwrap()).unwrap();
    Grammar::from_rules(vec![original, duplicate])
        .expect_err("Rule names are unique ignoring case.");
}

#[test]
pub fn json_number_cross_check_test() {
    let grammar = crate::examples::json_number_grammar();
    let validator = Validator::new(&grammar, ValidatorOptions::default());

    let samples = [
        "0", "-0", "-1", "12.5", "1e10", "3.14e-2", "10", "0.5", "120e+1",
        "01", "+1", "1.", ".5", "1e", "--1", "1e+", "e1", "1.2.3",
    ];
    for sample in samples {
        let accepted = validator.validate(sample).is_ok();
        let expected = serde_json::from_str::<f64>(sample).is_ok();
        assert_eq!(
            accepted, expected,
            "grammar and serde_json disagree on {:?}",
            sample
        );
    }
}
