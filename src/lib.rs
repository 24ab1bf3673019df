//! abnf_pt is a library to parse Augmented Backus-Naur Form ([ABNF](https://www.rfc-editor.org/rfc/rfc5234))
//! grammars and to validate input strings against them, producing a full parse tree ([ParseTree]) on success.
//!
//! # Overview
//! ABNF is the meta-language used by most IETF protocol specifications to describe their textual formats.
//! This library accepts a grammar written in the RFC 5234 syntax (with the RFC 7405 case-sensitive
//! string extension), builds an in-memory [Grammar] from it, and matches input strings against a
//! selected rule of that grammar.
//! A successful validation returns the complete derivation of the input as a tree of matched rules
//! and terminals, each annotated with its code point span.
//! A failed validation returns a structured error pointing at the offset where matching broke down.
//!
//! # Design
//!
//! The library consists of two cooperating subsystems which share the recursive [Element] data model.
//! The grammar parser ([GrammarParser]) is a hand-written recursive descent parser for the RFC 5234 §4
//! meta-grammar.
//! It resolves incremental alternatives (`=/`), folded lines and comments, and emits the rules in their
//! first-appearance order.
//! The validation engine ([Validator]) is a non-deterministic matcher: an element at a position may
//! produce several alternative outcomes, and the engine enumerates them, memoizing intermediate
//! results per `(element, position)` pair ([Cache]) in the manner of a Packrat parser.
//! The RFC 5234 core rules (`ALPHA`, `DIGIT`, `CRLF`, `VCHAR`, ...) are merged underneath the user
//! rules, so grammars can reference them without defining them.
//!
//! All positions handled by the library are code point offsets, not byte offsets, so grammars using
//! the widened [Latin1](Encoding::Latin1) or [Unicode](Encoding::Unicode) encodings match correctly
//! on multi-byte input.
//!
//! # Example
//!
//! ```
//! use abnf_pt::{GrammarParser, ParserOptions, Validator, ValidatorOptions};
//!
//! let text = concat!(
//!     "greeting   = salutation SP subject CRLF\r\n",
//!     "salutation = \"hello\" / \"hi\"\r\n",
//!     "subject    = 1*ALPHA\r\n",
//! );
//!
//! let grammar = GrammarParser::new(ParserOptions::default())
//!     .parse(text)
//!     .unwrap();
//!
//! let validator = Validator::new(&grammar, ValidatorOptions::default());
//!
//! let tree = validator.validate("hello world\r\n").unwrap();
//! assert_eq!(tree.matched, "hello world\r\n");
//! assert_eq!(tree.rule_name(), Some("greeting"));
//!
//! let subject = tree.find_rule("subject").unwrap();
//! assert_eq!((subject.start, subject.end), (6, 11));
//!
//! validator
//!     .validate("hello world")
//!     .expect_err("Missing line ending should fail to validate.");
//! ```
//!
//! # License
//! [abnf_pt](crate) is provided under the MIT or Apache-2.0 license.

mod cache;
mod core_rules;
mod element;
mod error;
pub mod examples;
mod grammar;
mod impl_default;
mod parser;
mod tree;
pub mod util;
mod validator;

use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub use core_rules::core_rules;
use util::Log;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// The numeral notation a numeric element was written in (`%b`, `%d` or `%x`).
///
/// The radix has no effect on matching.
/// It is kept on the element so that structural equality and the serialized grammar text
/// ([Element]'s [Display](std::fmt::Display) implementation) reproduce the original notation.
pub enum Radix {
    Binary,
    Decimal,
    Hexadecimal,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// The set of code points admitted inside quoted literals and by the `VCHAR` core rule.
///
/// Every input accepted under [Ascii](Encoding::Ascii) is also accepted under
/// [Latin1](Encoding::Latin1), and every input accepted under Latin1 is accepted under
/// [Unicode](Encoding::Unicode).
pub enum Encoding {
    Ascii,
    Latin1,
    Unicode,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
/// A fragment of a grammar rule body.
///
/// Elements are immutable after construction and form acyclic trees; rules refer to each other
/// by name through [RuleRef](Element::RuleRef), never by embedded pointers, so cycles exist only
/// through the name-indexed rule table of a [Grammar].
///
/// The [Display](std::fmt::Display) implementation re-serializes an element to RFC 5234 text,
/// preserving the [Radix] tags and case-sensitivity flags it was parsed with.
pub enum Element {
    /// A reference to a named rule, e.g. `ALPHA`.
    RuleRef(String),
    /// An ordered choice between alternatives, e.g. `"a" / "b"`.
    Alternation(Vec<Arc<Element>>),
    /// A sequence of elements which must match in order, e.g. `"a" "b"`.
    Concatenation(Vec<Arc<Element>>),
    /// A bounded or unbounded repetition, e.g. `2*3DIGIT`.
    /// `at_most` of [None] means unbounded.
    Repetition {
        element: Arc<Element>,
        at_least: usize,
        at_most: Option<usize>,
    },
    /// An optional element, e.g. `[suffix]`.
    Optional(Arc<Element>),
    /// A quoted string, e.g. `"hello"` or `%s"Hello"` (RFC 7405).
    /// Case-insensitive comparison uses ASCII case folding.
    Literal { value: String, case_sensitive: bool },
    /// A single code point, e.g. `%x41`.
    Numeric { value: u32, radix: Radix },
    /// A sequence of code points, e.g. `%x41.42.43`.
    NumericSeries { values: Vec<u32>, radix: Radix },
    /// An inclusive code point range, e.g. `%x41-5A`.
    NumericRange { min: u32, max: u32, radix: Radix },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A named grammar rule.
pub struct Rule {
    /// Rule name with the casing of its first definition. Lookup is case-insensitive.
    pub name: String,
    pub element: Arc<Element>,
}

#[derive(Debug, Clone)]
/// An ordered collection of uniquely named rules.
///
/// The order is the first-appearance order of the rule names in the source text; it is observable
/// because validation defaults to the first rule when no entry rule is given.
pub struct Grammar {
    rules: Vec<Rule>,
    index: OnceCell<HashMap<String, usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Configuration for [GrammarParser].
pub struct ParserOptions {
    /// Accept a bare `\n` as a line ending wherever CRLF is expected. Default `true`.
    pub allow_unix_newlines: bool,
    /// Accept grammar text whose last rule is not terminated by a newline. Default `true`.
    pub allow_omitting_final_newline: bool,
    /// Code points admitted inside quoted literals. Default [Ascii](Encoding::Ascii).
    pub encoding: Encoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Configuration for [Validator].
pub struct ValidatorOptions {
    /// Relax the `CRLF` core rule to also accept a bare `\n` or `\r`. Default `true`.
    pub allow_unix_newlines: bool,
    /// Widen the `VCHAR` core rule. Default [Ascii](Encoding::Ascii).
    pub encoding: Encoding,
}

/// A recursive descent parser for the RFC 5234 §4 meta-grammar.
///
/// The parser turns ABNF grammar text into a [Grammar]; it does not recover from syntax errors.
pub struct GrammarParser {
    options: ParserOptions,
}

/// The validation engine.
///
/// A [Validator] owns the merged rule table of a user [Grammar] and the core rules, and matches
/// input strings against it.
/// Validation is pure: the same grammar and input always produce the same tree, and a validator
/// can be shared across threads.
pub struct Validator {
    table: Grammar,
    default_entry: Option<String>,
    debugger: OnceCell<Log<&'static str>>,
}

#[derive(Clone, PartialEq, Eq)]
/// The derivation of a matched input region.
///
/// `start` and `end` are code point offsets into the validated input, and `matched` is the input
/// text of that span.
/// Non-terminal elements carry the sub-trees they matched through; terminal elements are leaves.
pub struct ParseTree {
    pub element: Arc<Element>,
    pub start: usize,
    pub end: usize,
    pub matched: String,
    pub children: Vec<ParseTree>,
}

/// Iterator over a [ParseTree] node and every node below it, depth first, parents
/// before children. Created by [ParseTree::descendants].
pub struct Descendants<'t> {
    stack: Vec<&'t ParseTree>,
}

#[derive(Debug)]
/// An error returned due to failed validation of programmatically constructed grammar values.
pub struct ImplementationError {
    message: String,
    what: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An error returned when the grammar text itself is malformed.
pub struct ParserError {
    /// Code point offset the parser had reached when it failed.
    pub pointer: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An error to indicate that the input does not match the grammar.
pub struct ValidationError {
    /// Code point offset at which the mismatch was detected.
    pub pointer: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A flat aggregate of [ValidationError] values collected from alternative match paths
/// which all failed.
pub struct ErrorCollection {
    errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The error channel of [Validator::validate].
pub enum ValidateError {
    Mismatch(ValidationError),
    Collection(ErrorCollection),
}

#[derive(Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
/// A unique key to save and retrieve match results for the Packrat matching technique.
///
/// The key is the identity of an [Element] within the rule table, not its structure.
pub struct CacheKey(usize);

/// A result returned when an [Element] is matched at a position: every alternative outcome
/// tree, or the error explaining why there is none.
pub type MatchResult = Result<Vec<ParseTree>, ValidateError>;

/// An object structure to store intermediate match results and the maximum successfully
/// matched position for the Packrat matching technique.
///
/// A [Cache] lives for exactly one validation call.
pub struct Cache {
    matched_result_cache: HashMap<(CacheKey, usize), MatchResult>,
    in_progress: HashSet<(CacheKey, usize)>,
    max_matched_point: usize,
}
