//! The non-deterministic matching engine.
//!
//! An element at a position may produce several alternative outcomes, each pinning its own
//! end offset. The engine enumerates them breadth-first, wrapping every outcome of a
//! non-terminal element in a [ParseTree] node, and memoizes match results per
//! `(element identity, position)` pair in a [Cache] which lives for one validation call.

use crate::util::{Code, Log};
use crate::{
    core_rules, Cache, CacheKey, Element, Grammar, MatchResult, ParseTree, ValidateError,
    ValidationError, Validator, ValidatorOptions,
};
use once_cell::sync::OnceCell;
use std::fmt::Write;
use std::sync::Arc;

#[cfg(test)]
mod __tests__;

impl Validator {
    /// Create a validator for `grammar`.
    ///
    /// The core rules for the given options are merged underneath the user rules; a user
    /// rule shadows the core rule of the same name.
    pub fn new(grammar: &Grammar, options: ValidatorOptions) -> Self {
        let mut rules = grammar.rules().to_vec();
        let default_entry = rules.first().map(|rule| rule.name.clone());
        for core in core_rules(options.encoding, options.allow_unix_newlines) {
            if grammar.get_rule(&core.name).is_none() {
                rules.push(core);
            }
        }
        Self {
            table: Grammar::from_rule_list(rules),
            default_entry,
            debugger: OnceCell::new(),
        }
    }

    /// The merged rule table, user rules first.
    pub fn rule_table(&self) -> &Grammar {
        &self.table
    }

    /// Set a log label to debug rule matching based on the level of [Log].
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.debugger
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Validate `input` against the first rule of the grammar.
    pub fn validate(&self, input: &str) -> Result<ParseTree, ValidateError> {
        match &self.default_entry {
            Some(entry) => self.run(input, entry),
            None => Err(ValidateError::Mismatch(ValidationError::new(
                0,
                "The grammar has no rules.".into(),
            ))),
        }
    }

    /// Validate `input` against the named rule. The rule name is compared ignoring case.
    pub fn validate_entry(&self, input: &str, entry: &str) -> Result<ParseTree, ValidateError> {
        self.run(input, entry)
    }

    fn run(&self, input: &str, entry: &str) -> Result<ParseTree, ValidateError> {
        let code = Code::new(input);
        let mut cache = Cache::root();
        let root = Arc::new(Element::RuleRef(entry.to_string()));
        let result = match self.match_element(&code, &root, 0, &mut cache) {
            Ok(outcomes) => match outcomes.into_iter().find(|tree| tree.end == code.len()) {
                Some(tree) => return Ok(tree),
                None => Err(ValidateError::Mismatch(cache.create_error(&code))),
            },
            Err(err) => Err(err),
        };
        result.map_err(|err| attach_position(&code, err))
    }

    /// Produce every outcome of `element` at `pointer`, or the error explaining why there
    /// is none. Results are memoized per `(element identity, position)`.
    ///
    /// Re-entering an element at the position it is already being matched at can only
    /// happen through a rule table cycle that consumed no input, so such a branch fails
    /// instead of recursing; the recursion error is never memoized.
    fn match_element(
        &self,
        code: &Code,
        element: &Arc<Element>,
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        let key = CacheKey::of(element);
        if let Some(result) = cache.find(key, pointer) {
            return result.clone();
        }
        if !cache.enter(key, pointer) {
            let message = match element.as_ref() {
                Element::RuleRef(name) => format!("Rule '{}' is left recursive.", name),
                _ => "Left recursive grammar cycle.".to_string(),
            };
            return Err(ValidateError::Mismatch(ValidationError::new(
                pointer, message,
            )));
        }
        let result = match element.as_ref() {
            Element::RuleRef(name) => self.match_rule_ref(code, element, name, pointer, cache),
            Element::Alternation(children) => {
                self.match_alternation(code, element, children, pointer, cache)
            }
            Element::Concatenation(children) => {
                self.match_concatenation(code, element, children, pointer, cache)
            }
            Element::Repetition {
                element: child,
                at_least,
                at_most,
            } => self.match_repetition(code, element, child, *at_least, *at_most, pointer, cache),
            Element::Optional(child) => self.match_optional(code, element, child, pointer, cache),
            Element::Literal {
                value,
                case_sensitive,
            } => self.match_literal(code, element, value, *case_sensitive, pointer, cache),
            Element::Numeric { value, .. } => {
                self.match_numeric(code, element, *value, pointer, cache)
            }
            Element::NumericSeries { values, .. } => {
                self.match_series(code, element, values, pointer, cache)
            }
            Element::NumericRange { min, max, .. } => {
                self.match_range(code, element, *min, *max, pointer, cache)
            }
        };
        cache.exit(key, pointer);
        cache.insert(key, pointer, result.clone());
        result
    }

    fn match_rule_ref(
        &self,
        code: &Code,
        element: &Arc<Element>,
        name: &str,
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        self.log_entry(name, pointer);
        let rule = match self.table.get_rule(name) {
            Some(rule) => rule,
            None => {
                return Err(ValidateError::Mismatch(ValidationError::new(
                    pointer,
                    format!("Undefined rule '{}'.", name),
                )))
            }
        };
        let result = self
            .match_element(code, &rule.element, pointer, cache)
            .map(|outcomes| {
                outcomes
                    .into_iter()
                    .map(|sub| ParseTree::wrap(element.clone(), sub))
                    .collect()
            });
        self.log_result(code, name, pointer, &result);
        result
    }

    /// Union of the outcomes over all alternatives. Branch failures are collected and
    /// suppressed as long as one sibling succeeds.
    fn match_alternation(
        &self,
        code: &Code,
        element: &Arc<Element>,
        children: &[Arc<Element>],
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        for child in children {
            match self.match_element(code, child, pointer, cache) {
                Ok(subs) => outcomes.extend(
                    subs.into_iter()
                        .map(|sub| ParseTree::wrap(element.clone(), sub)),
                ),
                Err(err) => failures.push(err),
            }
        }
        if outcomes.is_empty() {
            Err(ValidateError::flatten(failures))
        } else {
            Ok(outcomes)
        }
    }

    /// Cartesian extension across the children: every partial prefix is extended by every
    /// outcome of the next child. The first child with no outcome from any prefix surfaces
    /// its error verbatim.
    fn match_concatenation(
        &self,
        code: &Code,
        element: &Arc<Element>,
        children: &[Arc<Element>],
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        let mut states: Vec<(usize, Vec<ParseTree>)> = vec![(pointer, Vec::new())];
        for child in children {
            let mut next_states = Vec::new();
            let mut failure: Option<ValidateError> = None;
            for (end, trees) in &states {
                match self.match_element(code, child, *end, cache) {
                    Ok(subs) => {
                        for sub in subs {
                            let sub_end = sub.end;
                            let mut extended = trees.clone();
                            extended.push(sub);
                            next_states.push((sub_end, extended));
                        }
                    }
                    Err(err) => {
                        if failure.is_none() {
                            failure = Some(err);
                        }
                    }
                }
            }
            if next_states.is_empty() {
                return Err(failure.unwrap_or_else(|| {
                    ValidateError::Mismatch(ValidationError::new(
                        pointer,
                        format!("Expected {}.", element),
                    ))
                }));
            }
            states = next_states;
        }
        Ok(states
            .into_iter()
            .map(|(end, trees)| {
                ParseTree::node(
                    element.clone(),
                    pointer,
                    end,
                    code.slice(pointer, end),
                    trees,
                )
            })
            .collect())
    }

    /// Chain between `at_least` and `at_most` matches of the repeated element.
    ///
    /// A zero-width iteration is recorded but never chained further, so nullable inner
    /// elements can not spin forever.
    fn match_repetition(
        &self,
        code: &Code,
        element: &Arc<Element>,
        child: &Arc<Element>,
        at_least: usize,
        at_most: Option<usize>,
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        let mut outcomes = Vec::new();
        if at_least == 0 {
            outcomes.push(ParseTree::node(
                element.clone(),
                pointer,
                pointer,
                String::new(),
                Vec::new(),
            ));
        }
        let mut frontier: Vec<(usize, Vec<ParseTree>)> = vec![(pointer, Vec::new())];
        let mut count = 0;
        let mut failure: Option<ValidateError> = None;
        while !frontier.is_empty() && at_most.map_or(true, |limit| count < limit) {
            count += 1;
            let mut next_frontier = Vec::new();
            for (end, trees) in &frontier {
                match self.match_element(code, child, *end, cache) {
                    Ok(subs) => {
                        for sub in subs {
                            let sub_end = sub.end;
                            let zero_width = sub_end == *end;
                            let mut extended = trees.clone();
                            extended.push(sub);
                            if count >= at_least {
                                outcomes.push(ParseTree::node(
                                    element.clone(),
                                    pointer,
                                    sub_end,
                                    code.slice(pointer, sub_end),
                                    extended.clone(),
                                ));
                            }
                            if !zero_width {
                                next_frontier.push((sub_end, extended));
                            }
                        }
                    }
                    Err(err) => {
                        if failure.is_none() {
                            failure = Some(err);
                        }
                    }
                }
            }
            frontier = next_frontier;
        }
        if outcomes.is_empty() {
            return Err(failure.unwrap_or_else(|| {
                ValidateError::Mismatch(ValidationError::new(
                    pointer,
                    format!("Expected {}.", element),
                ))
            }));
        }
        Ok(outcomes)
    }

    fn match_optional(
        &self,
        code: &Code,
        element: &Arc<Element>,
        child: &Arc<Element>,
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        let mut outcomes = vec![ParseTree::node(
            element.clone(),
            pointer,
            pointer,
            String::new(),
            Vec::new(),
        )];
        if let Ok(subs) = self.match_element(code, child, pointer, cache) {
            outcomes.extend(
                subs.into_iter()
                    .map(|sub| ParseTree::wrap(element.clone(), sub)),
            );
        }
        Ok(outcomes)
    }

    fn match_literal(
        &self,
        code: &Code,
        element: &Arc<Element>,
        value: &str,
        case_sensitive: bool,
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        let mut p = pointer;
        for expected in value.chars() {
            match code.char_at(p) {
                Some(actual) if chars_equal(actual, expected, case_sensitive) => p += 1,
                _ => {
                    return Err(ValidateError::Mismatch(ValidationError::new(
                        p,
                        format!("Expected {}.", element),
                    )))
                }
            }
        }
        cache.update_index(p);
        Ok(vec![ParseTree::leaf(
            element.clone(),
            pointer,
            p,
            code.slice(pointer, p),
        )])
    }

    fn match_numeric(
        &self,
        code: &Code,
        element: &Arc<Element>,
        value: u32,
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        match code.char_at(pointer) {
            Some(c) if c as u32 == value => {
                cache.update_index(pointer + 1);
                Ok(vec![ParseTree::leaf(
                    element.clone(),
                    pointer,
                    pointer + 1,
                    code.slice(pointer, pointer + 1),
                )])
            }
            _ => Err(ValidateError::Mismatch(ValidationError::new(
                pointer,
                format!("Expected {}.", element),
            ))),
        }
    }

    fn match_series(
        &self,
        code: &Code,
        element: &Arc<Element>,
        values: &[u32],
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        let mut p = pointer;
        for value in values {
            match code.char_at(p) {
                Some(c) if c as u32 == *value => p += 1,
                _ => {
                    return Err(ValidateError::Mismatch(ValidationError::new(
                        p,
                        format!("Expected {}.", element),
                    )))
                }
            }
        }
        cache.update_index(p);
        Ok(vec![ParseTree::leaf(
            element.clone(),
            pointer,
            p,
            code.slice(pointer, p),
        )])
    }

    fn match_range(
        &self,
        code: &Code,
        element: &Arc<Element>,
        min: u32,
        max: u32,
        pointer: usize,
        cache: &mut Cache,
    ) -> MatchResult {
        match code.char_at(pointer) {
            Some(c) if (min..=max).contains(&(c as u32)) => {
                cache.update_index(pointer + 1);
                Ok(vec![ParseTree::leaf(
                    element.clone(),
                    pointer,
                    pointer + 1,
                    code.slice(pointer, pointer + 1),
                )])
            }
            _ => Err(ValidateError::Mismatch(ValidationError::new(
                pointer,
                format!("Expected {}.", element),
            ))),
        }
    }

    fn log_entry(&self, _name: &str, _pointer: usize) {
        #[cfg(debug_assertions)]
        if let Some(label) = self.debugger.get() {
            if label.order() >= Log::Verbose(()).order() {
                println!("[{}] Entering rule '{}' at {}.", label, _name, _pointer);
            }
        }
    }

    fn log_result(&self, _code: &Code, _name: &str, _pointer: usize, _result: &MatchResult) {
        #[cfg(debug_assertions)]
        match _result {
            Ok(outcomes) => {
                if let Some(label) = self.debugger.get() {
                    if label.order() >= Log::Success(()).order() {
                        println!(
                            "[{}; RuleSuccess]: '{}' with {} outcomes at {}",
                            label,
                            _name,
                            outcomes.len(),
                            _code.obtain_position(_pointer)
                        );
                    }
                }
            }
            Err(_) => {
                if let Some(label) = self.debugger.get() {
                    if label.order() >= Log::Result(()).order() {
                        println!(
                            "[{}; RuleError]: '{}' at {}",
                            label,
                            _name,
                            _code.obtain_position(_pointer)
                        );
                    }
                }
            }
        }
    }
}

fn chars_equal(actual: char, expected: char, case_sensitive: bool) -> bool {
    if case_sensitive {
        actual == expected
    } else {
        actual.to_ascii_lowercase() == expected.to_ascii_lowercase()
    }
}

fn attach_position(code: &Code, err: ValidateError) -> ValidateError {
    match err {
        ValidateError::Mismatch(mut error) => {
            let position = code.obtain_position(error.pointer);
            write!(error.message, "\nFailed to match at {}.", position).unwrap();
            ValidateError::Mismatch(error)
        }
        ValidateError::Collection(collection) => ValidateError::Collection(collection),
    }
}
