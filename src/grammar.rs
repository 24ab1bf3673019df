use crate::element::is_valid_rule_name;
use crate::{Element, Grammar, GrammarParser, ImplementationError, ParserError, Rule};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

impl Rule {
    /// Create a named rule.
    /// ### Arguments
    /// * `name` - A rule name matching `[A-Za-z][A-Za-z0-9-]*`.
    /// * `element` - The rule body.
    pub fn new(name: &str, element: Element) -> Result<Self, ImplementationError> {
        if !is_valid_rule_name(name) {
            return Err(ImplementationError::new(
                "InvalidRuleName".into(),
                format!("'{}' is not a valid ABNF rule name.", name),
            ));
        }
        Ok(Rule {
            name: name.to_string(),
            element: Arc::new(element),
        })
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.element)
    }
}

impl Grammar {
    /// Parse grammar text with the default [ParserOptions](crate::ParserOptions).
    pub fn parse(text: &str) -> Result<Self, ParserError> {
        GrammarParser::default().parse(text)
    }

    /// Create a grammar from programmatically constructed rules.
    ///
    /// Rule names must be unique; names are compared case-insensitively.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, ImplementationError> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            if seen.insert(rule.name.to_ascii_lowercase(), index).is_some() {
                return Err(ImplementationError::new(
                    "DuplicateRule".into(),
                    format!("Rule '{}' is defined more than once.", rule.name),
                ));
            }
        }
        Ok(Self {
            rules,
            index: OnceCell::with_value(seen),
        })
    }

    /// Internal constructor for rule lists whose names are already known to be unique.
    pub(crate) fn from_rule_list(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            index: OnceCell::new(),
        }
    }

    /// The rules in first-appearance order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by name, ignoring case.
    pub fn get_rule(&self, name: &str) -> Option<&Rule> {
        self.obtain_index()
            .get(&name.to_ascii_lowercase())
            .map(|index| &self.rules[*index])
    }

    fn obtain_index(&self) -> &HashMap<String, usize> {
        self.index.get_or_init(|| {
            self.rules
                .iter()
                .enumerate()
                .map(|(index, rule)| (rule.name.to_ascii_lowercase(), index))
                .collect()
        })
    }
}

impl Display for Grammar {
    /// Serialize the grammar back to RFC 5234 text, one rule per line.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for rule in &self.rules {
            write!(f, "{}\r\n", rule)?;
        }
        Ok(())
    }
}
