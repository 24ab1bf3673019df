use crate::util::Code;
use crate::{Cache, CacheKey, Element, MatchResult, ValidationError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

impl CacheKey {
    /// The identity of an element within the rule table.
    pub(crate) fn of(element: &Arc<Element>) -> Self {
        CacheKey(Arc::as_ptr(element) as usize)
    }
}

impl Cache {
    pub fn root() -> Self {
        Self {
            matched_result_cache: HashMap::new(),
            in_progress: HashSet::new(),
            max_matched_point: 0,
        }
    }

    pub fn find(&self, key: CacheKey, index: usize) -> Option<&MatchResult> {
        self.matched_result_cache.get(&(key, index))
    }

    pub fn insert(&mut self, key: CacheKey, index: usize, result: MatchResult) -> Option<MatchResult> {
        self.matched_result_cache.insert((key, index), result)
    }

    /// Mark `(key, index)` as being matched. Returns `false` when the pair is already
    /// active, i.e. the rule recursed into itself without consuming input.
    pub fn enter(&mut self, key: CacheKey, index: usize) -> bool {
        self.in_progress.insert((key, index))
    }

    pub fn exit(&mut self, key: CacheKey, index: usize) {
        self.in_progress.remove(&(key, index));
    }

    pub fn update_index(&mut self, index: usize) {
        if self.max_matched_point < index {
            self.max_matched_point = index;
        }
    }

    pub fn get_index(&self) -> usize {
        self.max_matched_point
    }

    /// Diagnostic for a validation where outcomes exist but none spans the whole input,
    /// anchored at the maximum successfully matched position.
    pub fn create_error(&self, code: &Code) -> ValidationError {
        match code.char_at(self.max_matched_point) {
            Some(c) => ValidationError::new(
                self.max_matched_point,
                format!("Unexpected '{}'.", c),
            ),
            None => ValidationError::new(code.len(), "Unexpected end of input.".into()),
        }
    }
}
