use crate::{ErrorCollection, ImplementationError, ParserError, ValidateError, ValidationError};
use std::fmt::{Display, Formatter};

impl ImplementationError {
    pub fn new(what: String, message: String) -> Self {
        Self { message, what }
    }
}

impl Display for ImplementationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImplementationError: {}-{}", self.what, self.message)
    }
}

impl ParserError {
    pub fn new(pointer: usize, message: String) -> Self {
        Self { pointer, message }
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SyntaxError: {}", self.message)
    }
}

impl ValidationError {
    pub fn new(pointer: usize, message: String) -> Self {
        Self { pointer, message }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ValidationError: {}", self.message)
    }
}

impl ErrorCollection {
    /// Create a collection from leaf errors. Use [ValidateError::flatten] to aggregate
    /// results which may themselves be collections.
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Display for ErrorCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ErrorCollection of {} errors:", self.errors.len())?;
        for error in &self.errors {
            write!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl ValidateError {
    /// Combine the leaf errors of several failures into a single error value.
    ///
    /// Nested collections are flattened, so the resulting collection always holds a flat
    /// list of leaf [ValidationError] values.
    /// A single leaf is surfaced as a bare [Mismatch](ValidateError::Mismatch).
    pub fn flatten(failures: Vec<ValidateError>) -> Self {
        let mut errors: Vec<ValidationError> = Vec::new();
        for failure in failures {
            match failure {
                ValidateError::Mismatch(error) => errors.push(error),
                ValidateError::Collection(collection) => errors.extend(collection.errors),
            }
        }
        if errors.len() == 1 {
            ValidateError::Mismatch(errors.swap_remove(0))
        } else {
            ValidateError::Collection(ErrorCollection::new(errors))
        }
    }

    pub fn is_mismatch(&self) -> bool {
        match self {
            ValidateError::Mismatch(_) => true,
            ValidateError::Collection(_) => false,
        }
    }

    pub fn is_collection(&self) -> bool {
        !self.is_mismatch()
    }

    /// The code point offset of the deepest recorded mismatch.
    pub fn pointer(&self) -> usize {
        match self {
            ValidateError::Mismatch(error) => error.pointer,
            ValidateError::Collection(collection) => collection
                .errors
                .iter()
                .map(|error| error.pointer)
                .max()
                .unwrap_or(0),
        }
    }
}

impl Display for ValidateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidateError::Mismatch(error) => error.fmt(f),
            ValidateError::Collection(collection) => collection.fmt(f),
        }
    }
}

impl From<ValidationError> for ValidateError {
    fn from(error: ValidationError) -> Self {
        ValidateError::Mismatch(error)
    }
}
