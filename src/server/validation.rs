use std::cell::RefCell;
use std::fmt;

/// A single failed field check recorded while handling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub key: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Request-scoped stack of field validation failures.
///
/// Owned by the [`RequestContext`](super::RequestContext); field validators
/// push onto it and control points read it back. The router clears it when a
/// request begins so nothing leaks between traversals that reuse a context.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: RefCell<Vec<FieldError>>,
}

impl ValidationErrors {
    pub fn push(&self, error: FieldError) {
        self.errors.borrow_mut().push(error);
    }

    /// Remove and return the most recent error.
    pub fn pop(&self) -> Option<FieldError> {
        self.errors.borrow_mut().pop()
    }

    /// Copy of the most recent error, left on the stack.
    #[must_use]
    pub fn last(&self) -> Option<FieldError> {
        self.errors.borrow().last().cloned()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_valid()
    }

    /// Snapshot of the recorded errors, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<FieldError> {
        self.errors.borrow().clone()
    }

    pub fn clear(&self) {
        self.errors.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_last_clear() {
        let errors = ValidationErrors::default();
        assert!(errors.is_valid());

        errors.push(FieldError::new("age", "INVALID STRING FORMAT FOR INTEGER"));
        errors.push(FieldError::new("name", "FIELD CANNOT BE NULL"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.last().map(|e| e.key), Some("name".to_string()));

        errors.clear();
        assert!(errors.is_valid());
        assert!(errors.last().is_none());
    }

    #[test]
    fn test_pop_unwinds_newest_first() {
        let errors = ValidationErrors::default();
        errors.push(FieldError::new("email", "FIELD CANNOT BE NULL"));
        errors.push(FieldError::new("zip", "INVALID FORMAT"));

        assert_eq!(errors.pop(), Some(FieldError::new("zip", "INVALID FORMAT")));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.pop().map(|e| e.key), Some("email".to_string()));
        assert!(errors.pop().is_none());
        assert!(errors.is_valid());
    }
}
