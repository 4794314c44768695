use std::fmt;

use thiserror::Error;

use super::ErrorCode;

/// One problem found while validating a workflow file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub file: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationError {
    pub fn new(file: &str, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        if !hint.is_empty() {
            self.hint = Some(hint);
        }
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.file.is_empty() {
            write!(f, "{}: ", self.file)?;
        }
        f.write_str(&self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  Hint: {hint}")?;
        }
        Ok(())
    }
}

/// All problems found in one workflow file, in discovery order.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn push(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::ValidationError
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => f.write_str("no errors"),
            [only] => write!(f, "{only}"),
            many => {
                writeln!(f, "found {} configuration errors:", many.len())?;
                for (i, err) in many.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_error_renders_without_numbering() {
        let errs = ValidationErrors {
            errors: vec![ValidationError::new("Cortexfile.yml", "no tasks defined")
                .with_hint("Add a 'tasks:' section with at least one task")],
        };
        assert_eq!(
            errs.to_string(),
            "Cortexfile.yml: no tasks defined\n  Hint: Add a 'tasks:' section with at least one task"
        );
    }

    #[test]
    fn multiple_errors_are_numbered() {
        let mut errs = ValidationErrors::default();
        errs.push(ValidationError::new("", "no agents defined"));
        errs.push(ValidationError::new("", "no tasks defined"));
        assert_eq!(
            errs.to_string(),
            "found 2 configuration errors:\n  1. no agents defined\n  2. no tasks defined\n"
        );
    }

    #[test]
    fn empty_hint_is_dropped() {
        let err = ValidationError::new("f", "m").with_hint("");
        assert_eq!(err.hint, None);
    }
}
