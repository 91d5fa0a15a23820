//! errors raised while parsing or evaluating a condition

use thiserror::Error;

use crate::properties::PropertyError;

/// result type for condition parsing and evaluation
pub type ConditionResult<T> = Result<T, ConditionError>;

/// why a condition could not be parsed or evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// malformed input: unbalanced parentheses, bad tokens, trailing input
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// operator or function applied to a value of the wrong type
    #[error("type error: {0}")]
    Type(String),

    /// division by zero
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// call to a function nobody registered
    #[error("unknown function: {name}{}", did_you_mean(.suggestion))]
    UnknownFunction {
        name: String,
        suggestion: Option<String>,
    },

    /// function called with the wrong number of arguments
    #[error("function '{name}' expects {expected} argument(s), got {actual}")]
    Arity {
        name: String,
        expected: &'static str,
        actual: usize,
    },

    /// a function rejected its arguments
    #[error("{name}: {message}")]
    Function { name: String, message: String },

    /// property alias could not be resolved
    #[error(transparent)]
    Property(#[from] PropertyError),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

impl ConditionError {
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        ConditionError::Parse {
            offset,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        ConditionError::Type(message.into())
    }

    pub fn function(name: &str, message: impl Into<String>) -> Self {
        ConditionError::Function {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// fatal errors must reach the top-level caller instead of becoming warnings
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConditionError::Property(e) if e.is_fatal())
    }
}
