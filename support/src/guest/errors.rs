use std::fmt::Display;

/// Errors that may occur while instantiating a proc-block.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error("{0}")]
    Other(String),
}

impl CreateError {
    pub fn other(error: impl Display) -> Self {
        CreateError::Other(error.to_string())
    }
}

/// An argument passed to the proc-block was missing or invalid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("The \"{name}\" argument is invalid")]
pub struct ArgumentError {
    pub name: String,
    #[source]
    pub reason: ArgumentErrorReason,
}

impl ArgumentError {
    pub fn not_found(name: impl Into<String>) -> Self {
        ArgumentError {
            name: name.into(),
            reason: ArgumentErrorReason::NotFound,
        }
    }

    pub fn invalid_value(name: impl Into<String>, error: impl Display) -> Self {
        ArgumentError {
            name: name.into(),
            reason: ArgumentErrorReason::InvalidValue(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgumentErrorReason {
    #[error("{0}")]
    Other(String),
    #[error("The argument wasn't defined")]
    NotFound,
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Errors that may occur while running a proc-block.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error("{0}")]
    Other(String),
}

impl RunError {
    pub fn other(reason: impl Display) -> Self {
        RunError::Other(reason.to_string())
    }

    pub fn missing_input(tensor_name: impl Into<String>) -> Self {
        RunError::InvalidInput(InvalidInput::not_found(tensor_name))
    }
}

/// One of the tensors passed to the proc-block was unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("The \"{name}\" input tensor was invalid")]
pub struct InvalidInput {
    pub name: String,
    #[source]
    pub reason: InvalidInputReason,
}

impl InvalidInput {
    pub fn not_found(tensor_name: impl Into<String>) -> Self {
        InvalidInput::new(tensor_name, InvalidInputReason::NotFound)
    }

    pub fn incompatible_element_type(tensor_name: impl Into<String>) -> Self {
        InvalidInput::new(
            tensor_name,
            InvalidInputReason::IncompatibleElementType,
        )
    }

    pub fn incompatible_dimensions(tensor_name: impl Into<String>) -> Self {
        InvalidInput::new(
            tensor_name,
            InvalidInputReason::IncompatibleDimensions,
        )
    }

    pub fn invalid_value(
        tensor_name: impl Into<String>,
        error: impl Display,
    ) -> Self {
        InvalidInput::new(
            tensor_name,
            InvalidInputReason::InvalidValue(error.to_string()),
        )
    }

    pub fn other(tensor_name: impl Into<String>, reason: impl Display) -> Self {
        InvalidInput::new(
            tensor_name,
            InvalidInputReason::Other(reason.to_string()),
        )
    }

    fn new(tensor_name: impl Into<String>, reason: InvalidInputReason) -> Self {
        InvalidInput {
            name: tensor_name.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputReason {
    #[error("{0}")]
    Other(String),
    #[error("Not found")]
    NotFound,
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Incompatible element type")]
    IncompatibleElementType,
    #[error("Incompatible dimensions")]
    IncompatibleDimensions,
}
