#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("formatted text exceeds the {capacity} character buffer")]
    CapacityExceeded { capacity: usize },

    #[error("format directive needs argument {index}, which was not supplied")]
    MissingArgument { index: usize },

    #[error("format argument {index} must be a number")]
    NotANumber { index: usize },

    #[error("text resource {resource} has no string {index}")]
    MissingText { resource: u16, index: u16 },
}
