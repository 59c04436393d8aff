use thiserror::Error;

/// A caller handed a pure domain function input outside its contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid argument: {0}")]
pub struct InvalidArgument(pub String);

impl InvalidArgument {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
