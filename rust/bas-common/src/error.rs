use thiserror::Error;

/// Error returned by the fallible (`try_*`) entry points of the bas-* crates.
///
/// The infallible entry points never produce this type: contract violations panic and
/// allocation failure aborts through `std::alloc::handle_alloc_error`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn allocation_failed(size: usize, alignment: usize) -> Error {
        Error(ErrorKind::AllocationFailed { size, alignment }.into())
    }

    pub fn capacity_overflow() -> Error {
        Error(ErrorKind::CapacityOverflow.into())
    }

    /// Returns `true` if the error reports that the underlying allocator could not
    /// satisfy a request.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::AllocationFailed { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("failed to allocate {size} bytes with alignment {alignment}")]
    AllocationFailed { size: usize, alignment: usize },

    #[error("capacity overflow")]
    CapacityOverflow,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::alloc::LayoutError> for Error {
    fn from(e: std::alloc::LayoutError) -> Self {
        Error::invalid_arg("layout", e.to_string())
    }
}
