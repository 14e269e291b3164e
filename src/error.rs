use std::{alloc::Layout, fmt};

/// The global allocator could not hand out memory for a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    pub layout: Layout,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to allocate {} bytes (align {})",
            self.layout.size(),
            self.layout.align()
        )
    }
}

impl std::error::Error for AllocError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Alloc(AllocError),
    /// The key has no ordering against itself or against a stored key.
    Incomparable,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Alloc(e) => write!(f, "node allocation failed: {e}"),
            Error::Incomparable => f.write_str("key cannot be ordered"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Alloc(e) => Some(e),
            Error::Incomparable => None,
        }
    }
}

impl From<AllocError> for Error {
    fn from(e: AllocError) -> Self {
        Error::Alloc(e)
    }
}
