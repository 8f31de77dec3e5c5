//! Tagged result of a cache operation.

/// Outcome of a cache operation.
///
/// Cache operations never fail with an error: a backend failure is a value
/// like any other, and callers decide what it means. For reads, `NotFound`
/// and `BackendError` are handled identically ("go to the store").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome<T> {
    /// The operation succeeded.
    Ok(T),
    /// No live entry under the key.
    NotFound,
    /// The backend could not be reached or rejected the request.
    BackendError(String),
}

impl<T> CacheOutcome<T> {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    #[must_use]
    pub const fn is_backend_error(&self) -> bool {
        matches!(self, Self::BackendError(_))
    }

    /// Collapses the outcome to the value, treating both failure tags as
    /// absence.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::NotFound | Self::BackendError(_) => None,
        }
    }
}
