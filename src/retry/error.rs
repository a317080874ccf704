//! Error types for retry operations.

/// An operation failure, tagged with whether it is worth retrying.
///
/// The tag is structural: any `Permanent` error ends the retry loop
/// immediately regardless of its payload, and the engine hands the caller
/// the unwrapped inner error. `Transient` errors feed the schedule.
///
/// Both variants are transparent in display: formatting an
/// `OperationError` formats the inner error.
///
/// # Examples
///
/// ```rust
/// use anew::OperationError;
///
/// // Plain errors convert to transient failures, so `?` works inside
/// // operations returning `Result<T, OperationError<E>>`.
/// let err: OperationError<&str> = "timed out".into();
/// assert!(!err.is_permanent());
///
/// // Round-trip: marking then unwrapping yields the original error.
/// let err = OperationError::permanent("bad request");
/// assert!(err.is_permanent());
/// assert_eq!(err.into_inner(), "bad request");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError<E> {
    /// A failure that may succeed on a later attempt.
    Transient(E),
    /// A failure that no amount of retrying will fix.
    Permanent(E),
}

impl<E> OperationError<E> {
    /// Tag an error as retryable.
    pub fn transient(error: E) -> Self {
        Self::Transient(error)
    }

    /// Tag an error as non-retryable.
    pub fn permanent(error: E) -> Self {
        Self::Permanent(error)
    }

    /// True if this error ends the retry loop immediately.
    ///
    /// The check is by tag alone; two permanent errors match regardless of
    /// their underlying causes.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    /// True if this error feeds the schedule for another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Unwrap the underlying error, discarding the tag.
    pub fn into_inner(self) -> E {
        match self {
            Self::Transient(error) | Self::Permanent(error) => error,
        }
    }

    /// Get a reference to the underlying error.
    pub fn inner(&self) -> &E {
        match self {
            Self::Transient(error) | Self::Permanent(error) => error,
        }
    }
}

impl<E> From<E> for OperationError<E> {
    /// Untagged errors are transient; retrying is the default.
    fn from(error: E) -> Self {
        Self::Transient(error)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for OperationError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl<E: std::error::Error + 'static> std::error::Error for OperationError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner())
    }
}

/// Error returned by [`Retryer::retry`](crate::Retryer::retry).
///
/// # Examples
///
/// ```rust
/// use anew::RetryError;
///
/// let err: RetryError<&str> = RetryError::Operation("connection reset");
/// assert!(!err.is_cancelled());
/// assert_eq!(err.into_inner(), Some("connection reset"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The cancellation token fired before the operation succeeded.
    Cancelled,
    /// The operation's own error: the unwrapped cause of a permanent
    /// failure, or the last transient error once the schedule stopped.
    Operation(E),
}

impl<E> RetryError<E> {
    /// True if retrying stopped because the caller cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The operation error, if there was one.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Cancelled => None,
            Self::Operation(error) => Some(error),
        }
    }

    /// Get a reference to the operation error, if there was one.
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::Cancelled => None,
            Self::Operation(error) => Some(error),
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "retry cancelled"),
            Self::Operation(error) => write!(f, "{}", error),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cancelled => None,
            Self::Operation(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Cause(&'static str);

    impl std::fmt::Display for Cause {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for Cause {}

    #[test]
    fn permanent_round_trips_its_cause() {
        let err = OperationError::permanent(Cause("given"));
        assert_eq!(err.into_inner(), Cause("given"));
    }

    #[test]
    fn permanence_is_a_tag_not_a_payload() {
        let a = OperationError::permanent("one");
        let b = OperationError::permanent("another");

        assert!(a.is_permanent());
        assert!(b.is_permanent());
        assert!(!OperationError::transient("one").is_permanent());
    }

    #[test]
    fn display_is_transparent() {
        assert_eq!(
            OperationError::permanent(Cause("given error")).to_string(),
            "given error"
        );
        assert_eq!(
            OperationError::transient(Cause("given error")).to_string(),
            "given error"
        );
    }

    #[test]
    fn source_points_at_the_cause() {
        use std::error::Error as _;

        let err = OperationError::permanent(Cause("inner"));
        let source = err.source().expect("has a source");
        assert_eq!(source.to_string(), "inner");
    }

    #[test]
    fn plain_errors_convert_to_transient() {
        let err: OperationError<Cause> = Cause("oops").into();
        assert!(err.is_transient());
    }

    #[test]
    fn retry_error_display() {
        assert_eq!(
            RetryError::<Cause>::Cancelled.to_string(),
            "retry cancelled"
        );
        assert_eq!(
            RetryError::Operation(Cause("boom")).to_string(),
            "boom"
        );
    }

    #[test]
    fn retry_error_accessors() {
        let cancelled: RetryError<Cause> = RetryError::Cancelled;
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.into_inner(), None);

        let operation = RetryError::Operation(Cause("boom"));
        assert_eq!(operation.inner(), Some(&Cause("boom")));
        assert_eq!(operation.into_inner(), Some(Cause("boom")));
    }
}
