//! Utility macros shared by the message crate.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but hands the error back to the caller instead of panicking.
///
/// # Example
///
/// ```ignore
/// ensure!(len > 0, StreamError::ZeroLengthRead);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
