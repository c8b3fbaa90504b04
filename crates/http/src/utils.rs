//! Internal helpers.

/// Returns `Err($error)` from the enclosing function unless `$predicate` holds.
///
/// The error expression is only evaluated on failure, so it may move values that the
/// rest of the function uses on the success path.
///
/// ```ignore
/// ensure!(is_allowed_method(&method), ParseError::method_not_allowed(method));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
