// src/context.rs
//! Context extension traits + macros for error handling.
//!
//! `.context()` / `.with_context()` on `Result`, plus `bail!` and `ensure!`,
//! all producing [`crate::error::Error`].

use crate::error::{Error, Result};

/// Extension trait giving you `.context()` / `.with_context()` on any `Result`
/// whose error converts into [`Error`].
pub trait Context<T, E> {
    /// Add static or owned context (built eagerly).
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Into<String>;

    /// Add context lazily; the closure only runs on the error path.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    #[inline(always)]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Into<String>,
    {
        self.map_err(|err| err.into().context(context))
    }

    #[inline(always)]
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|err| err.into().context(f()))
    }
}

// ====================== CONVENIENCE MACROS ======================

/// Early return with an error: `bail!("msg")`, `bail!(err)` or formatted.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::error::Error::msg($msg))
    };
    ($err:expr $(,)?) => {
        return Err(Into::<$crate::error::Error>::into($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::format(format_args!($fmt, $($arg)*)))
    };
}

/// Ensure a condition is true, else `bail!`.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !($cond) {
            $crate::bail!($msg);
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !($cond) {
            $crate::bail!($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($fmt, $($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_positive(raw: &str) -> Result<i32> {
        let value: i32 = raw
            .parse::<i32>()
            .map_err(|e| Error::custom(e.to_string()))
            .with_context(|| format!("parsing `{raw}`"))?;
        crate::ensure!(value > 0, "value must be positive, got {}", value);
        Ok(value)
    }

    #[test]
    fn with_context_prefixes_the_message() {
        let err = parse_positive("abc").unwrap_err();
        assert!(err.to_string().starts_with("parsing `abc`: "));
    }

    #[test]
    fn ensure_formats_its_message() {
        let err = parse_positive("-3").unwrap_err();
        assert_eq!(err.to_string(), "value must be positive, got -3");
        assert_eq!(parse_positive("7").unwrap(), 7);
    }
}
