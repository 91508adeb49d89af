// src/error.rs
//! Error handling for level loading and configuration.
//!
//! The per-tick movement path never fails; everything that can go wrong
//! happens at load time (files, map bytes, JSON) and lands here.

use std::fmt;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O errors (missing map or config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Non UTF-8 strings inside a map file.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Config / metadata (de)serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file does not start with the `TMAP` magic bytes.
    #[error("invalid map magic: expected `TMAP`, found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    /// The map ended before a field could be read.
    #[error("map data truncated at byte {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    /// The map has no triangle to collide with.
    #[error("map contains no collision geometry")]
    EmptyLevel,

    /// Simple custom message.
    #[error("{0}")]
    Custom(String),

    /// Context chaining, see [`crate::context::Context`].
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    #[inline]
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Self::Custom(msg.into())
    }

    /// Formatted custom error, used by `bail!`.
    #[inline]
    pub fn format(args: fmt::Arguments) -> Self {
        Self::Custom(fmt::format(args))
    }

    /// Wrap this error with a message describing what was being attempted.
    #[inline]
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    #[inline]
    pub fn msg(msg: &'static str) -> Self {
        Self::Custom(msg.into())
    }

    #[inline]
    pub fn is_io(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::WithContext { source, .. } => source.is_io(),
            _ => false,
        }
    }

    /// True for every failure caused by malformed map bytes.
    #[inline]
    pub fn is_malformed_map(&self) -> bool {
        match self {
            Error::InvalidMagic { .. } | Error::Truncated { .. } | Error::Utf8(_) => true,
            Error::WithContext { source, .. } => source.is_malformed_map(),
            _ => false,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
