// Copyright (C) 2022-2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of journald-tracing.
//
// journald-tracing is free software: you can redistribute it and/or modify it under the terms of
// the GNU General Public License as published by the Free Software Foundation, either version 3 of
// the License, or (at your option) any later version.
//
// journald-tracing is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with journald-tracing.
// If not, see <http://www.gnu.org/licenses/>.

//! [journald-tracing](crate) errors

use backtrace::Backtrace;

use std::path::PathBuf;

/// [journald-tracing](crate) error type
///
/// [journald-tracing](crate) eschews libraries like [thiserror], [anyhow] & [Snafu] in favor of
/// a straightforward enumeration with a few match arms chosen on the basis what the caller will
/// need to repond.
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [Snafu]: https://docs.rs/snafu/latest/snafu
#[non_exhaustive]
pub enum Error {
    /// A journal field name was empty, non-ASCII, or contained `=` or a newline
    BadFieldName { name: String, back: Backtrace },
    /// A field did not fit in what remained of the datagram buffer
    BufferOverflow {
        key: String,
        needed: usize,
        available: usize,
        back: Backtrace,
    },
    /// The byte length of a field value could not be written as a 64-bit length prefix
    BadLength { key: String, back: Backtrace },
    /// Failed to open or connect the journal socket
    Connect {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// Failed to send a datagram on a connected journal socket
    Send {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadFieldName { name, .. } => {
                write!(f, "'{}' is not a legal journal field name", name.escape_debug())
            }
            Error::BufferOverflow {
                key,
                needed,
                available,
                ..
            } => write!(
                f,
                "Field {} needs {} bytes, but only {} remain in the datagram buffer",
                key, needed, available
            ),
            Error::BadLength { key, .. } => {
                write!(f, "Failed to compute the length prefix for field {}", key)
            }
            Error::Connect { path, source, .. } => write!(
                f,
                "While connecting to the journal at {}, got {}",
                path.display(),
                source
            ),
            Error::Send { source, .. } => {
                write!(f, "While sending a journal datagram, got {}", source)
            }
            _ => write!(f, "Other journald-tracing error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadFieldName { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::BufferOverflow { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::BadLength { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::Connect { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::Send { back, .. } => write!(f, "{}\n{:#?}", self, back),
            err => write!(f, "journald-tracing error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    #[allow(unreachable_patterns)]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connect { source, .. } | Error::Send { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
