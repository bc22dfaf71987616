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

//! Journal [native protocol] datagram encoding.
//!
//! [native protocol]: https://systemd.io/JOURNAL_NATIVE_PROTOCOL/
//!
//! A datagram is a flat sequence of fields with no overall header or trailer. Each field is
//! written in one of two forms, depending on whether its value contains a newline:
//!
//! ```text
//! KEY=value\n
//! KEY\n<length: u64, little-endian>value\n
//! ```
//!
//! The second form lets multi-line values (stack traces, for instance) through without any
//! escaping.
//!
//! # Examples
//!
//! ```rust
//! use journald_tracing::encoder::write_field;
//! let mut buf = [0u8; 64];
//! let n = write_field("MESSAGE", "Hello, world!", &mut buf, 0).unwrap();
//! assert_eq!(&buf[..n], b"MESSAGE=Hello, world!\n");
//! ```

use crate::{
    error::{Error, Result},
    field::Field,
};

use backtrace::Backtrace;
use bytes::BufMut;

/// Default capacity of the datagram buffer; generous enough for a long stack trace.
pub const DEFAULT_BUFFER_CAPACITY: usize = 32 * 1024;

const LENGTH_PREFIX_SIZE: usize = std::mem::size_of::<u64>();

/// Write a single field into `buffer` at `position`, returning the number of bytes written.
///
/// Fails with [`Error::BufferOverflow`] if the encoded field would run past the end of `buffer`;
/// in that case nothing is written.
pub fn write_field(key: &str, value: &str, buffer: &mut [u8], position: usize) -> Result<usize> {
    let binary = value.contains('\n');
    let needed = if binary {
        key.len() + 1 + LENGTH_PREFIX_SIZE + value.len() + 1
    } else {
        key.len() + 1 + value.len() + 1
    };
    let available = buffer.len().saturating_sub(position);
    if needed > available {
        return Err(Error::BufferOverflow {
            key: key.to_owned(),
            needed,
            available,
            back: Backtrace::new(),
        });
    }

    let mut out = &mut buffer[position..position + needed];
    out.put_slice(key.as_bytes());
    if binary {
        let length = u64::try_from(value.len()).map_err(|_| Error::BadLength {
            key: key.to_owned(),
            back: Backtrace::new(),
        })?;
        out.put_u8(b'\n');
        out.put_u64_le(length);
    } else {
        out.put_u8(b'=');
    }
    out.put_slice(value.as_bytes());
    out.put_u8(b'\n');

    Ok(needed)
}

/// Write `fields`, in order, into `buffer` starting at `position`; return the total number of
/// bytes written (i.e. the datagram length when `position` is zero).
pub fn write_datagram(fields: &[Field<'_>], buffer: &mut [u8], position: usize) -> Result<usize> {
    let mut count = 0;
    for field in fields {
        count += write_field(field.key, &field.value, buffer, position + count)?;
    }
    Ok(count)
}

/// A fixed-capacity datagram buffer, reused from one entry to the next.
///
/// The buffer never grows: an entry that doesn't fit is an error, not a reallocation.
pub struct Encoder {
    buffer: Box<[u8]>,
}

impl std::default::Default for Encoder {
    fn default() -> Self {
        Encoder::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl Encoder {
    pub fn new(capacity: usize) -> Encoder {
        Encoder {
            buffer: vec![0u8; capacity].into_boxed_slice(),
        }
    }
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
    /// Encode `fields` as a single datagram & return it.
    pub fn encode(&mut self, fields: &[Field<'_>]) -> Result<&[u8]> {
        let count = write_datagram(fields, &mut self.buffer, 0)?;
        Ok(&self.buffer[..count])
    }
}
