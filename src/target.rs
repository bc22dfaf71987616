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

//! The journal target: records in, datagrams out.
//!
//! [`JournaldTarget`] ties together [`Record::fields`], an [`Encoder`] and a [`Transport`]. The
//! encoder's buffer & the transport are shared, mutable state, so every write is serialized
//! through a single mutex; a [`JournaldTarget`] may be used from as many threads as you like.
//!
//! ```rust
//! use journald_tracing::{priority::Severity, record::Record, target::{JournaldTarget, LogSink}};
//!
//! let target = JournaldTarget::builder()
//!     .syslog_identifier("demo")
//!     .static_field("ENV", "prod")
//!     .unwrap()
//!     .build();
//! // Fails unless journald is running, of course
//! let _ = target.write(&Record::new(Severity::Info, "DemoLogger", "Hello world!"));
//! ```

use crate::{
    encoder::{Encoder, DEFAULT_BUFFER_CAPACITY},
    error::Result,
    field::StaticField,
    record::Record,
    transport::{JournalSocket, Transport},
};

use parking_lot::Mutex;
use tracing::warn;

/// Something to which log [`Record`]s may be written.
pub trait LogSink {
    /// Deliver one record. Failures are returned to the caller, who decides what to do with them;
    /// the sink must remain usable for the next record either way.
    fn write(&self, record: &Record) -> Result<()>;
    /// Release any resources held. This must not fail, and may be called more than once.
    fn close(&self);
}

struct Inner<T: Transport> {
    encoder: Encoder,
    transport: T,
}

/// A [`LogSink`] that writes each [`Record`] to the journal as a single native-protocol datagram.
pub struct JournaldTarget<T: Transport = JournalSocket> {
    syslog_identifier: Option<String>,
    static_fields: Vec<StaticField>,
    inner: Mutex<Inner<T>>,
}

pub struct JournaldTargetBuilder {
    syslog_identifier: Option<String>,
    static_fields: Vec<StaticField>,
    buffer_capacity: usize,
}

impl JournaldTargetBuilder {
    /// Emit `identifier` as `SYSLOG_IDENTIFIER` on every entry
    pub fn syslog_identifier<S: Into<String>>(mut self, identifier: S) -> Self {
        self.syslog_identifier = Some(identifier.into());
        self
    }
    /// Add a field to be included in every entry, after all the others
    pub fn static_field<K, V>(mut self, key: K, value: V) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.static_fields.push(StaticField::new(key, value)?);
        Ok(self)
    }
    pub fn static_fields<I: IntoIterator<Item = StaticField>>(mut self, fields: I) -> Self {
        self.static_fields.extend(fields);
        self
    }
    /// Size, in bytes, of the (fixed) datagram buffer; entries larger than this can't be sent.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }
    /// Build a target that writes to the system journal
    pub fn build(self) -> JournaldTarget<JournalSocket> {
        let transport = JournalSocket::default().with_send_buffer_size(self.buffer_capacity);
        self.build_with_transport(transport)
    }
    /// Build a target that writes via `transport`
    pub fn build_with_transport<T: Transport>(self, transport: T) -> JournaldTarget<T> {
        JournaldTarget {
            syslog_identifier: self.syslog_identifier,
            static_fields: self.static_fields,
            inner: Mutex::new(Inner {
                encoder: Encoder::new(self.buffer_capacity),
                transport,
            }),
        }
    }
}

impl JournaldTarget<JournalSocket> {
    pub fn builder() -> JournaldTargetBuilder {
        JournaldTargetBuilder {
            syslog_identifier: None,
            static_fields: Vec::new(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl std::default::Default for JournaldTarget<JournalSocket> {
    fn default() -> Self {
        JournaldTarget::builder().build()
    }
}

impl<T: Transport> JournaldTarget<T> {
    /// A target with no identifier & no static fields, writing via `transport`
    pub fn with_transport(transport: T) -> Self {
        JournaldTarget::builder().build_with_transport(transport)
    }
    pub fn syslog_identifier(&self) -> Option<&str> {
        self.syslog_identifier.as_deref()
    }
    pub fn static_fields(&self) -> &[StaticField] {
        &self.static_fields
    }
}

impl<T: Transport> LogSink for JournaldTarget<T> {
    fn write(&self, record: &Record) -> Result<()> {
        let fields = record.fields(self.syslog_identifier.as_deref(), &self.static_fields);
        let mut guard = self.inner.lock();
        let Inner { encoder, transport } = &mut *guard;
        let datagram = encoder.encode(&fields).map_err(|err| {
            warn!("Failed to encode a journal entry: {}", err);
            err
        })?;
        transport.send(datagram)?;
        Ok(())
    }
    fn close(&self) {
        self.inner.lock().transport.close();
    }
}

impl<T: Transport> std::ops::Drop for JournaldTarget<T> {
    fn drop(&mut self) {
        self.inner.get_mut().transport.close();
    }
}
