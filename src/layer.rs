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

//! [journald-tracing](crate) [`Layer`] implementation.
//!
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! [`JournaldLayer`] maps each [`Event`] onto a [`Record`] & hands it to a [`LogSink`] (by default,
//! a [`JournaldTarget`] writing to the system journal):
//!
//! - the event's `message` field becomes `MESSAGE`
//! - its level becomes `PRIORITY` & `LEVEL`
//! - its target becomes `LOGGER`
//! - fields named `exception_type`, `exception_message` & `exception_stacktrace`, or any
//!   field recorded as a `dyn Error`, describe an attached exception
//!
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html

use crate::{
    priority::Severity,
    record::{source_chain, ExceptionInfo, Record},
    target::{JournaldTarget, LogSink},
};

use tracing::Event;
use tracing_subscriber::layer::Context;

// When the tracing-log feature is enabled, use NormalizeEvent to recover the original target of
// events that originated from the `log` crate.
#[cfg(feature = "tracing-log")]
use tracing_log::NormalizeEvent;

/// Events with targets under this prefix are our own diagnostics; they must never be fed back into
/// the sink that produced them.
const INTERNAL_TARGET: &str = env!("CARGO_CRATE_NAME");

fn is_internal(target: &str) -> bool {
    target
        .strip_prefix(INTERNAL_TARGET)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       struct JournaldLayer                                     //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A [`tracing-subscriber`]-compliant [`Layer`] implementation that will send [`Event`]s to the
/// systemd journal.
///
/// Besides `message`, three event fields are recognized, whether recorded as plain strings or
/// with `%`/`?`: `exception_type`, `exception_message` and `exception_stacktrace`. Any one of them
/// is enough to emit the `EXCEPTION_*` fields; the missing ones are sent empty (or, for the stack
/// trace, omitted). An [`Error`](std::error::Error) value recorded as a field supplies the message
/// and its chain of sources as the stack trace. The concrete type of such a value can't be
/// recovered, so absent an explicit `exception_type` the *field name* stands in for it:
///
/// ```rust
/// # let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
/// // EXCEPTION_TYPE=error, EXCEPTION_MESSAGE=disk on fire
/// tracing::error!(error = &err as &(dyn std::error::Error + 'static), "write failed");
/// // EXCEPTION_TYPE=std::io::Error, EXCEPTION_MESSAGE=disk on fire
/// tracing::error!(exception_type = "std::io::Error", exception_message = %err, "write failed");
/// ```
///
/// [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
pub struct JournaldLayer<K: LogSink = JournaldTarget> {
    sink: K,
    with_stack_trace: bool,
}

impl std::default::Default for JournaldLayer<JournaldTarget> {
    /// A [`JournaldLayer`] writing to the system journal with no identifier or static fields
    fn default() -> Self {
        JournaldLayer::new(JournaldTarget::default())
    }
}

impl<K: LogSink> JournaldLayer<K> {
    pub fn new(sink: K) -> Self {
        JournaldLayer {
            sink,
            with_stack_trace: false,
        }
    }
    /// Capture the call stack for every event & send it as `STACKTRACE`
    pub fn with_stack_trace(mut self, with_stack_trace: bool) -> Self {
        self.with_stack_trace = with_stack_trace;
        self
    }
    pub fn sink(&self) -> &K {
        &self.sink
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: Option<String>,
    exception_type: Option<String>,
    exception_message: Option<String>,
    exception_stacktrace: Option<String>,
    error_field: Option<&'static str>,
}

impl RecordVisitor {
    fn exception(&mut self) -> Option<ExceptionInfo> {
        if self.exception_type.is_none()
            && self.exception_message.is_none()
            && self.exception_stacktrace.is_none()
        {
            return None;
        }
        let type_name = self
            .exception_type
            .take()
            .or_else(|| self.error_field.map(str::to_owned))
            .unwrap_or_default();
        Some(ExceptionInfo {
            type_name,
            message: self.exception_message.take().unwrap_or_default(),
            stack_trace: self.exception_stacktrace.take(),
        })
    }
    /// The slot, if any, that a field of this name fills
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "message" => Some(&mut self.message),
            "exception_type" => Some(&mut self.exception_type),
            "exception_message" => Some(&mut self.exception_message),
            "exception_stacktrace" => Some(&mut self.exception_stacktrace),
            _ => None,
        }
    }
}

impl tracing::field::Visit for RecordVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if let Some(slot) = self.slot(field.name()) {
            *slot = Some(value.to_owned());
        }
    }
    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        self.error_field = Some(field.name());
        if self.exception_message.is_none() {
            self.exception_message = Some(value.to_string());
        }
        if self.exception_stacktrace.is_none() {
            self.exception_stacktrace = source_chain(value);
        }
    }
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // The tracing macros "pre-format" the `message` field, so `value` is really a
        // `std::fmt::Arguments` instance whose debug format carries no enclosing quotes. Fields
        // recorded with `%` likewise debug-format as their `Display` text.
        if let Some(slot) = self.slot(field.name()) {
            *slot = Some(format!("{:?}", value));
        }
    }
}

/// This is the [`Layer`] implementation proper.
///
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
impl<S, K> tracing_subscriber::layer::Layer<S> for JournaldLayer<K>
where
    S: tracing::Subscriber,
    K: LogSink + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // For events bridged from the `log` crate, normalized_metadata() carries the original
        // target; for native tracing events it returns None.
        #[cfg(feature = "tracing-log")]
        let normalized_meta = event.normalized_metadata();
        #[cfg(feature = "tracing-log")]
        let meta = normalized_meta.as_ref().unwrap_or_else(|| event.metadata());
        #[cfg(not(feature = "tracing-log"))]
        let meta = event.metadata();

        if is_internal(meta.target()) {
            return;
        }

        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let mut record = Record::new(
            Severity::from(meta.level()),
            meta.target(),
            visitor.message.take().unwrap_or_default(),
        );
        record.exception = visitor.exception();
        if self.with_stack_trace {
            record.stack_trace = Some(format!("{:?}", backtrace::Backtrace::new()));
        }

        if let Err(err) = self.sink.write(&record) {
            ::tracing::error!("Failed to write an event to the journal: {}", err);
        }
    }
}
