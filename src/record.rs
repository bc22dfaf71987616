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

//! Log records & their mapping onto journal fields.
//!
//! A [`Record`] is what a host logging framework hands us: a rendered message plus a handful of
//! scalar attributes. [`Record::fields`] lays those out as the ordered list of [`Field`]s that
//! make up one journal entry:
//!
//! ```text
//! PRIORITY, MESSAGE, LEVEL, LOGGER, TIMESTAMP,
//! [SYSLOG_IDENTIFIER],
//! [EXCEPTION_TYPE, EXCEPTION_MESSAGE, [EXCEPTION_STACKTRACE]],
//! [STACKTRACE],
//! static fields...
//! ```

use crate::{
    field::{names, Field, StaticField},
    priority::Severity,
};

use chrono::prelude::*;

/// An error attached to a [`Record`], reduced to text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    pub stack_trace: Option<String>,
}

impl ExceptionInfo {
    pub fn new<T: Into<String>, M: Into<String>>(type_name: T, message: M) -> ExceptionInfo {
        ExceptionInfo {
            type_name: type_name.into(),
            message: message.into(),
            stack_trace: None,
        }
    }
    pub fn with_stack_trace<S: Into<String>>(mut self, stack_trace: S) -> ExceptionInfo {
        self.stack_trace = Some(stack_trace.into());
        self
    }
    /// Describe `err`: its type, its [`Display`](std::fmt::Display) text, and its chain of
    /// sources (one `caused by:` line apiece) as the stack trace, if it has any.
    pub fn from_error<E: std::error::Error>(err: &E) -> ExceptionInfo {
        ExceptionInfo {
            type_name: std::any::type_name::<E>().to_owned(),
            message: err.to_string(),
            stack_trace: source_chain(err),
        }
    }
}

/// Render the [`source`](std::error::Error::source) chain of `err`, or `None` if it has none.
pub(crate) fn source_chain(err: &dyn std::error::Error) -> Option<String> {
    let mut lines = Vec::new();
    let mut next = err.source();
    while let Some(cause) = next {
        lines.push(format!("caused by: {}", cause));
        next = cause.source();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// One log event, as delivered by the host framework.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub severity: Severity,
    pub logger: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub exception: Option<ExceptionInfo>,
    /// The call stack at the point the record was created, if captured
    pub stack_trace: Option<String>,
}

impl Record {
    /// A record stamped with the current time, carrying no exception or call stack
    pub fn new<L, M>(severity: Severity, logger: L, message: M) -> Record
    where
        L: Into<String>,
        M: Into<String>,
    {
        Record {
            severity,
            logger: logger.into(),
            message: message.into(),
            timestamp: Utc::now(),
            exception: None,
            stack_trace: None,
        }
    }
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Record {
        self.timestamp = timestamp;
        self
    }
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Record {
        self.exception = Some(exception);
        self
    }
    pub fn with_stack_trace<S: Into<String>>(mut self, stack_trace: S) -> Record {
        self.stack_trace = Some(stack_trace.into());
        self
    }
    /// Lay this record out as journal fields, in their canonical order.
    ///
    /// `identifier` is emitted as `SYSLOG_IDENTIFIER` only when present & non-empty; `statics`
    /// come last, in the order given.
    pub fn fields<'a>(
        &'a self,
        identifier: Option<&'a str>,
        statics: &'a [StaticField],
    ) -> Vec<Field<'a>> {
        let mut fields = Vec::with_capacity(10 + statics.len());
        fields.push(Field::new(names::PRIORITY, self.severity.priority()));
        fields.push(Field::new(names::MESSAGE, self.message.as_str()));
        fields.push(Field::new(names::LEVEL, self.severity.name()));
        fields.push(Field::new(names::LOGGER, self.logger.as_str()));
        fields.push(Field::new(
            names::TIMESTAMP,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
        ));
        if let Some(identifier) = identifier.filter(|s| !s.is_empty()) {
            fields.push(Field::new(names::SYSLOG_IDENTIFIER, identifier));
        }
        if let Some(exception) = &self.exception {
            fields.push(Field::new(names::EXCEPTION_TYPE, exception.type_name.as_str()));
            fields.push(Field::new(names::EXCEPTION_MESSAGE, exception.message.as_str()));
            if let Some(trace) = &exception.stack_trace {
                fields.push(Field::new(names::EXCEPTION_STACKTRACE, trace.as_str()));
            }
        }
        if let Some(trace) = &self.stack_trace {
            fields.push(Field::new(names::STACKTRACE, trace.as_str()));
        }
        fields.extend(statics.iter().map(StaticField::as_field));
        fields
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::encoder::write_datagram;

    fn epoch() -> DateTime<Utc> {
        std::time::UNIX_EPOCH.into()
    }

    #[test]
    fn minimal_record() {
        let record =
            Record::new(Severity::Info, "DemoLogger", "Hello world!").with_timestamp(epoch());
        let keys: Vec<&str> = record.fields(None, &[]).iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["PRIORITY", "MESSAGE", "LEVEL", "LOGGER", "TIMESTAMP"]);

        // An empty identifier counts as no identifier
        assert_eq!(record.fields(Some(""), &[]).len(), 5);
    }

    #[test]
    fn hello_world_datagram() {
        let record =
            Record::new(Severity::Info, "DemoLogger", "Hello world!").with_timestamp(epoch());
        let statics = vec![StaticField::new("ENV", "prod").unwrap()];
        let fields = record.fields(Some("demo"), &statics);

        let mut buf = [0u8; 512];
        let n = write_datagram(&fields, &mut buf, 0).unwrap();
        assert_eq!(
            std::str::from_utf8(&buf[..n]).unwrap(),
            "PRIORITY=6\n\
             MESSAGE=Hello world!\n\
             LEVEL=Info\n\
             LOGGER=DemoLogger\n\
             TIMESTAMP=1970-01-01T00:00:00.000000000Z\n\
             SYSLOG_IDENTIFIER=demo\n\
             ENV=prod\n"
        );
    }

    #[test]
    fn everything_at_once() {
        let record = Record::new(Severity::Error, "DemoLogger", "Failure message.")
            .with_timestamp(epoch())
            .with_exception(
                ExceptionInfo::new("ArgumentOutOfRange", "Specified argument was out of range.")
                    .with_stack_trace("at a()\nat b()"),
            )
            .with_stack_trace("at main()");
        let statics = vec![
            StaticField::new("ENV", "prod").unwrap(),
            StaticField::new("REGION", "eu").unwrap(),
        ];
        let fields = record.fields(Some("demo"), &statics);

        let mut buf = [0u8; 1024];
        let n = write_datagram(&fields, &mut buf, 0).unwrap();

        let mut golden: Vec<u8> = b"PRIORITY=3\n\
                                    MESSAGE=Failure message.\n\
                                    LEVEL=Error\n\
                                    LOGGER=DemoLogger\n\
                                    TIMESTAMP=1970-01-01T00:00:00.000000000Z\n\
                                    SYSLOG_IDENTIFIER=demo\n\
                                    EXCEPTION_TYPE=ArgumentOutOfRange\n\
                                    EXCEPTION_MESSAGE=Specified argument was out of range.\n\
                                    EXCEPTION_STACKTRACE\n"
            .to_vec();
        golden.extend_from_slice(&13u64.to_le_bytes());
        golden.extend_from_slice(b"at a()\nat b()\nSTACKTRACE=at main()\nENV=prod\nREGION=eu\n");
        assert_eq!(&buf[..n], &golden[..]);
    }

    #[test]
    fn timestamp_round_trips() {
        let when = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let record = Record::new(Severity::Info, "L", "M").with_timestamp(when);
        let fields = record.fields(None, &[]);
        assert_eq!(fields[4], Field::new("TIMESTAMP", "2023-11-14T22:13:20.123456789Z"));
        let parsed = DateTime::parse_from_rfc3339(&fields[4].value).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), when);
    }

    #[test]
    fn exception_without_trace() {
        let record = Record::new(Severity::Fatal, "L", "M")
            .with_exception(ExceptionInfo::new("T", ""));
        let fields = record.fields(None, &[]);
        assert_eq!(fields[0], Field::new("PRIORITY", "2"));
        assert_eq!(fields[5], Field::new("EXCEPTION_TYPE", "T"));
        assert_eq!(fields[6], Field::new("EXCEPTION_MESSAGE", ""));
        assert_eq!(fields.len(), 7);
    }

    #[derive(Debug)]
    struct Outer(std::io::Error);
    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "outer failure")
        }
    }
    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn from_error() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"));
        let info = ExceptionInfo::from_error(&err);
        assert!(info.type_name.ends_with("Outer"));
        assert_eq!(info.message, "outer failure");
        assert_eq!(info.stack_trace.as_deref(), Some("caused by: disk on fire"));

        let info = ExceptionInfo::from_error(&std::fmt::Error);
        assert!(info.type_name.ends_with("fmt::Error"));
        assert_eq!(info.stack_trace, None);
    }
}
