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

//! Severity & priority definitions.
//!
//! [`Severity`] is the (closed) set of severities a [`Record`](crate::record::Record) may carry.
//! The journal's `PRIORITY` field takes a syslog level, `0` (`LOG_EMERG`) through `7`
//! (`LOG_DEBUG`), as a single decimal digit; see `syslog(3)`.

type StdResult<T, E> = std::result::Result<T, E>;

/// Severity of a log record.
///
/// This is the host framework's model, not syslog's: there is no equivalent of emergency, alert or
/// notice, and [`Severity::Fatal`] has no [`tracing`] counterpart (it is reachable only by
/// building a [`Record`](crate::record::Record) directly).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// The `PRIORITY` field value for this severity. Never emergency (0), alert (1) or notice (5).
    pub fn priority(self) -> &'static str {
        match self {
            Severity::Fatal => "2", // LOG_CRIT
            Severity::Error => "3", // LOG_ERR
            Severity::Warn => "4", // LOG_WARNING
            Severity::Info => "6", // LOG_INFO
            Severity::Debug | Severity::Trace => "7", // LOG_DEBUG
        }
    }
    /// The `LEVEL` field value for this severity
    pub fn name(self) -> &'static str {
        match self {
            Severity::Trace => "Trace",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warn => "Warn",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.name())
    }
}

impl std::convert::From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Severity::Trace,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

#[cfg(test)]
mod severity_level_tests {
    use super::*;

    #[test]
    fn test_priority() {
        assert_eq!(Severity::Fatal.priority(), "2");
        assert_eq!(Severity::Error.priority(), "3");
        assert_eq!(Severity::Warn.priority(), "4");
        assert_eq!(Severity::Info.priority(), "6");
        assert_eq!(Severity::Debug.priority(), "7");
        assert_eq!(Severity::Trace.priority(), "7");
    }

    #[test]
    fn test_no_emerg_alert_or_notice() {
        let all = [
            Severity::Trace,
            Severity::Debug,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
            Severity::Fatal,
        ];
        for s in all {
            assert!(!["0", "1", "5"].contains(&s.priority()), "{:?}", s);
            assert_eq!(s.priority().len(), 1);
        }
    }

    #[test]
    fn test_from_tracing() {
        assert_eq!(Severity::from(&tracing::Level::TRACE), Severity::Trace);
        assert_eq!(Severity::from(&tracing::Level::WARN), Severity::Warn);
        assert_eq!(Severity::from(&tracing::Level::ERROR), Severity::Error);
        assert_eq!(format!("{}", Severity::Warn), "Warn");
    }
}
