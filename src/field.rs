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

//! Journal fields.
//!
//! A journal entry is nothing more than a bag of `KEY=value` pairs. The keys are ASCII
//! identifiers (they may contain neither `=` nor a newline); the values are arbitrary text.

use crate::error::{Error, Result};

use backtrace::Backtrace;

use std::borrow::Cow;

type StdResult<T, E> = std::result::Result<T, E>;

/// A single (key, value) pair, ready for the [encoder](crate::encoder).
///
/// The key is not re-validated here; callers build [`Field`]s either from the well-known field
/// names in [`names`] or from a [`FieldName`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field<'a> {
    pub key: &'a str,
    pub value: Cow<'a, str>,
}

impl<'a> Field<'a> {
    pub fn new<V: Into<Cow<'a, str>>>(key: &'a str, value: V) -> Field<'a> {
        Field {
            key,
            value: value.into(),
        }
    }
}

/// The field names this crate emits on its own account.
pub mod names {
    pub const PRIORITY: &str = "PRIORITY";
    pub const MESSAGE: &str = "MESSAGE";
    pub const LEVEL: &str = "LEVEL";
    pub const LOGGER: &str = "LOGGER";
    pub const TIMESTAMP: &str = "TIMESTAMP";
    pub const SYSLOG_IDENTIFIER: &str = "SYSLOG_IDENTIFIER";
    pub const EXCEPTION_TYPE: &str = "EXCEPTION_TYPE";
    pub const EXCEPTION_MESSAGE: &str = "EXCEPTION_MESSAGE";
    pub const EXCEPTION_STACKTRACE: &str = "EXCEPTION_STACKTRACE";
    pub const STACKTRACE: &str = "STACKTRACE";
}

/// A [`String`] with the additional constraint that it is a non-empty run of ASCII containing
/// neither `=` nor `\n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: String) -> Result<FieldName> {
        if !name.is_empty() && name.is_ascii() && !name.contains(['=', '\n']) {
            Ok(FieldName(name))
        } else {
            Err(Error::BadFieldName {
                name,
                back: Backtrace::new(),
            })
        }
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::convert::TryFrom<String> for FieldName {
    type Error = Error;
    fn try_from(x: String) -> StdResult<Self, Self::Error> {
        FieldName::new(x)
    }
}

impl std::convert::TryFrom<&str> for FieldName {
    type Error = Error;
    fn try_from(x: &str) -> StdResult<Self, Self::Error> {
        FieldName::new(x.to_owned())
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// An additional field, fixed at configuration time, included in every entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticField {
    key: FieldName,
    value: String,
}

impl StaticField {
    /// Both key & value are required; only the key is checked
    pub fn new<K, V>(key: K, value: V) -> Result<StaticField>
    where
        K: Into<String>,
        V: Into<String>,
    {
        Ok(StaticField {
            key: FieldName::new(key.into())?,
            value: value.into(),
        })
    }
    pub fn key(&self) -> &str {
        self.key.as_str()
    }
    pub fn value(&self) -> &str {
        &self.value
    }
    pub fn as_field(&self) -> Field<'_> {
        Field::new(self.key.as_str(), self.value.as_str())
    }
}
