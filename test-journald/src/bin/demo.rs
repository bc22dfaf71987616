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

//! Log a greeting & a failure to the local journal; inspect the results with
//! `journalctl -t demo -o verbose`.

use backtrace::Backtrace;
use journald_tracing::{
    priority::Severity,
    record::{ExceptionInfo, Record},
    target::{JournaldTarget, LogSink},
};

#[derive(Debug)]
struct ArgumentOutOfRange {
    name: &'static str,
}

impl std::fmt::Display for ArgumentOutOfRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Specified argument was out of the range of valid values. (Parameter '{}')",
            self.name
        )
    }
}

impl std::error::Error for ArgumentOutOfRange {}

fn throw_an_exception() -> Result<(), ArgumentOutOfRange> {
    Err(ArgumentOutOfRange {
        name: "someArgumentName",
    })
}

pub fn main() {
    let target = JournaldTarget::builder().syslog_identifier("demo").build();

    if let Err(err) = target.write(&Record::new(Severity::Info, "DemoLogger", "Hello world!")) {
        eprintln!("{}", err);
    }

    if let Err(ex) = throw_an_exception() {
        let record = Record::new(Severity::Error, "DemoLogger", "Failure message.").with_exception(
            ExceptionInfo::from_error(&ex).with_stack_trace(format!("{:?}", Backtrace::new())),
        );
        if let Err(err) = target.write(&record) {
            eprintln!("{}", err);
        }
    }

    target.close();
}
