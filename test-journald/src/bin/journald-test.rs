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

//! Test writing to `/run/systemd/journal/socket` on the local host.

use journald_tracing::{layer::JournaldLayer, target::JournaldTarget};
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    let target = JournaldTarget::builder()
        .syslog_identifier("journald-test")
        .static_field("ENV", "test")
        .unwrap()
        .static_field("NOTE", "spans\nseveral\nlines")
        .unwrap()
        .build();
    // Setup the real subsriber...
    let subscriber = Registry::default().with(JournaldLayer::new(target).with_stack_trace(true));
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("你好, journal.");
    debug!("你好, journal.");
    info!("你好, journal.");
    warn!("你好,\njournal.");
    error!(
        exception_type = "std::io::Error",
        exception_message = "disk on fire",
        exception_stacktrace = "at write()\nat flush()",
        "你好, journal."
    );
}
