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

//! A [`tracing-subscriber`] [`Layer`] implementation for sending [`tracing`] [`Event`]s to the
//! [systemd journal] over its [native protocol].
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//! [`tracing`]: https://docs.rs/tracing/0.1.35/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
//! [systemd journal]: https://www.freedesktop.org/software/systemd/man/systemd-journald.service.html
//! [native protocol]: https://systemd.io/JOURNAL_NATIVE_PROTOCOL/
//!
//! # Introduction
//!
//! `systemd-journald` will happily take plain text on its stdout stream or syslog packets on
//! `/dev/log`, but its native protocol is the only one that preserves structure: each entry is a
//! set of `KEY=value` fields, sent as a single datagram to `/run/systemd/journal/socket`. This
//! crate speaks that protocol directly (no `libsystemd`), in three steps:
//!
//! 1. lay the event out as an ordered list of fields ([`record`])
//!
//! 2. encode those fields into a datagram in a fixed, reusable buffer ([`encoder`])
//!
//! 3. send the datagram on a Unix domain socket that reconnects itself after a journald restart
//!    ([`transport`])
//!
//! [`target::JournaldTarget`] packages all three behind a mutex, and [`layer::JournaldLayer`]
//! plugs it in to [`tracing`].
//!
//! [`tracing`]: https://docs.rs/tracing/0.1.35/tracing/index.html
//!
//! # Usage
//!
//! ```rust
//! use tracing::info;
//! use journald_tracing::layer::JournaldLayer;
//! use tracing_subscriber::registry::Registry;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! // Nothing is connected until the first event is written.
//! let subscriber = Registry::default().with(JournaldLayer::default());
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! info!("Hello, world!");
//! ```
//!
//! Will produce journal entries that look something like this (`journalctl -o verbose`):
//!
//! ```text
//!     PRIORITY=6
//!     MESSAGE=Hello, world!
//!     LEVEL=Info
//!     LOGGER=rust_out
//!     TIMESTAMP=2022-06-23T16:10:55.123456789Z
//! ```
//!
//! An identifier & additional fixed fields are configured on the target:
//!
//! ```rust
//! use journald_tracing::{layer::JournaldLayer, target::JournaldTarget};
//! use tracing_subscriber::{layer::SubscriberExt, registry::Registry};
//!
//! let target = JournaldTarget::builder()
//!     .syslog_identifier("demo")
//!     .static_field("ENV", "prod")
//!     .unwrap()
//!     .build();
//! let subscriber = Registry::default().with(JournaldLayer::new(target).with_stack_trace(true));
//! ```

pub mod encoder;
pub mod error;
pub mod field;
pub mod layer;
pub mod priority;
pub mod record;
pub mod target;
pub mod transport;
