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

//! The journal transport layer.
//!
//! This module defines the [`Transport`] trait along with [`JournalSocket`], which speaks to the
//! journal over its Unix domain datagram socket.
//!
//! [`JournalSocket`] connects lazily: constructing one never fails, and the socket is opened on
//! the first [`send`](Transport::send). Any failure (to connect, or to send) leaves it
//! disconnected, and the next [`send`](Transport::send) simply tries again from scratch. This lets
//! a long-running process ride out a restart of `systemd-journald`.
//!
//! # Examples
//!
//! ```rust
//! use journald_tracing::transport::{JournalSocket, Transport};
//! let mut transpo = JournalSocket::new("/i/am/not/there.s");
//! assert!(!transpo.is_connected());
//! assert!(transpo.send(b"MESSAGE=hi\n").is_err()); // no such socket, after all
//! assert!(!transpo.is_connected());
//! ```

use crate::{
    encoder::DEFAULT_BUFFER_CAPACITY,
    error::{Error, Result},
};

use backtrace::Backtrace;
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::{info, warn};

use std::{
    os::{fd::OwnedFd, unix::net::UnixDatagram},
    path::{Path, PathBuf},
};

/// Well-known location of the journal's native protocol socket
pub const JOURNAL_SOCKET_PATH: &str = "/run/systemd/journal/socket";

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations all transport layers must support.
pub trait Transport {
    /// Send a complete datagram on this transport mechanism, returning the number of bytes sent.
    ///
    /// Implementations may need to (re)establish a connection first, hence `&mut self`.
    fn send(&mut self, buf: &[u8]) -> Result<usize>;
    /// Release any resources held; the next [`send`](Transport::send) must start afresh.
    ///
    /// This must not fail; problems are logged & otherwise ignored.
    fn close(&mut self);
}

/// Sending journal entries via the journal's Unix datagram socket.
pub struct JournalSocket {
    path: PathBuf,
    send_buffer_size: usize,
    socket: Option<UnixDatagram>,
}

impl std::default::Default for JournalSocket {
    /// A [`JournalSocket`] for the system journal at [`JOURNAL_SOCKET_PATH`]
    fn default() -> Self {
        JournalSocket::new(JOURNAL_SOCKET_PATH)
    }
}

impl JournalSocket {
    /// Construct a [`Transport`] implementation that will send datagrams to the socket at `path`.
    ///
    /// No connection is attempted until the first call to [`send`](Transport::send).
    pub fn new<P: AsRef<Path>>(path: P) -> JournalSocket {
        JournalSocket {
            path: path.as_ref().to_path_buf(),
            send_buffer_size: DEFAULT_BUFFER_CAPACITY,
            socket: None,
        }
    }
    /// Request a kernel send buffer of (at least) `size` bytes on each new connection
    pub fn with_send_buffer_size(mut self, size: usize) -> JournalSocket {
        self.send_buffer_size = size;
        self
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// True if we hold a socket that the kernel still considers connected
    pub fn is_connected(&self) -> bool {
        self.socket
            .as_ref()
            .map_or(false, |sock| sock.peer_addr().is_ok())
    }
    fn connect(&self) -> Result<UnixDatagram> {
        let connect_err = |err: std::io::Error| Error::Connect {
            path: self.path.clone(),
            source: Box::new(err),
            back: Backtrace::new(),
        };
        info!("Connecting to the journal at {}", self.path.display());
        let socket = Socket::new(Domain::UNIX, Type::DGRAM, None).map_err(connect_err)?;
        socket
            .set_send_buffer_size(self.send_buffer_size)
            .map_err(connect_err)?;
        socket
            .connect(&SockAddr::unix(&self.path).map_err(connect_err)?)
            .map_err(connect_err)?;
        Ok(UnixDatagram::from(OwnedFd::from(socket)))
    }
    /// Return our socket, connecting (or re-connecting) first if need be.
    fn connected_socket(&mut self) -> Result<&UnixDatagram> {
        let stale = self
            .socket
            .as_ref()
            .map_or(false, |sock| sock.peer_addr().is_err());
        if stale {
            self.close();
        }
        let socket = match self.socket.take() {
            Some(socket) => socket,
            None => self.connect().map_err(|err| {
                warn!("Failed to connect to the journal: {}", err);
                err
            })?,
        };
        Ok(self.socket.insert(socket))
    }
}

impl Transport for JournalSocket {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        let sent = self.connected_socket()?.send(buf);
        sent.map_err(|err| {
            warn!("Failed to send {} bytes to the journal: {}", buf.len(), err);
            self.close();
            Error::Send {
                source: Box::new(err),
                back: Backtrace::new(),
            }
        })
    }
    fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            info!("Closing journal socket");
            // Dropping a `UnixDatagram` can't report errors, so shut it down explicitly to find
            // out about them. A peer that has already gone away is not worth mentioning.
            if let Err(err) = socket.shutdown(std::net::Shutdown::Both) {
                if err.kind() != std::io::ErrorKind::NotConnected {
                    warn!("While closing the journal socket, got {}", err);
                }
            }
        }
    }
}

impl std::ops::Drop for JournalSocket {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use std::time::Duration;

    /// A stand-in for journald: a datagram socket bound somewhere temporary.
    struct FakeJournal {
        _dir: tempfile::TempDir,
        path: PathBuf,
        socket: UnixDatagram,
    }

    impl FakeJournal {
        fn new() -> FakeJournal {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("socket");
            let socket = UnixDatagram::bind(&path).unwrap();
            socket
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
            FakeJournal {
                _dir: dir,
                path,
                socket,
            }
        }
        /// Simulate a journald restart: a new socket at the same path
        fn restart(&mut self) {
            std::fs::remove_file(&self.path).unwrap();
            self.socket = UnixDatagram::bind(&self.path).unwrap();
            self.socket
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
        }
        fn recv(&self) -> Vec<u8> {
            let mut buf = vec![0u8; 65536];
            let n = self.socket.recv(&mut buf).unwrap();
            buf.truncate(n);
            buf
        }
    }

    #[test]
    fn lazy_connect() {
        let journal = FakeJournal::new();
        let mut transpo = JournalSocket::new(&journal.path);
        assert!(!transpo.is_connected());
        assert_eq!(transpo.path(), journal.path.as_path());

        assert_eq!(transpo.send(b"MESSAGE=one\n").unwrap(), 12);
        assert!(transpo.is_connected());
        assert_eq!(journal.recv(), b"MESSAGE=one\n");

        assert_eq!(transpo.send(b"MESSAGE=two\n").unwrap(), 12);
        assert_eq!(journal.recv(), b"MESSAGE=two\n");
    }

    #[test]
    fn send_buffer_sized_on_connect() {
        let journal = FakeJournal::new();
        let mut transpo = JournalSocket::new(&journal.path).with_send_buffer_size(64 * 1024);
        transpo.send(b"MESSAGE=sized\n").unwrap();
        assert_eq!(journal.recv(), b"MESSAGE=sized\n");

        let sock = transpo.socket.as_ref().unwrap();
        assert!(socket2::SockRef::from(sock).send_buffer_size().unwrap() >= 64 * 1024);
        assert!(sock.peer_addr().is_ok());
    }

    #[test]
    fn connect_failure_then_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let mut transpo = JournalSocket::new(dir.path().join("missing"));
        match transpo.send(b"MESSAGE=x\n") {
            Err(Error::Connect { path, .. }) => assert_eq!(path, dir.path().join("missing")),
            _ => panic!("expected a connection error"),
        }
        assert!(!transpo.is_connected());
        // Neither of these may fail or panic
        transpo.close();
        transpo.close();
        assert!(!transpo.is_connected());
    }

    #[test]
    fn connects_once_the_journal_shows_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("socket");
        let mut transpo = JournalSocket::new(&path);
        assert!(transpo.send(b"MESSAGE=early\n").is_err());

        let journal = UnixDatagram::bind(&path).unwrap();
        assert!(transpo.send(b"MESSAGE=late\n").is_ok());
        let mut buf = [0u8; 64];
        let n = journal.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"MESSAGE=late\n");
    }

    #[test]
    fn reconnect_when_not_connected() {
        let journal = FakeJournal::new();
        let mut transpo = JournalSocket::new(&journal.path);
        // A socket that reports itself as not connected
        transpo.socket = Some(UnixDatagram::unbound().unwrap());
        assert!(!transpo.is_connected());

        assert!(transpo.send(b"MESSAGE=again\n").is_ok());
        assert!(transpo.is_connected());
        assert_eq!(journal.recv(), b"MESSAGE=again\n");
    }

    #[test]
    fn journal_restart() {
        let mut journal = FakeJournal::new();
        let mut transpo = JournalSocket::new(&journal.path);
        transpo.send(b"MESSAGE=before\n").unwrap();
        assert_eq!(journal.recv(), b"MESSAGE=before\n");

        journal.restart();

        // Our peer is gone; the first attempt may fail, but must leave us disconnected so that a
        // subsequent attempt gets through to the new journal without any help from the caller.
        if transpo.send(b"MESSAGE=after\n").is_err() {
            assert!(!transpo.is_connected());
            transpo.send(b"MESSAGE=after\n").unwrap();
        }
        assert_eq!(journal.recv(), b"MESSAGE=after\n");
    }

    #[test]
    fn oversized_datagram() {
        let journal = FakeJournal::new();
        let mut transpo = JournalSocket::new(&journal.path).with_send_buffer_size(4096);
        transpo.send(b"MESSAGE=ok\n").unwrap();
        assert_eq!(journal.recv(), b"MESSAGE=ok\n");

        // Far beyond any socket buffer the kernel will grant us
        let huge = vec![b'x'; 16 * 1024 * 1024];
        match transpo.send(&huge) {
            Err(Error::Send { .. }) => assert!(!transpo.is_connected()),
            _ => panic!("expected a send error"),
        }
        transpo.send(b"MESSAGE=ok\n").unwrap();
        assert_eq!(journal.recv(), b"MESSAGE=ok\n");
    }
}
