//! One socket-backed peripheral service.
//!
//! A service owns a non-blocking listener and at most one client. A new connection
//! replaces the old one. A failed bind leaves the service disabled for the life of the
//! process.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use tracing::{debug, error, info, warn};

use crate::common::Peripheral;

/// Listener plus optional client for one peripheral.
#[derive(Debug)]
pub struct SocketService {
    peripheral: Peripheral,
    listener: Option<TcpListener>,
    client: Option<TcpStream>,
}

fn listen(addr: &str, port: u16) -> io::Result<TcpListener> {
    let listener = TcpListener::bind((addr, port))?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

impl SocketService {
    /// Binds `addr:port`. On failure the error is logged and the service stays disabled.
    pub fn bind(peripheral: Peripheral, addr: &str, port: u16) -> Self {
        let listener = match listen(addr, port) {
            Ok(listener) => {
                info!(
                    "{peripheral}: listening on port {}",
                    listener.local_addr().map_or(port, |a| a.port())
                );
                Some(listener)
            }
            Err(e) => {
                error!("{peripheral}: can't listen on {addr}:{port}: {e}");
                None
            }
        };
        Self {
            peripheral,
            listener,
            client: None,
        }
    }

    /// A service with no listener.
    pub const fn disabled(peripheral: Peripheral) -> Self {
        Self {
            peripheral,
            listener: None,
            client: None,
        }
    }

    /// Peripheral this service feeds.
    pub const fn peripheral(&self) -> Peripheral {
        self.peripheral
    }

    /// The service has a listener.
    pub const fn is_enabled(&self) -> bool {
        self.listener.is_some()
    }

    /// A client is connected.
    pub const fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref()?.local_addr().ok()
    }

    /// Accepts a pending connection, replacing any current client.
    ///
    /// Returns `true` if a client was accepted.
    pub fn accept(&mut self) -> bool {
        let Some(listener) = &self.listener else {
            return false;
        };
        match listener.accept() {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nonblocking(true) {
                    warn!("{}: can't set socket non-blocking: {e}", self.peripheral);
                }
                if self.client.is_some() {
                    info!("[{}: replacing connection]", self.peripheral);
                }
                info!("[{}: New connection from {addr}]", self.peripheral);
                self.client = Some(stream);
                true
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(e) => {
                warn!("{}: accept failed: {e}", self.peripheral);
                false
            }
        }
    }

    /// Drops the client, if any.
    pub fn drop_client(&mut self) {
        if self.client.take().is_some() {
            info!("[{}: Connection dropped]", self.peripheral);
        }
    }

    /// Reads one byte from the client.
    ///
    /// End of stream and read errors drop the client.
    pub fn read_byte(&mut self) -> Option<u8> {
        let client = self.client.as_mut()?;
        let mut byte = [0u8; 1];
        match client.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => None,
            Ok(_) | Err(_) => {
                self.drop_client();
                None
            }
        }
    }

    /// Writes one byte to the client; dropped silently if none is connected.
    pub fn write_byte(&mut self, byte: u8) {
        let Some(client) = self.client.as_mut() else {
            return;
        };
        match client.write(&[byte]) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                debug!("{}: client not draining, byte {byte:#04x} lost", self.peripheral);
            }
            Err(_) => self.drop_client(),
        }
    }

    /// Non-blocking readability check used where `poll(2)` is unavailable.
    ///
    /// A closed or failed client is dropped and reported as not readable.
    pub fn peek_readable(&mut self) -> bool {
        let Some(client) = self.client.as_ref() else {
            return false;
        };
        let mut byte = [0u8; 1];
        match client.peek(&mut byte) {
            Ok(0) => {
                self.drop_client();
                false
            }
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(_) => {
                self.drop_client();
                false
            }
        }
    }

    /// Listener descriptor, or -1.
    #[cfg(unix)]
    pub fn listener_fd(&self) -> std::os::unix::io::RawFd {
        use std::os::unix::io::AsRawFd;
        self.listener.as_ref().map_or(-1, AsRawFd::as_raw_fd)
    }

    /// Client descriptor, or -1.
    #[cfg(unix)]
    pub fn client_fd(&self) -> std::os::unix::io::RawFd {
        use std::os::unix::io::AsRawFd;
        self.client.as_ref().map_or(-1, AsRawFd::as_raw_fd)
    }
}
