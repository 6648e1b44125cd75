//! Socket-backed peripheral emulation.
//!
//! Two byte-stream peripherals, the console UART and the debug requester, are bridged to
//! TCP listeners. Each simulated cycle the [`IoMux`]:
//! 1. **Polls:** Every Nth call only (see [`PollInterval`]), waits with a zero timeout on
//!    the listeners and clients, accepting new connections and collecting per-peripheral
//!    work bits.
//! 2. **Transmits:** Forwards any byte the model offers to the peripheral's client. Console
//!    output is also echoed to stdout.
//! 3. **Receives:** When a peripheral has work and its FIFO has room, hands the model one
//!    byte with a one-cycle strobe. The console drains the injected initial string first.
//!
//! Socket faults never stop the simulation; a dropped client can reconnect later.

/// Adaptive poll interval.
pub mod poll;
/// Listener and client for one peripheral.
pub mod service;

use std::collections::VecDeque;
use std::io::Write;
use std::net::SocketAddr;

pub use poll::PollInterval;
pub use service::SocketService;

use crate::common::Peripheral;
use crate::config::IoConfig;
use crate::model::HardwareModel;

/// Console and debug services plus the shared poll interval.
#[derive(Debug)]
pub struct IoMux {
    services: [SocketService; 2],
    interval: PollInterval,
    initial: VecDeque<u8>,
    echo_console: bool,
}

impl IoMux {
    /// Binds both services as configured.
    ///
    /// # Arguments
    ///
    /// * `config` - Ports, bind address and poll bounds.
    /// * `initial` - Bytes fed to the console before any socket input.
    pub fn new(config: &IoConfig, initial: &str) -> Self {
        let services = [
            SocketService::bind(Peripheral::Console, &config.bind_address, config.console_port),
            SocketService::bind(Peripheral::Debug, &config.bind_address, config.debug_port),
        ];
        Self::with_services(services, config, initial)
    }

    /// A multiplexer with no sockets. Only the initial string reaches the model.
    pub fn detached(config: &IoConfig, initial: &str) -> Self {
        let services = [
            SocketService::disabled(Peripheral::Console),
            SocketService::disabled(Peripheral::Debug),
        ];
        Self::with_services(services, config, initial)
    }

    fn with_services(services: [SocketService; 2], config: &IoConfig, initial: &str) -> Self {
        Self {
            services,
            interval: PollInterval::new(
                config.poll_interval_min,
                config.poll_interval_max,
                config.poll_interval_step,
            ),
            initial: initial.bytes().collect(),
            echo_console: config.echo_console,
        }
    }

    /// Returns the work bits for this cycle.
    ///
    /// Socket bits come from a real poll only when the interval is due. The console bit is
    /// also set while initial-string bytes remain.
    pub fn poll_work(&mut self) -> u64 {
        let mut work = 0;
        if self.interval.due() {
            work = self.poll_sockets();
            self.interval.record(work != 0);
        }
        if !self.initial.is_empty() {
            work |= Peripheral::Console.work_bit();
        }
        work
    }

    /// Waits on every descriptor with a zero timeout.
    #[cfg(unix)]
    fn poll_sockets(&mut self) -> u64 {
        const LISTENERS: usize = 0;
        const CLIENTS: usize = 2;

        let mut fds = [libc::pollfd {
            fd: -1,
            events: libc::POLLIN,
            revents: 0,
        }; 4];
        for (i, service) in self.services.iter().enumerate() {
            fds[LISTENERS + i].fd = service.listener_fd();
            fds[CLIENTS + i].fd = service.client_fd();
        }

        // SAFETY: `fds` is a valid array of `fds.len()` pollfd structs that outlives the
        // call. Negative descriptors are ignored by poll(2). A zero timeout never blocks.
        let ready = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, 0) };
        if ready <= 0 {
            return 0;
        }

        let mut work = 0;
        // Clients first, so a replacement accepted below isn't mistaken for the old one.
        for (i, service) in self.services.iter_mut().enumerate() {
            let revents = fds[CLIENTS + i].revents;
            if revents & (libc::POLLERR | libc::POLLNVAL) != 0
                || (revents & libc::POLLHUP != 0 && revents & libc::POLLIN == 0)
            {
                service.drop_client();
            } else if revents & libc::POLLIN != 0 {
                work |= service.peripheral().work_bit();
            }
        }
        for (i, service) in self.services.iter_mut().enumerate() {
            if fds[LISTENERS + i].revents != 0 {
                let _ = service.accept();
            }
        }
        work
    }

    #[cfg(not(unix))]
    fn poll_sockets(&mut self) -> u64 {
        let mut work = 0;
        for service in &mut self.services {
            if service.peek_readable() {
                work |= service.peripheral().work_bit();
            }
            let _ = service.accept();
        }
        work
    }

    /// Moves bytes between the model's peripherals and their sockets for one cycle.
    ///
    /// Runs between the rising and falling edge evaluations.
    pub fn service<M: HardwareModel + ?Sized>(&mut self, model: &mut M) {
        let work = self.poll_work();

        if let Some(byte) = model.tx_byte(Peripheral::Console) {
            if self.echo_console {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(&[byte]).and_then(|()| out.flush());
            }
            self.service_mut(Peripheral::Console).write_byte(byte);
        }
        self.receive(model, Peripheral::Console, work);

        if let Some(byte) = model.tx_byte(Peripheral::Debug) {
            self.service_mut(Peripheral::Debug).write_byte(byte);
        }
        self.receive(model, Peripheral::Debug, work);
    }

    fn receive<M: HardwareModel + ?Sized>(&mut self, model: &mut M, port: Peripheral, work: u64) {
        let byte = if work & port.work_bit() != 0 && model.rx_ready(port) {
            self.next_rx_byte(port)
        } else {
            None
        };
        model.rx_strobe(port, byte);
    }

    fn next_rx_byte(&mut self, port: Peripheral) -> Option<u8> {
        if port == Peripheral::Console {
            if let Some(byte) = self.initial.pop_front() {
                return Some(byte);
            }
        }
        self.service_mut(port).read_byte()
    }

    fn service_mut(&mut self, port: Peripheral) -> &mut SocketService {
        &mut self.services[port.index()]
    }

    /// The service for `port`.
    pub fn socket(&self, port: Peripheral) -> &SocketService {
        &self.services[port.index()]
    }

    /// Address `port` is listening on, if enabled.
    pub fn local_addr(&self, port: Peripheral) -> Option<SocketAddr> {
        self.socket(port).local_addr()
    }

    /// A client is connected to `port`.
    pub fn is_connected(&self, port: Peripheral) -> bool {
        self.socket(port).is_connected()
    }

    /// Current poll interval.
    pub const fn poll_interval(&self) -> &PollInterval {
        &self.interval
    }

    /// Initial-string bytes not yet delivered.
    pub fn pending_initial(&self) -> usize {
        self.initial.len()
    }
}
