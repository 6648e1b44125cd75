//! Unix signal hookup for operator requests.
//!
//! `SIGUSR1` asks for a register dump and `SIGUSR2` for a state save. The handler only
//! raises bits in [`RequestFlags`]; the run loop acts on them between cycles.

use std::io;
use std::sync::OnceLock;

use crate::sim::requests::RequestFlags;

static TARGET: OnceLock<RequestFlags> = OnceLock::new();

extern "C" fn on_signal(sig: libc::c_int) {
    let Some(flags) = TARGET.get() else {
        return;
    };
    match sig {
        libc::SIGUSR1 => flags.request(RequestFlags::DUMP_REGS),
        libc::SIGUSR2 => flags.request(RequestFlags::SAVE_STATE),
        _ => {}
    }
}

/// Routes `SIGUSR1`/`SIGUSR2` to `flags`.
///
/// Only the first call's flags are used; later calls re-install the same handler.
///
/// # Errors
///
/// Returns the OS error if a handler can't be installed.
pub fn install(flags: &RequestFlags) -> io::Result<()> {
    let _ = TARGET.set(flags.clone());
    for sig in [libc::SIGUSR1, libc::SIGUSR2] {
        let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        // SAFETY: `on_signal` only reads an initialised OnceLock and performs an atomic
        // OR, both async-signal-safe.
        if unsafe { libc::signal(sig, handler) } == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
