//! Operator Interruption.
//!
//! SIGINT and SIGTERM are turned into a shared flag that the trace sources
//! poll. A raised flag is reported as a halt, so an interrupted run still
//! finalizes and writes its statistics.

use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

static SIGNAL_FLAG: OnceLock<Interrupt> = OnceLock::new();

/// Shared stop request flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

extern "C" fn on_signal(_signum: libc::c_int) {
    if let Some(flag) = SIGNAL_FLAG.get() {
        flag.request();
    }
}

/// Routes SIGINT and SIGTERM to the returned flag.
///
/// Calling this more than once returns the same flag.
pub fn install_handler() -> Interrupt {
    let flag = SIGNAL_FLAG.get_or_init(Interrupt::new).clone();
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;

    // SAFETY: the handler only performs an atomic store.
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
    info!("SIGINT/SIGTERM will halt the simulation");
    flag
}
