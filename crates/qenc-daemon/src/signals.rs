//! Signal handling for the sampling daemon.
//!
//! SIGTERM and SIGINT request a graceful shutdown; SIGHUP requests that every
//! channel be zeroed at its current position. Handlers only set static atomic
//! flags; the main loop calls [`SignalHandler::poll`] to fold them into the
//! shared state.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

static TERMINATE_FLAG: AtomicBool = AtomicBool::new(false);
static INTERRUPT_FLAG: AtomicBool = AtomicBool::new(false);
static ZERO_FLAG: AtomicBool = AtomicBool::new(false);

/// Signal types that the daemon handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// SIGTERM - Graceful termination request.
    Terminate,
    /// SIGINT - Interrupt (Ctrl+C).
    Interrupt,
    /// SIGHUP - Zero all encoder positions.
    Hangup,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Terminate => write!(f, "SIGTERM"),
            SignalKind::Interrupt => write!(f, "SIGINT"),
            SignalKind::Hangup => write!(f, "SIGHUP"),
        }
    }
}

/// Requests raised by signals, shared with the main loop.
#[derive(Debug, Default)]
pub struct SignalState {
    shutdown_requested: AtomicBool,
    zero_requested: AtomicBool,
    signal_count: AtomicU32,
}

impl SignalState {
    /// Create a new signal state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Relaxed)
    }

    /// Check if zeroing has been requested (and clear the flag).
    #[inline]
    pub fn take_zero_request(&self) -> bool {
        self.zero_requested.swap(false, Ordering::Relaxed)
    }

    /// Request shutdown.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Relaxed);
    }

    /// Request that all positions be zeroed.
    pub fn request_zero(&self) {
        self.zero_requested.store(true, Ordering::Relaxed);
    }

    fn record_signal(&self, kind: SignalKind) {
        self.signal_count.fetch_add(1, Ordering::Relaxed);
        info!(signal = %kind, "Signal received");
    }

    /// Get the total number of signals received.
    pub fn signal_count(&self) -> u32 {
        self.signal_count.load(Ordering::Relaxed)
    }
}

/// Handle for signal management.
#[derive(Debug, Clone)]
pub struct SignalHandler {
    state: Arc<SignalState>,
}

impl SignalHandler {
    /// Create a handler and install the process signal handlers.
    ///
    /// On non-Unix platforms only manual requests are available.
    pub fn new() -> std::io::Result<Self> {
        #[cfg(unix)]
        register_unix_handlers()?;

        Ok(Self::detached())
    }

    /// Create a handler without touching process signal dispositions.
    pub fn detached() -> Self {
        Self {
            state: Arc::new(SignalState::new()),
        }
    }

    /// Move pending flags raised by the signal handlers into the state.
    pub fn poll(&self) {
        for (flag, kind) in [
            (&TERMINATE_FLAG, SignalKind::Terminate),
            (&INTERRUPT_FLAG, SignalKind::Interrupt),
        ] {
            if flag.swap(false, Ordering::Relaxed) {
                self.state.record_signal(kind);
                self.state.request_shutdown();
            }
        }
        if ZERO_FLAG.swap(false, Ordering::Relaxed) {
            self.state.record_signal(SignalKind::Hangup);
            self.state.request_zero();
        }
    }

    /// Check if shutdown has been requested.
    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        self.state.shutdown_requested()
    }

    /// Check if zeroing has been requested (clears the flag).
    #[inline]
    pub fn take_zero_request(&self) -> bool {
        self.state.take_zero_request()
    }

    /// Manually request shutdown.
    pub fn request_shutdown(&self) {
        info!("Manual shutdown requested");
        self.state.request_shutdown();
    }

    /// Get the signal state for inspection.
    pub fn state(&self) -> &SignalState {
        &self.state
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn register_unix_handlers() -> std::io::Result<()> {
    use std::os::raw::c_int;

    extern "C" fn on_terminate(_: c_int) {
        TERMINATE_FLAG.store(true, Ordering::Relaxed);
    }

    extern "C" fn on_interrupt(_: c_int) {
        INTERRUPT_FLAG.store(true, Ordering::Relaxed);
    }

    extern "C" fn on_hangup(_: c_int) {
        ZERO_FLAG.store(true, Ordering::Relaxed);
    }

    let terminate = on_terminate as extern "C" fn(c_int) as libc::sighandler_t;
    let interrupt = on_interrupt as extern "C" fn(c_int) as libc::sighandler_t;
    let hangup = on_hangup as extern "C" fn(c_int) as libc::sighandler_t;

    // SAFETY: the handlers only store to static atomics, which is async-signal-safe.
    unsafe {
        for (signal, handler) in [
            (libc::SIGTERM, terminate),
            (libc::SIGINT, interrupt),
            (libc::SIGHUP, hangup),
        ] {
            if libc::signal(signal, handler) == libc::SIG_ERR {
                return Err(std::io::Error::last_os_error());
            }
        }
    }

    debug!("Unix signal handlers registered");
    Ok(())
}
