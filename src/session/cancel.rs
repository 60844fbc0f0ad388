// Mon Oct 12 2026 - Alex

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

static INTERRUPTED: Lazy<Arc<AtomicBool>> = Lazy::new(|| Arc::new(AtomicBool::new(false)));

extern "C" fn on_interrupt(_signal: libc::c_int) {
    if let Some(flag) = Lazy::get(&INTERRUPTED) {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Cooperative stop flag for long-running commands, checked at every poll.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    on_interrupt: bool,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token tripped by Ctrl-C, but only inside an [`InterruptGuard`] scope.
    /// Elsewhere SIGINT keeps its usual behaviour.
    pub fn interrupt() -> Self {
        Self {
            flag: Arc::clone(&INTERRUPTED),
            on_interrupt: true,
        }
    }

    /// Re-arms the token and, for an interrupt token, routes SIGINT to it
    /// until the guard is dropped.
    pub fn interruptible(&self) -> InterruptGuard {
        self.reset();
        let previous = if self.on_interrupt {
            let handler = on_interrupt as extern "C" fn(libc::c_int);
            Some(set_sigint(handler as libc::sighandler_t))
        } else {
            None
        };
        InterruptGuard { previous }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Re-arms the token before a new long-running command.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Sleeps for `duration` in steps of at most `step`. Returns true if the
    /// token was cancelled meanwhile.
    pub fn sleep(&self, duration: Duration, step: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let step = step.max(Duration::from_millis(1));
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(step.min(deadline - now));
        }
    }
}

fn set_sigint(handler: libc::sighandler_t) -> libc::sighandler_t {
    // SAFETY: the only handler installed here performs an atomic store
    unsafe { libc::signal(libc::SIGINT, handler) }
}

/// Restores the SIGINT disposition that was active before
/// [`CancellationToken::interruptible`].
pub struct InterruptGuard {
    previous: Option<libc::sighandler_t>,
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let restored = if previous == libc::SIG_ERR { libc::SIG_DFL } else { previous };
            set_sigint(restored);
        }
    }
}
