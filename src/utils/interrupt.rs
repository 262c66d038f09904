use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::BackupError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Set from the Ctrl-C handler, polled by the backup loop
#[derive(Debug, Clone, Default)]
pub(crate) struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Route Ctrl-C to a new flag instead of killing the process
    pub(crate) fn install() -> Result<Self, BackupError> {
        let flag = Self::default();
        let handler_flag = flag.clone();
        ctrlc::set_handler(move || handler_flag.raise())?;
        Ok(flag)
    }

    pub(crate) fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> Result<(), BackupError> {
        if self.is_raised() {
            Err(BackupError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration`, waking early with `Interrupted` if the flag goes up
    pub(crate) fn pause(&self, duration: Duration) -> Result<(), BackupError> {
        let deadline = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}
