use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide shutdown signal, shared by the frame hook and the IPC
/// server. Set once, during bridge teardown; never cleared.
#[derive(Default)]
pub struct ShutdownFlag(AtomicBool);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn signal(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_signaled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unsignaled() {
        assert!(!ShutdownFlag::new().is_signaled());
    }

    #[test]
    fn signal_is_observed() {
        let flag = ShutdownFlag::new();
        flag.signal();
        assert!(flag.is_signaled());
    }
}
