use crate::platform::elevation::ElevationCheck;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone)]
pub struct FakeElevation {
    elevated: Arc<AtomicBool>,
}

impl FakeElevation {
    pub fn new(elevated: bool) -> Self {
        Self {
            elevated: Arc::new(AtomicBool::new(elevated)),
        }
    }

    pub fn set_elevated(&self, elevated: bool) {
        self.elevated.store(elevated, Ordering::SeqCst);
    }
}

impl ElevationCheck for FakeElevation {
    fn is_elevated(&self) -> bool {
        self.elevated.load(Ordering::SeqCst)
    }
}
