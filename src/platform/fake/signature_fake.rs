use crate::domain::SignatureStatus;
use crate::platform::signature::{SignatureInfo, SignatureVerifier};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct FakeSignatureVerifier {
    entries: Arc<Mutex<HashMap<String, SignatureInfo>>>,
}

impl FakeSignatureVerifier {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn seed(&self, executable_path: &str, publisher: Option<&str>, status: SignatureStatus) {
        self.entries.lock().insert(
            executable_path.to_string(),
            SignatureInfo {
                publisher: publisher.map(str::to_string),
                status,
            },
        );
    }
}

impl SignatureVerifier for FakeSignatureVerifier {
    fn verify(&self, executable_path: &str) -> SignatureInfo {
        self.entries.lock().get(executable_path).cloned().unwrap_or(SignatureInfo {
            publisher: None,
            status: SignatureStatus::Unknown,
        })
    }
}
