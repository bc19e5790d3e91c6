//! Anti-forgery tokens for the admin settings form.
//!
//! A token is issued when the form is rendered and must come back with the
//! submission. Tokens stay valid for [`NONCE_TTL`] and may be reused within
//! that window, so a redisplayed form keeps working.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use uuid::Uuid;

pub const NONCE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug)]
pub struct NonceStore {
    ttl: Duration,
    issued: Mutex<HashMap<String, Instant>>,
}

impl Default for NonceStore {
    fn default() -> Self {
        Self::with_ttl(NONCE_TTL)
    }
}

impl NonceStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh token. Expired tokens are dropped on the way.
    pub fn issue(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let mut issued = self.issued.lock();
        issued.retain(|_, at| now.duration_since(*at) < self.ttl);
        issued.insert(token.clone(), now);
        token
    }

    pub fn verify(&self, token: &str) -> bool {
        match self.issued.lock().get(token) {
            Some(at) => at.elapsed() < self.ttl,
            None => false,
        }
    }
}
