//! Per-user metric cache with timestamp expiry.
//!
//! Several achievements re-derive the same aggregate (five streak badges all
//! need "current streak days"), so aggregates are held for a short TTL.
//! Entries are keyed by user id only; nothing is shared across users. Every
//! write sweeps out expired entries, so users who stop showing up do not
//! accumulate.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;

pub trait UserCache<V>: Send + Sync {
    fn get(&self, user_id: &str) -> Option<V>;
    fn set(&self, user_id: &str, value: V);
    fn expire(&self, user_id: &str);
}

pub struct TtlCache<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, (V, DateTime<Utc>)>>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone + Send> UserCache<V> for TtlCache<V> {
    fn get(&self, user_id: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let fresh = entries
            .get(user_id)
            .map(|(value, stored_at)| (now - *stored_at < self.ttl).then(|| value.clone()));
        match fresh {
            Some(Some(value)) => Some(value),
            Some(None) => {
                entries.remove(user_id);
                None
            }
            None => None,
        }
    }

    fn set(&self, user_id: &str, value: V) {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, (_, stored_at)| now - *stored_at < ttl);
        entries.insert(user_id.to_string(), (value, now));
    }

    fn expire(&self, user_id: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(user_id);
    }
}

/// Cache that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl<V> UserCache<V> for NoCache {
    fn get(&self, _user_id: &str) -> Option<V> {
        None
    }

    fn set(&self, _user_id: &str, _value: V) {}

    fn expire(&self, _user_id: &str) {}
}
