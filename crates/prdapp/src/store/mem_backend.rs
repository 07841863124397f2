use super::backend::{entry_bytes, StorageBackend};
use crate::error::{PrdError, Result};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since prdapp is single-threaded.
/// This avoids the overhead of `RwLock` while still allowing the
/// `StorageBackend` trait to use `&self` for all methods.
pub struct MemBackend {
    entries: RefCell<HashMap<String, String>>,
    capacity: u64,
    simulate_write_error: RefCell<bool>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self::with_capacity(super::DEFAULT_CAPACITY)
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            capacity,
            simulate_write_error: RefCell::new(false),
        }
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Bytes currently held, across every key.
    pub fn used_bytes(&self) -> u64 {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| entry_bytes(k, v))
            .sum()
    }
}

impl StorageBackend for MemBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(PrdError::Store("Simulated write error".to_string()));
        }

        let previous = self
            .entries
            .borrow()
            .get(key)
            .map(|old| entry_bytes(key, old))
            .unwrap_or(0);
        let needed = entry_bytes(key, value);
        let available = self.capacity.saturating_sub(self.used_bytes() - previous);
        if needed > available {
            return Err(PrdError::QuotaExceeded { needed, available });
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }
}
