use crate::error::Result;

/// Abstract interface for the persistent key-value medium.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`super::DocumentStore`] handles the "what" (documents, pointer, preferences).
/// Values are opaque strings; the store owns their JSON encoding.
pub trait StorageBackend {
    /// Read a raw value. Returns Ok(None) if the key does not exist.
    /// Returns Err only on actual I/O errors.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw value.
    /// MUST be atomic, and MUST fail with `PrdError::QuotaExceeded` (leaving the
    /// previous value in place) if the write would exceed [`Self::capacity`].
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Every key currently held, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;

    /// Total bytes the medium accepts, measured with [`entry_bytes`].
    fn capacity(&self) -> u64;
}

/// Size of a string as browser storage accounts for it: UTF-16 code units × 2.
pub fn utf16_bytes(s: &str) -> u64 {
    s.encode_utf16().count() as u64 * 2
}

/// Bytes one stored entry costs against the medium's capacity.
pub fn entry_bytes(key: &str, value: &str) -> u64 {
    utf16_bytes(key) + utf16_bytes(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_utf16_units() {
        assert_eq!(utf16_bytes(""), 0);
        assert_eq!(utf16_bytes("abc"), 6);
        // U+2611 is one unit, U+1F600 is a surrogate pair
        assert_eq!(utf16_bytes("\u{2611}"), 2);
        assert_eq!(utf16_bytes("\u{1F600}"), 4);
        assert_eq!(entry_bytes("k", "vv"), 6);
    }
}
