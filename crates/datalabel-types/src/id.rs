use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content identifier of a labeling task.
///
/// Tasks are addressed by the blake3 digest of their content, so two
/// submitters posting the same task payload vote on the same entry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskHash([u8; 32]);

impl TaskHash {
    pub fn new(data: &[u8]) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for TaskHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskHash({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for TaskHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Opaque worker identity as authenticated by the hosting network.
///
/// The contract never verifies signatures itself; by the time a call
/// reaches a handler the host has already established the caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId([u8; 32]);

impl WorkerId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerId({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_hash_deterministic() {
        let data = b"lung scan #42";
        let h1 = TaskHash::new(data);
        let h2 = TaskHash::new(data);
        assert_eq!(h1, h2);
        assert_ne!(h1, TaskHash::new(b"lung scan #43"));
    }

    #[test]
    fn test_task_hash_hex_roundtrip() {
        let hash = TaskHash::new(b"roundtrip");
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(TaskHash::from_hex(&hex).unwrap(), hash);
        assert!(TaskHash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_worker_id_hex_roundtrip() {
        let id = WorkerId::from_bytes([7; 32]);
        let hex = id.to_hex();
        assert_eq!(WorkerId::from_hex(&hex).unwrap(), id);
        assert!(WorkerId::from_hex("not-hex").is_err());
    }

    #[test]
    fn test_short_display() {
        let id = WorkerId::from_bytes([0xAB; 32]);
        assert_eq!(format!("{}", id), "abababababababab");
        assert!(format!("{:?}", id).starts_with("WorkerId(abababab"));
    }
}
