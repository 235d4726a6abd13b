use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const OBJECT_ID_LEN: usize = 24;

/// 24-character lowercase hex identifier for users and articles.
///
/// The first 4 bytes are the big-endian creation time in unix seconds, the
/// remaining 8 are random.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        let secs = OffsetDateTime::now_utc().unix_timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        rand::thread_rng().fill_bytes(&mut bytes[4..]);
        Self(hex::encode(bytes))
    }

    /// Accepts exactly 24 hex digits in either case.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == OBJECT_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
