//! SHA-256 helpers.

use sha2::{Digest, Sha256};

use crate::config::Configuration;
use crate::consts::TEST_UUID_LEN;

/// Hex SHA-256 of `bytes`.
pub fn hash_bytes(bytes: &[u8]) -> String {
  hex::encode(Sha256::digest(bytes))
}

/// Deterministic app uuid for test builds.
///
/// Hashes the serialized configuration, so two test builds of the same
/// config share a uuid and unrelated configs do not.
pub fn config_uuid(config: &Configuration) -> String {
  // serde_json maps are ordered, so serialization is stable.
  let serialized = config.as_value().to_string();
  let mut full = hash_bytes(serialized.as_bytes());
  full.truncate(TEST_UUID_LEN);
  full
}
