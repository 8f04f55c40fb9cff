//! Build targets and host platform detection.
//!
//! [`Platform`] enumerates the targets a web app can be packaged for.
//! [`host`] describes the machine running the build, which matters for tasks
//! that shell out to OS-specific tooling.

pub mod host;
pub mod paths;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use host::{Arch, Host, Os, host_triple};

/// A packaging target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Android,
  Ios,
  Firefox,
  Chrome,
  Safari,
  Ie,
  Web,
}

impl Platform {
  /// Every supported target, in canonical order.
  pub const ALL: [Platform; 7] = [
    Platform::Android,
    Platform::Ios,
    Platform::Firefox,
    Platform::Chrome,
    Platform::Safari,
    Platform::Ie,
    Platform::Web,
  ];

  /// Targets enabled when the caller does not choose any.
  pub const DEFAULT_ENABLED: [Platform; 6] = [
    Platform::Chrome,
    Platform::Firefox,
    Platform::Safari,
    Platform::Ie,
    Platform::Android,
    Platform::Web,
  ];

  /// Returns the lowercase identifier used in command scopes.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Android => "android",
      Self::Ios => "ios",
      Self::Firefox => "firefox",
      Self::Chrome => "chrome",
      Self::Safari => "safari",
      Self::Ie => "ie",
      Self::Web => "web",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Returned when a string does not name a known [`Platform`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
  type Err = UnknownPlatform;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Platform::ALL
      .into_iter()
      .find(|p| p.as_str() == s)
      .ok_or_else(|| UnknownPlatform(s.to_string()))
  }
}
