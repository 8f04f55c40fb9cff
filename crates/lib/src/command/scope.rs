use std::collections::BTreeSet;
use std::fmt;

use crate::build::ConfigurationError;
use crate::platform::Platform;

/// The platforms a command is relevant for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformScope {
  /// The `"all"` wildcard.
  All,
  /// Platform names as written; checked against [`Platform`] during filtering.
  Named(Vec<String>),
}

impl PlatformScope {
  /// Parse `"all"` or a comma-separated list such as `"android,web"`.
  ///
  /// Only the bare string `"all"` is the wildcard; inside a list it is an
  /// ordinary name and fails at filter time like any other unknown platform.
  pub fn parse(scope: &str) -> Self {
    if scope.trim() == "all" {
      return Self::All;
    }
    Self::Named(
      scope
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect(),
    )
  }

  /// True when the scope is the wildcard or names any enabled platform.
  ///
  /// An empty scope or an unknown platform name is a configuration error.
  pub fn matches(&self, enabled: &BTreeSet<Platform>, task: &str) -> Result<bool, ConfigurationError> {
    let names = match self {
      Self::All => return Ok(true),
      Self::Named(names) => names,
    };
    if names.is_empty() {
      return Err(ConfigurationError::EmptyPlatformScope { task: task.to_string() });
    }
    let mut matched = false;
    for name in names {
      let platform: Platform = name.parse().map_err(|_| ConfigurationError::UnknownPlatform {
        task: task.to_string(),
        platform: name.clone(),
      })?;
      matched |= enabled.contains(&platform);
    }
    Ok(matched)
  }
}

impl From<Platform> for PlatformScope {
  fn from(platform: Platform) -> Self {
    Self::Named(vec![platform.as_str().to_string()])
  }
}

impl From<&str> for PlatformScope {
  fn from(scope: &str) -> Self {
    Self::parse(scope)
  }
}

impl fmt::Display for PlatformScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str("all"),
      Self::Named(names) => f.write_str(&names.join(",")),
    }
  }
}

/// Predicate names gating a command, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateExpr(Vec<String>);

impl PredicateExpr {
  pub fn parse(expr: &str) -> Self {
    Self(
      expr
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect(),
    )
  }

  pub fn names(&self) -> &[String] {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl fmt::Display for PredicateExpr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0.join(","))
  }
}
