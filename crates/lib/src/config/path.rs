//! Value paths used by `${...}` lookups: `name`, `icons["36"]`, `a.b[0].c`.

use serde_json::Value;

use super::ConfigError;

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Key(String),
  Index(usize),
}

/// Parse a lookup path into segments.
pub fn parse_path(path: &str) -> Result<Vec<Segment>, ConfigError> {
  let invalid = || ConfigError::InvalidPath(path.to_string());
  let mut segments = Vec::new();
  let mut chars = path.trim().chars().peekable();
  let mut key = String::new();

  while let Some(c) = chars.next() {
    match c {
      '.' => {
        if key.is_empty() && segments.is_empty() {
          return Err(invalid());
        }
        if !key.is_empty() {
          segments.push(Segment::Key(std::mem::take(&mut key)));
        }
      }
      '[' => {
        if !key.is_empty() {
          segments.push(Segment::Key(std::mem::take(&mut key)));
        }
        let mut inner = String::new();
        loop {
          match chars.next() {
            Some(']') => break,
            Some(ch) => inner.push(ch),
            None => return Err(invalid()),
          }
        }
        let inner = inner.trim();
        let quoted = inner.len() >= 2
          && ((inner.starts_with('"') && inner.ends_with('"')) || (inner.starts_with('\'') && inner.ends_with('\'')));
        if quoted {
          segments.push(Segment::Key(inner[1..inner.len() - 1].to_string()));
        } else {
          let index = inner.parse::<usize>().map_err(|_| invalid())?;
          segments.push(Segment::Index(index));
        }
      }
      c if c.is_whitespace() => return Err(invalid()),
      c => key.push(c),
    }
  }
  if !key.is_empty() {
    segments.push(Segment::Key(key));
  }
  if segments.is_empty() {
    return Err(invalid());
  }
  Ok(segments)
}

pub(super) fn lookup<'a>(root: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
  segments.iter().try_fold(root, |value, segment| match segment {
    Segment::Key(key) => value.get(key.as_str()),
    Segment::Index(index) => value.get(*index),
  })
}
