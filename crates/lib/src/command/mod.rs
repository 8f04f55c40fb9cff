//! Commands: one scheduled task invocation inside a script.
//!
//! A [`Command`] names the platforms it is relevant for, the predicates that
//! gate it, the task to run and the arguments to pass. Commands are built
//! once by phases (or read from a script file) and never modified
//! afterwards.
//!
//! # Tuple surface
//!
//! Script files spell commands as JSON arrays of two to five elements:
//!
//! ```json
//! ["android,web", "include_user", "copy_files", [], {"from": "src", "to": "out"}]
//! ```
//!
//! Missing trailing elements default to null / empty.

mod invocation;
mod scope;

pub use invocation::Invocation;
pub use scope::{PlatformScope, PredicateExpr};

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Positional task arguments.
pub type Args = Vec<Value>;

/// Keyword task arguments.
pub type Kwargs = Map<String, Value>;

/// One `(platforms, predicates, task, args, kwargs)` entry of a script.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
  platforms: PlatformScope,
  predicate: PredicateExpr,
  task: String,
  args: Args,
  kwargs: Kwargs,
}

impl Command {
  /// A command with no predicates and no arguments.
  pub fn new(platforms: impl Into<PlatformScope>, task: impl Into<String>) -> Self {
    Self {
      platforms: platforms.into(),
      predicate: PredicateExpr::default(),
      task: task.into(),
      args: Vec::new(),
      kwargs: Map::new(),
    }
  }

  /// Gate the command on a comma-separated list of predicate names.
  pub fn when(mut self, predicates: &str) -> Self {
    self.predicate = PredicateExpr::parse(predicates);
    self
  }

  pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
    self.args = args.into_iter().collect();
    self
  }

  pub fn with_kwargs(mut self, kwargs: Kwargs) -> Self {
    self.kwargs = kwargs;
    self
  }

  pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.kwargs.insert(name.into(), value.into());
    self
  }

  pub fn platforms(&self) -> &PlatformScope {
    &self.platforms
  }

  pub fn predicate(&self) -> &PredicateExpr {
    &self.predicate
  }

  pub fn task(&self) -> &str {
    &self.task
  }

  pub fn args(&self) -> &[Value] {
    &self.args
  }

  pub fn kwargs(&self) -> &Kwargs {
    &self.kwargs
  }

  /// The typed view handed to the task when this command runs.
  pub fn invocation(&self) -> Invocation<'_> {
    Invocation::new(&self.task, &self.args, &self.kwargs)
  }

  /// Build a command from the tuple surface.
  pub fn from_tuple(raw: Vec<Value>) -> Result<Self, String> {
    if !(2..=5).contains(&raw.len()) {
      return Err(format!("a command must have 2 to 5 elements, found {}", raw.len()));
    }
    let mut fields = raw.into_iter();

    let platforms = match fields.next() {
      Some(Value::String(scope)) => PlatformScope::parse(&scope),
      other => return Err(format!("platform scope must be a string, found {}", describe(other.as_ref()))),
    };
    let predicate = match fields.next() {
      None | Some(Value::Null) => PredicateExpr::default(),
      Some(Value::String(expr)) => PredicateExpr::parse(&expr),
      Some(other) => return Err(format!("predicate must be a string or null, found {}", describe(Some(&other)))),
    };
    // A two-element command has no task; execution reports it.
    let task = match fields.next() {
      None | Some(Value::Null) => String::new(),
      Some(Value::String(task)) => task,
      Some(other) => return Err(format!("task name must be a string, found {}", describe(Some(&other)))),
    };
    let args = match fields.next() {
      None | Some(Value::Null) => Vec::new(),
      Some(Value::Array(args)) => args,
      Some(other) => return Err(format!("args must be an array or null, found {}", describe(Some(&other)))),
    };
    let kwargs = match fields.next() {
      None | Some(Value::Null) => Map::new(),
      Some(Value::Object(kwargs)) => kwargs,
      Some(other) => return Err(format!("kwargs must be an object or null, found {}", describe(Some(&other)))),
    };

    Ok(Self {
      platforms,
      predicate,
      task,
      args,
      kwargs,
    })
  }
}

fn describe(value: Option<&Value>) -> &'static str {
  match value {
    None | Some(Value::Null) => "null",
    Some(Value::Bool(_)) => "a boolean",
    Some(Value::Number(_)) => "a number",
    Some(Value::String(_)) => "a string",
    Some(Value::Array(_)) => "an array",
    Some(Value::Object(_)) => "an object",
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}]", self.platforms)?;
    if !self.predicate.is_empty() {
      write!(f, " if {}", self.predicate)?;
    }
    write!(f, " {}(", self.task)?;
    let mut first = true;
    for arg in &self.args {
      if !first {
        f.write_str(", ")?;
      }
      write!(f, "{}", arg)?;
      first = false;
    }
    for (name, value) in &self.kwargs {
      if !first {
        f.write_str(", ")?;
      }
      write!(f, "{}={}", name, value)?;
      first = false;
    }
    f.write_str(")")
  }
}

impl Serialize for Command {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(5))?;
    seq.serialize_element(&self.platforms.to_string())?;
    if self.predicate.is_empty() {
      seq.serialize_element(&Value::Null)?;
    } else {
      seq.serialize_element(&self.predicate.to_string())?;
    }
    seq.serialize_element(&self.task)?;
    seq.serialize_element(&self.args)?;
    seq.serialize_element(&self.kwargs)?;
    seq.end()
  }
}

impl<'de> Deserialize<'de> for Command {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Command::from_tuple(raw).map_err(de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::Platform;
  use serde_json::json;

  #[test]
  fn builder_fills_defaults() {
    let command = Command::new(Platform::Ios, "run_ios");
    assert_eq!(command.platforms(), &PlatformScope::from(Platform::Ios));
    assert!(command.predicate().is_empty());
    assert!(command.args().is_empty());
    assert!(command.kwargs().is_empty());
  }

  #[test]
  fn parses_full_tuple() {
    let command: Command = serde_json::from_value(json!([
      "android,web",
      "include_user, have_android_icons",
      "copy_files",
      ["x"],
      { "from": "src", "to": "out" }
    ]))
    .unwrap();

    assert_eq!(command.platforms().to_string(), "android,web");
    assert_eq!(command.predicate().names(), ["include_user", "have_android_icons"]);
    assert_eq!(command.task(), "copy_files");
    assert_eq!(command.args(), [json!("x")]);
    assert_eq!(command.kwargs().get("to"), Some(&json!("out")));
  }

  #[test]
  fn missing_trailing_elements_default_to_empty() {
    let command: Command = serde_json::from_value(json!(["all", null, "resolve_urls"])).unwrap();
    assert_eq!(command, Command::new(PlatformScope::All, "resolve_urls"));

    let command: Command = serde_json::from_value(json!(["ios", null])).unwrap();
    assert_eq!(command.task(), "");
  }

  #[test]
  fn rejects_bad_tuples() {
    for bad in [
      json!(["all"]),
      json!(["all", null, "t", [], {}, "extra"]),
      json!([1, null, "t"]),
      json!(["all", 5, "t"]),
      json!(["all", null, "t", {}]),
      json!(["all", null, "t", [], []]),
    ] {
      assert!(serde_json::from_value::<Command>(bad.clone()).is_err(), "accepted {}", bad);
    }
  }

  #[test]
  fn serializes_as_five_tuple() {
    let command = Command::new(PlatformScope::All, "resolve_urls").with_args([json!("icons.*")]);
    assert_eq!(
      serde_json::to_value(&command).unwrap(),
      json!(["all", null, "resolve_urls", ["icons.*"], {}])
    );
  }

  #[test]
  fn display_shows_scope_predicates_and_arguments() {
    let command = Command::new(Platform::Android, "copy_files")
      .when("include_user")
      .with_kwarg("from", "src");
    assert_eq!(command.to_string(), "[android] if include_user copy_files(from=\"src\")");
  }
}
