use serde_json::{Map, Value};

use crate::build::ConfigurationError;

/// The arguments a task receives, with typed accessors.
///
/// Accessors report a missing required argument as
/// [`ConfigurationError::MissingArgument`] and a value of the wrong shape as
/// [`ConfigurationError::InvalidArgument`]. A JSON `null` counts as absent.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
  task: &'a str,
  args: &'a [Value],
  kwargs: &'a Map<String, Value>,
}

impl<'a> Invocation<'a> {
  pub fn new(task: &'a str, args: &'a [Value], kwargs: &'a Map<String, Value>) -> Self {
    Self { task, args, kwargs }
  }

  pub fn task(&self) -> &'a str {
    self.task
  }

  pub fn args(&self) -> &'a [Value] {
    self.args
  }

  pub fn kwargs(&self) -> &'a Map<String, Value> {
    self.kwargs
  }

  /// Positional argument `index`, treating `null` as absent.
  pub fn arg(&self, index: usize) -> Option<&'a Value> {
    self.args.get(index).filter(|v| !v.is_null())
  }

  /// Optional positional string argument.
  pub fn arg_str(&self, index: usize, name: &str) -> Result<Option<&'a str>, ConfigurationError> {
    match self.arg(index) {
      None => Ok(None),
      Some(Value::String(s)) => Ok(Some(s.as_str())),
      Some(_) => Err(self.invalid(name, "a string")),
    }
  }

  /// Required positional string argument.
  pub fn require_arg_str(&self, index: usize, name: &str) -> Result<&'a str, ConfigurationError> {
    self.arg_str(index, name)?.ok_or_else(|| self.missing(name))
  }

  /// Every positional argument, each of which must be a string.
  pub fn str_args(&self) -> Result<Vec<&'a str>, ConfigurationError> {
    self
      .args
      .iter()
      .enumerate()
      .map(|(i, value)| value.as_str().ok_or_else(|| self.invalid(&format!("argument {}", i), "a string")))
      .collect()
  }

  /// Keyword argument `name`, treating `null` as absent.
  pub fn kwarg(&self, name: &str) -> Option<&'a Value> {
    self.kwargs.get(name).filter(|v| !v.is_null())
  }

  pub fn kwarg_str(&self, name: &str) -> Result<Option<&'a str>, ConfigurationError> {
    match self.kwarg(name) {
      None => Ok(None),
      Some(Value::String(s)) => Ok(Some(s.as_str())),
      Some(_) => Err(self.invalid(name, "a string")),
    }
  }

  pub fn require_str(&self, name: &str) -> Result<&'a str, ConfigurationError> {
    self.kwarg_str(name)?.ok_or_else(|| self.missing(name))
  }

  pub fn kwarg_bool(&self, name: &str, default: bool) -> Result<bool, ConfigurationError> {
    match self.kwarg(name) {
      None => Ok(default),
      Some(Value::Bool(b)) => Ok(*b),
      Some(_) => Err(self.invalid(name, "a boolean")),
    }
  }

  pub fn kwarg_u64(&self, name: &str, default: u64) -> Result<u64, ConfigurationError> {
    match self.kwarg(name) {
      None => Ok(default),
      Some(value) => value.as_u64().ok_or_else(|| self.invalid(name, "a non-negative integer")),
    }
  }

  /// A list of strings; a single string is accepted as a one-element list.
  pub fn kwarg_str_list(&self, name: &str) -> Result<Vec<String>, ConfigurationError> {
    match self.kwarg(name) {
      None => Ok(Vec::new()),
      Some(Value::String(s)) => Ok(vec![s.clone()]),
      Some(Value::Array(items)) => items
        .iter()
        .map(|item| {
          item
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(name, "a list of strings"))
        })
        .collect(),
      Some(_) => Err(self.invalid(name, "a list of strings")),
    }
  }

  pub fn missing(&self, name: &str) -> ConfigurationError {
    ConfigurationError::MissingArgument {
      task: self.task.to_string(),
      name: name.to_string(),
    }
  }

  pub fn invalid(&self, name: &str, expected: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidArgument {
      task: self.task.to_string(),
      name: name.to_string(),
      expected,
    }
  }
}
