//! Task and predicate registries.
//!
//! A [`Registry`] is the capability table a build looks names up in. It is
//! built once at startup (see [`Registry::builtin`]), optionally extended with
//! extra registrations, and then handed to every [`BuildContext`] by shared
//! reference. Nothing registers into it while a build runs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;

/// An operation with side effects, invoked by name from a script.
pub trait Task: Send + Sync {
  fn run(&self, ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError>;
}

impl<F> Task for F
where
  F: Fn(&mut BuildContext<'_>, &Invocation<'_>) -> Result<(), TaskError> + Send + Sync,
{
  fn run(&self, ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
    self(ctx, call)
  }
}

/// A side-effect-free check over build state, used to gate commands.
pub trait Predicate: Send + Sync {
  fn check(&self, ctx: &BuildContext<'_>) -> bool;
}

impl<F> Predicate for F
where
  F: Fn(&BuildContext<'_>) -> bool + Send + Sync,
{
  fn check(&self, ctx: &BuildContext<'_>) -> bool {
    self(ctx)
  }
}

/// Pins a closure to the [`Task`] signature so its lifetimes are inferred as
/// higher-ranked.
pub fn task_fn<F>(f: F) -> F
where
  F: Fn(&mut BuildContext<'_>, &Invocation<'_>) -> Result<(), TaskError> + Send + Sync,
{
  f
}

/// Pins a closure to the [`Predicate`] signature.
pub fn predicate_fn<F>(f: F) -> F
where
  F: Fn(&BuildContext<'_>) -> bool + Send + Sync,
{
  f
}

/// Which table a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
  Task,
  Predicate,
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Kind::Task => f.write_str("task"),
      Kind::Predicate => f.write_str("predicate"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("{kind} `{name}` is already registered")]
  DuplicateRegistration { kind: Kind, name: String },

  #[error("{name} has not been registered as a {kind}")]
  UnknownName { kind: Kind, name: String },
}

/// Name to capability tables for tasks and predicates.
#[derive(Default, Clone)]
pub struct Registry {
  tasks: BTreeMap<String, Arc<dyn Task>>,
  predicates: BTreeMap<String, Arc<dyn Predicate>>,
}

impl Registry {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding every built-in task and predicate.
  pub fn builtin() -> Result<Self, RegistryError> {
    let mut registry = Self::new();
    crate::tasks::register(&mut registry)?;
    crate::predicates::register(&mut registry)?;
    Ok(registry)
  }

  pub fn register_task(&mut self, name: impl Into<String>, task: impl Task + 'static) -> Result<(), RegistryError> {
    let name = name.into();
    if self.tasks.contains_key(&name) {
      return Err(RegistryError::DuplicateRegistration { kind: Kind::Task, name });
    }
    self.tasks.insert(name, Arc::new(task));
    Ok(())
  }

  pub fn register_predicate(
    &mut self,
    name: impl Into<String>,
    predicate: impl Predicate + 'static,
  ) -> Result<(), RegistryError> {
    let name = name.into();
    if self.predicates.contains_key(&name) {
      return Err(RegistryError::DuplicateRegistration {
        kind: Kind::Predicate,
        name,
      });
    }
    self.predicates.insert(name, Arc::new(predicate));
    Ok(())
  }

  pub fn resolve_task(&self, name: &str) -> Result<&dyn Task, RegistryError> {
    self
      .tasks
      .get(name)
      .map(|task| task.as_ref())
      .ok_or_else(|| RegistryError::UnknownName {
        kind: Kind::Task,
        name: name.to_string(),
      })
  }

  pub fn resolve_predicate(&self, name: &str) -> Result<&dyn Predicate, RegistryError> {
    self
      .predicates
      .get(name)
      .map(|predicate| predicate.as_ref())
      .ok_or_else(|| RegistryError::UnknownName {
        kind: Kind::Predicate,
        name: name.to_string(),
      })
  }

  pub fn task_names(&self) -> impl Iterator<Item = &str> {
    self.tasks.keys().map(String::as_str)
  }

  pub fn predicate_names(&self) -> impl Iterator<Item = &str> {
    self.predicates.keys().map(String::as_str)
  }
}

impl fmt::Debug for Registry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registry")
      .field("tasks", &self.tasks.keys().collect::<Vec<_>>())
      .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
      .finish()
  }
}
