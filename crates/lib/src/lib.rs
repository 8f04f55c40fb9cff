//! webforge-lib: the build pipeline behind `forge`.
//!
//! One app's code is injected into a set of pre-built platform templates
//! (android, ios, chrome, firefox, safari, ie, web), which can then be run or
//! packaged. The pieces:
//! - `Command`/`Script`: what to do, scoped to platforms and guarded by predicates
//! - `Registry`: named tasks and predicates
//! - `BuildContext`: the per-invocation state that filters and executes a script
//! - `phases`/`goals`: the command lists behind `generate`, `run` and `package`
//! - `telemetry`: best-effort usage reporting

pub mod build;
pub mod command;
pub mod config;
pub mod consts;
pub mod goals;
pub mod phases;
pub mod platform;
pub mod predicates;
pub mod registry;
pub mod script;
pub mod tasks;
pub mod telemetry;
pub mod util;
