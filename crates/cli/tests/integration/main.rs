//! CLI integration tests: whole `forge` invocations against an app on disk.

mod common;
mod generate_tests;
mod package_tests;
mod plan_tests;
mod script_tests;
