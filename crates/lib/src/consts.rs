/// Application name, used for per-user directories.
pub const APP_NAME: &str = "webforge";

/// Version reported to telemetry and by `forge --version`.
pub const TOOLS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Length of the hex uuid generated in test mode.
pub const TEST_UUID_LEN: usize = 32;

/// Directory (relative to the working directory) holding generated platform trees.
pub const DEVELOPMENT_DIR: &str = "development";

/// Directory (relative to the working directory) receiving packaged artifacts.
pub const RELEASE_DIR: &str = "release";

/// Environment variable naming the telemetry endpoint.
pub const TELEMETRY_URL_ENV: &str = "FORGE_TELEMETRY_URL";
