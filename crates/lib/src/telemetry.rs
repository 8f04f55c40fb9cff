//! Build telemetry.
//!
//! Every goal reports one [`TrackRecord`] before it runs. Reporting is best
//! effort: [`record`] logs a warning when delivery fails and never fails the
//! build.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::TOOLS_VERSION;
use crate::platform::host_triple;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum TelemetryError {
  #[error("telemetry request failed: {0}")]
  Http(#[from] reqwest::Error),
}

/// What gets reported for one goal invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
  /// `generate`, `run` or `package`.
  pub action: String,
  /// Host platform triple.
  pub platform: String,
  pub tools_version: String,
  /// The app's uuid, when it has one.
  pub uuid: Option<String>,
}

impl TrackRecord {
  pub fn new(action: impl Into<String>, uuid: Option<&str>) -> Self {
    Self {
      action: action.into(),
      platform: host_triple(),
      tools_version: TOOLS_VERSION.to_string(),
      uuid: uuid.map(str::to_string),
    }
  }
}

pub trait Telemetry {
  fn track(&self, record: &TrackRecord) -> Result<(), TelemetryError>;
}

/// Reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
  fn track(&self, record: &TrackRecord) -> Result<(), TelemetryError> {
    debug!(action = %record.action, "telemetry disabled");
    Ok(())
  }
}

/// POSTs records as JSON to `<base>/track/`.
#[derive(Debug, Clone)]
pub struct HttpTelemetry {
  client: reqwest::blocking::Client,
  endpoint: String,
}

impl HttpTelemetry {
  pub fn new(base_url: &str) -> Result<Self, TelemetryError> {
    let client = reqwest::blocking::Client::builder().timeout(TIMEOUT).build()?;
    Ok(Self {
      client,
      endpoint: format!("{}/track/", base_url.trim_end_matches('/')),
    })
  }

  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }
}

impl Telemetry for HttpTelemetry {
  fn track(&self, record: &TrackRecord) -> Result<(), TelemetryError> {
    debug!(endpoint = %self.endpoint, action = %record.action, "sending telemetry");
    self.client.post(&self.endpoint).json(record).send()?.error_for_status()?;
    Ok(())
  }
}

/// Report `record`, logging instead of failing when delivery does not work.
pub fn record(telemetry: &dyn Telemetry, record: &TrackRecord) {
  if let Err(err) = telemetry.track(record) {
    warn!(action = %record.action, error = %err, "failed to record build telemetry");
  }
}
