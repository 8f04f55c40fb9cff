//! iOS: simulator runs and signed `.ipa` packages. macOS hosts only.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::android::ensure_package_name;
use super::archive::{release_path, zip_dir};
use super::files::copy_tree;
use super::glob_paths;
use super::shell::{require_tool, run_attached, run_shell};
use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;
use crate::platform::{Os, Platform};

const DEFAULT_CERTIFICATE: &str = "iPhone Developer";
const EMBEDDED_PROFILE: &str = "embedded.mobileprovision";
const PLIST_START: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const PLIST_END: &str = "</plist>";

#[derive(Debug, Error)]
pub enum IosError {
  #[error("iOS builds need a macOS host (this is {host})")]
  Unsupported { host: String },

  #[error("couldn't find an iOS app matching {pattern}")]
  AppNotFound { pattern: String },

  #[error("{} does not appear to be a valid provisioning profile", path.display())]
  InvalidProfile { path: PathBuf },
}

fn require_macos() -> Result<(), IosError> {
  match Os::current() {
    Some(os) if os.supports_ios() => Ok(()),
    other => Err(IosError::Unsupported {
      host: other.map(|os| os.as_str()).unwrap_or(std::env::consts::OS).to_string(),
    }),
  }
}

/// The embedded XML plist of a provisioning profile, which is otherwise a
/// signed binary blob.
pub fn extract_plist(profile: &[u8]) -> Option<String> {
  let text = String::from_utf8_lossy(profile);
  let start = text.find(PLIST_START)?;
  let end = text[start..].find(PLIST_END)? + start + PLIST_END.len();
  Some(text[start..end].to_string())
}

/// Distribution profiles list no provisioned devices.
pub fn is_distribution_profile(plist: &str) -> bool {
  !plist.contains("<key>ProvisionedDevices</key>")
}

/// Describe a mismatch between the profile kind and the signing identity.
pub fn signing_mismatch(distribution: bool, certificate: &str) -> Option<&'static str> {
  let development_identity = certificate.contains("Developer") || certificate.contains("Development");
  if distribution && development_identity {
    Some("distribution provisioning profile used with a development certificate")
  } else if !distribution && certificate.contains("Distribution") {
    Some("development provisioning profile used with a distribution certificate")
  } else {
    None
  }
}

fn find_app(ctx: &BuildContext<'_>, dir: &Path, pattern: &str) -> Result<PathBuf, TaskError> {
  let pattern = dir.join("ios").join(pattern).to_string_lossy().into_owned();
  glob_paths(ctx, &pattern)?
    .into_iter()
    .find(|p| p.is_dir())
    .ok_or_else(|| IosError::AppNotFound { pattern }.into())
}

/// `run_ios(dir)`: install into and launch on the booted simulator.
pub fn run_ios(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let dir = ctx.resolve_path(call.require_arg_str(0, "build_type_dir")?);
  require_macos()?;
  let xcrun = require_tool("xcrun", "install Xcode and its command line tools")?;

  let app = find_app(ctx, &dir, "simulator-*.app")?;
  ctx.unpackaged.insert(Platform::Ios, app.clone());
  let bundle = ensure_package_name(&mut ctx.config, Platform::Ios)?;

  info!(app = %app.display(), "installing on simulator");
  let args = [OsStr::new("simctl"), OsStr::new("install"), OsStr::new("booted"), app.as_os_str()];
  run_shell(&xcrun, &args, None)?;
  info!(bundle = %bundle, "launching");
  run_attached(&xcrun, &["simctl", "launch", "--console", "booted", bundle.as_str()], None)
}

/// `package_ios(dir){provisioning_profile, certificate="iPhone Developer"}`
pub fn package_ios(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let dir = ctx.resolve_path(call.require_arg_str(0, "build_type_dir")?);
  let profile = ctx.resolve_path(call.require_str("provisioning_profile")?);
  let certificate = call.kwarg_str("certificate")?.unwrap_or(DEFAULT_CERTIFICATE);
  require_macos()?;
  let codesign = require_tool("codesign", "install Xcode and make sure codesign is on your PATH")?;

  info!("starting package process for iOS");
  let app = find_app(ctx, &dir, "device-*.app")?;
  let bytes = fs::read(&profile).map_err(|e| TaskError::path("read", &profile, e))?;
  let plist = extract_plist(&bytes).ok_or_else(|| IosError::InvalidProfile { path: profile.clone() })?;
  if let Some(mismatch) = signing_mismatch(is_distribution_profile(&plist), certificate) {
    warn!(certificate = %certificate, profile = %profile.display(), "{}", mismatch);
  }

  let staging = tempfile::TempDir::new()?;
  let app_name = app.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  let payload_app = staging.path().join("Payload").join(&app_name);
  copy_tree(&app, &payload_app, &[])?;
  fs::copy(&profile, payload_app.join(EMBEDDED_PROFILE)).map_err(|e| TaskError::path("copy", &profile, e))?;

  let args = [
    OsStr::new("--force"),
    OsStr::new("--preserve-metadata=identifier,entitlements"),
    OsStr::new("--sign"),
    OsStr::new(certificate),
    payload_app.as_os_str(),
  ];
  run_shell(&codesign, &args, None)?;

  if let Some(artwork) = ctx.config.get_str("icons.512") {
    let artwork = ctx.resolve_path(artwork);
    fs::copy(&artwork, staging.path().join("iTunesArtwork")).map_err(|e| TaskError::path("copy", &artwork, e))?;
  }

  let output = release_path(ctx, Platform::Ios, "ipa")?;
  zip_dir(staging.path(), &output, &[])?;
  info!(path = %output.display(), "created IPA");
  ctx.unpackaged.insert(Platform::Ios, app);
  ctx.packaged.insert(Platform::Ios, output);
  Ok(())
}
