//! Android: building, signing, installing and running APKs.
//!
//! The generated Android tree under `<output>/android` is zipped into an
//! unsigned APK, aligned with `zipalign` and signed with `apksigner`, both
//! taken from the SDK's newest `build-tools` directory. Devices are driven
//! through `adb`.
//!
//! Waiting for a device is an explicit bounded loop: it ends when a device
//! shows up, when the user cancels, or when the attempt limit is reached.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::archive::{release_path, zip_dir};
use super::prompt;
use super::shell::{run_attached, run_shell, spawn_detached};
use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;
use crate::config::{ConfigError, Configuration};
use crate::platform::paths::home_dir;
use crate::platform::{Os, Platform};

/// Prefix of generated Android and iOS package names.
pub const PACKAGE_PREFIX: &str = "io.trigger.forge.";

const SDK_ENV_VARS: [&str; 2] = ["ANDROID_HOME", "ANDROID_SDK_ROOT"];
const UNSIGNED_APK: &str = "app.apk";
const ALIGNED_APK: &str = "aligned-app.apk";
const OUT_APK: &str = "out.apk";
const DEFAULT_AVD: &str = "forge";
const DEFAULT_ATTEMPTS: u64 = 10;
const DEFAULT_POLL_SECS: u64 = 3;

#[derive(Debug, Error)]
pub enum AndroidError {
  #[error("no Android SDK found: pass its location, set ANDROID_HOME, or add android_sdk to your settings")]
  SdkNotFound,

  #[error("{tool} not found in the Android SDK at {}", sdk.display())]
  SdkToolMissing { tool: String, sdk: PathBuf },

  #[error("no Android device became available after {attempts} attempt(s)")]
  NoDevice { attempts: u64 },

  #[error("no such device `{requested}`; available devices: {}", available.join(", "))]
  UnknownDevice { requested: String, available: Vec<String> },

  #[error("device {device} did not finish booting")]
  BootTimeout { device: String },
}

/// An Android SDK installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sdk {
  root: PathBuf,
}

impl Sdk {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Find the SDK: an explicit location first, then the environment, then
  /// the usual per-OS install locations.
  pub fn locate(explicit: Option<&Path>) -> Result<Self, AndroidError> {
    if let Some(dir) = explicit {
      return if dir.is_dir() {
        Ok(Self::new(dir))
      } else {
        Err(AndroidError::SdkNotFound)
      };
    }
    let from_env = SDK_ENV_VARS
      .iter()
      .filter_map(|var| std::env::var_os(var))
      .filter(|v| !v.is_empty())
      .map(PathBuf::from);
    let from_home = home_dir().into_iter().flat_map(|home| {
      [
        home.join("Android").join("Sdk"),
        home.join("Library").join("Android").join("sdk"),
        home.join("AppData").join("Local").join("Android").join("Sdk"),
      ]
    });
    from_env
      .chain(from_home)
      .find(|dir| dir.is_dir())
      .map(Self::new)
      .ok_or(AndroidError::SdkNotFound)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn executable(name: &str) -> String {
    Os::current().map(|os| os.executable(name)).unwrap_or_else(|| name.to_string())
  }

  pub fn adb(&self) -> PathBuf {
    self.root.join("platform-tools").join(Self::executable("adb"))
  }

  pub fn emulator(&self) -> PathBuf {
    self.root.join("emulator").join(Self::executable("emulator"))
  }

  /// A tool from the newest `build-tools/<version>` directory, falling back
  /// to the legacy `tools` directory.
  pub fn build_tool(&self, name: &str) -> Result<PathBuf, AndroidError> {
    let names = [Self::executable(name), format!("{}.bat", name), name.to_string()];
    let mut versions: Vec<PathBuf> = fs::read_dir(self.root.join("build-tools"))
      .map(|entries| entries.filter_map(Result::ok).map(|e| e.path()).filter(|p| p.is_dir()).collect())
      .unwrap_or_default();
    versions.sort_by(|a, b| version_key(b).cmp(&version_key(a)));
    versions.push(self.root.join("tools"));

    versions
      .iter()
      .flat_map(|dir| names.iter().map(move |n| dir.join(n)))
      .find(|p| p.is_file())
      .ok_or_else(|| AndroidError::SdkToolMissing {
        tool: name.to_string(),
        sdk: self.root.clone(),
      })
  }
}

/// Numeric sort key for `build-tools` version directories (`33.0.2`).
fn version_key(path: &Path) -> Vec<u64> {
  path
    .file_name()
    .and_then(|n| n.to_str())
    .map(|n| n.split(['.', '-']).map(|part| part.parse().unwrap_or(0)).collect())
    .unwrap_or_default()
}

/// Serial numbers of attached, ready devices from `adb devices` output.
pub fn scrape_devices(output: &str) -> Vec<String> {
  output
    .lines()
    .filter_map(|line| {
      let mut words = line.split('\t');
      let serial = words.next()?.trim();
      let state = words.next().map(str::trim);
      let looks_like_serial = serial.len() > 5 && !serial.contains(' ');
      (looks_like_serial && matches!(state, None | Some("device"))).then(|| serial.to_string())
    })
    .collect()
}

/// What to do after a probe found no device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDevice {
  Retry,
  Cancel,
}

/// Probe for devices up to `attempts` times.
///
/// `on_missing` runs between failed probes with the attempt number and
/// decides whether to keep waiting.
pub fn wait_for_device(
  attempts: u64,
  mut probe: impl FnMut() -> Result<Vec<String>, TaskError>,
  mut on_missing: impl FnMut(u64) -> Result<NoDevice, TaskError>,
) -> Result<Vec<String>, TaskError> {
  for attempt in 1..=attempts {
    let devices = probe()?;
    if !devices.is_empty() {
      return Ok(devices);
    }
    debug!(attempt, attempts, "no android device found");
    if attempt == attempts {
      break;
    }
    if on_missing(attempt)? == NoDevice::Cancel {
      return Err(TaskError::Cancelled);
    }
  }
  Err(AndroidError::NoDevice { attempts }.into())
}

/// Pick the requested device, or the first available one.
pub fn choose_device(available: &[String], requested: Option<&str>) -> Result<String, AndroidError> {
  match requested {
    Some(device) if available.iter().any(|d| d == device) => {
      info!(device = %device, "using specified android device");
      Ok(device.to_string())
    }
    Some(device) => Err(AndroidError::UnknownDevice {
      requested: device.to_string(),
      available: available.to_vec(),
    }),
    None => {
      let device = available.first().cloned().ok_or(AndroidError::NoDevice { attempts: 0 })?;
      info!(device = %device, "no android device specified, defaulting to first");
      Ok(device)
    }
  }
}

/// The app's package name for `platform`, generated from the app name and
/// uuid and written back into the configuration when absent.
pub fn ensure_package_name(config: &mut Configuration, platform: Platform) -> Result<String, ConfigError> {
  if let Some(name) = config.package_name(platform) {
    return Ok(name.to_string());
  }
  let uuid = config.uuid().ok_or_else(|| ConfigError::MissingKey("uuid".to_string()))?;
  let name = format!("{}{}{}", PACKAGE_PREFIX, config.slug()?, uuid);
  config.set_package_name(platform, name.clone());
  debug!(platform = %platform, package = %name, "generated package name");
  Ok(name)
}

/// Keystore credentials for `apksigner`.
#[derive(Debug, Clone)]
pub struct SigningInfo {
  pub keystore: PathBuf,
  pub storepass: String,
  pub keyalias: String,
  pub keypass: String,
}

impl SigningInfo {
  /// The SDK's standard debug key.
  pub fn debug_key(keystore: Option<&Path>) -> Self {
    let keystore = keystore.map(Path::to_path_buf).unwrap_or_else(|| {
      home_dir()
        .unwrap_or_default()
        .join(".android")
        .join("debug.keystore")
    });
    Self {
      keystore,
      storepass: "android".to_string(),
      keyalias: "androiddebugkey".to_string(),
      keypass: "android".to_string(),
    }
  }

  /// Release signing details from keyword arguments, prompting for missing
  /// ones when interactive.
  fn from_call(call: &Invocation<'_>, interactive: bool) -> Result<Self, TaskError> {
    const FIELDS: [(&str, &str); 4] = [
      ("keystore", "the location of your release keystore"),
      ("storepass", "the password of your release keystore"),
      ("keyalias", "the alias of your release key"),
      ("keypass", "the password for your release key"),
    ];
    let mut values = Vec::with_capacity(FIELDS.len());
    for (name, description) in FIELDS {
      let value = match call.kwarg_str(name)? {
        Some(v) if !v.is_empty() => v.to_string(),
        _ if interactive => prompt::ask(description)?,
        _ => return Err(call.missing(name).into()),
      };
      values.push(value);
    }
    let [keystore, storepass, keyalias, keypass]: [String; 4] = values
      .try_into()
      .map_err(|_| TaskError::Failed("incomplete signing information".to_string()))?;
    Ok(Self {
      keystore: PathBuf::from(keystore),
      storepass,
      keyalias,
      keypass,
    })
  }
}

/// Zip, align and sign the tree in `android_dir` into `output`.
fn build_apk(sdk: &Sdk, android_dir: &Path, signing: &SigningInfo, output: &Path) -> Result<(), TaskError> {
  info!("creating Android .apk file");
  let unsigned = android_dir.join(UNSIGNED_APK);
  let aligned = android_dir.join(ALIGNED_APK);
  zip_dir(android_dir, &unsigned, &[UNSIGNED_APK, ALIGNED_APK, OUT_APK])?;

  info!("aligning apk");
  let zipalign = sdk.build_tool("zipalign")?;
  let args = [OsStr::new("-f"), OsStr::new("4"), unsigned.as_os_str(), aligned.as_os_str()];
  run_shell(&zipalign, &args, None)?;

  info!(keystore = %signing.keystore.display(), "signing apk");
  if let Some(parent) = output.parent() {
    fs::create_dir_all(parent).map_err(|e| TaskError::path("create", parent, e))?;
  }
  let apksigner = sdk.build_tool("apksigner")?;
  let args: Vec<OsString> = vec![
    "sign".into(),
    "--ks".into(),
    signing.keystore.clone().into(),
    "--ks-pass".into(),
    format!("pass:{}", signing.storepass).into(),
    "--ks-key-alias".into(),
    signing.keyalias.clone().into(),
    "--key-pass".into(),
    format!("pass:{}", signing.keypass).into(),
    "--out".into(),
    output.into(),
    aligned.clone().into(),
  ];
  run_shell(&apksigner, &args, None)?;

  debug!("removing zipfile and unsigned apk");
  for intermediate in [&unsigned, &aligned] {
    if let Err(err) = fs::remove_file(intermediate) {
      warn!(path = %intermediate.display(), error = %err, "failed to remove intermediate apk");
    }
  }
  Ok(())
}

/// Stops the adb server when the run ends, releasing its lock on the APK.
struct AdbServer {
  adb: PathBuf,
}

impl Drop for AdbServer {
  fn drop(&mut self) {
    debug!("cleaning up after android run");
    if let Err(err) = spawn_detached(&self.adb, &["kill-server"], None) {
      warn!(error = %err, "failed to stop adb server");
    }
  }
}

fn list_devices(adb: &Path) -> Result<Vec<String>, TaskError> {
  let output = run_shell(adb, &["devices"], None)?;
  Ok(scrape_devices(&output))
}

fn launch_avd(sdk: &Sdk, avd: &str) -> Result<(), TaskError> {
  info!(avd = %avd, "starting emulator, waiting for device to boot");
  spawn_detached(sdk.emulator(), &["-avd", avd], None)?;
  Ok(())
}

fn wait_for_boot(adb: &Path, device: &str, attempts: u64, poll: Duration) -> Result<(), TaskError> {
  for _ in 0..attempts {
    let booted = run_shell(adb, &["-s", device, "shell", "getprop", "sys.boot_completed"], None)
      .map(|out| out.trim() == "1")
      .unwrap_or(false);
    if booted {
      return Ok(());
    }
    thread::sleep(poll);
  }
  Err(
    AndroidError::BootTimeout {
      device: device.to_string(),
    }
    .into(),
  )
}

fn sdk_from_call(call: &Invocation<'_>, index: usize) -> Result<Sdk, TaskError> {
  let explicit = match call.arg_str(index, "sdk")? {
    Some(dir) => Some(dir),
    None => call.kwarg_str("sdk")?,
  };
  Ok(Sdk::locate(explicit.map(Path::new))?)
}

/// `run_android(dir, sdk?, device?){interactive=true, attempts=10, avd="forge", poll_secs=3, keystore?, follow_log=true}`
pub fn run_android(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let android_dir = ctx.resolve_path(call.require_arg_str(0, "build_type_dir")?).join("android");
  let sdk = sdk_from_call(call, 1)?;
  let requested = match call.arg_str(2, "device")? {
    Some(device) => Some(device),
    None => call.kwarg_str("device")?,
  };
  let interactive = call.kwarg_bool("interactive", true)?;
  let attempts = call.kwarg_u64("attempts", DEFAULT_ATTEMPTS)?.max(1);
  let avd = call.kwarg_str("avd")?.unwrap_or(DEFAULT_AVD);
  let poll = Duration::from_secs(call.kwarg_u64("poll_secs", DEFAULT_POLL_SECS)?);
  let keystore = call.kwarg_str("keystore")?.map(|k| ctx.resolve_path(k));

  let adb = sdk.adb();
  if !adb.is_file() {
    return Err(
      AndroidError::SdkToolMissing {
        tool: "adb".to_string(),
        sdk: sdk.root().to_path_buf(),
      }
      .into(),
    );
  }
  let _server = AdbServer { adb: adb.clone() };
  let _ = run_shell(&adb, &["kill-server"], None);
  run_shell(&adb, &["start-server"], None)?;

  info!("looking for Android device");
  let mut emulator_started = false;
  let devices = wait_for_device(
    attempts,
    || list_devices(&adb),
    |attempt| {
      if interactive {
        let choice = prompt::choose(
          "No active Android device found, would you like to:",
          &[
            "Attempt to automatically launch the Android emulator",
            "Attempt to find the device again (after plugging in a device or launching the emulator)",
          ],
        )?;
        match choice {
          prompt::Choice::Quit => return Ok(NoDevice::Cancel),
          prompt::Choice::Picked(0) => {
            launch_avd(&sdk, avd)?;
            emulator_started = true;
          }
          prompt::Choice::Picked(_) => {}
        }
      } else if !emulator_started {
        launch_avd(&sdk, avd)?;
        emulator_started = true;
      }
      debug!(attempt, "waiting before probing again");
      thread::sleep(poll);
      Ok(NoDevice::Retry)
    },
  )?;
  let device = choose_device(&devices, requested)?;
  if emulator_started {
    wait_for_boot(&adb, &device, attempts, poll)?;
  }

  let apk = android_dir.join(OUT_APK);
  build_apk(&sdk, &android_dir, &SigningInfo::debug_key(keystore.as_deref()), &apk)?;
  ctx.unpackaged.insert(Platform::Android, android_dir.clone());

  info!("installing apk");
  let args = [
    OsStr::new("-s"),
    OsStr::new(&device),
    OsStr::new("install"),
    OsStr::new("-r"),
    apk.as_os_str(),
  ];
  run_shell(&adb, &args, None)?;

  let package = ensure_package_name(&mut ctx.config, Platform::Android)?;
  info!(package = %package, "running apk");
  let activity = format!("{}/{}.LoadActivity", package, package);
  run_shell(&adb, &["-s", device.as_str(), "shell", "am", "start", "-n", activity.as_str()], None)?;

  if call.kwarg_bool("follow_log", true)? {
    info!("clearing android log");
    run_attached(&adb, &["-s", device.as_str(), "logcat", "-c"], None)?;
    info!("showing android log");
    run_attached(&adb, &["-s", device.as_str(), "logcat", "WebCore:D", "Forge:D", "*:S"], None)?;
  }
  Ok(())
}

/// `package_android(sdk?){interactive=true, keystore, storepass, keyalias, keypass}`
pub fn package_android(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let interactive = call.kwarg_bool("interactive", true)?;
  let mut signing = SigningInfo::from_call(call, interactive)?;
  signing.keystore = ctx.resolve_path(&signing.keystore);
  let sdk = sdk_from_call(call, 0)?;

  let android_dir = ctx.output_dir.join("android");
  let output = release_path(ctx, Platform::Android, "apk")?;
  build_apk(&sdk, &android_dir, &signing, &output)?;
  if let Err(err) = spawn_detached(sdk.adb(), &["kill-server"], None) {
    debug!(error = %err, "adb not running");
  }

  info!(path = %output.display(), "created APK");
  ctx.unpackaged.insert(Platform::Android, android_dir);
  ctx.packaged.insert(Platform::Android, output);
  Ok(())
}
