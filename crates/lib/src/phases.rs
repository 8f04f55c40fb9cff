//! Phases: reusable lists of commands.
//!
//! Each function here is pure. It returns the commands for one step of a
//! goal without touching any build state, so goals (or anything else) can
//! assemble them in whatever order they need.

use std::path::Path;

use serde_json::{Value, json};

use crate::command::{Command, Kwargs};
use crate::platform::Platform;

/// Where the user's code lives inside the platform templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
  /// A build on the developer's machine, into `development/`.
  #[default]
  Customer,
  /// A build of the bare templates, as done on the build server.
  Server,
}

impl Layout {
  /// Directory receiving the user's code for `platform`. May contain globs.
  pub fn user_code(self, platform: Platform) -> &'static str {
    match (self, platform) {
      (Layout::Server, Platform::Android) => "android/template-app/assets/src",
      (Layout::Server, Platform::Ios) => "ios/templateapp/assets/src",
      (Layout::Server, Platform::Chrome) => "chrome/src",
      (Layout::Server, Platform::Firefox) => "firefox/template-app/data/src",
      (Layout::Server, Platform::Safari) => "forge.safariextension/src",
      (Layout::Server, Platform::Ie) => "ie/src",
      (Layout::Server, Platform::Web) => "web/src",
      (Layout::Customer, Platform::Android) => "development/android/assets/src",
      (Layout::Customer, Platform::Ios) => "development/ios/*/assets/src",
      (Layout::Customer, Platform::Chrome) => "development/chrome/src",
      (Layout::Customer, Platform::Firefox) => "development/firefox/resources/*-at-jetpack-f-data/src",
      (Layout::Customer, Platform::Safari) => "development/forge.safariextension/src",
      (Layout::Customer, Platform::Ie) => "development/ie/src",
      (Layout::Customer, Platform::Web) => "development/web/src",
    }
  }

  /// Directory icons are copied into, for platforms that take icons.
  pub fn icons(self, platform: Platform) -> Option<&'static str> {
    match (self, platform) {
      (Layout::Server, Platform::Android) => Some("android/template-app/res"),
      (Layout::Server, Platform::Safari) => Some("forge.safariextension"),
      (Layout::Server, Platform::Firefox) => Some("firefox/template-app/output"),
      (Layout::Server, Platform::Ios) => Some("ios"),
      (Layout::Customer, Platform::Android) => Some("development/android/res"),
      (Layout::Customer, Platform::Safari) => Some("development/forge.safariextension"),
      (Layout::Customer, Platform::Firefox) => Some("development/firefox"),
      (Layout::Customer, Platform::Ios) => Some("development/ios/*.app"),
      _ => None,
    }
  }
}

/// The `<script>` tag pointing each platform's pages at the forge bridge.
fn bridge_script(platform: Platform) -> &'static str {
  match platform {
    Platform::Android => "<head><script src='file:///android_asset/forge/all.js'></script>",
    Platform::Ios | Platform::Firefox | Platform::Safari => {
      "<head><script src='%{back_to_parent}%forge/all.js'></script>"
    }
    Platform::Chrome | Platform::Ie => "<head><script src='/forge/all.js'></script>",
    Platform::Web => "<head><script src='/_forge/all.js'></script>",
  }
}

/// Configuration locations holding URLs into the user's code.
pub const URL_LOCATIONS: [&str; 10] = [
  "activations.[].scripts.[]",
  "activations.[].styles.[]",
  "icons.*",
  "launch_images.*",
  "browser_action.default_icon",
  "browser_action.default_popup",
  "browser_action.default_icons.*",
  "page_action.default_icon",
  "page_action.default_popup",
  "page_action.default_icons.*",
];

/// Platforms whose templates receive user code, in template order.
const USER_CODE_PLATFORMS: [Platform; 7] = [
  Platform::Android,
  Platform::Ios,
  Platform::Chrome,
  Platform::Firefox,
  Platform::Safari,
  Platform::Ie,
  Platform::Web,
];

fn dir_arg(dir: &Path) -> Value {
  Value::String(dir.to_string_lossy().into_owned())
}

pub fn resolve_urls() -> Vec<Command> {
  vec![Command::new("all", "resolve_urls").with_args(URL_LOCATIONS.iter().map(|l| Value::from(*l)))]
}

pub fn copy_user_source_to_template(layout: Layout, ignore_patterns: &[String]) -> Vec<Command> {
  USER_CODE_PLATFORMS
    .iter()
    .map(|&platform| {
      Command::new(platform, "copy_files")
        .when("include_user")
        .with_kwarg("from", "src")
        .with_kwarg("to", layout.user_code(platform))
        .with_kwarg("ignore_patterns", ignore_patterns.to_vec())
    })
    .collect()
}

pub fn include_platform_in_html(layout: Layout) -> Vec<Command> {
  [
    Platform::Android,
    Platform::Ios,
    Platform::Firefox,
    Platform::Chrome,
    Platform::Safari,
    Platform::Ie,
    Platform::Web,
  ]
  .iter()
  .map(|&platform| {
    Command::new(platform, "find_and_replace_in_dir")
      .when("include_user")
      .with_args([json!(layout.user_code(platform))])
      .with_kwarg("find", "<head>")
      .with_kwarg("replace", bridge_script(platform))
  })
  .collect()
}

pub fn wrap_activations(layout: Layout) -> Vec<Command> {
  [Platform::Firefox, Platform::Safari]
    .iter()
    .map(|&platform| {
      Command::new(platform, "wrap_activations")
        .when("include_user")
        .with_args([json!(layout.user_code(platform))])
    })
    .collect()
}

/// `(platform, predicate, config lookup, file name)` for every icon and
/// launch image copied into a template.
const ICONS: [(Platform, &str, &str, &str); 15] = [
  (Platform::Android, "have_android_icons", "${icons[\"36\"]}", "drawable-ldpi/icon.png"),
  (Platform::Android, "have_android_icons", "${icons[\"48\"]}", "drawable-mdpi/icon.png"),
  (Platform::Android, "have_android_icons", "${icons[\"72\"]}", "drawable-hdpi/icon.png"),
  (Platform::Safari, "have_safari_icons", "${icons[\"32\"]}", "icon-32.png"),
  (Platform::Safari, "have_safari_icons", "${icons[\"48\"]}", "icon-48.png"),
  (Platform::Safari, "have_safari_icons", "${icons[\"64\"]}", "icon-64.png"),
  (Platform::Firefox, "have_firefox_icons", "${icons[\"32\"]}", "icon.png"),
  (Platform::Firefox, "have_firefox_icons", "${icons[\"64\"]}", "icon64.png"),
  (Platform::Ios, "have_ios_icons", "${icons[\"57\"]}", "normal.png"),
  (Platform::Ios, "have_ios_icons", "${icons[\"72\"]}", "ipad.png"),
  (Platform::Ios, "have_ios_icons", "${icons[\"114\"]}", "retina.png"),
  (Platform::Ios, "have_ios_launch", "${launch_images[\"iphone\"]}", "Default~iphone.png"),
  (Platform::Ios, "have_ios_launch", "${launch_images[\"iphone-retina\"]}", "Default@2x~iphone.png"),
  (Platform::Ios, "have_ios_launch", "${launch_images[\"ipad\"]}", "Default~ipad.png"),
  (Platform::Ios, "have_ios_launch", "${launch_images[\"ipad-landscape\"]}", "Default-Landscape~ipad.png"),
];

pub fn include_icons(layout: Layout) -> Vec<Command> {
  ICONS
    .iter()
    .filter_map(|&(platform, predicate, from, file)| {
      let dir = layout.icons(platform)?;
      Some(
        Command::new(platform, "copy_files")
          .when(&format!("{},include_user", predicate))
          .with_kwarg("from", from)
          .with_kwarg("to", format!("{}/{}", dir, file)),
      )
    })
    .collect()
}

pub fn make_installers(dir: &Path) -> Vec<Command> {
  vec![Command::new(Platform::Ie, "package_ie").with_args([dir_arg(dir)])]
}

/// Device selection for running on Android.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AndroidTarget {
  pub sdk: Option<String>,
  pub device: Option<String>,
}

pub fn run_android_phase(dir: &Path, target: &AndroidTarget, kwargs: Kwargs) -> Vec<Command> {
  vec![
    Command::new(Platform::Android, "run_android")
      .with_args([dir_arg(dir), json!(target.sdk), json!(target.device)])
      .with_kwargs(kwargs),
  ]
}

pub fn run_ios_phase(dir: &Path) -> Vec<Command> {
  vec![Command::new(Platform::Ios, "run_ios").with_args([dir_arg(dir)])]
}

pub fn run_firefox_phase(dir: &Path) -> Vec<Command> {
  vec![Command::new(Platform::Firefox, "run_firefox").with_args([dir_arg(dir)])]
}

pub fn run_web_phase(dir: &Path) -> Vec<Command> {
  vec![Command::new(Platform::Web, "run_web").with_args([dir_arg(dir)])]
}

/// Packaging for every platform that produces a distributable artifact.
pub fn package(dir: &Path, kwargs: Kwargs) -> Vec<Command> {
  vec![
    Command::new(Platform::Android, "package_android").with_kwargs(kwargs.clone()),
    Command::new(Platform::Ios, "package_ios")
      .with_args([dir_arg(dir)])
      .with_kwargs(kwargs.clone()),
    Command::new(Platform::Web, "package_web").with_kwargs(kwargs),
  ]
}
