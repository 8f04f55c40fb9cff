//! Built-in predicates.
//!
//! Predicates gate commands on build state. They only read the context.

use crate::build::BuildContext;
use crate::registry::{Registry, RegistryError};

const ANDROID_ICONS: [&str; 3] = ["36", "48", "72"];
const SAFARI_ICONS: [&str; 3] = ["32", "48", "64"];
const FIREFOX_ICONS: [&str; 2] = ["32", "64"];
const IOS_ICONS: [&str; 3] = ["57", "72", "114"];
const IOS_LAUNCH_IMAGES: [&str; 4] = ["iphone", "iphone-retina", "ipad", "ipad-landscape"];

/// True unless the build only produces platform templates.
pub fn include_user(ctx: &BuildContext<'_>) -> bool {
  !ctx.template_only
}

pub fn have_android_icons(ctx: &BuildContext<'_>) -> bool {
  ctx.config.has_entries("icons", &ANDROID_ICONS)
}

pub fn have_safari_icons(ctx: &BuildContext<'_>) -> bool {
  ctx.config.has_entries("icons", &SAFARI_ICONS)
}

pub fn have_firefox_icons(ctx: &BuildContext<'_>) -> bool {
  ctx.config.has_entries("icons", &FIREFOX_ICONS)
}

pub fn have_ios_icons(ctx: &BuildContext<'_>) -> bool {
  ctx.config.has_entries("icons", &IOS_ICONS)
}

pub fn have_ios_launch(ctx: &BuildContext<'_>) -> bool {
  ctx.config.has_entries("launch_images", &IOS_LAUNCH_IMAGES)
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
  registry.register_predicate("include_user", include_user)?;
  registry.register_predicate("have_android_icons", have_android_icons)?;
  registry.register_predicate("have_safari_icons", have_safari_icons)?;
  registry.register_predicate("have_firefox_icons", have_firefox_icons)?;
  registry.register_predicate("have_ios_icons", have_ios_icons)?;
  registry.register_predicate("have_ios_launch", have_ios_launch)?;
  Ok(())
}
