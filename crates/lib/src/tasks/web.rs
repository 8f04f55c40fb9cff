//! Tasks for the hosted web platform (a Node.js app).

use tracing::{error, info};

use super::archive::{release_path, zip_dir};
use super::shell::run_attached;
use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;
use crate::platform::{Os, Platform};

fn npm() -> &'static str {
  if Os::current() == Some(Os::Windows) {
    "npm.cmd"
  } else {
    "npm"
  }
}

/// `run_web(dir)`: install dependencies and start the app with npm.
pub fn run_web(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let dir = ctx.resolve_path(call.require_arg_str(0, "build_type_dir")?).join("web");
  let result = run_attached(npm(), &["install"], Some(&dir)).and_then(|()| run_attached(npm(), &["start"], Some(&dir)));
  if result.is_err() {
    error!("failed to run npm: do you have Node.js installed and on your path?");
  }
  result
}

/// `package_web`: zip the generated web app into the release directory.
pub fn package_web(ctx: &mut BuildContext<'_>, _call: &Invocation<'_>) -> Result<(), TaskError> {
  let src = ctx.output_dir.join("web");
  let dest = release_path(ctx, Platform::Web, "zip")?;
  let files = zip_dir(&src, &dest, &[])?;
  info!(path = %dest.display(), files, "created web package");
  ctx.unpackaged.insert(Platform::Web, src);
  ctx.packaged.insert(Platform::Web, dest);
  Ok(())
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use tempfile::TempDir;

  use crate::build::BuildError;
  use crate::command::Command;
  use crate::platform::Platform;
  use crate::registry::Registry;
  use crate::util::testutil::{context_in, write_file};

  #[test]
  fn package_web_records_release_zip() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "development/web/package.json", "{}");
    write_file(temp.path(), "development/web/src/index.html", "<html>");

    let registry = Registry::builtin().unwrap();
    let mut ctx = context_in(&registry, temp.path(), json!({"name": "My App!"}), &[Platform::Web]);
    ctx.add_steps([Command::new("web", "package_web")]).unwrap();
    ctx.run().unwrap();

    let zip = &ctx.packaged[&Platform::Web];
    assert!(zip.exists());
    assert!(zip.starts_with(dunce::canonicalize(temp.path()).unwrap().join("release/web")));
    let name = zip.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("myapp-") && name.ends_with(".zip"), "{}", name);
  }

  #[test]
  fn package_web_requires_app_name() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "development/web/index.html", "<html>");

    let registry = Registry::builtin().unwrap();
    let mut ctx = context_in(&registry, temp.path(), json!({}), &[Platform::Web]);
    ctx.add_steps([Command::new("web", "package_web")]).unwrap();
    assert!(matches!(ctx.run(), Err(BuildError::Task { .. })));
  }
}
