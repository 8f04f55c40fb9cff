//! `wrap_activations`: keep activation scripts out of frames unless they opt in.

use std::fs;

use serde_json::Value;
use tracing::{debug, warn};

use super::files::write_atomic;
use super::glob_paths;
use super::urls::USER_CODE_PREFIX;
use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;

const FRAME_GUARD_OPEN: &str = "if (forge._disableFrames === undefined || window.location == window.parent.location) {\n";
const FRAME_GUARD_CLOSE: &str = "\n}";

pub fn wrap_in_frame_guard(source: &str) -> String {
  format!("{}{}{}", FRAME_GUARD_OPEN, source, FRAME_GUARD_CLOSE)
}

/// Scripts of every activation not marked `all_frames`, relative to the user
/// code directory.
fn guarded_scripts(config: &Value) -> Vec<String> {
  let Some(activations) = config.get("activations").and_then(Value::as_array) else {
    return Vec::new();
  };
  activations
    .iter()
    .filter(|a| !a.get("all_frames").and_then(Value::as_bool).unwrap_or(false))
    .filter_map(|a| a.get("scripts").and_then(Value::as_array))
    .flatten()
    .filter_map(Value::as_str)
    .map(|script| {
      let rel = script.strip_prefix(USER_CODE_PREFIX).unwrap_or(script);
      rel.trim_start_matches('/').to_string()
    })
    .collect()
}

/// `wrap_activations(location)`
///
/// `location` is where the user code lives inside a platform template and may
/// be a glob. Runs after `resolve_urls`, so scripts are `src/`-prefixed.
pub fn wrap_activations(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let location = call.require_arg_str(0, "location")?;
  let scripts = guarded_scripts(ctx.config.as_value());
  if scripts.is_empty() {
    return Ok(());
  }

  let roots = glob_paths(ctx, location)?;
  if roots.is_empty() {
    warn!(pattern = %location, "no files were found to match pattern");
  }
  for root in roots {
    for script in &scripts {
      let path = root.join(script);
      debug!(file = %path.display(), "wrapping activation");
      let source = fs::read_to_string(&path).map_err(|e| TaskError::path("read", &path, e))?;
      write_atomic(&path, &wrap_in_frame_guard(&source))?;
    }
  }
  Ok(())
}
