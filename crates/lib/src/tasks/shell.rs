//! Running external tools.
//!
//! Tasks drive platform SDKs (adb, zipalign, codesign, npm, makensis) as
//! subprocesses. Three shapes are supported: run and capture stdout, run
//! attached to the terminal, and spawn detached for processes that outlive
//! the task (emulators).

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::build::TaskError;
use crate::platform::Os;

fn describe<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
  let mut cmd = program.display().to_string();
  for arg in args {
    cmd.push(' ');
    cmd.push_str(&arg.as_ref().to_string_lossy());
  }
  cmd
}

fn spawn_error(program: &Path, err: io::Error) -> TaskError {
  if err.kind() == io::ErrorKind::NotFound {
    TaskError::ToolNotFound {
      tool: program.display().to_string(),
      hint: "make sure it is installed and on your PATH".to_string(),
    }
  } else {
    TaskError::Io(err)
  }
}

fn command<S: AsRef<OsStr>>(program: &Path, args: &[S], cwd: Option<&Path>) -> Command {
  let mut command = Command::new(program);
  command.args(args);
  if let Some(dir) = cwd {
    command.current_dir(dir);
  }
  command
}

/// Run a program to completion and return its trimmed stdout.
///
/// A non-zero exit status is a [`TaskError::CmdFailed`]; the captured output
/// is logged at debug level.
pub fn run_shell<S: AsRef<OsStr>>(program: impl AsRef<Path>, args: &[S], cwd: Option<&Path>) -> Result<String, TaskError> {
  let program = program.as_ref();
  let cmd = describe(program, args);
  debug!(cmd = %cmd, cwd = ?cwd, "running");

  let output = command(program, args, cwd)
    .stdin(Stdio::null())
    .output()
    .map_err(|e| spawn_error(program, e))?;

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }
    return Err(TaskError::CmdFailed {
      cmd,
      code: output.status.code(),
    });
  }

  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }
  Ok(stdout)
}

/// Run a program with the terminal attached, for long-running tools whose
/// output the user watches (dev servers, log followers).
pub fn run_attached<S: AsRef<OsStr>>(program: impl AsRef<Path>, args: &[S], cwd: Option<&Path>) -> Result<(), TaskError> {
  let program = program.as_ref();
  let cmd = describe(program, args);
  info!(cmd = %cmd, "running");

  let status = command(program, args, cwd)
    .status()
    .map_err(|e| spawn_error(program, e))?;
  if !status.success() {
    return Err(TaskError::CmdFailed {
      cmd,
      code: status.code(),
    });
  }
  Ok(())
}

/// Start a program in the background and return its pid without waiting.
pub fn spawn_detached<S: AsRef<OsStr>>(program: impl AsRef<Path>, args: &[S], cwd: Option<&Path>) -> Result<u32, TaskError> {
  let program = program.as_ref();
  let child = command(program, args, cwd)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .map_err(|e| spawn_error(program, e))?;
  debug!(cmd = %describe(program, args), pid = child.id(), "spawned in background");
  Ok(child.id())
}

/// Look a program up on `PATH`.
pub fn which(name: &str) -> Option<PathBuf> {
  let exe = match Os::current() {
    Some(os) => os.executable(name),
    None => name.to_string(),
  };
  std::env::var_os("PATH").and_then(|paths| {
    std::env::split_paths(&paths)
      .map(|dir| dir.join(&exe))
      .find(|candidate| candidate.is_file())
  })
}

/// Like [`which`], but a missing tool is a [`TaskError::ToolNotFound`].
pub fn require_tool(name: &str, hint: &str) -> Result<PathBuf, TaskError> {
  which(name).ok_or_else(|| TaskError::ToolNotFound {
    tool: name.to_string(),
    hint: hint.to_string(),
  })
}
