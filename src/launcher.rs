//! Starting the application that owns the managed folder
//!
//! The process is started detached: its output goes nowhere and it keeps
//! running after the host exits. A background thread waits on it so a
//! short-lived app does not linger as a zombie.

use crate::error::{Error, Result};
use log::{debug, info};
use std::path::Path;
use std::process::{Command, Stdio};

#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// Start `path` as a detached process and return its process id
///
/// The working directory is the executable's own folder.
///
/// # Errors
///
/// - [`Error::ExecutableNotFound`] if `path` is not a file
/// - [`Error::NotExecutable`] if the file has no execute permission (unix)
/// - [`Error::Launch`] if the process cannot be spawned
pub fn launch_detached(path: &Path) -> Result<u32> {
    if !path.is_file() {
        return Err(Error::ExecutableNotFound(path.to_path_buf()));
    }
    if !is_executable(path) {
        return Err(Error::NotExecutable(path.to_path_buf()));
    }

    let mut command = Command::new(path);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        command.current_dir(dir);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    let mut child = command.spawn().map_err(|e| Error::Launch {
        path: path.to_path_buf(),
        source: e,
    })?;
    let pid = child.id();
    info!("🚀 Started {} (pid {pid})", path.display());

    std::thread::spawn(move || match child.wait() {
        Ok(status) => debug!("Launched process {pid} exited with {status}"),
        Err(e) => debug!("Could not wait on launched process {pid}: {e}"),
    });
    Ok(pid)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
