use std::{
    fs::{File, OpenOptions},
    os::fd::{AsRawFd, RawFd},
    path::Path,
};

use anyhow::{anyhow, Context, Result};
use nix::unistd::dup2;

/// Descriptor on which the invoking fuzzer sends forkserver control
/// messages.
///
/// Fixed wire contract shared with the fuzzer, must match it bit for bit.
pub const FORKSRV_CTL_FD: RawFd = 198;

/// Descriptor on which the invoking fuzzer expects forkserver status
/// messages.
pub const FORKSRV_ST_FD: RawFd = FORKSRV_CTL_FD + 1;

/// Opens the testcase that becomes the target's stdin.
pub fn open_input(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open input file {}", path.display()))
}

/// Opens the sink that swallows the target's stdout and stderr.
pub fn open_null() -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/null")
        .context("Failed to open /dev/null")
}

/// Rebuilds the descriptor table the target inherits.
///
/// The current stdin/stdout are the pipes the fuzzer talks through. They
/// move to [`FORKSRV_CTL_FD`]/[`FORKSRV_ST_FD`] first; only then are fds
/// 0/1/2 overwritten with the testcase and the sink.
pub fn remap(input: &File, null: &File) -> Result<()> {
    dup2(libc::STDIN_FILENO, FORKSRV_CTL_FD)
        .map_err(|e| anyhow!("Failed to move stdin to the control fd: {e:}"))?;
    dup2(libc::STDOUT_FILENO, FORKSRV_ST_FD)
        .map_err(|e| anyhow!("Failed to move stdout to the status fd: {e:}"))?;

    dup2(input.as_raw_fd(), libc::STDIN_FILENO)
        .map_err(|e| anyhow!("Failed to redirect stdin to the input file: {e:}"))?;
    dup2(null.as_raw_fd(), libc::STDOUT_FILENO)
        .map_err(|e| anyhow!("Failed to redirect stdout: {e:}"))?;
    dup2(null.as_raw_fd(), libc::STDERR_FILENO)
        .map_err(|e| anyhow!("Failed to redirect stderr: {e:}"))?;

    Ok(())
}
