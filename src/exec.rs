use std::ffi::CString;

use anyhow::{anyhow, Result};
use nix::unistd::execv;

/// Replaces the current process image with the target.
///
/// `argv[0]` doubles as the executable path, there is no PATH lookup. Only
/// returns on failure.
pub fn exec_target(argv: &[String]) -> Result<()> {
    let cargs = argv
        .iter()
        .map(|x| CString::new(x.clone()).map_err(|e| anyhow!("Failed to read argument: {e:}")))
        .collect::<Result<Vec<CString>>>()?;

    execv(&cargs[0], &cargs).map_err(|e| anyhow!("Failed to execv {}: {e:}", argv[0]))?;
    Ok(())
}
