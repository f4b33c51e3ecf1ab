use std::io;

use anyhow::{anyhow, Result};

/// Caps the address space of the current process, and with it the target
/// image that replaces it.
///
/// Applied as both the soft and the hard limit. A limit of 0 megabytes is
/// applied verbatim; virtually nothing launches under it.
pub fn set_address_space_limit(limit_mb: u64) -> Result<()> {
    let limit = limit_mb.saturating_mul(1024 * 1024) as libc::rlim_t;
    let r = libc::rlimit {
        rlim_cur: limit,
        rlim_max: limit,
    };

    // # Safety
    // Plain setrlimit call on a stack value.
    let ret = unsafe { libc::setrlimit(libc::RLIMIT_AS, &r) };
    if ret < 0 {
        return Err(anyhow!(
            "Failed to set the address space limit to {limit} bytes: {}",
            io::Error::last_os_error()
        ));
    }
    Ok(())
}
