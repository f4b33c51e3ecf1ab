use std::{env, io, ptr};

use anyhow::{anyhow, Context, Result};
use libc::{c_int, c_void, shmat, shmdt};

/// Environment variable through which the fuzzer hands down the SysV id of
/// its status segment.
pub const SHM_ENV_VAR: &str = "__AFL_SHM_ID";

/// Signature stored at offset 0 of the status segment when the target could
/// not be launched.
///
/// Protocol constant, the reading side matches on the exact bit pattern.
pub const EXEC_FAIL_SIG: u32 = 0xfee1dead;

/// Attached view of the fuzzer-owned status segment.
///
/// The segment is created and removed by the invoking fuzzer; this side only
/// attaches, writes once and detaches. Detaching happens in [`Drop`] so the
/// mapping is released on every exit path.
#[derive(Debug)]
pub struct StatusShMem {
    map: *mut u8,
}

impl StatusShMem {
    /// Attach the existing shared memory mapping identified by `id`.
    pub fn from_id(id: c_int) -> Result<Self> {
        // # Safety
        // `shmat` returns either a fresh mapping or -1, checked below.
        let map = unsafe { shmat(id, ptr::null(), 0) } as *mut u8;

        if map as isize == -1 || map.is_null() {
            return Err(anyhow!(
                "Failed to map the shared mapping with id {id}: {}",
                io::Error::last_os_error()
            ));
        }

        Ok(Self { map })
    }

    /// Attach the segment whose id the fuzzer put in [`SHM_ENV_VAR`].
    pub fn from_env() -> Result<Self> {
        let id = env::var(SHM_ENV_VAR)
            .with_context(|| format!("{SHM_ENV_VAR} not set, no status segment to report to"))?;
        let id = id
            .parse::<c_int>()
            .with_context(|| format!("Illegal {SHM_ENV_VAR} value {id:?}"))?;
        Self::from_id(id)
    }

    /// Stores the launch-failure signature at offset 0 of the segment.
    pub fn signal_exec_failure(&mut self) {
        // # Safety
        // The mapping is attached writable and at least one word long.
        unsafe {
            self.map.cast::<u32>().write_volatile(EXEC_FAIL_SIG);
        }
    }
}

impl Drop for StatusShMem {
    fn drop(&mut self) {
        // The fuzzer owns the segment, only the attachment is ours to
        // release.
        unsafe {
            shmdt(self.map as *mut c_void);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use libc::{shmat, shmctl, shmdt, shmget, IPC_CREAT, IPC_EXCL, IPC_PRIVATE, IPC_RMID};

    use super::{StatusShMem, EXEC_FAIL_SIG};

    #[test]
    fn writes_the_failure_signature() {
        let id = unsafe { shmget(IPC_PRIVATE, 4096, IPC_CREAT | IPC_EXCL | 0o600) };
        assert!(id >= 0, "could not allocate a test segment");

        {
            let mut status = StatusShMem::from_id(id).unwrap();
            status.signal_exec_failure();
        }

        // Check through an independent attachment, the way the fuzzer would.
        let map = unsafe { shmat(id, ptr::null(), 0) } as *const u32;
        assert_ne!(map as isize, -1);
        let value = unsafe { map.read_volatile() };
        unsafe {
            shmdt(map as *mut _);
            shmctl(id, IPC_RMID, ptr::null_mut());
        }

        assert_eq!(value, EXEC_FAIL_SIG);
    }

    #[test]
    fn rejects_a_bogus_id() {
        assert!(StatusShMem::from_id(-2).is_err());
    }
}
