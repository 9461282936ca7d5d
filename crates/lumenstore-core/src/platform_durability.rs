//! Forcing written bytes down to stable storage.
//!
//! `File::sync_data` is not enough everywhere: on Apple platforms it only
//! reaches the drive's volatile cache. Each target gets its strongest
//! primitive here.

use std::fs::File;
use std::io;
use std::path::Path;

/// Block until the contents of `file` are on stable storage.
///
/// - Linux: `fdatasync`
/// - macOS/iOS: `fcntl(F_FULLFSYNC)`
/// - Windows: `FlushFileBuffers`
/// - anything else: `File::sync_data`
///
/// May block for a long time under heavy I/O.
pub fn durable_sync(file: &File) -> io::Result<()> {
    sys::sync_file(file)
}

/// Persist directory metadata after a rename into `dir`.
///
/// Windows has no directory handle to flush; this is a no-op there.
pub fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        let handle = File::open(dir)?;
        sys::sync_file(&handle)
    }

    #[cfg(not(unix))]
    {
        let _ = dir;
        Ok(())
    }
}

#[cfg(target_os = "linux")]
mod sys {
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    pub fn sync_file(file: &File) -> io::Result<()> {
        // SAFETY: the fd comes from a live `File` borrow, so it is open.
        let rc = unsafe { libc::fdatasync(file.as_raw_fd()) };
        if rc == 0 { Ok(()) } else { Err(io::Error::last_os_error()) }
    }
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod sys {
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    pub fn sync_file(file: &File) -> io::Result<()> {
        // SAFETY: the fd comes from a live `File` borrow, so it is open.
        let rc = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_FULLFSYNC) };
        if rc == 0 {
            return Ok(());
        }
        // Some filesystems (network mounts) refuse F_FULLFSYNC
        file.sync_all()
    }
}

#[cfg(target_os = "windows")]
mod sys {
    use std::fs::File;
    use std::io;
    use std::os::windows::io::AsRawHandle;

    use winapi::um::fileapi::FlushFileBuffers;

    pub fn sync_file(file: &File) -> io::Result<()> {
        // SAFETY: the handle comes from a live `File` borrow.
        let ok = unsafe { FlushFileBuffers(file.as_raw_handle() as *mut _) };
        if ok != 0 { Ok(()) } else { Err(io::Error::last_os_error()) }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "ios", target_os = "windows")))]
mod sys {
    use std::fs::File;
    use std::io;

    pub fn sync_file(file: &File) -> io::Result<()> {
        file.sync_data()
    }
}
