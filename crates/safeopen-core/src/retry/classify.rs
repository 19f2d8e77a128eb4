//! Classify open failures into retry policy error kinds.

use std::io;

/// High-level classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Descriptor table exhausted; waiting may help.
    Retryable,
    /// Anything else. Returned to the caller as is.
    Permanent,
}

/// True iff `e` is the OS reporting "too many open files", for the process or system-wide.
///
/// Errors without an OS code (synthetic or wrapped errors) never qualify.
pub fn is_descriptor_exhaustion(e: &io::Error) -> bool {
    e.raw_os_error().is_some_and(is_exhaustion_code)
}

#[cfg(unix)]
fn is_exhaustion_code(code: i32) -> bool {
    code == libc::EMFILE || code == libc::ENFILE
}

#[cfg(windows)]
fn is_exhaustion_code(code: i32) -> bool {
    // ERROR_TOO_MANY_OPEN_FILES
    code == 4
}

#[cfg(not(any(unix, windows)))]
fn is_exhaustion_code(_code: i32) -> bool {
    false
}

/// Classify an open error for retry decisions.
pub fn classify(e: &io::Error) -> ErrorKind {
    if is_descriptor_exhaustion(e) {
        ErrorKind::Retryable
    } else {
        ErrorKind::Permanent
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn emfile_and_enfile_retryable() {
        let emfile = io::Error::from_raw_os_error(libc::EMFILE);
        let enfile = io::Error::from_raw_os_error(libc::ENFILE);
        assert_eq!(classify(&emfile), ErrorKind::Retryable);
        assert_eq!(classify(&enfile), ErrorKind::Retryable);
    }

    #[test]
    fn common_failures_permanent() {
        for code in [libc::ENOENT, libc::EACCES, libc::EISDIR, libc::ENOSPC, libc::EINVAL] {
            let e = io::Error::from_raw_os_error(code);
            assert_eq!(classify(&e), ErrorKind::Permanent, "errno {}", code);
        }
    }

    #[test]
    fn only_exhaustion_codes_qualify() {
        for code in 1..=200 {
            let e = io::Error::from_raw_os_error(code);
            let expected = code == libc::EMFILE || code == libc::ENFILE;
            assert_eq!(is_descriptor_exhaustion(&e), expected, "errno {}", code);
        }
    }

    #[test]
    fn errors_without_os_code_permanent() {
        let e = io::Error::new(io::ErrorKind::Other, "too many open files");
        assert_eq!(classify(&e), ErrorKind::Permanent);
        let e = io::Error::from(io::ErrorKind::Interrupted);
        assert_eq!(classify(&e), ErrorKind::Permanent);
    }
}
