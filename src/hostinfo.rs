//! Local machine details shown in the CLI banner. Nothing here affects a scan.

use serde::{Deserialize, Serialize};

const UNKNOWN: &str = "Unknown";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os: String,
    pub hostname: String,
    pub machine: String,
}

impl HostInfo {
    pub fn detect() -> Self {
        Self {
            os: os_name(),
            hostname: hostname(),
            machine: machine_type(),
        }
    }
}

/// Kernel name, e.g. `Linux` or `Darwin`.
pub fn os_name() -> String {
    #[cfg(unix)]
    {
        if let Some(u) = uname() {
            return u.sysname;
        }
    }
    if cfg!(windows) {
        return "Windows".to_string();
    }
    fallback_os()
}

/// Hardware label such as `x86_64`; the OS name where the platform has none.
pub fn machine_type() -> String {
    #[cfg(unix)]
    {
        if let Some(u) = uname().filter(|u| !u.machine.is_empty()) {
            return u.machine;
        }
    }
    os_name()
}

pub fn hostname() -> String {
    #[cfg(unix)]
    {
        let mut buf = [0u8; 256];
        // SAFETY: buf is writable for buf.len() bytes.
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
        if rc == 0 {
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            let name = String::from_utf8_lossy(&buf[..end]).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }
    if cfg!(windows) {
        if let Ok(name) = std::env::var("COMPUTERNAME") {
            if !name.is_empty() {
                return name;
            }
        }
    }
    UNKNOWN.to_string()
}

fn fallback_os() -> String {
    match std::env::consts::OS {
        "" => UNKNOWN.to_string(),
        os => os.to_string(),
    }
}

#[cfg(unix)]
struct Uname {
    sysname: String,
    machine: String,
}

#[cfg(unix)]
fn uname() -> Option<Uname> {
    use std::ffi::CStr;

    // SAFETY: utsname is plain old data, so all-zero bytes are a valid value.
    let mut info: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: info is a valid, exclusively borrowed utsname for the call.
    if unsafe { libc::uname(&mut info) } != 0 {
        return None;
    }
    let field = |raw: &[libc::c_char]| {
        // SAFETY: uname succeeded, so each field holds a NUL-terminated string
        // inside its fixed-size array, and info outlives the borrow.
        unsafe { CStr::from_ptr(raw.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    };
    Some(Uname {
        sysname: field(&info.sysname),
        machine: field(&info.machine),
    })
}
