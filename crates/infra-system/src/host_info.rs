// Host information implementation
// reason: uname(2) via nix for kernel facts, sysinfo for uptime and memory
use std::sync::Mutex;
use sysinfo::System;
use tracing::debug;

use repoinf_core::port::HostInfo;

/// Kernel identification captured once at construction
#[derive(Debug, Clone, Default)]
struct KernelIdent {
    sysname: String,
    release: String,
    version: String,
    nodename: String,
}

impl KernelIdent {
    #[cfg(unix)]
    fn read() -> Self {
        match nix::sys::utsname::uname() {
            Ok(uts) => Self {
                sysname: uts.sysname().to_string_lossy().into_owned(),
                release: uts.release().to_string_lossy().into_owned(),
                version: uts.version().to_string_lossy().into_owned(),
                nodename: uts.nodename().to_string_lossy().into_owned(),
            },
            Err(errno) => {
                debug!(error = %errno, "uname failed, falling back to sysinfo");
                Self::from_sysinfo()
            }
        }
    }

    #[cfg(not(unix))]
    fn read() -> Self {
        Self::from_sysinfo()
    }

    fn from_sysinfo() -> Self {
        Self {
            sysname: System::name().unwrap_or_default(),
            release: System::kernel_version().unwrap_or_default(),
            version: System::long_os_version().unwrap_or_default(),
            nodename: System::host_name().unwrap_or_default(),
        }
    }
}

/// HostInfo for the machine this process runs on
pub struct SystemHostInfo {
    kernel: KernelIdent,
    system: Mutex<System>,
}

impl SystemHostInfo {
    /// Create a new host info provider
    ///
    /// # Example
    /// ```ignore
    /// let host = SystemHostInfo::new();
    /// println!("{} {}", host.os_type(), host.release());
    /// ```
    pub fn new() -> Self {
        Self {
            kernel: KernelIdent::read(),
            system: Mutex::new(System::new()),
        }
    }

    /// Refresh memory counters and read them as (total, available)
    fn memory(&self) -> (u64, u64) {
        let mut sys = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sys.refresh_memory();

        debug!(
            mem_total = %sys.total_memory(),
            mem_available = %sys.available_memory(),
            "Memory counters refreshed"
        );

        (sys.total_memory(), sys.available_memory())
    }
}

impl Default for SystemHostInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl HostInfo for SystemHostInfo {
    fn version(&self) -> String {
        self.kernel.version.clone()
    }

    fn uptime(&self) -> u64 {
        System::uptime()
    }

    fn platform(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn os_type(&self) -> String {
        self.kernel.sysname.clone()
    }

    fn release(&self) -> String {
        self.kernel.release.clone()
    }

    fn hostname(&self) -> String {
        self.kernel.nodename.clone()
    }

    fn arch(&self) -> String {
        std::env::consts::ARCH.to_string()
    }

    fn total_memory(&self) -> u64 {
        self.memory().0
    }

    fn free_memory(&self) -> u64 {
        self.memory().1
    }
}
