// Host information port

use crate::domain::{FieldValue, HostFact};

/// Host information provider
///
/// All accessors are synchronous and always succeed.
pub trait HostInfo: Send + Sync {
    /// Kernel version string
    fn version(&self) -> String;

    /// Seconds since boot
    fn uptime(&self) -> u64;

    /// Platform kind (e.g. `linux`, `macos`, `windows`)
    fn platform(&self) -> String;

    /// Operating system type (e.g. `Linux`, `Darwin`)
    fn os_type(&self) -> String;

    /// Kernel release
    fn release(&self) -> String;

    fn hostname(&self) -> String;

    /// CPU architecture (e.g. `x86_64`, `aarch64`)
    fn arch(&self) -> String;

    /// Total memory in bytes
    fn total_memory(&self) -> u64;

    /// Available memory in bytes
    fn free_memory(&self) -> u64;

    /// `LE` or `BE`
    fn endianness(&self) -> String {
        if cfg!(target_endian = "big") {
            "BE".to_string()
        } else {
            "LE".to_string()
        }
    }

    /// Dispatch a fact to its accessor
    fn fact(&self, fact: HostFact) -> FieldValue {
        match fact {
            HostFact::Version => self.version().into(),
            HostFact::Uptime => self.uptime().into(),
            HostFact::Platform => self.platform().into(),
            HostFact::Type => self.os_type().into(),
            HostFact::Release => self.release().into(),
            HostFact::Hostname => self.hostname().into(),
            HostFact::Arch => self.arch().into(),
            HostFact::TotalMem => self.total_memory().into(),
            HostFact::FreeMem => self.free_memory().into(),
            HostFact::Endianness => self.endianness().into(),
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Fixed-value HostInfo
    #[derive(Debug, Clone)]
    pub struct MockHostInfo {
        pub uptime_secs: u64,
    }

    impl MockHostInfo {
        pub fn new(uptime_secs: u64) -> Self {
            Self { uptime_secs }
        }
    }

    impl HostInfo for MockHostInfo {
        fn version(&self) -> String {
            "#1 SMP PREEMPT_DYNAMIC".to_string()
        }
        fn uptime(&self) -> u64 {
            self.uptime_secs
        }
        fn platform(&self) -> String {
            "linux".to_string()
        }
        fn os_type(&self) -> String {
            "Linux".to_string()
        }
        fn release(&self) -> String {
            "6.1.0-test".to_string()
        }
        fn hostname(&self) -> String {
            "buildhost".to_string()
        }
        fn arch(&self) -> String {
            "x86_64".to_string()
        }
        fn total_memory(&self) -> u64 {
            8 * 1024 * 1024 * 1024
        }
        fn free_memory(&self) -> u64 {
            2 * 1024 * 1024 * 1024
        }
    }
}
