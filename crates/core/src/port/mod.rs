// Port Layer - Interfaces for external dependencies

pub mod filesystem;
pub mod host_info;
pub mod process_runner;
pub mod time_provider; // For deterministic boot time

// Re-exports
pub use filesystem::{recover_access, AccessLevel, FileAccess};
pub use host_info::HostInfo;
pub use process_runner::{
    CommandResult, Encoding, OutputBuffers, ProcessRunner, RunError, RunOptions, StreamData,
};
pub use time_provider::TimeProvider;
