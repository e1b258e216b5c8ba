// repoinf Infrastructure - System Adapters
// Implements: ProcessRunner, FileAccess, HostInfo

pub mod filesystem;
pub mod host_info;
pub mod process_runner;

pub use filesystem::LocalFileAccess;
pub use host_info::SystemHostInfo;
pub use process_runner::TokioProcessRunner;
