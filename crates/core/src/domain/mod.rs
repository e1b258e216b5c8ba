// Domain Layer - Info records and the values they carry

pub mod command;
pub mod error;
pub mod platform;
pub mod repository;
pub mod value;

// Re-exports
pub use command::{CommandTable, GitCommand, Transform};
pub use error::DomainError;
pub use platform::{HostFact, PlatformInfo};
pub use repository::{parse_head_branch, RepositoryInfo};
pub use value::{FieldValue, Record};
