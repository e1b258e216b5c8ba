// Application Layer - Inspection use cases

pub mod constants;
pub mod formatter;
pub mod platform;
pub mod repository;

// Re-exports
pub use formatter::{derivation, format_output, Derivation, Derivations};
pub use platform::{PlatformInspector, PlatformInspectorConfig};
pub use repository::{RepoInspectorConfig, RepositoryInspector, SpawnFailurePolicy};
