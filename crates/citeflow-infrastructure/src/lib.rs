pub mod paths;
pub mod storage;

pub use paths::{CiteflowPaths, PathError};
pub use storage::{ConfigStorage, SecretStorage, SecretStorageError};
