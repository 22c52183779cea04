//! Filter error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Storage error: {0}")]
    Storage(#[from] nimbus_storage::StorageError),
}
