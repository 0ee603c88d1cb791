#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    File(#[from] tierproxy_common::fs::FileStoreError),
}
