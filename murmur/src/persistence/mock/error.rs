use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockPersistenceError {
    #[error("injected insert failure")]
    InsertFailed,
    #[error("injected read failure after sequence {0}")]
    ReadFailed(i64),
}
