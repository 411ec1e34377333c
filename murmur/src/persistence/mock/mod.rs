mod error;
mod persistence;

pub use error::MockPersistenceError;
pub use persistence::MockPersistence;
