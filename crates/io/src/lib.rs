// File I/O: the character store and everything that reads or writes it

pub mod backup;
pub mod csv;
pub mod error;
pub mod ocr;
pub mod scan;
pub mod store;

pub use error::StoreError;
pub use store::{AccountCollection, Store};
