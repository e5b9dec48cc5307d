pub mod error;
pub mod records;
pub mod tokenization;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
