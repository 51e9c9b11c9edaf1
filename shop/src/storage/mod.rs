// Re-export all storage-related modules
pub mod catalog;
pub mod orders;
pub mod prod;
pub mod reports;
pub mod reviews;

// Re-export storage traits and implementations
pub use catalog::*;
pub use orders::*;
pub use prod::*;
pub use reports::*;
pub use reviews::*;
