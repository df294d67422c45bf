pub mod book;
pub mod preferences;

pub use book::*;
pub use preferences::*;
