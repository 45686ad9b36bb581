pub mod lifecycle;

pub use lifecycle::{classify_failure, RagController};
