pub mod payment;
pub mod time;

/// Boxed error type shared by the repository and gateway traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
