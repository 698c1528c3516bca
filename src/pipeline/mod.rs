mod retry;
mod runner;

pub use retry::RetryPolicy;
pub use runner::Pipeline;
