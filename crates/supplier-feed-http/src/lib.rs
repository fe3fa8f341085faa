pub mod client;
pub mod retry;

pub use client::EndpointClient;
pub use retry::RetryPolicy;
