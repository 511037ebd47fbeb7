mod client;

pub use client::{EdgeFunctionClient, EdgeFunctionClientBuilder, DEFAULT_FUNCTION_NAME};
