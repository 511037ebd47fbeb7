mod client;
mod models;

pub use client::PostgrestClient;
pub use models::PostgrestErrorBody;
