pub mod client;
pub mod handlers;
pub mod inflight;
pub mod server;
