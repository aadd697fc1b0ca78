pub mod client;

pub use client::{QueryProxy, FAILURE_MESSAGE};
