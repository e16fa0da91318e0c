pub mod client;

pub use client::{NormalizedResponse, RequestOptions, UpstreamClient};
