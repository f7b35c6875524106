//! Reachability probes for images and outbound links.

mod client;

pub use client::{HttpClient, MockClient, ProbeClient, ProbeClientBuilder, ProbeStatus};
