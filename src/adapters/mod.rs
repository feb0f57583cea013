// Adapters layer: concrete implementations for external systems (registry backend, sibling HTTP).

pub mod consul;
pub mod http;
