//! Chat surface over the retrieval worker bridge.

pub mod handlers;
