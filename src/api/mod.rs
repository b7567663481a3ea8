//! HTTP API handlers

pub mod relay;
