//! HTTP API for the Yatube blog: routing, auth middleware, resources, and
//! request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod resources;
