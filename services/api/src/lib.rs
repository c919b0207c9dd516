//! PREPY API Library Crate
//!
//! This library contains all the transport logic for the PREPY web service,
//! including the application state, document text extraction, API handlers,
//! and routing. The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
