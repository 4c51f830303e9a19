#![warn(missing_docs)]

//! StoreGate gateway subsystem: share exports, the session facade consumed by
//! protocol layers, and status-code mapping for client responses

pub mod config;
pub mod error;
pub mod session;
pub mod store;
