#![warn(missing_docs)]

//! StoreGate authentication subsystem: passthrough server pool with health-tracked failover, transactional session logon bridge

pub mod config;
pub mod connector;
pub mod error;
pub mod ftp;
pub mod identity;
pub mod passthru;
pub mod services;
