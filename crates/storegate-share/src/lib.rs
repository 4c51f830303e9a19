#![warn(missing_docs)]

//! StoreGate share subsystem: UNC address parsing, embedded credentials, transport protocol ordering

pub mod address;
pub mod error;
pub mod protocol;
