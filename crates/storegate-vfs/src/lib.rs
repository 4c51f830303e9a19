#![warn(missing_docs)]

//! StoreGate virtual filesystem subsystem: file attributes, pseudo-file synthesis, wildcard matching, enumeration cursors

pub mod attr;
pub mod error;
pub mod info;
pub mod pseudo;
pub mod search;
pub mod wildcard;
