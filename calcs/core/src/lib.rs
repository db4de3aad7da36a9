//! Core types for hpcalcs protocol crates.
//!
//! This crate provides:
//! - The `CalcError` type and `Result` alias shared by every protocol crate
//! - `VtlPacket`, the logical packet handed to and from a transport
//! - `VarEntry`, a named file or variable with a type tag and payload
//! - The `PacketTransport` trait that protocol crates send and receive through
//! - `MockTransport`, a scripted in-memory transport

mod entry;
mod error;
pub mod mock;
mod packet;
mod transport;

pub use entry::{push_entry, VarEntry};
pub use error::{CalcError, Result};
pub use mock::MockTransport;
pub use packet::VtlPacket;
pub use transport::PacketTransport;
