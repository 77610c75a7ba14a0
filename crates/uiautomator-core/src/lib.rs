//! Core types and logic for uiautomator.
//!
//! This crate holds everything that does not touch a device: the selector
//! encoder, the error taxonomy, the JSON-RPC envelope, and the typed records
//! and keyword vocabularies used by the host library in `uiautomator`.
//!
//! # Modules
//!
//! - [`selector`]: match criteria compiled into a masked query object
//! - [`error`]: error types with actionable suggestions
//! - [`protocol`]: JSON-RPC request/response envelope and method names
//! - [`actions`]: keyword vocabularies (corners, directions, keys, ...)
//! - [`info`]: device and element records, attribute alias lookup
//!
//! # Presence mask
//!
//! Every selector field owns one bit of a 64-bit mask. The server only
//! applies criteria whose bit is set, so a field is "present" once assigned
//! (even to its default) and "absent" again only after an explicit delete.

pub mod actions;
pub mod error;
pub mod info;
pub mod protocol;
pub mod selector;
