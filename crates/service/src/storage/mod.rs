//! Storage abstractions for service layer
//!
//! Contains the reusable file-backed list store that persists small
//! collections as a JSON array.

pub mod json_list_store;
