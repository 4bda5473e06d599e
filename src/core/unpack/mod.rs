//! Unpack stage
//!
//! Turns the downloaded archive into one JSON document per compressed
//! record. The archive is expected to hold exactly one top-level folder named
//! with digits only (the project id) containing the gzip records at any depth.

pub mod unpacker;

pub use unpacker::{locate_day_folder, unpack, unpack_blocking, RECORD_SUFFIX};
