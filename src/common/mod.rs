//! Utilities shared across the package writer and reader.

pub mod xml;
