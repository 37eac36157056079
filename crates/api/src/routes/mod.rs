//! Route handlers

pub mod sessions;
