//! Common types shared across quorum crates
//!
//! This crate provides shared identifier types to reduce direct
//! dependencies between service crates.

pub mod id;

pub use id::{InvalidMemberId, MemberId};
