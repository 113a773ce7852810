//! Cluster membership identity and directory
//!
//! This crate defines how a cluster member is identified, how membership
//! records are encoded into and decoded from the hierarchical key-value
//! directory, and how a member's running version is probed over its peer
//! endpoints. Consensus itself, store transactions, and transport setup are
//! external collaborators consumed through narrow interfaces.

pub mod error;
pub mod member;
pub mod store;
pub mod version;

pub use error::{MembershipError, Result};
pub use member::{
    generate_member_id, sort_members_by_id, sort_members_by_peer_url, Attributes, Member,
    RaftAttributes,
};
pub use quorum_types::MemberId;
pub use store::{
    member_attributes_key, member_raft_attributes_key, member_store_key, member_to_node,
    node_to_member, removed_member_store_key, StoreNode,
};
pub use version::{VersionInfo, VersionProbe};
