//! Directory codec for the hierarchical key-value store
//!
//! Each member occupies a subtree under the members prefix, with exactly two
//! recognized children: a `raftAttributes` blob (routing endpoints,
//! mandatory) and an `attributes` blob (descriptive attributes, optional).
//! Removed members are tombstoned under a parallel prefix, keyed by the same
//! identity, so an identity is never reused.

use crate::error::{MembershipError, Result};
use crate::member::{Attributes, Member, RaftAttributes};
use quorum_types::MemberId;

const MEMBERS_PREFIX: &str = "members";
const REMOVED_MEMBERS_PREFIX: &str = "removedMembers";
const RAFT_ATTRIBUTES_SUFFIX: &str = "raftAttributes";
const ATTRIBUTES_SUFFIX: &str = "attributes";

/// A read-only view of one node in the external configuration tree.
///
/// This is the narrow interface the codec consumes; transactions, watches,
/// and durability belong to the store behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreNode {
    /// Full `/`-joined key of this node.
    pub key: String,

    /// Leaf value, absent on interior nodes.
    pub value: Option<String>,

    /// Immediate children. Precondition: sorted by key; the codec trusts
    /// the store to deliver them that way and does not re-sort.
    pub nodes: Vec<StoreNode>,
}

/// Key of a member's subtree.
pub fn member_store_key(id: MemberId) -> String {
    format!("{}/{}", MEMBERS_PREFIX, id)
}

/// Key of a member's raft-attributes blob.
pub fn member_raft_attributes_key(id: MemberId) -> String {
    format!("{}/{}", member_store_key(id), RAFT_ATTRIBUTES_SUFFIX)
}

/// Key of a member's descriptive-attributes blob.
pub fn member_attributes_key(id: MemberId) -> String {
    format!("{}/{}", member_store_key(id), ATTRIBUTES_SUFFIX)
}

/// Key of a removed member's tombstone.
pub fn removed_member_store_key(id: MemberId) -> String {
    format!("{}/{}", REMOVED_MEMBERS_PREFIX, id)
}

/// Parse the member identity from the final segment of a subtree key.
///
/// The key shape is guaranteed by this codec's own writes, so a malformed
/// segment means the directory itself is corrupt and there is no safe
/// recovery.
fn member_id_from_key(key: &str) -> MemberId {
    let base = key.rsplit('/').next().unwrap_or(key);
    match base.parse() {
        Ok(id) => id,
        Err(err) => panic!("unexpected parse member id error: {}", err),
    }
}

/// Reconstruct a member from its subtree node.
///
/// The node's children must be sorted by key (see [`StoreNode::nodes`]).
/// An undecodable attributes blob still yields the identity and routing
/// endpoints already parsed, carried inside
/// [`MembershipError::InvalidAttributes`].
pub fn node_to_member(node: &StoreNode) -> Result<Member> {
    let id = member_id_from_key(&node.key);
    let raft_attr_key = format!("{}/{}", node.key, RAFT_ATTRIBUTES_SUFFIX);
    let attr_key = format!("{}/{}", node.key, ATTRIBUTES_SUFFIX);

    let mut raft_blob: Option<&str> = None;
    let mut attr_blob: Option<&str> = None;
    for child in &node.nodes {
        if child.key == raft_attr_key {
            raft_blob = child.value.as_deref();
        } else if child.key == attr_key {
            attr_blob = child.value.as_deref();
        } else {
            return Err(MembershipError::UnknownKey { key: child.key.clone() });
        }
    }

    let raft_attributes: RaftAttributes = match raft_blob {
        Some(data) => serde_json::from_str(data).map_err(|source| {
            MembershipError::InvalidRaftAttributes { key: raft_attr_key, source }
        })?,
        None => {
            return Err(MembershipError::RaftAttributesMissing { key: node.key.clone() });
        }
    };

    let mut member = Member {
        id,
        raft_attributes,
        attributes: Attributes::default(),
    };
    if let Some(data) = attr_blob {
        match serde_json::from_str(data) {
            Ok(attributes) => member.attributes = attributes,
            Err(source) => {
                return Err(MembershipError::InvalidAttributes {
                    member: Box::new(member),
                    source,
                });
            }
        }
    }
    Ok(member)
}

/// Encode a member into its two-blob subtree, children sorted by key.
///
/// The attributes blob is written only once the member has published a name
/// or client URLs; decoding an attribute-less subtree yields the same
/// default attributes back.
pub fn member_to_node(member: &Member) -> Result<StoreNode> {
    let mut nodes = Vec::with_capacity(2);
    if member.attributes != Attributes::default() {
        nodes.push(StoreNode {
            key: member_attributes_key(member.id),
            value: Some(serde_json::to_string(&member.attributes)?),
            nodes: vec![],
        });
    }
    nodes.push(StoreNode {
        key: member_raft_attributes_key(member.id),
        value: Some(serde_json::to_string(&member.raft_attributes)?),
        nodes: vec![],
    });
    Ok(StoreNode {
        key: member_store_key(member.id),
        value: None,
        nodes,
    })
}
