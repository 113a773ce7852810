//! Membership error types

use crate::member::Member;

/// Result type for membership operations
pub type Result<T> = std::result::Result<T, MembershipError>;

/// Membership-specific error types.
///
/// Contract violations (picking an endpoint from a member with none,
/// a malformed identity segment in a key the codec itself wrote) are not
/// represented here; they panic, so callers cannot catch-and-continue past
/// a corrupted directory.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("member must advertise at least one peer URL")]
    NoPeerUrls,

    #[error("unknown key {key:?} under member node")]
    UnknownKey { key: String },

    #[error("raftAttributes key doesn't exist under {key:?}")]
    RaftAttributesMissing { key: String },

    #[error("unmarshal raftAttributes at {key:?}: {source}")]
    InvalidRaftAttributes {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The attributes blob failed to decode. The identity and routing
    /// endpoints already parsed are kept in `member` so callers can decide
    /// whether the partial record is usable.
    #[error("unmarshal attributes for member {id}: {source}", id = .member.id)]
    InvalidAttributes {
        member: Box<Member>,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
