//! Cluster membership records and identity derivation

use crate::error::{MembershipError, Result};
use chrono::{DateTime, Utc};
use quorum_types::MemberId;
use rand::Rng;
use ring::digest;
use serde::{Deserialize, Serialize};

/// Raft-routing attributes of a cluster member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaftAttributes {
    /// URLs of the member's raft-replication listeners, in advertised order.
    #[serde(rename = "peerURLs")]
    pub peer_urls: Vec<String>,
}

/// Non-raft, descriptive attributes of a cluster member.
///
/// Absent fields stay absent across serialization: `None` and an empty list
/// are distinct states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Human-readable label for the member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URLs clients may use to reach this member.
    #[serde(rename = "clientURLs", default, skip_serializing_if = "Option::is_none")]
    pub client_urls: Option<Vec<String>>,
}

/// One participant in the replicated cluster.
///
/// A member is created either freshly via [`Member::new`] when it is being
/// proposed to the cluster, or reconstructed by the directory codec when
/// reading the configuration tree. `clone()` produces an independent deep
/// copy; mutating a shared instance is not supported by this subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Derived identity; immutable once assigned.
    pub id: MemberId,

    /// Raft-routing attributes, persisted under the `raftAttributes` key.
    pub raft_attributes: RaftAttributes,

    /// Descriptive attributes, persisted under the `attributes` key.
    pub attributes: Attributes,
}

impl Member {
    /// Create a member for bootstrapping or joining, deriving its identity
    /// from the peer URLs and cluster name.
    ///
    /// `now` makes repeated additions of the same endpoints yield distinct
    /// identities, so a re-added member never collides with its tombstone.
    /// An empty `name` is recorded as absent.
    pub fn new(
        name: &str,
        peer_urls: Vec<String>,
        cluster_name: &str,
        now: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let id = generate_member_id(&peer_urls, cluster_name, now)?;
        tracing::info!("generated member {} for cluster {}", id, cluster_name);
        Ok(Self {
            id,
            raft_attributes: RaftAttributes { peer_urls },
            attributes: Attributes {
                name: (!name.is_empty()).then(|| name.to_string()),
                client_urls: None,
            },
        })
    }

    /// The member's raft-replication listener URLs, in stored order.
    pub fn peer_urls(&self) -> &[String] {
        &self.raft_attributes.peer_urls
    }

    /// Choose a peer URL uniformly at random from the supplied source.
    ///
    /// # Panics
    ///
    /// Panics if the member has no peer URLs. A fully configured member
    /// always has at least one; continuing without an endpoint would
    /// silently corrupt cluster communication.
    pub fn pick_peer_url<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let urls = &self.raft_attributes.peer_urls;
        if urls.is_empty() {
            panic!("member {} should always have some peer url", self.id);
        }
        &urls[rng.gen_range(0..urls.len())]
    }
}

/// Derive a member identity from its advertised peer URLs.
///
/// The peer URLs are sorted into a scratch copy (the stored order is never
/// touched), concatenated with the cluster name and, when given, the decimal
/// Unix timestamp of `now`; the identity is the first 8 bytes of the SHA-1
/// digest of that string, big-endian. Deterministic and free of shared
/// state, so concurrent callers need no coordination.
pub fn generate_member_id(
    peer_urls: &[String],
    cluster_name: &str,
    now: Option<DateTime<Utc>>,
) -> Result<MemberId> {
    if peer_urls.is_empty() {
        return Err(MembershipError::NoPeerUrls);
    }

    let mut sorted: Vec<&str> = peer_urls.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut buf = Vec::new();
    for url in &sorted {
        buf.extend_from_slice(url.as_bytes());
    }
    buf.extend_from_slice(cluster_name.as_bytes());
    if let Some(t) = now {
        buf.extend_from_slice(t.timestamp().to_string().as_bytes());
    }

    let hash = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, &buf);
    let mut first8 = [0u8; 8];
    first8.copy_from_slice(&hash.as_ref()[..8]);
    Ok(MemberId::from(u64::from_be_bytes(first8)))
}

/// Stable sort of members by identity, ascending.
pub fn sort_members_by_id(members: &mut [Member]) {
    members.sort_by_key(|m| m.id);
}

/// Stable sort of members by their first peer URL, ascending.
///
/// # Panics
///
/// Panics if any member has no peer URLs; every member in a directory
/// snapshot carries at least one.
pub fn sort_members_by_peer_url(members: &mut [Member]) {
    members.sort_by(|a, b| a.raft_attributes.peer_urls[0].cmp(&b.raft_attributes.peer_urls[0]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_id_is_deterministic() {
        let a = generate_member_id(&urls(&["http://a:2380", "http://b:2380"]), "c1", None).unwrap();
        let b = generate_member_id(&urls(&["http://a:2380", "http://b:2380"]), "c1", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_id_ignores_peer_url_order() {
        let a = generate_member_id(&urls(&["http://b:2380", "http://a:2380"]), "c1", None).unwrap();
        let b = generate_member_id(&urls(&["http://a:2380", "http://b:2380"]), "c1", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_id_depends_on_cluster_name() {
        let peer = urls(&["http://a:2380"]);
        let a = generate_member_id(&peer, "c1", None).unwrap();
        let b = generate_member_id(&peer, "c2", None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_depends_on_creation_time() {
        let peer = urls(&["http://a:2380"]);
        let t1 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let t2 = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        let a = generate_member_id(&peer, "c1", Some(t1)).unwrap();
        let b = generate_member_id(&peer, "c1", Some(t2)).unwrap();
        let c = generate_member_id(&peer, "c1", None).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_id_rejects_empty_peer_urls() {
        let err = generate_member_id(&[], "c1", None).unwrap_err();
        assert!(matches!(err, MembershipError::NoPeerUrls));
    }

    #[test]
    fn test_new_member_keeps_advertised_order() {
        // Hashing sorts a copy; the record itself keeps the given order.
        let m = Member::new("m1", urls(&["http://z:2380", "http://a:2380"]), "c1", None).unwrap();
        assert_eq!(m.peer_urls(), &["http://z:2380", "http://a:2380"]);
        assert_eq!(m.attributes.name.as_deref(), Some("m1"));
        assert_eq!(m.attributes.client_urls, None);
    }

    #[test]
    fn test_new_member_empty_name_is_absent() {
        let m = Member::new("", urls(&["http://a:2380"]), "c1", None).unwrap();
        assert_eq!(m.attributes.name, None);
    }

    #[test]
    fn test_clone_is_independent_deep_copy() {
        let m = Member::new("m1", urls(&["http://a:2380"]), "c1", None).unwrap();
        let mut copy = m.clone();
        copy.raft_attributes.peer_urls.push("http://b:2380".to_string());
        copy.attributes.client_urls = Some(urls(&["http://c:2379"]));

        assert_eq!(m.peer_urls(), &["http://a:2380"]);
        assert_eq!(m.attributes.client_urls, None);
        assert_eq!(copy.clone(), copy);
    }

    #[test]
    fn test_clone_preserves_absent_sequences() {
        let m = Member::new("m1", urls(&["http://a:2380"]), "c1", None).unwrap();
        assert_eq!(m.clone().attributes.client_urls, None);

        let mut with_empty = m;
        with_empty.attributes.client_urls = Some(vec![]);
        assert_eq!(with_empty.clone().attributes.client_urls, Some(vec![]));
    }

    #[test]
    fn test_pick_peer_url_covers_all_urls() {
        let m = Member::new("m1", urls(&["http://a:2380", "http://b:2380"]), "c1", None).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..64 {
            seen.insert(m.pick_peer_url(&mut rng).to_string());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    #[should_panic(expected = "should always have some peer url")]
    fn test_pick_peer_url_panics_without_urls() {
        let m = Member {
            id: MemberId::from(1),
            raft_attributes: RaftAttributes::default(),
            attributes: Attributes::default(),
        };
        let mut rng = StdRng::seed_from_u64(0);
        m.pick_peer_url(&mut rng);
    }

    fn member_with(id: u64, peer: &str) -> Member {
        Member {
            id: MemberId::from(id),
            raft_attributes: RaftAttributes { peer_urls: urls(&[peer]) },
            attributes: Attributes::default(),
        }
    }

    #[test]
    fn test_sort_members_by_id() {
        let mut members = vec![
            member_with(5, "http://a"),
            member_with(1, "http://b"),
            member_with(3, "http://c"),
        ];
        sort_members_by_id(&mut members);
        let ids: Vec<u64> = members.iter().map(|m| m.id.as_u64()).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_sort_members_by_peer_url() {
        let mut members = vec![member_with(1, "http://z"), member_with(2, "http://a")];
        sort_members_by_peer_url(&mut members);
        assert_eq!(members[0].peer_urls()[0], "http://a");
        assert_eq!(members[1].peer_urls()[0], "http://z");
    }

    #[test]
    fn test_attributes_wire_field_names() {
        let attrs = Attributes {
            name: Some("m1".to_string()),
            client_urls: Some(urls(&["http://c:2379"])),
        };
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"name":"m1","clientURLs":["http://c:2379"]}"#);

        let raft = RaftAttributes { peer_urls: urls(&["http://a:2380"]) };
        assert_eq!(
            serde_json::to_string(&raft).unwrap(),
            r#"{"peerURLs":["http://a:2380"]}"#
        );
    }
}
