//! Keyword cluster types.
//!
//! Clusters are produced elsewhere and stored opaquely; nothing here checks
//! that parent ids are unique across groups.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an external keyword record.
///
/// Upstream records use either numeric or string ids, so both are accepted
/// and written back in the form they arrived in. Integers above `i64::MAX`
/// land in [`KeywordId::Uint`]. Fractional numbers are not ids and fail to
/// parse.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordId {
    /// Numeric id
    Int(i64),
    /// Numeric id too large for `i64`
    Uint(u64),
    /// String id
    Str(String),
}

impl fmt::Display for KeywordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordId::Int(id) => write!(f, "{}", id),
            KeywordId::Uint(id) => write!(f, "{}", id),
            KeywordId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for KeywordId {
    fn from(id: i64) -> Self {
        KeywordId::Int(id)
    }
}

impl From<u64> for KeywordId {
    fn from(id: u64) -> Self {
        i64::try_from(id).map_or(KeywordId::Uint(id), KeywordId::Int)
    }
}

impl From<&str> for KeywordId {
    fn from(id: &str) -> Self {
        KeywordId::Str(id.to_string())
    }
}

impl From<String> for KeywordId {
    fn from(id: String) -> Self {
        KeywordId::Str(id)
    }
}

/// A parent keyword together with the keywords grouped under it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterGroup {
    /// Representative keyword of the cluster
    pub parent_id: KeywordId,
    /// Keywords clustered under the parent, in producer order
    pub child_ids: Vec<KeywordId>,
}

impl ClusterGroup {
    /// Creates a new cluster group.
    pub fn new(parent_id: impl Into<KeywordId>, child_ids: Vec<KeywordId>) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_ids,
        }
    }

    /// Number of keywords in the group, parent included.
    pub fn size(&self) -> usize {
        1 + self.child_ids.len()
    }
}

/// Total number of keywords across a cluster index.
pub fn keyword_count(clusters: &[ClusterGroup]) -> usize {
    clusters.iter().map(ClusterGroup::size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_camel_case_fields() {
        let group = ClusterGroup::new(KeywordId::Int(1), vec![KeywordId::Int(2), KeywordId::Int(3)]);
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json, serde_json::json!({ "parentId": 1, "childIds": [2, 3] }));
    }

    #[test_case(r#"{"parentId":"kw-1","childIds":["kw-2"]}"# ; "string ids")]
    #[test_case(r#"{"parentId":7,"childIds":[8,9]}"# ; "integer ids")]
    #[test_case(r#"{"parentId":"kw-1","childIds":[2,"kw-3"]}"# ; "mixed ids")]
    #[test_case(r#"{"parentId":18446744073709551615,"childIds":[-1]}"# ; "ids beyond i64")]
    fn test_ids_keep_their_form(raw: &str) {
        let group: ClusterGroup = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&group).unwrap(), raw);
    }

    #[test]
    fn test_rejects_missing_children() {
        let result: Result<ClusterGroup, _> = serde_json::from_str(r#"{"parentId":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_large_ids_parse_as_uint() {
        let group: ClusterGroup =
            serde_json::from_str(r#"{"parentId":9223372036854775808,"childIds":[9223372036854775807]}"#)
                .unwrap();
        assert_eq!(group.parent_id, KeywordId::Uint(9_223_372_036_854_775_808));
        assert_eq!(group.child_ids, vec![KeywordId::Int(i64::MAX)]);
        assert_eq!(group.parent_id.to_string(), "9223372036854775808");
    }

    #[test]
    fn test_from_u64_prefers_int() {
        assert_eq!(KeywordId::from(5u64), KeywordId::Int(5));
        assert_eq!(KeywordId::from(u64::MAX), KeywordId::Uint(u64::MAX));
    }

    #[test]
    fn test_fractional_ids_are_rejected() {
        let result: Result<ClusterGroup, _> = serde_json::from_str(r#"{"parentId":1.5,"childIds":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_keyword_count() {
        let clusters = vec![
            ClusterGroup::new(KeywordId::Int(1), vec![KeywordId::Int(2)]),
            ClusterGroup::new("solo", vec![]),
        ];
        assert_eq!(keyword_count(&clusters), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(KeywordId::Int(42).to_string(), "42");
        assert_eq!(KeywordId::from("seo").to_string(), "seo");
    }
}
