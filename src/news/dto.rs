use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::AppResult,
    validation::{Payload, Validate},
};

pub const MAX_QUERY_LEN: usize = 100;

/// `GET /news?q=term`
#[derive(Debug)]
pub struct SearchQuery {
    pub q: String,
}

impl Validate for SearchQuery {
    fn validate(p: &Payload) -> AppResult<Self> {
        p.allow_only(&["q"])?;
        let q = p.field("q").trimmed().required()?.max_len(MAX_QUERY_LEN)?;
        Ok(Self { q: q.into_string() })
    }
}

/// What `/news` relays to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResults {
    pub status: &'static str,
    pub articles: Vec<Value>,
    pub total_results: u64,
}

/// Upstream body. Both the success and the error shapes share `status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpstreamBody {
    pub status: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<Value>,
    #[serde(default)]
    pub total_results: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn query(q: &str) -> AppResult<SearchQuery> {
        SearchQuery::validate(&Payload::from_strings(HashMap::from([(
            "q".to_string(),
            q.to_string(),
        )])))
    }

    #[test]
    fn query_is_trimmed_and_bounded() {
        assert_eq!(query("  rust lang ").unwrap().q, "rust lang");
        assert!(query(&"a".repeat(MAX_QUERY_LEN)).is_ok());
        assert!(query(&"a".repeat(MAX_QUERY_LEN + 1)).is_err());
        assert!(query("   ").is_err());
    }

    #[test]
    fn query_is_required() {
        assert!(SearchQuery::validate(&Payload::default()).is_err());
    }
}
