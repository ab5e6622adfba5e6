//! Client-side mirrors of backend payloads.
//!
//! Only the fields the bindings act on are typed; everything else rides along
//! in `extra` so views can render it without this crate knowing about it.

use crate::error::{ApiError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Ids are UUID strings on the backend but plain numbers in fixtures and mocks.
fn id_from_any<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nft {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "likes")]
    pub likes_count: i64,
    #[serde(default, alias = "isLiked")]
    pub is_liked: bool,
    #[serde(default, alias = "inCart")]
    pub in_cart: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of `GET /nfts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NftPage {
    pub nfts: Vec<Nft>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u64>,
}

impl NftPage {
    /// Accepts the paginated envelope or a bare array.
    pub fn from_value(v: Value) -> Result<Self> {
        if v.is_array() {
            let nfts: Vec<Nft> = serde_json::from_value(v)?;
            return Ok(NftPage {
                total: Some(nfts.len() as u64),
                nfts,
                ..Default::default()
            });
        }
        if v.get("nfts").is_none() {
            return Err(ApiError::Decode("listing response has no `nfts` field".into()));
        }
        Ok(serde_json::from_value(v)?)
    }

    pub fn has_more(&self) -> bool {
        match (self.current_page, self.pages) {
            (Some(cur), Some(pages)) => cur < pages,
            _ => false,
        }
    }

    pub fn find(&self, id: &str) -> Option<&Nft> {
        self.nfts.iter().find(|n| n.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Nft> {
        self.nfts.iter_mut().find(|n| n.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "is_read", alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts `[...]` or `{"notifications": [...]}`.
pub fn notifications_from_value(v: Value) -> Result<Vec<Notification>> {
    let list = match v {
        Value::Object(mut o) => o
            .remove("notifications")
            .ok_or_else(|| ApiError::Decode("response has no `notifications` field".into()))?,
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_backend_envelope() {
        let page = NftPage::from_value(json!({
            "nfts": [{"id": "1", "title": "Koi", "likes_count": 5, "price": 2.5, "tags": ["fish"]}],
            "total": 1, "pages": 1, "current_page": 1
        }))
        .unwrap();
        assert_eq!(page.nfts.len(), 1);
        let nft = &page.nfts[0];
        assert_eq!(nft.likes_count, 5);
        assert!(!nft.is_liked);
        assert_eq!(nft.extra["price"], json!(2.5));
        assert!(!page.has_more());
    }

    #[test]
    fn parses_mock_shape() {
        let page = NftPage::from_value(json!([
            {"id": 7, "title": "Carp", "likes": 12, "isLiked": true, "inCart": true}
        ]))
        .unwrap();
        let nft = page.find("7").unwrap();
        assert_eq!(nft.likes_count, 12);
        assert!(nft.is_liked);
        assert!(nft.in_cart);
    }

    #[test]
    fn rejects_unrelated_payload() {
        assert!(NftPage::from_value(json!({"message": "ok"})).is_err());
        assert!(NftPage::from_value(json!([{"title": "no id"}])).is_err());
    }

    #[test]
    fn notifications_both_shapes() {
        let a = notifications_from_value(json!([{"id": "n1", "read": false}])).unwrap();
        let b = notifications_from_value(json!({"notifications": [{"id": 2, "isRead": true}]})).unwrap();
        assert_eq!(a[0].id, "n1");
        assert!(b[0].read);
        assert_eq!(b[0].id, "2");
    }
}
