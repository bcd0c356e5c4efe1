use serde::Deserialize;

/// Every shop API response wraps its payload in this envelope. A non-zero
/// `code` is a domain error even when the HTTP status is 200.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// One page of a paginated search. Records stay as raw JSON; the transform
/// layer decides what to keep. An absent or null token signals the last page.
#[derive(Debug, Default, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Shops the app is authorized to act for.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizedShops {
    #[serde(default)]
    pub shops: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_with_data() {
        let env: ApiEnvelope<RecordPage> = serde_json::from_str(
            r#"{"code":0,"message":"Success","data":{"records":[{"id":"1"}],"next_page_token":"abc"}}"#,
        )
        .unwrap();
        assert_eq!(env.code, 0);
        let page = env.data.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn page_defaults_when_fields_absent() {
        let page: RecordPage = serde_json::from_str("{}").unwrap();
        assert!(page.records.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn null_token_reads_as_none() {
        let page: RecordPage =
            serde_json::from_str(r#"{"records":[],"next_page_token":null}"#).unwrap();
        assert!(page.next_page_token.is_none());
    }
}
