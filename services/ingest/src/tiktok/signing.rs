use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Body string signed (and transmitted) for a POST with no payload.
pub const EMPTY_POST_BODY: &str = "{}";

/// Query parameters that never participate in signing. `sign` and `timestamp`
/// are outputs of the process; `access_token` is appended after signing.
const EXCLUDED_KEYS: [&str; 3] = ["sign", "timestamp", "access_token"];

/// Computes the HMAC-SHA256 request signature the shop API expects.
///
/// The string to sign is the request path, followed by every query parameter
/// as `keyvalue` pairs sorted by key (timestamp included), followed by the
/// exact body bytes. That string is wrapped in the app secret on both sides
/// and keyed with the app secret.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    app_secret: String,
}

/// Signature plus the timestamp that was folded into it. The caller must send
/// both, unchanged, in the query string.
#[derive(Debug, Clone)]
pub struct Signature {
    pub sign: String,
    pub timestamp: String,
}

impl RequestSigner {
    pub fn new(app_secret: impl Into<String>) -> Self {
        Self {
            app_secret: app_secret.into(),
        }
    }

    /// Sign a request using the current unix time.
    pub fn sign(&self, path: &str, params: &[(String, String)], body: &str) -> Signature {
        self.sign_at(path, params, body, Utc::now().timestamp())
    }

    /// Sign a request at an explicit timestamp.
    pub fn sign_at(
        &self,
        path: &str,
        params: &[(String, String)],
        body: &str,
        timestamp: i64,
    ) -> Signature {
        let timestamp = timestamp.to_string();
        let string_to_sign = string_to_sign(path, params, &timestamp, body);
        let wrapped = format!("{}{}{}", self.app_secret, string_to_sign, self.app_secret);

        let mut mac = HmacSha256::new_from_slice(self.app_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(wrapped.as_bytes());
        let sign = hex::encode(mac.finalize().into_bytes());

        Signature { sign, timestamp }
    }
}

/// Build the exact string covered by the signature. Parameter order in the
/// input slice does not matter; keys are sorted here.
fn string_to_sign(path: &str, params: &[(String, String)], timestamp: &str, body: &str) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| !EXCLUDED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.push(("timestamp", timestamp));
    pairs.sort();

    let mut out = String::from(path);
    for (k, v) in pairs {
        out.push_str(k);
        out.push_str(v);
    }
    out.push_str(body);
    out
}

/// Serialize a JSON body deterministically: object keys sorted, no whitespace.
/// The signed bytes and the transmitted bytes must be identical, so the client
/// sends exactly this string.
pub fn canonical_json(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sort_value(value))
}

/// Canonical body for a POST request. A missing or empty-object body signs as
/// the literal `{}`.
pub fn canonical_body(body: Option<&serde_json::Value>) -> Result<String, serde_json::Error> {
    match body {
        None => Ok(EMPTY_POST_BODY.to_string()),
        Some(v) if v.as_object().is_some_and(|m| m.is_empty()) => Ok(EMPTY_POST_BODY.to_string()),
        Some(v) => canonical_json(v),
    }
}

fn sort_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_value(&map[key]));
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sort_value).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn string_to_sign_is_byte_exact() {
        let sts = string_to_sign(
            "/order/202309/orders/search",
            &params(&[("app_key", "abc123"), ("page_size", "50")]),
            "1700000000",
            "{}",
        );
        assert_eq!(
            sts,
            "/order/202309/orders/searchapp_keyabc123page_size50timestamp1700000000{}"
        );
    }

    #[test]
    fn known_answer_post_empty_body() {
        let signer = RequestSigner::new("app-secret");
        let sig = signer.sign_at(
            "/order/202309/orders/search",
            &params(&[("app_key", "abc123"), ("page_size", "50")]),
            EMPTY_POST_BODY,
            1_700_000_000,
        );
        assert_eq!(
            sig.sign,
            "7fd836f8d77741ccef4482a1d1a0502e8f7428d7e1d5e370a2561144e90526ee"
        );
        assert_eq!(sig.timestamp, "1700000000");
    }

    #[test]
    fn known_answer_get_no_body() {
        let signer = RequestSigner::new("app-secret");
        let sig = signer.sign_at(
            "/authorization/202309/shops",
            &params(&[("app_key", "abc123"), ("shop_cipher", "c-1")]),
            "",
            1_700_000_000,
        );
        assert_eq!(
            sig.sign,
            "0ed7220a6c0ebb84c62813c17d87abb06390913b290813a8c4a7d05d6fa87dff"
        );
    }

    #[test]
    fn known_answer_post_with_body() {
        let signer = RequestSigner::new("s3cr3t");
        let body = canonical_body(Some(&json!({
            "page_size": 50,
            "create_time_ge": 1_690_000_000,
        })))
        .unwrap();
        assert_eq!(body, r#"{"create_time_ge":1690000000,"page_size":50}"#);

        let sig = signer.sign_at(
            "/order/202309/orders/search",
            &params(&[("app_key", "key-9"), ("shop_id", "7001")]),
            &body,
            1_712_345_678,
        );
        assert_eq!(
            sig.sign,
            "6cea8f9a054e33fc6efa02a10862addac76efd820e8c1ef70f25ef2b014d5c75"
        );
    }

    #[test]
    fn signature_independent_of_param_order() {
        let signer = RequestSigner::new("app-secret");
        let a = signer.sign_at(
            "/p",
            &params(&[("b", "2"), ("a", "1"), ("c", "3")]),
            "",
            1_700_000_000,
        );
        let b = signer.sign_at(
            "/p",
            &params(&[("c", "3"), ("a", "1"), ("b", "2")]),
            "",
            1_700_000_000,
        );
        assert_eq!(a.sign, b.sign);
    }

    #[test]
    fn none_body_and_empty_object_sign_identically() {
        let signer = RequestSigner::new("app-secret");
        let p = params(&[("app_key", "abc123")]);

        let none = canonical_body(None).unwrap();
        let empty = canonical_body(Some(&json!({}))).unwrap();
        assert_eq!(none, empty);

        let a = signer.sign_at("/p", &p, &none, 1_700_000_000);
        let b = signer.sign_at("/p", &p, &empty, 1_700_000_000);
        assert_eq!(a.sign, b.sign);
    }

    #[test]
    fn excluded_params_do_not_affect_signature() {
        let signer = RequestSigner::new("app-secret");
        let bare = params(&[("app_key", "abc123")]);
        let noisy = params(&[
            ("app_key", "abc123"),
            ("sign", "stale"),
            ("timestamp", "999"),
            ("access_token", "tok"),
        ]);

        let a = signer.sign_at("/p", &bare, "", 1_700_000_000);
        let b = signer.sign_at("/p", &noisy, "", 1_700_000_000);
        assert_eq!(a.sign, b.sign);
    }

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let body = canonical_json(&json!({
            "z": {"b": 1, "a": 2},
            "a": [{"y": 1, "x": 2}],
        }))
        .unwrap();
        assert_eq!(body, r#"{"a":[{"x":2,"y":1}],"z":{"a":2,"b":1}}"#);
    }
}
