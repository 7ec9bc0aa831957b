//! Label extraction from boot requests
//!
//! Every query parameter becomes a label. A key given more than once keeps
//! its first value. The `mac` label is parsed and normalized; a value that
//! is not a MAC address is dropped so it can never match a selector.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use netboot_crd::{parse_mac, MachineLabels, MAC_LABEL};
use std::convert::Infallible;
use tracing::warn;
use url::form_urlencoded;

/// Labels presented by one request, plus the query they came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestLabels {
    pub labels: MachineLabels,
    pub raw_query: String,
}

impl RequestLabels {
    /// Extract labels from a raw (still percent-encoded) query string
    pub fn from_query(query: &str) -> Self {
        let mut labels = MachineLabels::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key.eq_ignore_ascii_case(MAC_LABEL) {
                if labels.get(MAC_LABEL).is_some() {
                    continue;
                }
                match parse_mac(&value) {
                    Ok(mac) => labels.insert(MAC_LABEL, mac),
                    Err(e) => warn!(value = %value, error = %e, "Ignoring invalid mac label"),
                }
                continue;
            }

            if labels.get(&key).is_none() {
                labels.insert(key.into_owned(), value.into_owned());
            }
        }

        Self {
            labels,
            raw_query: query.to_string(),
        }
    }

    /// Add a label inferred from the boot protocol
    ///
    /// An explicitly supplied label with the same key wins.
    pub fn infer(&mut self, key: &str, value: impl Into<String>) {
        self.labels.insert_if_absent(key, value);
    }
}

impl<S> FromRequestParts<S> for RequestLabels
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query(parts.uri.query().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_every_parameter_becomes_a_label() {
        let request = RequestLabels::from_query("uuid=abc&hostname=node1&os=installed");
        assert_eq!(request.labels.get("uuid"), Some("abc"));
        assert_eq!(request.labels.get("hostname"), Some("node1"));
        assert_eq!(request.labels.get("os"), Some("installed"));
        assert_eq!(request.raw_query, "uuid=abc&hostname=node1&os=installed");
    }

    #[test]
    fn test_first_value_wins() {
        let request = RequestLabels::from_query("role=a&role=b");
        assert_eq!(request.labels.get("role"), Some("a"));
    }

    #[test]
    fn test_mac_is_normalized() {
        let request = RequestLabels::from_query("mac=52-54-00-A1-9C-AE");
        assert_eq!(request.labels.get("mac"), Some("52:54:00:a1:9c:ae"));

        let request = RequestLabels::from_query("MAC=52%3A54%3A00%3Aa1%3A9c%3Aae");
        assert_eq!(request.labels.get("mac"), Some("52:54:00:a1:9c:ae"));
    }

    #[test]
    fn test_invalid_mac_is_dropped() {
        let request = RequestLabels::from_query("mac=not-a-mac&uuid=u1");
        assert_eq!(request.labels.get("mac"), None);
        assert_eq!(request.labels.get("uuid"), Some("u1"));
    }

    #[test]
    fn test_empty_query() {
        let request = RequestLabels::from_query("");
        assert!(request.labels.is_empty());
        assert_eq!(request.raw_query, "");
    }

    #[test]
    fn test_percent_decoding() {
        let request = RequestLabels::from_query("hostname=node%201&note=a+b");
        assert_eq!(request.labels.get("hostname"), Some("node 1"));
        assert_eq!(request.labels.get("note"), Some("a b"));
    }

    #[test]
    fn test_inferred_label_does_not_override() {
        let mut request = RequestLabels::from_query("mac=52:54:00:a1:9c:ae");
        request.infer("mac", "00:00:00:00:00:01");
        assert_eq!(request.labels.get("mac"), Some("52:54:00:a1:9c:ae"));

        let mut request = RequestLabels::from_query("");
        request.infer("mac", "00:00:00:00:00:01");
        assert_eq!(request.labels.get("mac"), Some("00:00:00:00:00:01"));
    }

    #[tokio::test]
    async fn test_extractor() {
        let (mut parts, _) = Request::builder()
            .uri("/ipxe?uuid=u1&mac=52:54:00:a1:9c:ae")
            .body(())
            .unwrap()
            .into_parts();

        let request = RequestLabels::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(request.labels.len(), 2);
        assert_eq!(request.raw_query, "uuid=u1&mac=52:54:00:a1:9c:ae");
    }
}
