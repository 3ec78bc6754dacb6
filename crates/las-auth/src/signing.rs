//! HMAC request signing for legacy access-key credentials
//!
//! AWS Signature Version 4 with a fixed scope (`eu-west-1`, `execute-api`).
//! Signed headers are `host`, `x-amz-date`, `x-amz-security-token` (when a
//! session token is present) and `x-api-key`, in that order.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;
use sha2::{Digest, Sha256};

use common::Secret;

use crate::constants::{SIGNING_ALGORITHM, SIGNING_REGION, SIGNING_SCOPE_SUFFIX, SIGNING_SERVICE};
use crate::credentials::AccessKeyCredentials;
use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Unreserved characters of RFC 3986 stay literal.
const SIGV4: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Headers produced by signing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub security_token: Option<String>,
    pub api_key: String,
    pub authorization: String,
}

impl SignedHeaders {
    /// `(name, value)` pairs ready to attach to the request.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("x-amz-date", self.amz_date.as_str())];
        if let Some(token) = &self.security_token {
            pairs.push(("x-amz-security-token", token.as_str()));
        }
        pairs.push(("x-api-key", self.api_key.as_str()));
        pairs.push(("authorization", self.authorization.as_str()));
        pairs
    }
}

/// Signs requests with a stable access key pair.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    access_key_id: String,
    secret_access_key: Secret<String>,
    session_token: Option<Secret<String>>,
    api_key: Secret<String>,
}

impl SigV4Signer {
    pub fn new(credentials: &AccessKeyCredentials) -> Self {
        Self {
            access_key_id: credentials.access_key_id.clone(),
            secret_access_key: credentials.secret_access_key.clone(),
            session_token: credentials.session_token.clone(),
            api_key: credentials.api_key.clone(),
        }
    }

    /// Sign at the current time.
    pub fn sign_headers(&self, url: &Url, method: &str, body: &[u8]) -> Result<SignedHeaders> {
        self.sign_headers_at(url, method, body, Utc::now())
    }

    /// Sign at `at`. Identical inputs within the same second sign identically.
    pub fn sign_headers_at(
        &self,
        url: &Url,
        method: &str,
        body: &[u8],
        at: DateTime<Utc>,
    ) -> Result<SignedHeaders> {
        let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = at.format("%Y%m%d").to_string();

        let (canonical_request, signed_headers) = self.canonical_request(url, method, body, &amz_date)?;
        let scope = credential_scope(&datestamp);
        let request_digest = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign = [SIGNING_ALGORITHM, amz_date.as_str(), scope.as_str(), request_digest.as_str()]
            .join("\n");

        let key = self.signing_key(&datestamp)?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        Ok(SignedHeaders {
            authorization: format!(
                "{SIGNING_ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.access_key_id
            ),
            amz_date,
            security_token: self.session_token.as_ref().map(|t| t.expose().clone()),
            api_key: self.api_key.expose().clone(),
        })
    }

    /// Canonical request string and the `;`-joined signed header names.
    pub fn canonical_request(
        &self,
        url: &Url,
        method: &str,
        body: &[u8],
        amz_date: &str,
    ) -> Result<(String, String)> {
        let host = host_header(url)?;
        let mut headers: Vec<(&str, &str)> = vec![("host", host.as_str()), ("x-amz-date", amz_date)];
        if let Some(token) = &self.session_token {
            headers.push(("x-amz-security-token", token.expose().as_str()));
        }
        headers.push(("x-api-key", self.api_key.expose().as_str()));

        let canonical_headers: String = headers.iter().map(|(k, v)| format!("{k}:{v}\n")).collect();
        let signed_headers = headers.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(";");

        let method = method.to_ascii_uppercase();
        let path = if url.path().is_empty() { "/" } else { url.path() };
        let query = canonical_query(url);
        let payload_hash = hex::encode(Sha256::digest(body));

        let canonical = [
            method.as_str(),
            path,
            query.as_str(),
            canonical_headers.as_str(),
            signed_headers.as_str(),
            payload_hash.as_str(),
        ]
        .join("\n");

        Ok((canonical, signed_headers))
    }

    fn signing_key(&self, datestamp: &str) -> Result<Vec<u8>> {
        let mut key = format!("AWS4{}", self.secret_access_key.expose()).into_bytes();
        for part in [datestamp, SIGNING_REGION, SIGNING_SERVICE, SIGNING_SCOPE_SUFFIX] {
            key = hmac(&key, part.as_bytes())?;
        }
        Ok(key)
    }
}

fn credential_scope(datestamp: &str) -> String {
    format!("{datestamp}/{SIGNING_REGION}/{SIGNING_SERVICE}/{SIGNING_SCOPE_SUFFIX}")
}

fn hmac(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| Error::Signing(format!("invalid HMAC key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Host as sent on the wire, including a non-default port.
fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::Signing(format!("url has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Query pairs decoded, re-encoded with the signing alphabet, sorted by key then value.
fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ~`.
fn uri_encode(value: &str) -> String {
    utf8_percent_encode(value, SIGV4).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn signer(session_token: Option<&str>) -> SigV4Signer {
        SigV4Signer::new(&AccessKeyCredentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: Secret::new(SECRET.into()),
            session_token: session_token.map(|t| Secret::new(t.to_string())),
            api_key: Secret::new("apikey".into()),
            api_endpoint: "https://api.example.com/v1".into(),
        })
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn signs_get_without_query() {
        let url = Url::parse("https://api.example.com/v1/documents").unwrap();
        let headers = signer(None)
            .sign_headers_at(&url, "GET", b"", fixed_time())
            .unwrap();

        assert_eq!(headers.amz_date, "20200102T030405Z");
        assert_eq!(headers.api_key, "apikey");
        assert!(headers.security_token.is_none());
        assert_eq!(
            headers.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20200102/eu-west-1/execute-api/aws4_request, \
             SignedHeaders=host;x-amz-date;x-api-key, \
             Signature=31fbbf8e97954d15b4f9c9fec03278ca7a76beb05eb8efd52b948c0bab06f0a9"
        );
    }

    #[test]
    fn signs_post_with_query_body_and_session_token() {
        let url = Url::parse_with_params(
            "https://api.example.com/v1/documents",
            &[("nextToken", "a b/c"), ("maxResults", "10")],
        )
        .unwrap();
        let headers = signer(Some("sess"))
            .sign_headers_at(&url, "POST", br#"{"x":1}"#, fixed_time())
            .unwrap();

        assert_eq!(headers.security_token.as_deref(), Some("sess"));
        assert_eq!(
            headers.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20200102/eu-west-1/execute-api/aws4_request, \
             SignedHeaders=host;x-amz-date;x-amz-security-token;x-api-key, \
             Signature=0957e2d200520dc03c4871768edc75f82ecdb14194823eccaeaccaa42f32b94e"
        );
    }

    #[test]
    fn canonical_request_layout() {
        let url = Url::parse("https://api.example.com/v1/documents").unwrap();
        let (canonical, signed) = signer(None)
            .canonical_request(&url, "get", b"", "20200102T030405Z")
            .unwrap();
        assert_eq!(signed, "host;x-amz-date;x-api-key");
        assert_eq!(
            canonical,
            "GET\n/v1/documents\n\nhost:api.example.com\nx-amz-date:20200102T030405Z\nx-api-key:apikey\n\n\
             host;x-amz-date;x-api-key\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn same_second_is_deterministic_and_body_changes_signature() {
        let url = Url::parse("https://api.example.com/v1/models").unwrap();
        let s = signer(None);
        let a = s.sign_headers_at(&url, "POST", b"{}", fixed_time()).unwrap();
        let b = s.sign_headers_at(&url, "POST", b"{}", fixed_time()).unwrap();
        let c = s.sign_headers_at(&url, "POST", b"{ }", fixed_time()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.authorization, c.authorization);
    }

    #[test]
    fn host_includes_non_default_port() {
        let url = Url::parse("http://127.0.0.1:8080/x").unwrap();
        assert_eq!(host_header(&url).unwrap(), "127.0.0.1:8080");
        let url = Url::parse("https://api.example.com:443/x").unwrap();
        assert_eq!(host_header(&url).unwrap(), "api.example.com");
    }

    #[test]
    fn query_is_sorted_and_encoded() {
        let url = Url::parse("https://h/p?b=2&a=%2F&a=1&c=x+y").unwrap();
        assert_eq!(canonical_query(&url), "a=%2F&a=1&b=2&c=x%20y");
    }

    #[test]
    fn unreserved_characters_stay_literal() {
        assert_eq!(uri_encode("a b/c~-_.Z9"), "a%20b%2Fc~-_.Z9");
        assert_eq!(uri_encode("é+*"), "%C3%A9%2B%2A");
    }

    #[test]
    fn pairs_order_and_optional_token() {
        let url = Url::parse("https://api.example.com/v1").unwrap();
        let names: Vec<_> = signer(Some("t"))
            .sign_headers_at(&url, "GET", b"", fixed_time())
            .unwrap()
            .pairs()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec!["x-amz-date", "x-amz-security-token", "x-api-key", "authorization"]
        );
    }
}
