//! Target origin handling.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// A validated `X-WebDAV-Target` header value.
///
/// Names the remote WebDAV server as scheme + host (+ optional port). The
/// raw header value is kept verbatim so error responses can echo exactly
/// what the caller sent; a single trailing slash is tolerated and stripped
/// when composing upstream URLs.
///
/// # Examples
///
/// ```
/// use davbridge_proxy::TargetOrigin;
/// use std::str::FromStr;
///
/// let target = TargetOrigin::from_str("https://dav.example.com/").unwrap();
/// let url = target.upstream_url("/a/b.txt").unwrap();
/// assert_eq!(url.as_str(), "https://dav.example.com/a/b.txt");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetOrigin {
    raw: String,
    host: String,
}

/// Errors that can occur parsing a target origin or composing an upstream URL.
#[derive(Debug, Error)]
pub enum TargetOriginError {
    /// The header value was empty.
    #[error("target origin cannot be empty")]
    Empty,

    /// The value is not a parsable absolute URL.
    #[error("invalid target origin `{raw}`: {source}")]
    Invalid {
        /// The offending value.
        raw: String,
        /// The underlying parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The value uses a scheme other than http or https.
    #[error("unsupported target scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),

    /// The value has no host component.
    #[error("target origin `{0}` has no host")]
    MissingHost(String),
}

impl TargetOrigin {
    /// The header value exactly as the caller sent it (whitespace trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The `host[:port]` to synthesize as the upstream `host` header.
    ///
    /// The port is included only when it was explicit and non-default,
    /// matching URL `host` semantics.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Compose the absolute upstream URL for an already prefix-stripped path.
    pub fn upstream_url(&self, path: &str) -> Result<Url, TargetOriginError> {
        let base = self.raw.strip_suffix('/').unwrap_or(&self.raw);
        let joined = format!("{base}{path}");
        Url::parse(&joined).map_err(|source| TargetOriginError::Invalid { raw: joined, source })
    }
}

impl FromStr for TargetOrigin {
    type Err = TargetOriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(TargetOriginError::Empty);
        }

        let url = Url::parse(raw).map_err(|source| TargetOriginError::Invalid {
            raw: raw.to_string(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(TargetOriginError::UnsupportedScheme(other.to_string())),
        }

        let host_str = url
            .host_str()
            .ok_or_else(|| TargetOriginError::MissingHost(raw.to_string()))?;

        let host = match url.port() {
            Some(port) => format!("{host_str}:{port}"),
            None => host_str.to_string(),
        };

        Ok(Self {
            raw: raw.to_string(),
            host,
        })
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheme_host_and_port() {
        let target = TargetOrigin::from_str("http://127.0.0.1:8080").unwrap();
        assert_eq!(target.host(), "127.0.0.1:8080");
        assert_eq!(target.as_str(), "http://127.0.0.1:8080");
    }

    #[test]
    fn elides_default_port_from_host() {
        let target = TargetOrigin::from_str("https://dav.example.com:443").unwrap();
        assert_eq!(target.host(), "dav.example.com");
    }

    #[test]
    fn strips_single_trailing_slash_when_composing() {
        let target = TargetOrigin::from_str("https://dav.example.com/").unwrap();
        let url = target.upstream_url("/a/b.txt").unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com/a/b.txt");
    }

    #[test]
    fn composes_without_trailing_slash_too() {
        let target = TargetOrigin::from_str("https://dav.example.com").unwrap();
        let url = target.upstream_url("/a/b.txt").unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com/a/b.txt");
    }

    #[test]
    fn preserves_path_prefix_on_the_origin() {
        let target = TargetOrigin::from_str("https://dav.example.com/remote.php/dav/").unwrap();
        let url = target.upstream_url("/notes.txt").unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com/remote.php/dav/notes.txt");
    }

    #[test]
    fn rejects_empty_values() {
        assert!(matches!(
            TargetOrigin::from_str("   "),
            Err(TargetOriginError::Empty)
        ));
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(matches!(
            TargetOrigin::from_str("ftp://dav.example.com"),
            Err(TargetOriginError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn rejects_values_that_are_not_urls() {
        assert!(matches!(
            TargetOrigin::from_str("not a url"),
            Err(TargetOriginError::Invalid { .. })
        ));
    }
}
