//! County key authorization.
//!
//! A county key is an opaque credential naming an environment variable whose
//! value is a comma-separated list of mail domain suffixes. The key is read
//! from the `countyKey` query parameter first and the `X-County-Key` header
//! second.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;

use crate::error::{ApiError, ApiResult, INVALID_KEY, MISSING_KEY};

/// Header carrying the county key.
pub const COUNTY_KEY_HEADER: &str = "X-County-Key";

/// Query parameter carrying the county key. Takes precedence over the header.
pub const COUNTY_KEY_QUERY: &str = "countyKey";

/// Immutable mapping from county key to its raw suffix list.
#[derive(Clone, Default)]
pub struct CountyKeys {
    entries: HashMap<String, String>,
}

impl CountyKeys {
    /// Snapshots every environment variable as a potential county key.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_prefix("")
    }

    /// Snapshots the environment variables whose name starts with `prefix`.
    ///
    /// Variables that are not valid unicode are skipped.
    #[must_use]
    pub fn from_env_with_prefix(prefix: &str) -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .filter(|(name, _)| name.starts_with(prefix))
            .collect()
    }

    /// Drops the given names, e.g. the service's own configuration variables.
    #[must_use]
    pub fn excluding<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in names {
            self.entries.remove(name);
        }
        self
    }

    /// Returns the raw suffix list configured for `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Key names are credentials.
impl fmt::Debug for CountyKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountyKeys")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CountyKeys {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The county key presented with a request, if any.
///
/// Extraction never fails; a missing key is reported by
/// [`resolve_allowed_suffixes`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CountyCredential(Option<String>);

impl CountyCredential {
    #[must_use]
    pub fn new(key: Option<String>) -> Self {
        Self(key.filter(|k| !k.is_empty()))
    }

    /// Reads the key from the query string, falling back to the header.
    /// Empty values count as absent.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        let from_query = parts.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(name, value)| name == COUNTY_KEY_QUERY && !value.is_empty())
                .map(|(_, value)| value.into_owned())
        });

        let key = from_query.or_else(|| {
            parts
                .headers
                .get(COUNTY_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        });

        Self(key)
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Debug for CountyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.0.is_some() { "[REDACTED]" } else { "None" };
        f.debug_tuple("CountyCredential").field(&shown).finish()
    }
}

impl<S> FromRequestParts<S> for CountyCredential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// Splits a configured suffix list on commas, trimming and lowercasing each
/// entry. Order is preserved.
#[must_use]
pub fn normalize_suffixes(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_lowercase()).collect()
}

/// Trims and lowercases a mail address.
#[must_use]
pub fn normalize_mail(mail: &str) -> String {
    mail.trim().to_lowercase()
}

/// Returns true if `mail` ends with one of `suffixes`, ignoring case and
/// surrounding whitespace. An empty suffix matches every mail.
#[must_use]
pub fn mail_matches_suffixes(mail: &str, suffixes: &[String]) -> bool {
    let mail = normalize_mail(mail);
    suffixes.iter().any(|suffix| mail.ends_with(suffix.as_str()))
}

/// Validates the presented key and returns its normalized suffix list.
///
/// With a target mail, additionally requires the mail to match one of the
/// suffixes.
///
/// # Errors
///
/// - [`ApiError::Unauthorized`] if no key was presented or it is unknown.
/// - [`ApiError::Forbidden`] if `mail` matches none of the suffixes.
pub fn resolve_allowed_suffixes(
    keys: &CountyKeys,
    credential: &CountyCredential,
    mail: Option<&str>,
) -> ApiResult<Vec<String>> {
    let key = credential.key().ok_or(ApiError::Unauthorized(MISSING_KEY))?;
    let raw = keys.lookup(key).ok_or(ApiError::Unauthorized(INVALID_KEY))?;
    let suffixes = normalize_suffixes(raw);

    if let Some(mail) = mail {
        if !mail_matches_suffixes(mail, &suffixes) {
            return Err(ApiError::Forbidden {
                mail: normalize_mail(mail),
                allowed_suffixes: suffixes,
            });
        }
    }

    Ok(suffixes)
}
