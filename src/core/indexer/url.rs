//! URL canonicalization.

use crate::core::error::{HisterError, Result};
use url::Url;

/// A canonical page URL and the domain derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    pub url: String,
    pub domain: String,
}

/// Canonicalize a submitted URL.
///
/// The URL must have a scheme and a host. The fragment is removed, as are
/// `utm` and `utm_*` query parameters; other parameters keep their order.
pub fn canonicalize(raw: &str) -> Result<CanonicalUrl> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(HisterError::MissingField("url".to_string()));
    }

    let mut parsed = Url::parse(raw).map_err(|e| HisterError::InvalidUrl(format!("{raw}: {e}")))?;

    let Some(host) = parsed.host_str().filter(|h| !h.is_empty()) else {
        return Err(HisterError::InvalidUrl(format!(
            "{raw}: missing scheme/host"
        )));
    };
    let domain = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    parsed.set_fragment(None);

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let kept: Vec<&(String, String)> = pairs.iter().filter(|(k, _)| !is_tracking(k)).collect();

    if kept.len() != pairs.len() {
        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    Ok(CanonicalUrl {
        url: parsed.to_string(),
        domain,
    })
}

/// Resolve `href` against `base`; `data:` URIs are returned as is
pub fn resolve(base: &str, href: &str) -> Option<String> {
    if href.starts_with("data:") {
        return Some(href.to_string());
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

fn is_tracking(key: &str) -> bool {
    key == "utm" || key.starts_with("utm_")
}
