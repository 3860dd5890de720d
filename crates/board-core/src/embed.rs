//! Embedded web content boundary.
//!
//! Turning a pasted URL into something a frame can show is delegated to an
//! [`EmbedNormalizer`]. The board always stores the raw URL; normalization is
//! applied at render time and must be pure.

use url::Url;

/// Outcome of normalizing a raw URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    Embeddable(String),
    Unsupported,
}

pub trait EmbedNormalizer {
    fn normalize(&self, raw: &str) -> Embed;
}

/// Passes every non-blank URL through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl EmbedNormalizer for IdentityNormalizer {
    fn normalize(&self, raw: &str) -> Embed {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Embed::Unsupported
        } else {
            Embed::Embeddable(trimmed.to_string())
        }
    }
}

/// What the host learned about a frame after it tried to load.
/// Unknown counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedLoadState {
    Loaded,
    Blocked,
    #[default]
    Unknown,
}

/// Affordance shown in place of a frame the target site refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedFallback {
    pub domain: String,
    pub open_url: String,
}

/// Host name of `raw`, or `raw` itself when it does not parse as a URL.
pub fn domain_of(raw: &str) -> String {
    Url::parse(raw.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| raw.to_string())
}

pub fn fallback_for(raw: &str, state: EmbedLoadState) -> Option<EmbedFallback> {
    match state {
        EmbedLoadState::Blocked => Some(EmbedFallback {
            domain: domain_of(raw),
            open_url: raw.trim().to_string(),
        }),
        EmbedLoadState::Loaded | EmbedLoadState::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_url() {
        let n = IdentityNormalizer;
        assert_eq!(
            n.normalize(" https://example.com/a "),
            Embed::Embeddable("https://example.com/a".into())
        );
        assert_eq!(n.normalize("   "), Embed::Unsupported);
    }

    #[test]
    fn fallback_only_when_blocked() {
        let url = "https://www.example.org/page?q=1";
        assert_eq!(fallback_for(url, EmbedLoadState::Unknown), None);
        assert_eq!(fallback_for(url, EmbedLoadState::Loaded), None);
        assert_eq!(
            fallback_for(url, EmbedLoadState::Blocked),
            Some(EmbedFallback {
                domain: "www.example.org".into(),
                open_url: url.into(),
            })
        );
    }

    #[test]
    fn unparsable_domain_falls_back_to_input() {
        assert_eq!(domain_of("not a url"), "not a url");
    }
}
