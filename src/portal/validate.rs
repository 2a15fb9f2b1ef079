//! Link validation against the configured host and extension allow-lists

use crate::config::PortalConfig;

use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkRejection {
    #[error("link is empty")]
    Empty,

    #[error("not an absolute http(s) URL")]
    Malformed,

    #[error("host {0} is not allowed")]
    HostNotAllowed(String),

    #[error("path must end with one of the allowed extensions")]
    ExtensionNotAllowed,
}

/// Allow-lists applied to submitted links
#[derive(Debug, Clone)]
pub struct LinkPolicy {
    hosts: Vec<String>,
    extensions: Vec<String>,
}

impl LinkPolicy {
    pub fn new<H, E>(hosts: H, extensions: E) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(&config.allowed_hosts, &config.allowed_extensions)
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    fn host_allowed(&self, host: &str) -> bool {
        self.hosts.iter().any(|allowed| {
            host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .map_or(false, |prefix| prefix.ends_with('.'))
        })
    }

    fn extension_allowed(&self, path: &str) -> bool {
        let path = path.to_ascii_lowercase();
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }
}

/// Check a submitted link. Hosts match exactly or as a parent domain, so
/// `media.giphy.com` passes for `giphy.com` while `notgiphy.com` does not.
pub fn validate_link(link: &str, policy: &LinkPolicy) -> Result<(), LinkRejection> {
    if link.is_empty() {
        return Err(LinkRejection::Empty);
    }

    let parsed = Url::parse(link).map_err(|_| LinkRejection::Malformed)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LinkRejection::Malformed);
    }

    // Url lower-cases the host for special schemes
    let host = parsed.host_str().ok_or(LinkRejection::Malformed)?;
    if !policy.host_allowed(host) {
        return Err(LinkRejection::HostNotAllowed(host.to_string()));
    }

    if !policy.extension_allowed(parsed.path()) {
        return Err(LinkRejection::ExtensionNotAllowed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn giphy() -> LinkPolicy {
        LinkPolicy::new(["giphy.com"], [".gif"])
    }

    #[test]
    fn test_accepts_giphy_links() {
        let policy = giphy();
        assert_eq!(
            validate_link("https://media.giphy.com/media/abc/giphy.gif", &policy),
            Ok(())
        );
        assert_eq!(validate_link("https://giphy.com/x.GIF", &policy), Ok(()));
        assert_eq!(
            validate_link("https://MEDIA.GIPHY.COM/media/abc/giphy.gif?cid=1", &policy),
            Ok(())
        );
    }

    #[test]
    fn test_rejections() {
        let policy = giphy();
        assert_eq!(validate_link("", &policy), Err(LinkRejection::Empty));
        assert_eq!(validate_link("giphy.gif", &policy), Err(LinkRejection::Malformed));
        assert_eq!(
            validate_link("ftp://media.giphy.com/a.gif", &policy),
            Err(LinkRejection::Malformed)
        );
        assert_eq!(
            validate_link("https://example.com/x.gif", &policy),
            Err(LinkRejection::HostNotAllowed("example.com".to_string()))
        );
        assert_eq!(
            validate_link("https://notgiphy.com/x.gif", &policy),
            Err(LinkRejection::HostNotAllowed("notgiphy.com".to_string()))
        );
        assert_eq!(
            validate_link("https://media.giphy.com/media/abc/giphy.mp4", &policy),
            Err(LinkRejection::ExtensionNotAllowed)
        );
    }
}
