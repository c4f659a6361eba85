//! Virtual-host root selection.
//!
//! Requests reach the server three ways, and each is treated differently:
//!
//! - `Host` equals the canonical hostname: serve the default root.
//! - `Host` ends with the canonical hostname: match configured subdomains,
//!   redirecting to the canonical subdomain form when enabled.
//! - Anything else (a bare IP, an unrelated name): serve the default root.

use std::path::PathBuf;

use crate::config::SiteConfig;

/// Outcome of root selection for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSelection {
    /// Serve static content from this root.
    Serve(PathBuf),
    /// No root applies; the response is left as the handlers made it.
    Unrooted,
    /// Send the client to `location` with 303 See Other.
    Redirect { location: String },
}

impl RootSelection {
    fn from_root(root: Option<&PathBuf>) -> Self {
        root.cloned()
            .map(RootSelection::Serve)
            .unwrap_or(RootSelection::Unrooted)
    }
}

/// Picks the root that should serve a request for `uri` on `host`.
pub fn select_root(host: &str, uri: &str, site: &SiteConfig) -> RootSelection {
    let default_root = site.default_root.as_ref();

    let Some(hostname) = site.hostname.as_deref() else {
        return RootSelection::from_root(default_root);
    };

    if host == hostname {
        return RootSelection::from_root(default_root);
    }

    if !host.ends_with(hostname) {
        return RootSelection::from_root(default_root);
    }

    let (label, root) = match match_subdomain(host, hostname, site) {
        Some((label, root)) => (label, Some(root)),
        None => ("", default_root),
    };

    let canonical = format!("{}{}", label, hostname);
    if !site.redirect_to_matched_subdomain || canonical == host {
        return RootSelection::from_root(root);
    }

    RootSelection::Redirect {
        location: format!("//{}{}", canonical, uri),
    }
}

/// Finds the configured subdomain covering the most labels of `host`.
///
/// Candidates start after each `.` left of the hostname, outermost first,
/// and run up to the hostname, keeping their trailing dot: for
/// `a.images.example.test` they are `a.images.` and `images.`. A candidate
/// matches a key when it equals `key + "."`. Returns the matched label
/// with its dot and the root it maps to.
fn match_subdomain<'a>(
    host: &'a str,
    hostname: &str,
    site: &'a SiteConfig,
) -> Option<(&'a str, &'a PathBuf)> {
    let domain_start = host.len() - hostname.len();

    let starts = std::iter::once(0).chain(
        host.match_indices('.')
            .map(|(i, _)| i + 1),
    );

    for start in starts {
        if start >= domain_start {
            break;
        }

        let candidate = &host[start..domain_start];
        let Some(label) = candidate.strip_suffix('.') else {
            continue;
        };

        if let Some(root) = site.subdomain_roots.get(label) {
            return Some((candidate, root));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            default_root: Some(PathBuf::from("./www")),
            hostname: Some("example.test".to_string()),
            subdomain_roots: [
                ("images".to_string(), PathBuf::from("./img")),
                ("images.other".to_string(), PathBuf::from("./other-img")),
            ]
            .into_iter()
            .collect(),
            redirect_to_matched_subdomain: true,
        }
    }

    #[test]
    fn longest_configured_subdomain_wins() {
        let site = site();
        let (label, root) = match_subdomain("images.other.example.test", "example.test", &site).unwrap();

        assert_eq!(label, "images.other.");
        assert_eq!(root, &PathBuf::from("./other-img"));
    }

    #[test]
    fn outer_labels_are_skipped_until_a_match() {
        let site = site();
        let (label, _) = match_subdomain("x.y.images.example.test", "example.test", &site).unwrap();
        assert_eq!(label, "images.");
    }

    #[test]
    fn glued_prefix_is_not_a_subdomain() {
        let site = site();
        assert!(match_subdomain("imagesexample.test", "example.test", &site).is_none());
    }
}
