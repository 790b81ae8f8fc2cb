use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;

// Alternatives are tried in order: version, then commit, then branch or tag.
static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:(\d+(?:\.\d+){2}(?:-[^/]+)?)|sha-([^/]+)|([^/]+))$")
        .expect("path pattern is a valid regex")
});

/// A point in the upstream history, as requested by a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// Semantic version such as `1.2.3` or `1.2.3-beta.1`
    Version(String),
    /// Commit id, requested as `sha-{id}`
    Commit(String),
    BranchOrTag(String),
}

impl Reference {
    /// Classifies a request path of the form `/{ref}`.
    ///
    /// The path is percent-decoded first. Returns `None` when the decoded path
    /// is not exactly one non-empty segment, or when that segment is `.` or
    /// `..`, which cannot be placed in an upstream URL.
    pub fn parse(path: &str) -> Option<Reference> {
        let decoded = percent_decode_str(path).decode_utf8().ok()?;
        if matches!(decoded.as_ref(), "/." | "/..") {
            return None;
        }
        let captures = PATH_PATTERN.captures(&decoded)?;

        if let Some(version) = captures.get(1) {
            Some(Reference::Version(version.as_str().to_string()))
        } else if let Some(commit) = captures.get(2) {
            Some(Reference::Commit(commit.as_str().to_string()))
        } else {
            captures
                .get(3)
                .map(|name| Reference::BranchOrTag(name.as_str().to_string()))
        }
    }

    /// The ref name as it appears in the upstream repository.
    pub fn upstream_ref(&self) -> String {
        match self {
            Reference::Version(version) => format!("v{version}"),
            Reference::Commit(id) => id.clone(),
            Reference::BranchOrTag(name) => name.clone(),
        }
    }

    /// Only released versions are immutable upstream. Everything else is
    /// redirected instead of cached.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Reference::Version(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!(
            Reference::parse("/1.2.3"),
            Some(Reference::Version("1.2.3".into()))
        );
        assert_eq!(
            Reference::parse("/10.20.30-beta.1"),
            Some(Reference::Version("10.20.30-beta.1".into()))
        );
        assert_eq!(
            Reference::parse("/1.2.3").map(|r| r.upstream_ref()),
            Some("v1.2.3".into())
        );
    }

    #[test]
    fn test_parse_commits() {
        assert_eq!(
            Reference::parse("/sha-abc123"),
            Some(Reference::Commit("abc123".into()))
        );
        assert_eq!(
            Reference::parse("/sha-abc123").map(|r| r.upstream_ref()),
            Some("abc123".into())
        );
    }

    #[test]
    fn test_parse_branches_and_tags() {
        for path in ["/main", "/1.2", "/1.2.3-", "/sha-", "/v1.2.3", "/1.2.3.4"] {
            assert_eq!(
                Reference::parse(path),
                Some(Reference::BranchOrTag(path[1..].into())),
                "{path}"
            );
        }
    }

    #[test]
    fn test_parse_unmatched() {
        for path in [
            "",
            "/",
            "//",
            "/a/b",
            "/main/",
            "main",
            "/feature%2Fx",
            "/.",
            "/..",
            "/%2e",
            "/%2e%2e",
            "/.%2E",
        ] {
            assert_eq!(Reference::parse(path), None, "{path}");
        }
    }

    #[test]
    fn test_parse_decodes_path() {
        assert_eq!(
            Reference::parse("/release%20candidate"),
            Some(Reference::BranchOrTag("release candidate".into()))
        );
        // invalid utf-8 after decoding
        assert_eq!(Reference::parse("/%ff"), None);
    }

    #[test]
    fn test_is_cacheable() {
        assert!(Reference::Version("1.2.3".into()).is_cacheable());
        assert!(!Reference::Commit("abc".into()).is_cacheable());
        assert!(!Reference::BranchOrTag("main".into()).is_cacheable());
    }
}
