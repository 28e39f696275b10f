//! Path composition for nested route groups.
//!
//! # Responsibilities
//! - Normalize path templates (collapse repeated `/`, strip trailing `/`)
//! - Join ancestor group segments with a route segment
//! - Extract `:name` parameters from a template
//!
//! # Design Decisions
//! - Segments are concatenated verbatim before normalizing, so
//!   `"/api"` + `"users"` yields `/apiusers` exactly as the host router would
//! - No regex: a single linear scan per operation

/// The root path.
pub const ROOT: &str = "/";

/// Collapse consecutive separators and strip a trailing separator.
///
/// An empty result becomes [`ROOT`]. The function is idempotent.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_was_separator = false;

    for ch in path.chars() {
        if ch == '/' {
            if !previous_was_separator {
                out.push(ch);
            }
            previous_was_separator = true;
        } else {
            out.push(ch);
            previous_was_separator = false;
        }
    }

    if out.ends_with('/') {
        out.pop();
    }

    if out.is_empty() {
        ROOT.to_string()
    } else {
        out
    }
}

/// Join `ancestors` (root first) and `segment`, then normalize.
pub fn compose_path<S: AsRef<str>>(ancestors: &[S], segment: &str) -> String {
    let mut joined = String::new();
    for ancestor in ancestors {
        joined.push_str(ancestor.as_ref());
    }
    joined.push_str(segment);
    normalize(&joined)
}

/// Extract every `:name` token in declaration order, without duplicates.
///
/// A name is a run of ASCII alphanumerics or `_` following the colon.
pub fn extract_params(path: &str) -> Vec<String> {
    let mut params: Vec<String> = Vec::new();
    let mut chars = path.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if ch != ':' {
            continue;
        }

        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }

        if !name.is_empty() && !params.contains(&name) {
            params.push(name);
        }
    }

    params
}

/// True when `path` lies under `prefix`, compared segment by segment.
///
/// `:param` segments in the prefix match any single segment.
pub fn has_prefix(path: &str, prefix: &str) -> bool {
    if prefix == ROOT {
        return true;
    }

    let mut path_segments = path.split('/').filter(|s| !s.is_empty());
    for expected in prefix.split('/').filter(|s| !s.is_empty()) {
        match path_segments.next() {
            Some(actual) if expected.starts_with(':') || expected == actual => {}
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_and_strips() {
        assert_eq!(normalize("/api//user/"), "/api/user");
        assert_eq!(normalize("//"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/api/user"), "/api/user");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["/a//b///c/", "/", "x//", "/:id//posts/", "////"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_compose_path_ancestors_first() {
        assert_eq!(compose_path(&["/api", "/v1"], "/users/"), "/api/v1/users");
        assert_eq!(compose_path(&["/api/"], "/"), "/api");
        assert_eq!(compose_path::<&str>(&[], "/"), "/");
        // Plain concatenation, no implicit separator.
        assert_eq!(compose_path(&["/api"], "users"), "/apiusers");
    }

    #[test]
    fn test_extract_params_in_order() {
        assert_eq!(extract_params("/user/:id/post/:postId"), vec!["id", "postId"]);
        assert_eq!(extract_params("/a/:x/b/:x"), vec!["x"]);
        assert!(extract_params("/static/path").is_empty());
        assert!(extract_params("/odd/:/path").is_empty());
    }

    #[test]
    fn test_has_prefix_segment_wise() {
        assert!(has_prefix("/api/users", "/api"));
        assert!(has_prefix("/api", "/api"));
        assert!(!has_prefix("/apiary", "/api"));
        assert!(has_prefix("/users/42/posts", "/users/:id"));
        assert!(has_prefix("/anything", "/"));
    }
}
