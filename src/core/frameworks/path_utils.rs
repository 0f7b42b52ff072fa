// src/core/frameworks/path_utils.rs
//! URL path helpers shared by all framework adapters.

/// Normalize a route path: ensure a leading `/`, strip one trailing `/`.
/// The empty path stays empty.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    if normalized.ends_with('/') {
        normalized.pop();
    }

    normalized
}

/// Combine a base path with a method path. Both sides are expected to be
/// normalized already, so plain concatenation never produces a double slash.
pub fn combine(base_path: &str, path: &str) -> String {
    if path.is_empty() {
        return base_path.to_string();
    }
    if base_path.is_empty() {
        return path.to_string();
    }

    format!("{}{}", base_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("users"), "/users");
        assert_eq!(normalize("/users"), "/users");
        assert_eq!(normalize("users/"), "/users");
        assert_eq!(normalize("/users/"), "/users");
        assert_eq!(normalize("{id}"), "/{id}");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["", "users", "/users", "users/", "/a/b/c/", "{id}"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_combine() {
        assert_eq!(combine("", "/b"), "/b");
        assert_eq!(combine("/a", ""), "/a");
        assert_eq!(combine("/a", "/b"), "/a/b");
        assert_eq!(combine("", ""), "");
    }
}
