// Cache key construction.
// Builds namespace-qualified keys from a root id and a version id.

/// Build the cache key for a root entity at a given version.
pub fn cache_key(namespace: &str, root_id: &str, version_id: &str) -> String {
    format!("{}:{}:{}", namespace, root_id, version_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("warmup", "form-1", "v3"), "warmup:form-1:v3");
    }

    #[test]
    fn test_versions_get_distinct_keys() {
        assert_ne!(
            cache_key("warmup", "form-1", "v1"),
            cache_key("warmup", "form-1", "v2")
        );
        assert_ne!(
            cache_key("warmup", "form-1", "v1"),
            cache_key("other", "form-1", "v1")
        );
    }
}
