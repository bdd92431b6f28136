//! URL utilities for consistent endpoint construction.

/// Normalize a base URL by removing trailing slashes so endpoint joining
/// never produces double slashes.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path.
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        assert_eq!(
            normalize_base_url("https://api.tosca.app/v1/"),
            "https://api.tosca.app/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.tosca.app/v1///"),
            "https://api.tosca.app/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.tosca.app/v1"),
            "https://api.tosca.app/v1"
        );
    }

    #[test]
    fn endpoints_join_without_double_slashes() {
        assert_eq!(
            construct_api_url("https://api.tosca.app/v1/", "/generate-image"),
            "https://api.tosca.app/v1/generate-image"
        );
        assert_eq!(
            construct_api_url("https://api.tosca.app/v1", "chat"),
            "https://api.tosca.app/v1/chat"
        );
    }
}
