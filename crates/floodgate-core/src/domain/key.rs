//! Rate-limit key derivation.

/// Namespace used for keys derived from the client address.
pub const DEFAULT_KEY_PREFIX: &str = "rate_limit";

/// Key for a client network address, e.g. `rate_limit:10.0.0.7`.
pub fn client_key(prefix: &str, addr: &str) -> String {
    format!("{prefix}:{addr}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key() {
        assert_eq!(client_key(DEFAULT_KEY_PREFIX, "127.0.0.1"), "rate_limit:127.0.0.1");
        assert_eq!(client_key("auth", "::1"), "auth:::1");
    }
}
