//! Rate-limit key derivation for inbound requests.

use actix_web::dev::ServiceRequest;

use floodgate_core::domain::{DEFAULT_KEY_PREFIX, client_key};

/// Maps a request to the key its admission events are counted under.
///
/// Closures `Fn(&ServiceRequest) -> String` implement this, so a route can
/// partition by API key, user or path without a dedicated type.
pub trait KeyExtractor: Send + Sync {
    fn extract(&self, req: &ServiceRequest) -> String;
}

impl<F> KeyExtractor for F
where
    F: Fn(&ServiceRequest) -> String + Send + Sync,
{
    fn extract(&self, req: &ServiceRequest) -> String {
        self(req)
    }
}

/// Keys requests by client network address: `<prefix>:<addr>`.
#[derive(Debug, Clone)]
pub struct ClientAddrKey {
    prefix: String,
    trust_forwarded: bool,
}

impl ClientAddrKey {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            trust_forwarded: false,
        }
    }

    /// Take the address from `Forwarded` / `X-Forwarded-For` when present.
    /// Only safe behind a proxy that overwrites those headers.
    pub fn trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

impl Default for ClientAddrKey {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl KeyExtractor for ClientAddrKey {
    fn extract(&self, req: &ServiceRequest) -> String {
        if self.trust_forwarded {
            let info = req.connection_info();
            return client_key(&self.prefix, info.realip_remote_addr().unwrap_or("unknown"));
        }

        match req.peer_addr() {
            Some(addr) => client_key(&self.prefix, &addr.ip().to_string()),
            None => client_key(&self.prefix, "unknown"),
        }
    }
}

/// One caller-supplied key for every request through the middleware.
#[derive(Debug, Clone)]
pub struct FixedKey(pub String);

impl KeyExtractor for FixedKey {
    fn extract(&self, _req: &ServiceRequest) -> String {
        self.0.clone()
    }
}
