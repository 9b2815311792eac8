/// Settings the server core reads at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Upstream `host:port`; empty means answer locally.
    pub resolver: String,
}

impl ServerConfig {
    pub fn new(resolver: impl Into<String>) -> Self {
        ServerConfig {
            resolver: resolver.into(),
        }
    }

    pub fn should_forward(&self) -> bool {
        !self.resolver.is_empty()
    }
}
