// Name and version baked in from Cargo.toml; served at /version and sent as the client User-Agent.

pub const NAME: &str = env!("CARGO_PKG_NAME");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `nmtscope/<version>`
pub fn user_agent() -> String {
    format!("{}/{}", NAME, VERSION)
}
