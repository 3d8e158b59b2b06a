//! Engine configuration

use crate::value::{PropertyKey, Symbol, METADATA_SYMBOL_DESCRIPTION};

/// Environment variable forcing the registered metadata key
pub const LEGACY_METADATA_KEY_ENV: &str = "DECORATORS_LEGACY_METADATA_KEY";

/// Options for a decoration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Whether the host provides the well-known metadata symbol.
    ///
    /// When it does not, metadata is stored under the registered symbol
    /// `Symbol.for("Symbol.metadata")`.
    pub native_metadata_symbol: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            native_metadata_symbol: true,
        }
    }
}

impl EngineOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from the process environment
    pub fn from_env() -> Self {
        let legacy = std::env::var(LEGACY_METADATA_KEY_ENV)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);
        Self {
            native_metadata_symbol: !legacy,
        }
    }

    /// Set whether the well-known metadata symbol is available
    pub fn with_native_metadata_symbol(mut self, available: bool) -> Self {
        self.native_metadata_symbol = available;
        self
    }

    /// Key under which a construct's metadata carrier is stored
    pub fn metadata_key(&self) -> PropertyKey {
        if self.native_metadata_symbol {
            PropertyKey::Symbol(Symbol::metadata())
        } else {
            PropertyKey::Symbol(Symbol::for_key(METADATA_SYMBOL_DESCRIPTION))
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    let raw = raw.trim();
    raw == "1" || raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("yes")
}
