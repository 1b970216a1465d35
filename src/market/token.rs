use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Debug, Display};

/// Opaque token identifier. Two tokens are the same token iff their addresses are equal.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAddress(String);

impl TokenAddress {
    pub fn new<S: Into<String>>(address: S) -> Self {
        TokenAddress(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // For testing purposes
    pub fn repeat_byte(byte: u8) -> TokenAddress {
        let mut address = String::with_capacity(42);
        address.push_str("0x");
        for _ in 0..20 {
            address.push_str(&format!("{byte:02x}"));
        }
        TokenAddress(address)
    }
}

impl Display for TokenAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for TokenAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenAddress({})", self.0)
    }
}

impl From<&str> for TokenAddress {
    fn from(address: &str) -> Self {
        TokenAddress(address.to_string())
    }
}

impl From<String> for TokenAddress {
    fn from(address: String) -> Self {
        TokenAddress(address)
    }
}

impl Borrow<str> for TokenAddress {
    fn borrow(&self) -> &str {
        &self.0
    }
}
