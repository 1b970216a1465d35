use super::token::TokenAddress;
use serde::{Deserialize, Serialize};
use sha2::digest::Update;
use sha2::{Digest, Sha256};
use std::fmt::{Debug, Display};

/// Canonical identifier of a trading pair. The endpoints are sorted before hashing,
/// so `PairId::new(a, b) == PairId::new(b, a)`.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PairId(pub [u8; 32]);

impl PairId {
    pub fn new(a: &TokenAddress, b: &TokenAddress) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };

        let mut hasher = Sha256::new();
        Update::update(&mut hasher, first.as_str().as_bytes());
        // separator keeps ("ab", "c") and ("a", "bc") apart
        Update::update(&mut hasher, b"/");
        Update::update(&mut hasher, second.as_str().as_bytes());

        let hash_slice: [u8; 32] = hasher.finalize().into();
        PairId(hash_slice)
    }

    fn encode_prefixed(&self) -> String {
        let mut encoded = String::with_capacity(66);
        encoded.push_str("0x");
        for byte in self.0.iter() {
            encoded.push_str(&format!("{byte:02x}"));
        }
        encoded
    }

    fn decode(s: &str) -> Result<Self, String> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 64 {
            return Err(format!("invalid pair id length: {}", s.len()));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|e| format!("invalid pair id: {e}"))?;
        }
        Ok(PairId(bytes))
    }
}

impl Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode_prefixed())
    }
}

impl Debug for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PairId({})", self.encode_prefixed())
    }
}

impl From<[u8; 32]> for PairId {
    fn from(hash: [u8; 32]) -> Self {
        PairId(hash)
    }
}

impl Serialize for PairId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode_prefixed())
    }
}

impl<'de> Deserialize<'de> for PairId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PairId::decode(&s).map_err(serde::de::Error::custom)
    }
}
