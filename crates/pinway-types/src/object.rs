use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use cid::multibase::{self, Base};
use cid::{Cid, Version};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Content identifier for any object held by the storage node.
///
/// A `ContentId` wraps a CID: a self-describing multihash, optionally tagged
/// with a version and codec. Two identifiers are equal exactly when their
/// binary encodings are equal. The canonical text form is base58btc: CIDv0
/// renders as bare base-58 (`Qm...`), CIDv1 with the `z` multibase prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(Cid);

impl ContentId {
    /// Parse a textual identifier.
    ///
    /// Accepts CIDv0 base-58 strings and CIDv1 strings in any multibase.
    /// Rejects empty input, foreign characters, bad multihash headers and
    /// trailing data after the encoded CID.
    pub fn decode(text: &str) -> Result<Self, TypeError> {
        if text.is_empty() {
            return Err(TypeError::InvalidIdentifier("empty identifier".into()));
        }
        let cid = Cid::try_from(text)
            .map_err(|e| TypeError::InvalidIdentifier(format!("{text}: {e}")))?;

        // The cid parser skips anything up to an `/ipfs/` delimiter, so the
        // whole text must re-encode (v0) or decode (v1) to exactly this CID.
        match cid.version() {
            Version::V0 => {
                if cid.to_string() != text {
                    return Err(TypeError::InvalidIdentifier(format!(
                        "{text}: not a bare base-58 identifier"
                    )));
                }
            }
            Version::V1 => {
                let (_, raw) = multibase::decode(text)
                    .map_err(|e| TypeError::InvalidIdentifier(format!("{text}: {e}")))?;
                if raw != cid.to_bytes() {
                    return Err(TypeError::InvalidIdentifier(format!(
                        "{text}: trailing data after identifier"
                    )));
                }
            }
        }
        Ok(Self(cid))
    }

    /// Canonical base58btc text form.
    pub fn encode(&self) -> String {
        match self.0.version() {
            // CIDv0 has exactly one text form: bare base-58.
            Version::V0 => self.0.to_string(),
            Version::V1 => multibase::encode(Base::Base58Btc, self.0.to_bytes()),
        }
    }

    /// Parse the binary form of a CID.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let cid = Cid::try_from(bytes)
            .map_err(|e| TypeError::InvalidIdentifier(e.to_string()))?;
        if cid.to_bytes().len() != bytes.len() {
            return Err(TypeError::InvalidIdentifier(
                "trailing data after identifier".into(),
            ));
        }
        Ok(Self(cid))
    }

    /// The binary form of the identifier.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    pub fn version(&self) -> Version {
        self.0.version()
    }

    pub fn as_cid(&self) -> &Cid {
        &self.0
    }
}

impl From<Cid> for ContentId {
    fn from(cid: Cid) -> Self {
        Self(cid)
    }
}

impl From<ContentId> for Cid {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

impl FromStr for ContentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl PartialOrd for ContentId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ContentId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.encode())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::decode(&text).map_err(serde::de::Error::custom)
    }
}

/// A named payload submitted for storage.
///
/// Lives only for the duration of one upload; retention is the storage
/// node's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub name: Option<String>,
    pub bytes: bytes::Bytes,
}

impl StoredObject {
    pub fn new(bytes: impl Into<bytes::Bytes>) -> Self {
        Self {
            name: None,
            bytes: bytes.into(),
        }
    }

    pub fn named(name: impl Into<String>, bytes: impl Into<bytes::Bytes>) -> Self {
        Self {
            name: Some(name.into()),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Name for log lines; `"unknown"` when the upload carried none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }
}
