// crates/engine/src/record.rs
use serde::{Serialize, Serializer};
use std::fmt;

/// Four-part assembly version (`major.minor.build.revision`).
///
/// Field order matters: the derived `Ord` compares major first, then minor,
/// build and revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssemblyVersion {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl AssemblyVersion {
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl Serialize for AssemblyVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Eight-byte strong-name token, or nothing for unsigned assemblies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PublicKeyToken(Option<[u8; 8]>);

impl PublicKeyToken {
    pub const EMPTY: Self = Self(None);

    #[must_use]
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(Some(bytes))
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.0 {
            Some(bytes) => bytes,
            None => &[],
        }
    }
}

impl fmt::Display for PublicKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_bytes()))
    }
}

impl Serialize for PublicKeyToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identity read from a module's Assembly table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyIdentity {
    pub name: String,
    pub version: AssemblyVersion,
    pub public_key_token: PublicKeyToken,
    /// Empty for culture-neutral assemblies.
    pub culture: String,
}

/// One row per scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadataRecord {
    pub name: String,
    pub version: AssemblyVersion,
    pub public_key_token: PublicKeyToken,
    pub culture: String,
    #[serde(rename = "path")]
    pub relative_path: String,
    #[serde(skip)]
    pub is_error: bool,
}

impl FileMetadataRecord {
    #[must_use]
    pub fn from_identity(identity: AssemblyIdentity, relative_path: String) -> Self {
        Self {
            name: identity.name,
            version: identity.version,
            public_key_token: identity.public_key_token,
            culture: identity.culture,
            relative_path,
            is_error: false,
        }
    }

    /// Record for a file whose metadata could not be read.
    #[must_use]
    pub fn failed(relative_path: String) -> Self {
        Self {
            name: String::new(),
            version: AssemblyVersion::default(),
            public_key_token: PublicKeyToken::EMPTY,
            culture: String::new(),
            relative_path,
            is_error: true,
        }
    }
}
