//! Extension manifest declaration and validation.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity an extension declares to the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionManifest {
    /// Stable identifier, e.g. `homes.core`.
    pub id: String,
    /// Semantic version string (`major.minor.patch`).
    pub version: String,
}

impl ExtensionManifest {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    /// Checks the id and version before the kernel accepts the extension.
    ///
    /// Ids are lowercase ASCII words joined by single `.`, `_` or `-`
    /// separators. Versions are `major.minor.patch` with numeric parts.
    pub fn validate(&self) -> Result<(), ManifestValidationError> {
        let id = self.id.trim();
        let version = self.version.trim();
        match (id.is_empty(), version.is_empty()) {
            (true, _) => Err(ManifestValidationError::EmptyId),
            _ if !id_words_are_valid(id) => Err(ManifestValidationError::InvalidId(self.id.clone())),
            (_, true) => Err(ManifestValidationError::EmptyVersion),
            _ if !version_parts_are_numeric(version) => {
                Err(ManifestValidationError::InvalidVersion(self.version.clone()))
            }
            _ => Ok(()),
        }
    }
}

const ID_SEPARATORS: [char; 3] = ['.', '_', '-'];

fn id_words_are_valid(id: &str) -> bool {
    id.split(ID_SEPARATORS).all(|word| {
        !word.is_empty()
            && word
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    })
}

fn version_parts_are_numeric(version: &str) -> bool {
    let mut count = 0;
    for part in version.split('.') {
        count += 1;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    count == 3
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestValidationError {
    EmptyId,
    InvalidId(String),
    EmptyVersion,
    InvalidVersion(String),
}

impl Display for ManifestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "manifest id must not be empty"),
            Self::InvalidId(value) => write!(f, "manifest id is invalid: {value}"),
            Self::EmptyVersion => write!(f, "manifest version must not be empty"),
            Self::InvalidVersion(value) => write!(
                f,
                "manifest version is invalid: {value} (expected major.minor.patch)"
            ),
        }
    }
}

impl Error for ManifestValidationError {}

#[cfg(test)]
mod tests {
    use super::{ExtensionManifest, ManifestValidationError};

    #[test]
    fn accepts_dotted_lowercase_id() {
        assert!(ExtensionManifest::new("homes.core", "1.2.0").validate().is_ok());
        assert!(ExtensionManifest::new("tp-requests_2", "0.0.1").validate().is_ok());
    }

    #[test]
    fn rejects_bad_ids() {
        for id in ["Homes", "homes..core", "homes.", ".homes", "homes core"] {
            let err = ExtensionManifest::new(id, "1.0.0")
                .validate()
                .expect_err("id must be rejected");
            assert_eq!(err, ManifestValidationError::InvalidId(id.to_string()));
        }
        assert_eq!(
            ExtensionManifest::new("  ", "1.0.0").validate(),
            Err(ManifestValidationError::EmptyId)
        );
    }

    #[test]
    fn rejects_bad_versions() {
        assert_eq!(
            ExtensionManifest::new("homes", "").validate(),
            Err(ManifestValidationError::EmptyVersion)
        );
        assert!(matches!(
            ExtensionManifest::new("homes", "v1").validate(),
            Err(ManifestValidationError::InvalidVersion(_))
        ));
        assert!(matches!(
            ExtensionManifest::new("homes", "1.2").validate(),
            Err(ManifestValidationError::InvalidVersion(_))
        ));
    }
}
