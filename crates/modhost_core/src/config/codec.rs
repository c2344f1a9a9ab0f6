//! YAML serializer shared by every config in one registry.

use serde::de::DeserializeOwned;
use serde::Serialize;

const DOCUMENT_MARKER: &str = "---\n";

/// YAML encoder/decoder for config files.
///
/// Field names pass through untouched and output never starts with a
/// `---` document marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec {
    _private: (),
}

impl YamlCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `value` as one YAML document without a leading marker.
    pub fn to_document<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, serde_yaml::Error> {
        let rendered = serde_yaml::to_string(value)?;
        Ok(match rendered.strip_prefix(DOCUMENT_MARKER) {
            Some(body) => body.to_string(),
            None => rendered,
        })
    }

    pub fn from_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }
}
