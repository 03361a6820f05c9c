use crate::error::MetadataError;
use crate::media::MediaType;
use crate::metadata::PayloadType;
use crate::version::Version;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Serializes an entity into bytes for one media type.
pub trait EntityWriter: Send + Sync {
    fn write(&self, entity: &Value, media_type: &MediaType) -> anyhow::Result<Vec<u8>>;
}

/// Deserializes request bytes into an entity.
pub trait EntityReader: Send + Sync {
    fn read(&self, bytes: &[u8], media_type: &MediaType) -> anyhow::Result<Value>;
}

/// What a reader or writer declares it handles.
#[derive(Debug, Clone)]
pub struct CodecSpec {
    pub name: String,
    pub payload_type: PayloadType,
    pub media_types: Vec<String>,
    pub version: Option<String>,
}

impl CodecSpec {
    pub fn new(name: impl Into<String>, payload_type: PayloadType) -> Self {
        Self {
            name: name.into(),
            payload_type,
            media_types: Vec::new(),
            version: None,
        }
    }

    /// Media types handled; an empty list handles every media type.
    #[must_use]
    pub fn media_types<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_types = media_types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A registered reader or writer with its parsed match criteria.
pub struct Registration<C: ?Sized> {
    name: String,
    payload_type: PayloadType,
    media_types: Vec<MediaType>,
    version: Option<Version>,
    codec: Arc<C>,
}

pub type ReaderRegistration = Registration<dyn EntityReader>;
pub type WriterRegistration = Registration<dyn EntityWriter>;

impl<C: ?Sized> Registration<C> {
    /// Parse `spec` and bind it to `codec`.
    ///
    /// # Errors
    ///
    /// [`MetadataError`] if a media type or the version does not parse.
    pub fn new(spec: CodecSpec, codec: Arc<C>) -> Result<Self, MetadataError> {
        let media_types = spec
            .media_types
            .iter()
            .map(|m| MediaType::parse(m))
            .collect::<Result<Vec<_>, _>>()?;
        let version = spec.version.as_deref().map(Version::parse).transpose()?;
        Ok(Self {
            name: spec.name,
            payload_type: spec.payload_type,
            media_types,
            version,
            codec,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn payload_type(&self) -> &PayloadType {
        &self.payload_type
    }

    #[must_use]
    pub fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    #[must_use]
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    #[must_use]
    pub fn codec(&self) -> &Arc<C> {
        &self.codec
    }

    /// Type and media-type criteria; versions are checked by the resolver.
    pub(crate) fn handles(&self, payload_type: &PayloadType, media_type: &MediaType) -> bool {
        self.payload_type.is_assignable_from(payload_type)
            && media_type.is_compatible_to(&self.media_types)
    }
}

impl<C: ?Sized> fmt::Debug for Registration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("payload_type", &self.payload_type.name())
            .field("media_types", &self.media_types)
            .field("version", &self.version)
            .finish()
    }
}

impl WriterRegistration {
    pub fn write(&self, entity: &Value, media_type: &MediaType) -> anyhow::Result<Vec<u8>> {
        self.codec.write(entity, media_type)
    }
}

impl ReaderRegistration {
    pub fn read(&self, bytes: &[u8], media_type: &MediaType) -> anyhow::Result<Value> {
        self.codec.read(bytes, media_type)
    }
}

/// `application/json` and `+json` vendor types.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl EntityWriter for JsonCodec {
    fn write(&self, entity: &Value, _media_type: &MediaType) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(entity)?)
    }
}

impl EntityReader for JsonCodec {
    fn read(&self, bytes: &[u8], _media_type: &MediaType) -> anyhow::Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// `text/plain`. Strings are written raw; other values as their JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl EntityWriter for TextCodec {
    fn write(&self, entity: &Value, _media_type: &MediaType) -> anyhow::Result<Vec<u8>> {
        Ok(match entity {
            Value::String(s) => s.clone().into_bytes(),
            Value::Null => Vec::new(),
            other => other.to_string().into_bytes(),
        })
    }
}

impl EntityReader for TextCodec {
    fn read(&self, bytes: &[u8], _media_type: &MediaType) -> anyhow::Result<Value> {
        Ok(Value::String(std::str::from_utf8(bytes)?.to_string()))
    }
}

/// `application/yaml` and friends.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl EntityWriter for YamlCodec {
    fn write(&self, entity: &Value, _media_type: &MediaType) -> anyhow::Result<Vec<u8>> {
        Ok(serde_yaml::to_string(entity)?.into_bytes())
    }
}

impl EntityReader for YamlCodec {
    fn read(&self, bytes: &[u8], _media_type: &MediaType) -> anyhow::Result<Value> {
        Ok(serde_yaml::from_slice(bytes)?)
    }
}
