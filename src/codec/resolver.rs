use super::core::{
    CodecSpec, EntityReader, EntityWriter, JsonCodec, ReaderRegistration, Registration, TextCodec,
    WriterRegistration, YamlCodec,
};
use crate::error::{MetadataError, ResolutionError};
use crate::media::MediaType;
use crate::metadata::PayloadType;
use crate::version::{resolve_best, VersionRange};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const READER: &str = "reader";
const WRITER: &str = "writer";

/// A writer picked by content negotiation, with the media type it will produce.
#[derive(Debug, Clone)]
pub struct Negotiated {
    pub writer: Arc<WriterRegistration>,
    pub media_type: MediaType,
}

impl Negotiated {
    pub fn write(&self, entity: &serde_json::Value) -> anyhow::Result<Vec<u8>> {
        self.writer.write(entity, &self.media_type)
    }
}

/// Registered readers and writers plus a memo of successful resolutions.
///
/// Registration happens at startup; resolution is read-only apart from the cache,
/// which is written at most once per key and never evicted.
pub struct CodecRegistry {
    readers: Vec<Arc<ReaderRegistration>>,
    writers: Vec<Arc<WriterRegistration>>,
    reader_cache: DashMap<String, Arc<ReaderRegistration>>,
    writer_cache: DashMap<String, Arc<WriterRegistration>>,
    cache_enabled: bool,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CodecRegistry {
    pub fn new(cache_enabled: bool) -> Self {
        info!(cache_enabled, "Initializing codec registry");
        Self {
            readers: Vec::new(),
            writers: Vec::new(),
            reader_cache: DashMap::new(),
            writer_cache: DashMap::new(),
            cache_enabled,
        }
    }

    /// A registry with JSON, plain-text and YAML codecs for every payload type.
    ///
    /// # Errors
    ///
    /// Never in practice; the built-in media types are static and valid.
    pub fn with_builtin_codecs(cache_enabled: bool) -> Result<Self, MetadataError> {
        let mut registry = Self::new(cache_enabled);
        let any = PayloadType::any();
        let json = Arc::new(JsonCodec);
        let text = Arc::new(TextCodec);
        let yaml = Arc::new(YamlCodec);
        let json_spec = CodecSpec::new("json", any.clone()).media_types(["application/json"]);
        let text_spec = CodecSpec::new("text", any.clone()).media_types(["text/plain"]);
        let yaml_spec = CodecSpec::new("yaml", any)
            .media_types(["application/yaml", "application/x-yaml", "text/yaml"]);

        registry.register_writer(json_spec.clone(), Arc::clone(&json) as Arc<dyn EntityWriter>)?;
        registry.register_reader(json_spec, json as Arc<dyn EntityReader>)?;
        registry.register_writer(text_spec.clone(), Arc::clone(&text) as Arc<dyn EntityWriter>)?;
        registry.register_reader(text_spec, text as Arc<dyn EntityReader>)?;
        registry.register_writer(yaml_spec.clone(), Arc::clone(&yaml) as Arc<dyn EntityWriter>)?;
        registry.register_reader(yaml_spec, yaml as Arc<dyn EntityReader>)?;
        Ok(registry)
    }

    /// Register a writer. Names must be unique among writers.
    ///
    /// # Errors
    ///
    /// [`MetadataError`] for unparsable media types or versions, or a duplicate name.
    pub fn register_writer(
        &mut self,
        spec: CodecSpec,
        writer: Arc<dyn EntityWriter>,
    ) -> Result<(), MetadataError> {
        let registration = Registration::new(spec, writer)?;
        push_unique(&mut self.writers, registration, WRITER)?;
        self.writer_cache.clear();
        Ok(())
    }

    /// Register a reader. Names must be unique among readers.
    ///
    /// # Errors
    ///
    /// [`MetadataError`] for unparsable media types or versions, or a duplicate name.
    pub fn register_reader(
        &mut self,
        spec: CodecSpec,
        reader: Arc<dyn EntityReader>,
    ) -> Result<(), MetadataError> {
        let registration = Registration::new(spec, reader)?;
        push_unique(&mut self.readers, registration, READER)?;
        self.reader_cache.clear();
        Ok(())
    }

    #[must_use]
    pub fn writers(&self) -> &[Arc<WriterRegistration>] {
        &self.writers
    }

    #[must_use]
    pub fn readers(&self) -> &[Arc<ReaderRegistration>] {
        &self.readers
    }

    /// Number of memoised resolutions (readers and writers).
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.reader_cache.len() + self.writer_cache.len()
    }

    /// Find the single writer for `payload_type` and `media_type`.
    ///
    /// With a `range`, writers whose version falls inside it win and the greatest
    /// version is taken; unversioned writers are the fallback. Without a range every
    /// qualifying writer counts, versioned or not.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::MediaTypeNotSupported`] with no candidate,
    /// [`ResolutionError::MediaTypeAmbiguous`] with more than one.
    pub fn resolve_writer(
        &self,
        payload_type: &PayloadType,
        media_type: &MediaType,
        range: Option<&VersionRange>,
    ) -> Result<Arc<WriterRegistration>, ResolutionError> {
        resolve_cached(
            &self.writers,
            &self.writer_cache,
            self.cache_enabled,
            WRITER,
            payload_type,
            media_type,
            range,
        )
    }

    /// Reader counterpart of [`resolve_writer`](Self::resolve_writer).
    ///
    /// # Errors
    ///
    /// As for [`resolve_writer`](Self::resolve_writer).
    pub fn resolve_reader(
        &self,
        payload_type: &PayloadType,
        media_type: &MediaType,
        range: Option<&VersionRange>,
    ) -> Result<Arc<ReaderRegistration>, ResolutionError> {
        resolve_cached(
            &self.readers,
            &self.reader_cache,
            self.cache_enabled,
            READER,
            payload_type,
            media_type,
            range,
        )
    }

    /// Pick a writer from an `Accept` header.
    ///
    /// Accept entries are tried in header order; wildcard entries expand to the
    /// method's declared `produces` types, in declaration order. The version comes
    /// from `version_header` (a range expression, or a bare version meaning "up to
    /// and including") or else from the media type's embedded `.vN` version. A
    /// version header that does not parse is ignored.
    ///
    /// # Errors
    ///
    /// The first ambiguity encountered, or
    /// [`ResolutionError::MediaTypeNotSupported`] when no entry resolves.
    pub fn negotiate_writer(
        &self,
        payload_type: &PayloadType,
        produces: &[MediaType],
        accept_header: Option<&str>,
        version_header: Option<&str>,
    ) -> Result<Negotiated, ResolutionError> {
        let header = accept_header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or("*/*");
        let header_range = version_header.and_then(parse_version_header);

        let mut accepted = Vec::new();
        for entry in MediaType::parse_accept(header) {
            if entry.is_wildcard() && !produces.is_empty() {
                accepted.extend(
                    produces
                        .iter()
                        .map(|p| p.clone().with_charset(entry.charset())),
                );
            } else {
                accepted.push(entry);
            }
        }

        for media_type in accepted {
            let range = header_range.or_else(|| {
                media_type
                    .version_expr()
                    .and_then(|v| VersionRange::up_to(v).ok())
            });
            match self.resolve_writer(payload_type, &media_type, range.as_ref()) {
                Ok(writer) => {
                    let media_type = concrete_media_type(media_type, &writer);
                    debug!(
                        payload_type = %payload_type,
                        writer = %writer.name(),
                        media_type = %media_type,
                        "Writer negotiated"
                    );
                    return Ok(Negotiated { writer, media_type });
                }
                Err(ResolutionError::MediaTypeNotSupported { .. }) => continue,
                Err(other) => return Err(other),
            }
        }

        Err(ResolutionError::MediaTypeNotSupported {
            kind: WRITER,
            payload_type: payload_type.name().to_string(),
            media_type: header.to_string(),
        })
    }
}

fn parse_version_header(raw: &str) -> Option<VersionRange> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = if raw.contains(['[', ']', '(', ')', ',']) {
        VersionRange::parse(raw)
    } else {
        VersionRange::up_to(raw)
    };
    match parsed {
        Ok(range) => Some(range),
        Err(e) => {
            warn!(version = %raw, error = %e, "Ignoring unparsable version header");
            None
        }
    }
}

/// A wildcard accept entry takes the writer's first declared media type.
fn concrete_media_type(accepted: MediaType, writer: &WriterRegistration) -> MediaType {
    if accepted.is_wildcard() {
        if let Some(first) = writer.media_types().first() {
            return first.clone().with_charset(accepted.charset());
        }
    }
    accepted
}

fn push_unique<C: ?Sized>(
    list: &mut Vec<Arc<Registration<C>>>,
    registration: Registration<C>,
    kind: &'static str,
) -> Result<(), MetadataError> {
    if list.iter().any(|r| r.name() == registration.name()) {
        return Err(MetadataError::Duplicate {
            kind,
            name: registration.name().to_string(),
            owner: "codec registry".to_string(),
        });
    }
    debug!(
        kind,
        name = %registration.name(),
        payload_type = %registration.payload_type(),
        version = ?registration.version(),
        "Codec registered"
    );
    list.push(Arc::new(registration));
    Ok(())
}

fn cache_key(
    kind: &str,
    payload_type: &PayloadType,
    media_type: &MediaType,
    range: Option<&VersionRange>,
) -> String {
    match range {
        Some(r) => format!("{kind}:{payload_type}:{media_type}:{r}"),
        None => format!("{kind}:{payload_type}:{media_type}"),
    }
}

fn resolve_cached<C: ?Sized>(
    list: &[Arc<Registration<C>>],
    cache: &DashMap<String, Arc<Registration<C>>>,
    cache_enabled: bool,
    kind: &'static str,
    payload_type: &PayloadType,
    media_type: &MediaType,
    range: Option<&VersionRange>,
) -> Result<Arc<Registration<C>>, ResolutionError> {
    if !cache_enabled {
        return resolve(list, kind, payload_type, media_type, range);
    }
    let key = cache_key(kind, payload_type, media_type, range);
    if let Some(hit) = cache.get(&key) {
        debug!(cache_key = %key, "Codec cache hit");
        return Ok(Arc::clone(hit.value()));
    }
    let resolved = resolve(list, kind, payload_type, media_type, range)?;
    cache.insert(key, Arc::clone(&resolved));
    Ok(resolved)
}

fn resolve<C: ?Sized>(
    list: &[Arc<Registration<C>>],
    kind: &'static str,
    payload_type: &PayloadType,
    media_type: &MediaType,
    range: Option<&VersionRange>,
) -> Result<Arc<Registration<C>>, ResolutionError> {
    let candidates: Vec<&Arc<Registration<C>>> = list
        .iter()
        .filter(|r| r.handles(payload_type, media_type))
        .collect();

    let chosen = match range {
        Some(range) => {
            let (versioned, unversioned): (Vec<_>, Vec<_>) =
                candidates.into_iter().partition(|r| r.version().is_some());
            best_versioned(&versioned, range).unwrap_or(unversioned)
        }
        None => candidates,
    };

    match chosen.as_slice() {
        [] => {
            debug!(kind, payload_type = %payload_type, media_type = %media_type, "No codec matched");
            Err(ResolutionError::MediaTypeNotSupported {
                kind,
                payload_type: payload_type.name().to_string(),
                media_type: media_type.to_string(),
            })
        }
        [single] => {
            debug!(kind, name = %single.name(), media_type = %media_type, "Codec resolved");
            Ok(Arc::clone(single))
        }
        many => {
            let names: Vec<String> = many.iter().map(|r| r.name().to_string()).collect();
            warn!(
                kind,
                payload_type = %payload_type,
                media_type = %media_type,
                candidates = ?names,
                "Ambiguous codec resolution"
            );
            Err(ResolutionError::MediaTypeAmbiguous {
                kind,
                payload_type: payload_type.name().to_string(),
                media_type: media_type.to_string(),
                candidates: names,
            })
        }
    }
}

/// Candidates bound to the greatest version inside `range`, or `None` if no
/// versioned candidate is in range.
fn best_versioned<'a, C: ?Sized>(
    versioned: &[&'a Arc<Registration<C>>],
    range: &VersionRange,
) -> Option<Vec<&'a Arc<Registration<C>>>> {
    let best = resolve_best(
        versioned
            .iter()
            .copied()
            .filter_map(|r| r.version().map(|v| (v, r))),
        range,
    )?;
    let best_version = best.version().copied();
    Some(
        versioned
            .iter()
            .copied()
            .filter(|r| r.version().copied() == best_version)
            .collect(),
    )
}
