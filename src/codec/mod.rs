//! # Codec Module
//!
//! Readers and writers turn request bytes into entities and entities into response
//! bytes. This module only decides *which* reader or writer handles a call; the
//! codecs themselves are opaque [`EntityReader`]/[`EntityWriter`] implementations.
//!
//! ## Resolution
//!
//! For a payload type `T` and a requested media type `A`:
//!
//! 1. keep registrations whose payload type is assignable from `T` and whose media
//!    types are empty or contain an entry compatible with `A`
//! 2. with a version range, prefer registrations whose version is in range and keep
//!    only those at the greatest matching version
//! 3. zero candidates is [`ResolutionError::MediaTypeNotSupported`], exactly one is
//!    the answer, more than one is [`ResolutionError::MediaTypeAmbiguous`] listing
//!    every candidate name
//!
//! There is no specificity tie-break: two writers that both qualify are reported,
//! not guessed between. Successful resolutions are memoised per
//! `(kind, type, media type, range)` unless the cache is disabled.
//!
//! [`ResolutionError::MediaTypeNotSupported`]: crate::error::ResolutionError::MediaTypeNotSupported
//! [`ResolutionError::MediaTypeAmbiguous`]: crate::error::ResolutionError::MediaTypeAmbiguous

mod core;
mod resolver;
#[cfg(test)]
mod tests;

pub use core::{
    CodecSpec, EntityReader, EntityWriter, JsonCodec, ReaderRegistration, Registration, TextCodec,
    WriterRegistration, YamlCodec,
};
pub use resolver::{CodecRegistry, Negotiated};
