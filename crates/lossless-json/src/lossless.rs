//! Lifecycle wrapper that carries a record's document between decode and
//! encode.
//!
//! A record owns one [`Lossless`] field. Decoding stores the parsed document
//! there before populating the typed fields; encoding flattens the fields back
//! into that same document, so members no field claims come back out
//! untouched.

use std::mem;

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{LosslessError, Result, UsageError};
use crate::projector::{self, Describe};
use crate::{Document, KeyPath, Options};

/// Holds the document a record was decoded from, plus the options in effect.
///
/// Equality compares the held documents only. A wrapper that never decoded
/// holds no document until its first mutation or encode.
#[derive(Clone, Debug, Default)]
pub struct Lossless {
    document: Option<Document>,
    options: Options,
}

impl PartialEq for Lossless {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

impl Lossless {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            document: None,
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// The retained document, if any.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Create an empty object document if none is held yet.
    pub fn ensure_initialized(&mut self) -> &mut Document {
        self.document.get_or_insert_with(Document::new)
    }

    /// Drop the retained document.
    pub fn reset(&mut self) {
        self.document = None;
    }

    /// Parse `bytes`, retain the document and populate `target` from it.
    ///
    /// Invalid JSON leaves the previously held document in place. A field
    /// that fails to decode still leaves the new document held.
    pub fn decode_into<R: Describe>(&mut self, target: &mut R, bytes: &[u8]) -> Result<()> {
        let document = Document::parse(bytes)?;
        trace!(bytes = bytes.len(), "parsed document");
        self.hydrate_from(target, document)
    }

    fn hydrate_from<R: Describe>(&mut self, target: &mut R, document: Document) -> Result<()> {
        let document = self.document.insert(document);
        debug!(
            keys = document.keys().map(Iterator::count).unwrap_or(0),
            "decoding record"
        );
        projector::hydrate(target, document, &self.options)
    }

    /// Flatten `source` into the retained document and serialize it.
    pub fn encode_from<R: Describe>(&mut self, source: &R) -> Result<Vec<u8>> {
        let pretty = self.options.pretty;
        let document = self.ensure_initialized();
        projector::flatten(source, document)?;
        let bytes = if pretty {
            document.to_vec_pretty()?
        } else {
            document.to_vec()?
        };
        debug!(fields = R::fields().len(), size = bytes.len(), "encoded record");
        Ok(bytes)
    }

    /// Set a value at `path`, creating intermediate objects as needed.
    ///
    /// ```
    /// use lossless_json::Lossless;
    ///
    /// let mut state = Lossless::new();
    /// state.set(["Phone", "Mobile"], "614-555-1212").unwrap();
    /// assert_eq!(
    ///     state.document().unwrap().to_string(),
    ///     r#"{"Phone":{"Mobile":"614-555-1212"}}"#
    /// );
    /// ```
    pub fn set<P, T>(&mut self, path: P, value: T) -> Result<()>
    where
        P: Into<KeyPath>,
        T: Serialize,
    {
        let path = path.into();
        if path.is_empty() {
            return Err(UsageError::EmptyPath.into());
        }
        let value =
            serde_json::to_value(value).map_err(|e| LosslessError::encode(path.to_string(), e))?;
        trace!(%path, "set");
        self.ensure_initialized().set_path(&path, value)?;
        Ok(())
    }

    /// Read the value at `path`. `None` when nothing is held there.
    pub fn get<P: Into<KeyPath>>(&self, path: P) -> Result<Option<&Value>> {
        let path = path.into();
        match &self.document {
            Some(document) => Ok(document.get_path(&path)?),
            None => Ok(None),
        }
    }

    /// Remove the value at `path`, returning it. Missing members are a no-op.
    pub fn delete<P: Into<KeyPath>>(&mut self, path: P) -> Result<Option<Value>> {
        let path = path.into();
        trace!(%path, "delete");
        Ok(self.ensure_initialized().delete_path(&path)?)
    }
}

/// A record carrying its own [`Lossless`] state.
///
/// Implemented by `#[derive(Describe)]` for structs with a field marked
/// `#[lossless(state)]`.
pub trait LosslessRecord: Describe + Sized {
    fn state(&self) -> &Lossless;

    fn state_mut(&mut self) -> &mut Lossless;

    /// Decode a new record from JSON text.
    fn decode(bytes: &[u8]) -> Result<Self>
    where
        Self: Default,
    {
        let mut record = Self::default();
        record.decode_in_place(bytes)?;
        Ok(record)
    }

    /// Replace the held document with `bytes` and repopulate the fields.
    fn decode_in_place(&mut self, bytes: &[u8]) -> Result<()> {
        detached(self, |state, record| state.decode_into(record, bytes))
    }

    /// Flatten the fields into the held document and serialize it.
    fn encode(&mut self) -> Result<Vec<u8>> {
        detached(self, |state, record| state.encode_from(&*record))
    }

    fn set<P, T>(&mut self, path: P, value: T) -> Result<()>
    where
        P: Into<KeyPath>,
        T: Serialize,
    {
        self.state_mut().set(path, value)
    }

    fn get<P: Into<KeyPath>>(&self, path: P) -> Result<Option<&Value>> {
        self.state().get(path)
    }

    fn delete<P: Into<KeyPath>>(&mut self, path: P) -> Result<Option<Value>> {
        self.state_mut().delete(path)
    }
}

/// Run `f` with the record's state moved out, so both can be borrowed
/// mutably. The state is put back whatever `f` returns.
fn detached<R, T>(record: &mut R, f: impl FnOnce(&mut Lossless, &mut R) -> T) -> T
where
    R: LosslessRecord,
{
    let mut state = mem::take(record.state_mut());
    let out = f(&mut state, record);
    *record.state_mut() = state;
    out
}

/// Serialize a record as its merged document.
///
/// Flattens into a copy of the held document, leaving the record unchanged.
/// Usable as `#[serde(serialize_with = "lossless_json::lossless::serialize")]`.
pub fn serialize<R, S>(record: &R, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    R: LosslessRecord,
    S: Serializer,
{
    let mut document = record.state().document().cloned().unwrap_or_default();
    projector::flatten(record, &mut document).map_err(ser::Error::custom)?;
    document.serialize(serializer)
}

/// Deserialize a record, retaining every member of its object.
pub fn deserialize<'de, R, D>(deserializer: D) -> std::result::Result<R, D::Error>
where
    R: LosslessRecord + Default,
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let mut record = R::default();
    detached(&mut record, |state, record| {
        state.hydrate_from(record, Document::from_value(value))
    })
    .map_err(de::Error::custom)?;
    Ok(record)
}
