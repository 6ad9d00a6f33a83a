//! Purpose: Persist `Value` documents as UTF-8 JSON files.
//! Exports: `save_to_file`, `load_from_file`, `load_from_file_with_max_depth`.
//! Role: Thin file collaborator over the crate's parser and serializer.
//! Invariants: Save writes the whole serialized document; load reads the whole file then parses.
//! Invariants: I/O failures map to `ErrorKind::Io`, decode failures to `ErrorKind::Parse`.

use std::fs;
use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::json::parse::{DEFAULT_MAX_DEPTH, from_slice_with_max_depth};
use crate::json::serialize::serialize;
use crate::json::value::Value;

pub fn save_to_file(path: &Path, value: &Value) -> Result<(), Error> {
    let text = serialize(value);
    fs::write(path, text.as_bytes()).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write JSON file")
            .with_path(path)
            .with_source(err)
    })?;
    tracing::info!(path = %path.display(), bytes = text.len(), "saved json document");
    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<Value, Error> {
    load_from_file_with_max_depth(path, DEFAULT_MAX_DEPTH)
}

pub fn load_from_file_with_max_depth(path: &Path, max_depth: usize) -> Result<Value, Error> {
    let bytes = fs::read(path).map_err(|err| {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Error::new(kind)
            .with_message("failed to read JSON file")
            .with_path(path)
            .with_source(err)
    })?;
    let value = from_slice_with_max_depth(&bytes, max_depth)
        .map_err(|err| err.into_error(&path.display().to_string()).with_path(path))?;
    tracing::debug!(path = %path.display(), kind = %value.kind(), "loaded json document");
    Ok(value)
}
