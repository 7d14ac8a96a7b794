//! # contract: the encoder seam for finished documents
//!
//! Marshaling produces an in-memory document graph. Turning that graph into
//! bytes is the job of a [`DocumentSink`], supplied by the caller of
//! [`crate::document::marshal_embedded`].
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can assert on the
//!   payload a sink receives without encoding it.
//!
//! ## Provided Sinks
//! - [`JsonSink`] writes newline-terminated JSON to any `std::io::Write`.

use std::io::Write;

use mockall::automock;
use serde::Serialize;

use crate::document::OnePayload;
use crate::error::MarshalError;

/// Receives a finished single-resource payload.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait DocumentSink {
    fn write_document(&mut self, payload: &OnePayload) -> Result<(), MarshalError>;
}

/// Encodes documents as JSON onto a writer, one document per line unless
/// pretty printing is enabled.
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Encodes any serializable document (either payload kind, or a
    /// [`crate::document::Document`]).
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), MarshalError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, value)?;
        } else {
            serde_json::to_writer(&mut self.writer, value)?;
        }
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| MarshalError::Encode(serde_json::Error::io(e)))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DocumentSink for JsonSink<W> {
    fn write_document(&mut self, payload: &OnePayload) -> Result<(), MarshalError> {
        self.encode(payload)
    }
}
