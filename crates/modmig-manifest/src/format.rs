//! Declaration-literal writer
//!
//! Renders a [`serde_json::Value`] as the executable literal syntax used by
//! manifest files. Structure and string escaping come from serde_json's
//! pretty printer; only the scalar spellings differ (`True`, `False`,
//! `None`), which a [`Formatter`] handles at the token level rather than by
//! rewriting the rendered text.

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::Value;
use std::io;

/// Indentation used for rendered manifests
pub const MANIFEST_INDENT: &[u8] = b"    ";

/// Pretty formatter emitting declaration-literal scalars
#[derive(Debug)]
pub struct LiteralFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl<'a> LiteralFormatter<'a> {
    /// Create formatter with the given indentation
    #[inline]
    #[must_use]
    pub fn with_indent(indent: &'a [u8]) -> Self {
        Self {
            inner: PrettyFormatter::with_indent(indent),
        }
    }
}

impl Default for LiteralFormatter<'_> {
    fn default() -> Self {
        Self::with_indent(MANIFEST_INDENT)
    }
}

impl Formatter for LiteralFormatter<'_> {
    fn write_null<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"None")
    }

    fn write_bool<W>(&mut self, writer: &mut W, value: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(if value { b"True" } else { b"False" })
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object_value(writer)
    }
}

/// Render a value as declaration-literal text, newline terminated
///
/// # Errors
/// Returns the serializer error if rendering fails.
pub fn to_literal_string(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, LiteralFormatter::default());
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
