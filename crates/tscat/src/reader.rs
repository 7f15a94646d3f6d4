//! TS document reader.
//!
//! # Invariants
//!
//! 1. **Structure is fatal, entries are not**: malformed XML or a root
//!    other than `<TS>` fails the whole document. A message that is well
//!    formed XML but unusable (no `<source>`, undecodable text) fails only
//!    itself; [`ParseMode::Lenient`] skips it and records why.
//!
//! 2. **Text is verbatim**: whitespace and line breaks inside text
//!    elements are kept; whitespace between elements is ignored.
//!
//! 3. **Unknown elements are skipped** together with their subtree, so
//!    files carrying `<extra-*>` or `<userdata>` still load.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Bad XML | Unbalanced tags, bad entity in markup | `TsError::Xml` |
//! | Wrong root | Not a TS file | `TsError::NotTs` |
//! | Bad message | Missing `<source>`, undecodable text | Strict: `TsError::InvalidEntry`; Lenient: skipped |

use std::cell::Cell;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};

use crate::error::TsError;
use crate::model::{Context, Document, LineRef, Location, Message, Translation, TranslationStatus};

/// How to treat messages that cannot be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// The first bad message fails the document.
    Strict,
    /// Bad messages are skipped and reported in [`Parsed::skipped`].
    #[default]
    Lenient,
}

/// Result of a successful parse.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub document: Document,
    /// Messages dropped in lenient mode.
    pub skipped: Vec<TsError>,
}

/// Parse a TS document held in memory.
pub fn parse_document(input: &str, mode: ParseMode) -> Result<Parsed, TsError> {
    let mut reader = TsReader::new(input, mode);
    let document = reader.read_document()?;
    debug!(
        contexts = document.contexts.len(),
        messages = document.message_count(),
        skipped = reader.skipped.len(),
        "parsed TS document"
    );
    Ok(Parsed {
        document,
        skipped: reader.skipped,
    })
}

/// Parse strictly, returning only the document.
pub fn parse_str(input: &str) -> Result<Document, TsError> {
    parse_document(input, ParseMode::Strict).map(|parsed| parsed.document)
}

/// Read and parse a TS file.
pub fn read_file(path: impl AsRef<Path>, mode: ParseMode) -> Result<Parsed, TsError> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|err| TsError::io(path, &err))?;
    parse_document(&input, mode)
}

/// Accumulates the parts of a `<message>` while its subtree is read.
#[derive(Default)]
struct MessageDraft {
    message: Message,
    source: Option<String>,
    forms: Vec<String>,
    problem: Option<String>,
}

struct TsReader<'a> {
    reader: Reader<&'a [u8]>,
    input: &'a str,
    mode: ParseMode,
    skipped: Vec<TsError>,
    /// Byte offset already scanned for newlines and the line it ends on.
    line_cursor: Cell<(usize, usize)>,
}

impl<'a> TsReader<'a> {
    fn new(input: &'a str, mode: ParseMode) -> Self {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            input,
            mode,
            skipped: Vec::new(),
            line_cursor: Cell::new((0, 1)),
        }
    }

    /// 1-based line of the reader's current position.
    ///
    /// Only the bytes since the previous call are scanned, so reporting a
    /// line for every message stays linear in the document size.
    fn line(&self) -> usize {
        let pos = usize::try_from(self.reader.buffer_position())
            .unwrap_or(self.input.len())
            .min(self.input.len());
        let (mut scanned, mut line) = self.line_cursor.get();
        if pos < scanned {
            scanned = 0;
            line = 1;
        }
        line += self.input.as_bytes()[scanned..pos]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line_cursor.set((pos, line));
        line
    }

    fn xml_error(&self, message: impl std::fmt::Display) -> TsError {
        TsError::Xml {
            line: self.line(),
            message: message.to_string(),
        }
    }

    fn next(&mut self) -> Result<Event<'a>, TsError> {
        match self.reader.read_event() {
            Ok(Event::Eof) => Err(self.xml_error("unexpected end of document")),
            Ok(event) => Ok(event),
            Err(err) => Err(self.xml_error(err)),
        }
    }

    fn attr(&self, start: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, TsError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|err| self.xml_error(err))?;
            if attr.key.as_ref() == key {
                let value = attr.unescape_value().map_err(|err| self.xml_error(err))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn read_document(&mut self) -> Result<Document, TsError> {
        loop {
            let event = match self.reader.read_event() {
                Ok(Event::Eof) => {
                    return Err(TsError::NotTs {
                        root: String::new(),
                    });
                }
                Ok(event) => event,
                Err(err) => return Err(self.xml_error(err)),
            };
            match event {
                Event::Start(start) => {
                    let mut doc = self.root_attributes(&start)?;
                    self.read_contexts(&mut doc)?;
                    return Ok(doc);
                }
                Event::Empty(start) => return self.root_attributes(&start),
                _ => {}
            }
        }
    }

    fn root_attributes(&self, start: &BytesStart<'_>) -> Result<Document, TsError> {
        if start.name().as_ref() != b"TS" {
            return Err(TsError::NotTs {
                root: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            });
        }
        Ok(Document {
            version: self.attr(start, b"version")?,
            language: self.attr(start, b"language")?,
            source_language: self.attr(start, b"sourcelanguage")?,
            contexts: Vec::new(),
        })
    }

    fn read_contexts(&mut self, doc: &mut Document) -> Result<(), TsError> {
        loop {
            match self.next()? {
                Event::Start(start) if start.name().as_ref() == b"context" => {
                    let context = self.read_context()?;
                    doc.contexts.push(context);
                }
                Event::Start(start) => self.skip_element(&start)?,
                Event::End(_) => return Ok(()),
                _ => {}
            }
        }
    }

    fn read_context(&mut self) -> Result<Context, TsError> {
        let mut context = Context::default();
        loop {
            match self.next()? {
                Event::Start(start) => match start.name().as_ref() {
                    b"name" => {
                        let mut problem = None;
                        context.name = self.read_text(&mut problem)?;
                        if let Some(reason) = problem {
                            return Err(self.xml_error(reason));
                        }
                    }
                    b"comment" => {
                        let mut problem = None;
                        let comment = self.read_text(&mut problem)?;
                        if let Some(reason) = problem {
                            warn!(
                                context = %context.name,
                                line = self.line(),
                                reason = %reason,
                                "undecodable context comment"
                            );
                        }
                        context.comment = Some(comment);
                    }
                    b"message" => {
                        let line = self.line();
                        let message = self.read_message(&start)?;
                        match message {
                            Ok(message) => context.messages.push(message),
                            Err(reason) => self.reject(&context.name, line, reason)?,
                        }
                    }
                    _ => self.skip_element(&start)?,
                },
                Event::Empty(start) if start.name().as_ref() == b"message" => {
                    let line = self.line();
                    self.reject(&context.name, line, "empty <message> element".into())?;
                }
                Event::End(_) => return Ok(context),
                _ => {}
            }
        }
    }

    fn reject(&mut self, context: &str, line: usize, reason: String) -> Result<(), TsError> {
        let err = TsError::InvalidEntry {
            context: context.to_string(),
            line,
            reason,
        };
        match self.mode {
            ParseMode::Strict => Err(err),
            ParseMode::Lenient => {
                warn!(context, line, error = %err, "skipping unreadable message");
                self.skipped.push(err);
                Ok(())
            }
        }
    }

    /// Read a `<message>` subtree. The outer `Result` carries document
    /// errors, the inner one the reason the message itself is unusable.
    fn read_message(
        &mut self,
        start: &BytesStart<'_>,
    ) -> Result<Result<Message, String>, TsError> {
        let numerus = self.attr(start, b"numerus")?.as_deref() == Some("yes");
        let mut draft = MessageDraft::default();
        draft.message.id = self.attr(start, b"id")?;

        loop {
            match self.next()? {
                Event::Start(child) => {
                    let name = child.name().as_ref().to_vec();
                    match name.as_slice() {
                        b"location" => {
                            draft.message.locations.push(self.location(&child)?);
                            self.skip_element(&child)?;
                        }
                        b"translation" => {
                            draft.message.status = self.status(&child)?;
                            if numerus {
                                self.read_numerus_forms(&mut draft)?;
                            } else {
                                let text = self.read_text(&mut draft.problem)?;
                                draft.message.translation = Translation::Text(text);
                            }
                        }
                        _ => {
                            if let Some(slot) = text_slot(&mut draft, &name) {
                                let mut problem = None;
                                let text = self.read_text(&mut problem)?;
                                *slot = Some(text);
                                if problem.is_some() {
                                    draft.problem = problem;
                                }
                            } else {
                                self.skip_element(&child)?;
                            }
                        }
                    }
                }
                Event::Empty(child) => match child.name().as_ref() {
                    b"location" => draft.message.locations.push(self.location(&child)?),
                    b"translation" => draft.message.status = self.status(&child)?,
                    b"source" => draft.source = Some(String::new()),
                    _ => {}
                },
                Event::End(_) => break,
                _ => {}
            }
        }

        if let Some(problem) = draft.problem {
            return Ok(Err(problem));
        }
        let Some(source) = draft.source else {
            return Ok(Err("missing <source>".to_string()));
        };
        let mut message = draft.message;
        message.source = source;
        if numerus {
            message.translation = Translation::Numerus(draft.forms);
        }
        Ok(Ok(message))
    }

    fn read_numerus_forms(&mut self, draft: &mut MessageDraft) -> Result<(), TsError> {
        loop {
            match self.next()? {
                Event::Start(child) if child.name().as_ref() == b"numerusform" => {
                    let form = self.read_text(&mut draft.problem)?;
                    draft.forms.push(form);
                }
                Event::Empty(child) if child.name().as_ref() == b"numerusform" => {
                    draft.forms.push(String::new());
                }
                Event::Start(child) => self.skip_element(&child)?,
                Event::End(_) => return Ok(()),
                _ => {}
            }
        }
    }

    fn location(&self, start: &BytesStart<'_>) -> Result<Location, TsError> {
        Ok(Location {
            filename: self.attr(start, b"filename")?,
            line: self.attr(start, b"line")?.as_deref().and_then(LineRef::parse),
        })
    }

    fn status(&self, start: &BytesStart<'_>) -> Result<TranslationStatus, TsError> {
        Ok(self
            .attr(start, b"type")?
            .as_deref()
            .map_or(TranslationStatus::Finished, TranslationStatus::from_attr))
    }

    /// Collect character data up to the end of the current element.
    ///
    /// Decoding problems are stored in `problem` and reading continues, so
    /// the reader stays aligned with the document structure.
    fn read_text(&mut self, problem: &mut Option<String>) -> Result<String, TsError> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Event::Text(chunk) => match chunk.unescape() {
                    Ok(decoded) => text.push_str(&decoded),
                    Err(err) => *problem = Some(err.to_string()),
                },
                Event::CData(chunk) => match std::str::from_utf8(&chunk.into_inner()) {
                    Ok(decoded) => text.push_str(decoded),
                    Err(err) => *problem = Some(err.to_string()),
                },
                Event::Empty(child) if child.name().as_ref() == b"byte" => {
                    match self.attr(&child, b"value")?.as_deref().and_then(byte_char) {
                        Some(ch) => text.push(ch),
                        None => *problem = Some("invalid <byte> value".to_string()),
                    }
                }
                Event::Start(child) => self.skip_element(&child)?,
                Event::End(_) => return Ok(text),
                _ => {}
            }
        }
    }

    fn skip_element(&mut self, start: &BytesStart<'_>) -> Result<(), TsError> {
        let name = start.name().as_ref().to_vec();
        let mut depth = 1usize;
        while depth > 0 {
            match self.next()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                _ => {}
            }
        }
        debug!(element = %String::from_utf8_lossy(&name), "skipped unknown element");
        Ok(())
    }
}

/// The optional text field a child element of `<message>` fills.
fn text_slot<'d>(draft: &'d mut MessageDraft, name: &[u8]) -> Option<&'d mut Option<String>> {
    match name {
        b"source" => Some(&mut draft.source),
        b"oldsource" => Some(&mut draft.message.old_source),
        b"comment" => Some(&mut draft.message.comment),
        b"oldcomment" => Some(&mut draft.message.old_comment),
        b"extracomment" => Some(&mut draft.message.extra_comment),
        b"translatorcomment" => Some(&mut draft.message.translator_comment),
        _ => None,
    }
}

/// Decode a `<byte value="x1b"/>` escape (hex with `x`, else decimal).
fn byte_char(value: &str) -> Option<char> {
    let code = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse().ok()?,
    };
    char::from_u32(code)
}
