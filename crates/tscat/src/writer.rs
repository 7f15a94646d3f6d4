//! TS document writer.
//!
//! Emits the layout `lupdate` produces: XML declaration, `<!DOCTYPE TS>`,
//! contexts at column 0, four-space indentation below, all five XML
//! special characters escaped. Control characters other than tab, line
//! feed and carriage return are written as `<byte value="xNN"/>`.
//!
//! Reading the output back yields a [`Document`] equal to the input.

use std::fmt::Write as _;
use std::path::Path;

use quick_xml::escape::escape;

use crate::error::TsError;
use crate::model::{Document, Location, Message, Translation};

const INDENT: &str = "    ";

/// Serialize a document to TS XML.
#[must_use]
pub fn write_document(doc: &Document) -> String {
    let mut out = String::with_capacity(256 + doc.message_count() * 160);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS");
    push_attr(&mut out, "version", doc.version.as_deref());
    push_attr(&mut out, "language", doc.language.as_deref());
    push_attr(&mut out, "sourcelanguage", doc.source_language.as_deref());
    out.push_str(">\n");

    for context in &doc.contexts {
        out.push_str("<context>\n");
        push_element(&mut out, 1, "name", &context.name);
        if let Some(comment) = &context.comment {
            push_element(&mut out, 1, "comment", comment);
        }
        for message in &context.messages {
            write_message(&mut out, message);
        }
        out.push_str("</context>\n");
    }
    out.push_str("</TS>\n");
    out
}

/// Serialize a document to a file.
pub fn write_file(doc: &Document, path: impl AsRef<Path>) -> Result<(), TsError> {
    let path = path.as_ref();
    std::fs::write(path, write_document(doc)).map_err(|err| TsError::io(path, &err))
}

fn write_message(out: &mut String, message: &Message) {
    out.push_str(INDENT);
    out.push_str("<message");
    push_attr(out, "id", message.id.as_deref());
    if message.is_numerus() {
        out.push_str(" numerus=\"yes\"");
    }
    out.push_str(">\n");

    for location in &message.locations {
        write_location(out, location);
    }
    push_element(out, 2, "source", &message.source);
    let optional = [
        ("oldsource", &message.old_source),
        ("comment", &message.comment),
        ("oldcomment", &message.old_comment),
        ("extracomment", &message.extra_comment),
        ("translatorcomment", &message.translator_comment),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            push_element(out, 2, name, value);
        }
    }

    out.push_str(&INDENT.repeat(2));
    out.push_str("<translation");
    push_attr(out, "type", message.status.as_attr());
    out.push('>');
    match &message.translation {
        Translation::Text(text) => push_text(out, text),
        Translation::Numerus(forms) if forms.is_empty() => {}
        Translation::Numerus(forms) => {
            out.push('\n');
            for form in forms {
                push_element(out, 3, "numerusform", form);
            }
            out.push_str(&INDENT.repeat(2));
        }
    }
    out.push_str("</translation>\n");

    out.push_str(INDENT);
    out.push_str("</message>\n");
}

fn write_location(out: &mut String, location: &Location) {
    out.push_str(&INDENT.repeat(2));
    out.push_str("<location");
    push_attr(out, "filename", location.filename.as_deref());
    if let Some(line) = location.line {
        let _ = write!(out, " line=\"{line}\"");
    }
    out.push_str("/>\n");
}

fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = write!(out, " {name}=\"{}\"", escape(value));
    }
}

fn push_element(out: &mut String, depth: usize, name: &str, text: &str) {
    out.push_str(&INDENT.repeat(depth));
    let _ = write!(out, "<{name}>");
    push_text(out, text);
    let _ = writeln!(out, "</{name}>");
}

fn push_text(out: &mut String, text: &str) {
    let mut plain_start = 0;
    for (idx, ch) in text.char_indices() {
        if ch.is_control() && !matches!(ch, '\n' | '\t' | '\r') {
            out.push_str(&escape(&text[plain_start..idx]));
            let _ = write!(out, "<byte value=\"x{:x}\"/>", u32::from(ch));
            plain_start = idx + ch.len_utf8();
        }
    }
    out.push_str(&escape(&text[plain_start..]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Context, LineRef, TranslationStatus};
    use crate::reader::parse_str;

    fn sample() -> Document {
        let mut doc = Document::new("de_DE");
        let ctx = doc.context_mut("MainWindow");
        ctx.messages.push(
            Message::new("Preferences", "Einstellungen").with_location("../mainwindow.cpp", 467),
        );
        ctx.messages.push(
            Message::new("Running Code...", "Programm-Code wird ausgeführt …")
                .with_location("../mainwindow.cpp", 1735)
                .with_old_source("Running Code...."),
        );
        ctx.messages
            .push(Message::unfinished("Enable Audio Inputs").with_location("../mainwindow.cpp", 12));
        doc
    }

    #[test]
    fn matches_lupdate_layout() {
        let expected = "\
<?xml version=\"1.0\" encoding=\"utf-8\"?>
<!DOCTYPE TS>
<TS version=\"2.1\" language=\"de_DE\">
<context>
    <name>MainWindow</name>
    <message>
        <location filename=\"../mainwindow.cpp\" line=\"467\"/>
        <source>Preferences</source>
        <translation>Einstellungen</translation>
    </message>
    <message>
        <location filename=\"../mainwindow.cpp\" line=\"1735\"/>
        <source>Running Code...</source>
        <oldsource>Running Code....</oldsource>
        <translation>Programm-Code wird ausgeführt …</translation>
    </message>
    <message>
        <location filename=\"../mainwindow.cpp\" line=\"12\"/>
        <source>Enable Audio Inputs</source>
        <translation type=\"unfinished\"></translation>
    </message>
</context>
</TS>
";
        assert_eq!(write_document(&sample()), expected);
    }

    #[test]
    fn escapes_special_characters() {
        let mut doc = Document::new("de");
        doc.context_mut("C").messages.push(Message::new(
            "input & outputs <b>",
            "Sonic Pi's \"Editor\"",
        ));
        let out = write_document(&doc);
        assert!(out.contains("<source>input &amp; outputs &lt;b&gt;</source>"));
        assert!(out.contains("<translation>Sonic Pi&apos;s &quot;Editor&quot;</translation>"));
    }

    #[test]
    fn numerus_and_comments_round_trip() {
        let mut doc = Document::new("de");
        doc.source_language = Some("en".into());
        let mut ctx = Context::new("Files");
        ctx.comment = Some("file dialogs".into());
        let mut msg = Message::unfinished("%n file(s)");
        msg.id = Some("files.count".into());
        msg.comment = Some("status bar".into());
        msg.extra_comment = Some("count of selected files".into());
        msg.translator_comment = Some("prüfen".into());
        msg.old_comment = Some("status".into());
        msg.translation = Translation::Numerus(vec!["%n Datei".into(), "%n Dateien".into()]);
        msg.locations.push(Location {
            filename: None,
            line: Some(LineRef::Relative(4)),
        });
        ctx.messages.push(msg);
        let mut vanished = Message::new("Old", "Alt");
        vanished.status = TranslationStatus::Vanished;
        ctx.messages.push(vanished);
        doc.contexts.push(ctx);

        let text = write_document(&doc);
        assert!(text.contains("<message id=\"files.count\" numerus=\"yes\">"));
        assert!(text.contains("<location line=\"+4\"/>"));
        assert_eq!(parse_str(&text).unwrap(), doc);
    }

    #[test]
    fn control_characters_use_byte_elements() {
        let mut doc = Document::new("de");
        doc.context_mut("C")
            .messages
            .push(Message::new("bell\u{7}", "Zeile 1\nZeile 2\u{1b}"));
        let text = write_document(&doc);
        assert!(text.contains("<source>bell<byte value=\"x7\"/></source>"));
        assert!(text.contains("Zeile 1\nZeile 2<byte value=\"x1b\"/>"));
        assert_eq!(parse_str(&text).unwrap(), doc);
    }

    #[test]
    fn empty_numerus_translation_round_trips() {
        let mut doc = Document::new("de");
        let mut msg = Message::unfinished("%n item(s)");
        msg.translation = Translation::Numerus(Vec::new());
        doc.context_mut("C").messages.push(msg);
        assert_eq!(parse_str(&write_document(&doc)).unwrap(), doc);
    }

    #[test]
    fn write_file_reports_io_errors() {
        let dir = std::env::temp_dir().join("tscat-writer-missing-dir").join("nested");
        let err = write_file(&Document::new("de"), dir.join("out.ts")).unwrap_err();
        assert!(matches!(err, TsError::Io { .. }));
    }
}
