//! Word document readers: OOXML (`.docx`) and the legacy binary format (`.doc`).

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Pulls the body text out of `word/document.xml`.
///
/// Text runs (`w:t`) are concatenated in document order, which is also reading
/// order for table cells. Paragraph ends and explicit breaks become newlines,
/// tabs become spaces. The part may inflate to at most `max_xml_bytes`; the
/// declared size is checked first and the read itself is capped, since the
/// header can lie.
pub fn extract_docx(bytes: &[u8], max_xml_bytes: usize) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::malformed("docx", e))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::malformed("docx", e))?;

    let limit = max_xml_bytes as u64;
    if part.size() > limit {
        return Err(inflates_past(max_xml_bytes));
    }

    let mut xml = Vec::new();
    part.take(limit + 1)
        .read_to_end(&mut xml)
        .map_err(|e| ExtractError::malformed("docx", e))?;
    if xml.len() > max_xml_bytes {
        return Err(inflates_past(max_xml_bytes));
    }

    let xml = String::from_utf8(xml).map_err(|e| ExtractError::malformed("docx", e))?;
    document_xml_to_text(&xml)
}

fn inflates_past(limit: usize) -> ExtractError {
    ExtractError::malformed("docx", format!("{DOCUMENT_PART} inflates past {limit} bytes"))
}

fn document_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::with_capacity(xml.len() / 4);
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = true,
                b"tab" => out.push(' '),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push(' '),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                b"tc" => out.push(' '),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractError::malformed("docx", e))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractError::malformed("docx", e)),
        }
    }

    Ok(out)
}

/// Best-effort text recovery from a Word 97-2003 binary.
///
/// The binary keeps its text stream either as UTF-16LE or as 8-bit characters.
/// Both decodings are scanned for runs of printable characters and the one that
/// recovers more text wins. `\r` is Word's paragraph mark and becomes a newline.
pub fn extract_doc(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.len() < 8 || !bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return Err(ExtractError::Malformed {
            format: "doc",
            reason: "missing compound file signature".to_string(),
        });
    }

    let wide = printable_runs(
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .map(|unit| char::from_u32(unit as u32).unwrap_or('\0')),
    );
    let narrow = printable_runs(bytes.iter().map(|&b| b as char));

    Ok(if wide.len() >= narrow.len() {
        wide
    } else {
        narrow
    })
}

const MIN_RUN_CHARS: usize = 4;

fn printable_runs(chars: impl Iterator<Item = char>) -> String {
    let mut out = String::new();
    let mut run = String::new();

    for c in chars {
        match c {
            '\r' | '\n' => {
                run.push('\n');
            }
            '\t' => run.push(' '),
            c if is_document_char(c) => run.push(c),
            _ => flush_run(&mut run, &mut out),
        }
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut String, out: &mut String) {
    if run.trim().chars().count() >= MIN_RUN_CHARS {
        out.push_str(run);
        out.push('\n');
    }
    run.clear();
}

fn is_document_char(c: char) -> bool {
    !c.is_control()
        && c != '\u{fffd}'
        && !('\u{e000}'..='\u{f8ff}').contains(&c)
        && (c.is_alphanumeric() || c.is_whitespace() || c.is_ascii_punctuation() || c == '•')
}

#[cfg(test)]
pub(crate) fn build_docx(document_xml: &str) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(DOCUMENT_PART, zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(document_xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
