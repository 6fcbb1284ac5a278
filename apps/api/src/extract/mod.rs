//! Document text extraction.
//!
//! Thin I/O adapters dispatched on file extension: PDF, DOCX, and plain
//! text. Anything else — including image uploads, which would need an OCR
//! engine this deployment does not ship — yields an empty string. Extraction
//! never errors outward; parse failures degrade to empty with a warning.

pub mod upload;

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

/// Returns the plain text of an uploaded document, or an empty string for
/// unsupported formats and unparseable files.
pub fn extract_text(bytes: &[u8], filename: &str) -> String {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        extract_pdf(bytes)
    } else if lower.ends_with(".docx") {
        extract_docx(bytes)
    } else if lower.ends_with(".txt") || lower.ends_with(".md") {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        warn!("Unsupported upload format: {filename}");
        String::new()
    }
}

fn extract_pdf(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF extraction failed: {e}");
            String::new()
        }
    }
}

fn extract_docx(bytes: &[u8]) -> String {
    match read_docx_document(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("DOCX extraction failed: {e}");
            String::new()
        }
    }
}

/// Pulls the run text out of `word/document.xml`, one line per paragraph.
fn read_docx_document(bytes: &[u8]) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut document = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut document)?;

    let mut reader = Reader::from_str(&document);
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::End(e) if e.local_name().as_ref() == b"p" => text.push('\n'),
            Event::Empty(e) if e.local_name().as_ref() == b"br" => text.push('\n'),
            Event::Empty(e) if e.local_name().as_ref() == b"tab" => text.push('\t'),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_fixture(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unsupported_extension_yields_empty() {
        assert_eq!(extract_text(b"binary", "photo.png"), "");
        assert_eq!(extract_text(b"binary", "resume.xlsx"), "");
        assert_eq!(extract_text(b"binary", "noextension"), "");
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = "Experienced Rust engineer.\nOpen source contributor.";
        assert_eq!(extract_text(text.as_bytes(), "resume.txt"), text);
        assert_eq!(extract_text(text.as_bytes(), "RESUME.TXT"), text);
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
                <w:p><w:r><w:t>Senior Backend Engineer</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;
        let bytes = docx_fixture(xml);
        let text = extract_text(&bytes, "resume.docx");
        assert!(text.contains("Jane Doe\n"));
        assert!(text.contains("Senior Backend Engineer\n"));
    }

    #[test]
    fn test_corrupt_docx_yields_empty() {
        assert_eq!(extract_text(b"not a zip archive", "resume.docx"), "");
    }

    #[test]
    fn test_docx_without_document_part_yields_empty() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("unrelated.txt", options).unwrap();
        writer.write_all(b"hello").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert_eq!(extract_text(&bytes, "resume.docx"), "");
    }
}
