//! Format-specific text extraction
//!
//! Every parser works on the raw bytes of one file and returns the text it
//! found, split into pages for paged formats. Failures carry the file path.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::FileType;

/// Text extracted from one page, or the whole file for unpaged formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    pub text: String,
    /// 0-based page index
    pub page: Option<u32>,
}

impl ParsedPage {
    fn whole(text: String) -> Self {
        Self { text, page: None }
    }
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Parse file bytes according to the detected type
    pub fn parse(path: &Path, file_type: FileType, data: &[u8]) -> Result<Vec<ParsedPage>> {
        match file_type {
            FileType::Txt => Self::parse_text(path, data).map(|t| vec![ParsedPage::whole(t)]),
            FileType::Markdown => Self::parse_markdown(path, data).map(|t| vec![ParsedPage::whole(t)]),
            FileType::Csv => Self::parse_csv(path, data),
            FileType::Pdf => Self::parse_pdf(path, data),
            FileType::Docx => Self::parse_docx(path, data).map(|t| vec![ParsedPage::whole(t)]),
        }
    }

    /// Plain text, strict UTF-8
    pub fn parse_text(path: &Path, data: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::load(path, format!("file is not valid UTF-8: {}", e)))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
    }

    /// Markdown rendered to plain text, blocks separated by blank lines
    pub fn parse_markdown(path: &Path, data: &[u8]) -> Result<String> {
        use pulldown_cmark::{Event, Parser, Tag, TagEnd};

        let source = Self::parse_text(path, data)?;
        let mut out = String::with_capacity(source.len());

        for event in Parser::new(&source) {
            match event {
                Event::Text(text) | Event::Code(text) => out.push_str(&text),
                Event::SoftBreak | Event::HardBreak => out.push('\n'),
                Event::Start(Tag::Item) => out.push_str("- "),
                Event::End(TagEnd::Item) => end_line(&mut out),
                Event::End(TagEnd::Paragraph)
                | Event::End(TagEnd::Heading(_))
                | Event::End(TagEnd::CodeBlock)
                | Event::End(TagEnd::List(_)) => end_block(&mut out),
                Event::Rule => end_block(&mut out),
                _ => {}
            }
        }

        Ok(out.trim().to_string())
    }

    /// One page per data row, each rendered as `header: value` lines
    pub fn parse_csv(path: &Path, data: &[u8]) -> Result<Vec<ParsedPage>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data);

        let headers = reader
            .headers()
            .map_err(|e| Error::load(path, format!("malformed CSV header: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| Error::load(path, format!("malformed CSV row {}: {}", i + 1, e)))?;
            let text = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| format!("{}: {}", header.trim(), value.trim()))
                .collect::<Vec<_>>()
                .join("\n");
            rows.push(ParsedPage::whole(text));
        }

        Ok(rows)
    }

    /// One page per PDF page that carries text
    #[cfg(feature = "pdf")]
    pub fn parse_pdf(path: &Path, data: &[u8]) -> Result<Vec<ParsedPage>> {
        match lopdf::Document::load_mem(data) {
            Ok(doc) => {
                let mut pages = Vec::new();
                for page_number in doc.get_pages().keys() {
                    match doc.extract_text(&[*page_number]) {
                        Ok(text) => {
                            let text = cleanup_pdf_text(&text);
                            if !text.is_empty() {
                                pages.push(ParsedPage {
                                    text,
                                    page: Some(page_number.saturating_sub(1)),
                                });
                            }
                        }
                        Err(e) => {
                            tracing::debug!(
                                "Could not extract text from page {} of {}: {}",
                                page_number,
                                path.display(),
                                e
                            );
                        }
                    }
                }

                if !pages.is_empty() {
                    return Ok(pages);
                }
                tracing::warn!(
                    "Per-page extraction found no text in {}, trying whole-file extraction",
                    path.display()
                );
                Self::parse_pdf_whole(path, data)
            }
            Err(e) => {
                tracing::warn!("lopdf could not open {}: {}, trying pdf-extract", path.display(), e);
                Self::parse_pdf_whole(path, data)
            }
        }
    }

    #[cfg(feature = "pdf")]
    fn parse_pdf_whole(path: &Path, data: &[u8]) -> Result<Vec<ParsedPage>> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::load(path, format!("failed to read PDF: {}", e)))?;
        let text = cleanup_pdf_text(&text);
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![ParsedPage::whole(text)])
    }

    #[cfg(not(feature = "pdf"))]
    pub fn parse_pdf(path: &Path, _data: &[u8]) -> Result<Vec<ParsedPage>> {
        Err(Error::load(path, "PDF support is disabled (enable the `pdf` feature)"))
    }

    /// Paragraph text joined by newlines
    #[cfg(feature = "docx")]
    pub fn parse_docx(path: &Path, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::load(path, format!("failed to read DOCX: {}", e)))?;

        let mut paragraphs = Vec::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut line = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                line.push_str(&t.text);
                            }
                        }
                    }
                }
                paragraphs.push(line);
            }
        }

        Ok(paragraphs.join("\n"))
    }

    #[cfg(not(feature = "docx"))]
    pub fn parse_docx(path: &Path, _data: &[u8]) -> Result<String> {
        Err(Error::load(path, "DOCX support is disabled (enable the `docx` feature)"))
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn end_block(out: &mut String) {
    if out.is_empty() {
        return;
    }
    let trimmed_len = out.trim_end_matches('\n').len();
    out.truncate(trimmed_len);
    out.push_str("\n\n");
}

/// Drop NUL bytes, trim lines and collapse blank runs left by PDF extraction
#[cfg(feature = "pdf")]
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{00A0}', " ")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
