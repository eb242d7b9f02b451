//! PDF loading: one text entry per page

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{FileType, LoadedDocument, PageText};

/// Upper bound for the pdf-extract fallback, which can hang on odd fonts
const FALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Normalize glyphs that PDF fonts commonly emit
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
}

/// Loads PDFs into per-page text
pub struct PdfLoader;

impl PdfLoader {
    /// Load a PDF from disk
    pub fn load_file(path: &Path) -> Result<LoadedDocument> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string();

        if !FileType::from_filename(&filename).is_supported() {
            return Err(Error::UnsupportedFileType(filename));
        }

        let data = std::fs::read(path)
            .map_err(|e| Error::file_parse(&filename, format!("Failed to read file: {}", e)))?;

        Self::load_bytes(&filename, &data)
    }

    /// Load a PDF from memory.
    ///
    /// Pages come back in document order with 0-based indices. A page without
    /// extractable text is kept as an empty entry so the page count stays
    /// accurate.
    pub fn load_bytes(filename: &str, data: &[u8]) -> Result<LoadedDocument> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        if doc.is_encrypted() {
            return Err(Error::file_parse(filename, "PDF is encrypted"));
        }

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(Error::file_parse(filename, "PDF has no pages"));
        }

        let mut pages: Vec<PageText> = page_numbers
            .iter()
            .enumerate()
            .map(|(idx, &number)| {
                let content = match doc.extract_text(&[number]) {
                    Ok(text) => cleanup_pdf_text(&text),
                    Err(e) => {
                        tracing::debug!("lopdf could not extract page {}: {}", number, e);
                        String::new()
                    }
                };
                PageText {
                    page: idx as u32,
                    content,
                }
            })
            .collect();

        if pages.iter().all(|p| p.content.trim().is_empty()) {
            tracing::warn!("lopdf found no text in {}, trying pdf-extract", filename);
            if let Some(text) = Self::extract_text_fallback(data) {
                let split: Vec<&str> = text.split('\x0c').collect();
                if split.len() == pages.len() {
                    for (page, text) in pages.iter_mut().zip(split) {
                        page.content = cleanup_pdf_text(text);
                    }
                } else if let Some(first) = pages.first_mut() {
                    // No usable page breaks; keep the text on the first page
                    first.content = cleanup_pdf_text(&text);
                }
            }
        }

        tracing::debug!("Loaded {} with {} pages", filename, pages.len());

        Ok(LoadedDocument {
            filename: filename.to_string(),
            pages,
            content_hash: hash_bytes(data),
        })
    }

    /// Whole-document extraction through pdf-extract on a watchdog thread
    fn extract_text_fallback(data: &[u8]) -> Option<String> {
        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(FALLBACK_TIMEOUT) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                Some(text)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("pdf-extract failed: {}", e);
                None
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!(
                    "pdf-extract timed out after {}s",
                    FALLBACK_TIMEOUT.as_secs()
                );
                None
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("pdf-extract thread crashed");
                None
            }
        }
    }
}

/// SHA-256 of raw bytes, hex encoded
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![50.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_loads_pages_in_order() {
        let data = build_pdf(&["First page text", "Second page text", "Third page text"]);
        let doc = PdfLoader::load_bytes("guide.pdf", &data).unwrap();

        assert_eq!(doc.filename, "guide.pdf");
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.pages[0].page, 0);
        assert_eq!(doc.pages[2].page, 2);
        assert!(doc.pages[0].content.contains("First page text"));
        assert!(doc.pages[1].content.contains("Second page text"));
        assert!(doc.pages[2].content.contains("Third page text"));
    }

    #[test]
    fn test_blank_page_is_kept() {
        let data = build_pdf(&["Cover", "", "Body"]);
        let doc = PdfLoader::load_bytes("blank.pdf", &data).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert!(doc.pages[1].content.trim().is_empty());
    }

    #[test]
    fn test_hash_is_of_raw_bytes() {
        let data = build_pdf(&["Hashed"]);
        let doc = PdfLoader::load_bytes("h.pdf", &data).unwrap();
        assert_eq!(doc.content_hash, hash_bytes(&data));
        assert_eq!(doc.content_hash.len(), 64);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = PdfLoader::load_bytes("broken.pdf", b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let err = PdfLoader::load_file(Path::new("/nonexistent/dir/missing.pdf")).unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }

    #[test]
    fn test_non_pdf_rejected() {
        let err = PdfLoader::load_file(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[test]
    fn test_cleanup_replaces_ligatures() {
        assert_eq!(cleanup_pdf_text("e\u{FB03}cient\r\nof\u{FB01}ce\0"), "efficient\noffice");
    }
}
