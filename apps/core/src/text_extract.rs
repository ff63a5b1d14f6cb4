//! Text extraction for uploaded essays
//! Supports: TXT, PDF, DOCX (and DOC through the DOCX reader)

use tracing::{info, warn};

use crate::error::AppError;

/// Extensions accepted for upload
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "pdf", "docx", "doc"];

/// Only the leading pages of a PDF are read
pub const MAX_PDF_PAGES: usize = 10;

/// Lowercased extension of `file_name`, empty if it has none
pub fn file_extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

pub fn is_supported_file(file_name: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&file_extension(file_name).as_str())
}

/// Extract text content from binary file data based on file extension
pub fn extract_text_from_file(file_name: &str, file_data: &[u8]) -> Result<String, AppError> {
    let extension = file_extension(file_name);

    info!("Extracting text from file: {} (type: {})", file_name, extension);

    match extension.as_str() {
        "txt" => String::from_utf8(file_data.to_vec())
            .map_err(|e| AppError::Extraction(format!("Invalid UTF-8 content: {}", e))),
        "pdf" => extract_pdf_text(file_data),
        "docx" | "doc" => extract_docx_text(file_data),
        _ => Err(AppError::Extraction(format!(
            "Unsupported file extension: {}",
            extension
        ))),
    }
}

fn extract_pdf_text(file_data: &[u8]) -> Result<String, AppError> {
    match pdf_extract::extract_text_from_mem_by_pages(file_data) {
        Ok(pages) => {
            if pages.len() > MAX_PDF_PAGES {
                info!(
                    "PDF has {} pages, keeping the first {}",
                    pages.len(),
                    MAX_PDF_PAGES
                );
            }
            let cleaned = clean_extracted_text(&leading_pages(&pages));
            info!("PDF extraction successful: {} characters", cleaned.chars().count());
            Ok(cleaned)
        }
        Err(e) => {
            warn!("PDF extraction failed: {}", e);
            Err(AppError::Extraction(format!("Failed to extract PDF text: {}", e)))
        }
    }
}

/// Text of the first [`MAX_PDF_PAGES`] pages, one page after another
fn leading_pages(pages: &[String]) -> String {
    pages
        .iter()
        .take(MAX_PDF_PAGES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_docx_text(file_data: &[u8]) -> Result<String, AppError> {
    let docx = docx_rs::read_docx(file_data).map_err(|e| {
        warn!("DOCX extraction failed: {}", e);
        AppError::Extraction(format!("Failed to extract DOCX text: {}", e))
    })?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .into_iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_text(&para)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    let cleaned = clean_extracted_text(&paragraphs.join("\n"));
    info!("DOCX extraction successful: {} characters", cleaned.chars().count());
    Ok(cleaned)
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let docx_rs::RunChild::Text(t) = run_child {
                    out.push_str(&t.text);
                }
            }
        }
    }
    out
}

/// Trim lines and drop blank ones, so each remaining line is a paragraph
fn clean_extracted_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_extraction() {
        let content = "私が総合政策に興味を持ったきっかけは\n絵を描くことです。".as_bytes();
        let result = extract_text_from_file("essay.txt", content);
        assert_eq!(
            result.unwrap(),
            "私が総合政策に興味を持ったきっかけは\n絵を描くことです。"
        );
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(is_supported_file("ESSAY.PDF"));
        assert!(is_supported_file("draft.Docx"));
        assert!(is_supported_file("old.doc"));
        assert!(!is_supported_file("notes.md"));
        assert!(!is_supported_file("no_extension"));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = extract_text_from_file("test.xyz", b"Some binary data");
        match result {
            Err(AppError::Extraction(msg)) => assert!(msg.contains("Unsupported")),
            other => panic!("Expected extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let result = extract_text_from_file("bad.txt", &[0xff, 0xfe, 0xfd]);
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_corrupt_pdf() {
        let result = extract_text_from_file("broken.pdf", b"not a pdf");
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_corrupt_docx() {
        let result = extract_text_from_file("broken.docx", b"not a zip archive");
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_empty_file() {
        let result = extract_text_from_file("empty.txt", b"");
        assert_eq!(result.unwrap(), "");
    }

    #[test]
    fn test_pdf_pages_are_capped() {
        let pages: Vec<String> = (1..=12).map(|i| format!("page {}", i)).collect();
        let text = leading_pages(&pages);

        assert!(text.starts_with("page 1\n"));
        assert!(text.ends_with("page 10"));
        assert!(!text.contains("page 11"));
        assert_eq!(text.lines().count(), MAX_PDF_PAGES);
    }

    #[test]
    fn test_clean_extracted_text() {
        let dirty = "  Line 1  \n\n  Line 2  \n   \n  Line 3  ";
        assert_eq!(clean_extracted_text(dirty), "Line 1\nLine 2\nLine 3");
    }
}
