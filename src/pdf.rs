//! PDF-to-text extraction.
//!
//! Scanned PDFs have no text layer; they come back as an empty string rather
//! than an error so callers can tell "no text" apart from "unreadable file".

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to read PDF: {0}")]
    Unreadable(String),
    #[error("PDF extraction aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Best-effort sniff for PDF bytes (magic header)
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

/// Extract the text of every page, one line per non-empty page, in page order.
///
/// Parsing runs on the blocking pool; a panic inside the parser surfaces as
/// [`PdfError::Aborted`].
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, PdfError> {
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| PdfError::Unreadable(e.to_string()))
    })
    .await??;

    debug!(pages = pages.len(), "extracted PDF pages");
    Ok(join_pages(&pages))
}

/// Collapse whitespace in each page and join the non-empty ones with newlines
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| page.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A one-page PDF whose page has no content stream
    pub(crate) fn blank_pdf() -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << >> >>",
        ];

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        out
    }

    #[test]
    fn joins_non_empty_pages_in_order() {
        let pages = ["  一ページ目の\n本文  ", "   ", "", "三ページ目"];
        assert_eq!(join_pages(&pages), "一ページ目の 本文\n三ページ目");
    }

    #[test]
    fn all_blank_pages_join_to_empty() {
        assert_eq!(join_pages(&["", " \n "]), "");
    }

    #[test]
    fn sniffs_pdf_header() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(!looks_like_pdf(b"<html>"));
    }

    #[tokio::test]
    async fn blank_pdf_has_no_text() {
        let text = extract_pdf_text(blank_pdf()).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn corrupt_bytes_are_an_error() {
        assert!(extract_pdf_text(b"%PDF-1.4 garbage".to_vec()).await.is_err());
    }
}
