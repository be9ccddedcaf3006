//! PDF text extraction wrapper
//!
//! Wraps pdf-extract crate with error handling for:
//! - Unreadable files
//! - Corrupted or encrypted PDFs
//! - Panics inside the parser on unusual font encodings

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("PDF parser panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Text of each page, in page order
pub fn extract_pages_from_bytes(pdf_bytes: &[u8]) -> Result<Vec<String>> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    }));

    match outcome {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PdfError::Parse(e.to_string())),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(PdfError::Panicked(msg))
        }
    }
}

/// Extract full text from PDF bytes: every page concatenated in order
pub fn extract_text_from_bytes(pdf_bytes: &[u8]) -> Result<String> {
    Ok(extract_pages_from_bytes(pdf_bytes)?.concat())
}

/// Extract full text from a PDF file
pub fn extract_text_from_pdf<P: AsRef<Path>>(path: P) -> Result<String> {
    let bytes = std::fs::read(path.as_ref())?;
    let text = extract_text_from_bytes(&bytes)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        chars = text.chars().count(),
        "extracted PDF text"
    );
    Ok(text)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Builds small multi-page PDFs for tests

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// One page per entry, each showing its text in Courier
    pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
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
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
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
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::build_pdf;
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_text_from_pdf(dir.path().join("missing.pdf"));
        assert!(matches!(result, Err(PdfError::Io(_))));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(extract_text_from_bytes(b"not a pdf at all").is_err());
        assert!(extract_text_from_bytes(&[]).is_err());
    }

    #[test]
    fn test_pages_concatenate_in_order() {
        let bytes = build_pdf(&["PageOneAlpha", "PageTwoBeta", "PageThreeGamma"]);

        let pages = extract_pages_from_bytes(&bytes).unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains("PageOneAlpha"));
        assert!(pages[2].contains("PageThreeGamma"));

        let text = extract_text_from_bytes(&bytes).unwrap();
        assert_eq!(text, pages.concat());
        let first = text.find("PageOneAlpha").unwrap();
        let second = text.find("PageTwoBeta").unwrap();
        let third = text.find("PageThreeGamma").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_extract_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.pdf");
        std::fs::write(&path, build_pdf(&["Potassium hydroxide"])).unwrap();
        assert!(extract_text_from_pdf(&path).unwrap().contains("Potassium hydroxide"));
    }
}
