//! Word (.docx) model documents
//!
//! A `.docx` is a ZIP package; only `word/document.xml` is parsed. Every other
//! entry is copied byte-for-byte when the document is saved.

mod body;
pub mod xml;

pub use body::{Cell, Paragraph, Row, Run, Table};

use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use xml::{Element, Node};

pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing package part: {0}")]
    MissingPart(String),

    #[error("Malformed document: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, DocxError>;

/// A loaded `.docx` package with its main document part parsed
#[derive(Debug, Clone)]
pub struct Document {
    package: Vec<u8>,
    nodes: Vec<Node>,
}

impl Document {
    /// Open a `.docx` from the file system
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    /// Load a `.docx` from in-memory package bytes
    pub fn from_bytes(package: Vec<u8>) -> Result<Self> {
        let xml = {
            let mut archive = ZipArchive::new(Cursor::new(package.as_slice()))?;
            let mut part = match archive.by_name(DOCUMENT_PART) {
                Ok(f) => f,
                Err(zip::result::ZipError::FileNotFound) => {
                    return Err(DocxError::MissingPart(DOCUMENT_PART.to_string()))
                }
                Err(e) => return Err(e.into()),
            };
            let mut xml = Vec::new();
            part.read_to_end(&mut xml)?;
            xml
        };

        let nodes = xml::parse(&xml)?;
        let doc = Self { package, nodes };
        if doc.body().is_none() {
            return Err(DocxError::Malformed("no w:document/w:body element".to_string()));
        }
        Ok(doc)
    }

    fn body(&self) -> Option<&Element> {
        self.nodes
            .iter()
            .find_map(|n| match n {
                Node::Element(e) if e.is("document") => Some(e),
                _ => None,
            })?
            .child_elements()
            .find(|e| e.is("body"))
    }

    fn body_mut(&mut self) -> Option<&mut Element> {
        self.nodes
            .iter_mut()
            .find_map(|n| match n {
                Node::Element(e) if e.is("document") => Some(e),
                _ => None,
            })?
            .child_elements_mut()
            .find(|e| e.is("body"))
    }

    /// Body-level paragraphs in document order
    pub fn paragraphs(&self) -> Vec<Paragraph<'_>> {
        self.body()
            .map(|b| b.child_elements().filter(|e| e.is("p")).map(Paragraph).collect())
            .unwrap_or_default()
    }

    /// Top-level tables in document order
    pub fn tables(&self) -> Vec<Table<'_>> {
        self.body()
            .map(|b| b.child_elements().filter(|e| e.is("tbl")).map(Table).collect())
            .unwrap_or_default()
    }

    /// Paragraph texts followed by table cell texts, newline-joined
    pub fn full_text(&self) -> String {
        let mut parts: Vec<String> = self.paragraphs().iter().map(|p| p.text()).collect();
        for table in self.tables() {
            for row in table.rows() {
                for cell in row.cells() {
                    parts.push(cell.text());
                }
            }
        }
        parts.join("\n")
    }

    /// Replace `old` with `new` in every body and table-cell paragraph whose
    /// text contains it, one run at a time. Returns the number of runs rewritten.
    pub fn replace_text(&mut self, old: &str, new: &str) -> usize {
        let mut rewritten = 0;
        if let Some(root) = self.body_mut() {
            body::for_each_paragraph_mut(root, &mut |p| {
                rewritten += body::replace_in_paragraph(p, old, new);
            });
        }
        rewritten
    }

    /// Serialize the package with the current main document part
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let document_xml = xml::write(&self.nodes)?;
        let mut archive = ZipArchive::new(Cursor::new(self.package.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            if entry.name() == DOCUMENT_PART {
                let options = SimpleFileOptions::default()
                    .compression_method(CompressionMethod::Deflated);
                drop(entry);
                writer.start_file(DOCUMENT_PART, options)?;
                writer.write_all(&document_xml)?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(&bytes)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_full_text_paragraphs_then_tables() {
        let body = format!(
            "{}{}{}",
            para(&["Safety ", "Data Sheet"]),
            table(&[&["Health", "3"], &["Fire", "0"]]),
            para(&["Acme Chemicals"])
        );
        let doc = Document::from_bytes(build_docx(&body)).unwrap();
        assert_eq!(
            doc.full_text(),
            "Safety Data Sheet\nAcme Chemicals\nHealth\n3\nFire\n0"
        );
    }

    #[test]
    fn test_empty_body_has_empty_text() {
        let doc = Document::from_bytes(build_docx("")).unwrap();
        assert_eq!(doc.full_text(), "");
        assert!(doc.paragraphs().is_empty());
    }

    #[test]
    fn test_missing_document_part() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/styles.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(Document::from_bytes(bytes), Err(DocxError::MissingPart(_))));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            Document::from_bytes(b"plain text".to_vec()),
            Err(DocxError::Zip(_))
        ));
    }

    #[test]
    fn test_replace_in_body_and_tables_then_reload() {
        let body = format!(
            "{}{}",
            para(&["Supplier: Acme"]),
            table(&[&["Acme Corp", "Ac"]])
        );
        let mut doc = Document::from_bytes(build_docx(&body)).unwrap();
        assert_eq!(doc.replace_text("Acme", "Globex"), 2);

        let reloaded = Document::from_bytes(doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.full_text(), "Supplier: Globex\nGlobex Corp\nAc");
    }

    #[test]
    fn test_save_copies_other_parts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.docx");
        let doc = Document::from_bytes(build_docx(&para(&["x"]))).unwrap();
        doc.save(&out).unwrap();

        let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut styles = String::new();
        archive.by_name("word/styles.xml").unwrap().read_to_string(&mut styles).unwrap();
        assert_eq!(styles, "<w:styles/>");
        assert!(archive.by_name("[Content_Types].xml").is_ok());
        assert_eq!(archive.len(), 3);
    }
}
