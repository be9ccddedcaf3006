//! Paragraphs, runs and tables of a WordprocessingML body
//!
//! Only the parts the filler reads or writes are modelled: body-level
//! paragraphs, top-level tables, and the direct paragraphs of their cells.

use super::xml::{Element, Node};

/// Read-only view of a `w:p` element
#[derive(Debug, Clone, Copy)]
pub struct Paragraph<'a>(pub(crate) &'a Element);

/// Read-only view of a `w:r` element
#[derive(Debug, Clone, Copy)]
pub struct Run<'a>(pub(crate) &'a Element);

#[derive(Debug, Clone, Copy)]
pub struct Table<'a>(pub(crate) &'a Element);

#[derive(Debug, Clone, Copy)]
pub struct Row<'a>(&'a Element);

#[derive(Debug, Clone, Copy)]
pub struct Cell<'a>(&'a Element);

impl<'a> Paragraph<'a> {
    /// Text of every run, including runs inside hyperlinks
    pub fn text(&self) -> String {
        paragraph_text(self.0)
    }

    /// Direct runs, the unit of replacement
    pub fn runs(&self) -> Vec<Run<'a>> {
        self.0.child_elements().filter(|e| e.is("r")).map(Run).collect()
    }
}

impl<'a> Run<'a> {
    pub fn text(&self) -> String {
        run_text(self.0)
    }
}

impl<'a> Table<'a> {
    pub fn rows(&self) -> Vec<Row<'a>> {
        self.0.child_elements().filter(|e| e.is("tr")).map(Row).collect()
    }
}

impl<'a> Row<'a> {
    pub fn cells(&self) -> Vec<Cell<'a>> {
        self.0.child_elements().filter(|e| e.is("tc")).map(Cell).collect()
    }
}

impl<'a> Cell<'a> {
    pub fn paragraphs(&self) -> Vec<Paragraph<'a>> {
        self.0.child_elements().filter(|e| e.is("p")).map(Paragraph).collect()
    }

    /// Newline join of the cell's paragraphs
    pub fn text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub(crate) fn paragraph_text(p: &Element) -> String {
    let mut text = String::new();
    for child in p.child_elements() {
        if child.is("r") {
            text.push_str(&run_text(child));
        } else if child.is("hyperlink") {
            for r in child.child_elements().filter(|e| e.is("r")) {
                text.push_str(&run_text(r));
            }
        }
    }
    text
}

pub(crate) fn run_text(r: &Element) -> String {
    let mut text = String::new();
    for child in r.child_elements() {
        match child.local_name() {
            b"t" => text.push_str(&child.text()),
            b"tab" | b"ptab" => text.push('\t'),
            b"cr" => text.push('\n'),
            b"br" => match child.attribute("type").as_deref() {
                None | Some("textWrapping") => text.push('\n'),
                _ => {}
            },
            b"noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

/// Replace the run's content with `text`, keeping its `w:rPr`.
///
/// Tabs become `w:tab`, line breaks become `w:br`, everything else goes into
/// `w:t` elements.
pub(crate) fn set_run_text(r: &mut Element, text: &str) {
    let prefix = r.prefix();
    r.children
        .retain(|n| matches!(n, Node::Element(e) if e.is("rPr")));

    let mut pending = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' | '\r' => {
                flush_text(r, &prefix, &mut pending);
                let name = if ch == '\t' { "tab" } else { "br" };
                r.children.push(Node::Element(Element::new(&format!("{}{}", prefix, name))));
            }
            _ => pending.push(ch),
        }
    }
    flush_text(r, &prefix, &mut pending);
}

fn flush_text(r: &mut Element, prefix: &str, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let mut t = Element::new(&format!("{}t", prefix));
    if pending.starts_with(char::is_whitespace) || pending.ends_with(char::is_whitespace) {
        t = t.with_attribute("xml:space", "preserve");
    }
    r.children.push(Node::Element(t.with_text(pending)));
    pending.clear();
}

/// Replace `old` with `new` inside each direct run of `p` whose own text
/// contains `old`. Matches spanning several runs are left alone.
///
/// Returns the number of runs rewritten.
pub(crate) fn replace_in_paragraph(p: &mut Element, old: &str, new: &str) -> usize {
    if !paragraph_text(p).contains(old) {
        return 0;
    }
    let mut rewritten = 0;
    for run in p.child_elements_mut().filter(|e| e.is("r")) {
        let text = run_text(run);
        if text.contains(old) {
            set_run_text(run, &text.replace(old, new));
            rewritten += 1;
        }
    }
    rewritten
}

/// Visit body paragraphs and the direct paragraphs of top-level table cells
pub(crate) fn for_each_paragraph_mut(body: &mut Element, f: &mut impl FnMut(&mut Element)) {
    for block in body.child_elements_mut() {
        if block.is("p") {
            f(block);
        } else if block.is("tbl") {
            for row in block.child_elements_mut().filter(|e| e.is("tr")) {
                for cell in row.child_elements_mut().filter(|e| e.is("tc")) {
                    for p in cell.child_elements_mut().filter(|e| e.is("p")) {
                        f(p);
                    }
                }
            }
        }
    }
}
