//! Text search over a document's content streams
//!
//! Glyph positions come from replaying the text-positioning operators with
//! an approximate advance of half an em per character; the document's own
//! font metrics are not consulted. That is precise enough to scroll to and
//! highlight a match, which is all search results are used for.

use crate::coords::{PageFrame, PdfRect};
use annotation_types::{Bounds, SearchHandler, SearchResult, SearchState};
use lopdf::content::Content;
use lopdf::{Document, Object};
use tracing::debug;

/// Characters of context on each side of a match
const SNIPPET_CONTEXT: usize = 20;

/// Advance width of every glyph, in text space ems
const GLYPH_ADVANCE: f64 = 0.5;

/// Descent below the baseline, in ems
const DESCENT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let nums = numbers(operands);
        (nums.len() == 6).then(|| Matrix([nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]]))
    }

    /// `self` applied first, then `other`
    fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn origin(&self) -> (f64, f64) {
        (self.0[4], self.0[5])
    }

    fn vertical_scale(&self) -> f64 {
        self.0[2].hypot(self.0[3])
    }
}

fn numbers(operands: &[Object]) -> Vec<f64> {
    operands
        .iter()
        .filter_map(|o| o.as_float().ok().map(f64::from))
        .collect()
}

/// Decode a string operand: UTF-16BE with BOM, then UTF-8, then Latin-1
fn decode_operand(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Positioned characters of one page
#[derive(Debug, Clone, Default)]
struct PageText {
    page: u32,
    chars: Vec<char>,
    /// Glyph box of each char, page space
    boxes: Vec<PdfRect>,
}

impl PageText {
    fn push(&mut self, c: char, rect: PdfRect) {
        self.chars.push(c);
        self.boxes.push(rect);
    }

    fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

/// Replays text operators, accumulating positioned characters
struct TextCursor<'p> {
    out: &'p mut PageText,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    font_size: f64,
    leading: f64,
}

impl<'p> TextCursor<'p> {
    fn new(out: &'p mut PageText) -> Self {
        Self {
            out,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font_size: 0.0,
            leading: 0.0,
        }
    }

    fn next_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn advance(&mut self, tx: f64) {
        self.tm = Matrix::translate(tx, 0.0).then(&self.tm);
    }

    fn show(&mut self, text: &str) {
        let size = self.font_size;
        for c in text.chars() {
            let trm = self.tm.then(&self.ctm);
            let (x, y) = trm.origin();
            let em = size * trm.vertical_scale();
            self.separate_from_previous(x, y, em);
            self.out.push(
                c,
                PdfRect {
                    x,
                    y: y - DESCENT * em,
                    width: GLYPH_ADVANCE * em,
                    height: em,
                },
            );
            self.advance(GLYPH_ADVANCE * size);
        }
    }

    /// Insert a space where a run starts on a new line or after a visible gap
    fn separate_from_previous(&mut self, x: f64, y: f64, em: f64) {
        let (Some(&last), Some(prev)) = (self.out.chars.last(), self.out.boxes.last().copied())
        else {
            return;
        };
        if last.is_whitespace() {
            return;
        }
        let prev_baseline = prev.y + DESCENT * prev.height;
        let new_line = (y - prev_baseline).abs() > em * 0.5;
        let gap = x - (prev.x + prev.width) > em * 0.25;
        if new_line || gap {
            self.out.push(
                ' ',
                PdfRect {
                    x: prev.x + prev.width,
                    width: 0.0,
                    ..prev
                },
            );
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(m) = self.ctm_stack.pop() {
                    self.ctm = m;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.then(&self.ctm);
                }
            }
            "BT" => {
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(size) = numbers(operands).first() {
                    self.font_size = *size;
                }
            }
            "TL" => {
                if let Some(l) = numbers(operands).first() {
                    self.leading = *l;
                }
            }
            "Td" | "TD" => {
                let nums = numbers(operands);
                if nums.len() == 2 {
                    if operator == "TD" {
                        self.leading = -nums[1];
                    }
                    self.next_line(nums[0], nums[1]);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.tm = m;
                    self.tlm = m;
                }
            }
            "T*" => self.next_line(0.0, -self.leading),
            "Tj" => self.show_operand(operands.first()),
            "'" => {
                self.next_line(0.0, -self.leading);
                self.show_operand(operands.first());
            }
            "\"" => {
                self.next_line(0.0, -self.leading);
                self.show_operand(operands.get(2));
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(..) => self.show_operand(Some(item)),
                            other => {
                                if let Ok(n) = other.as_float() {
                                    self.advance(-(n as f64) / 1000.0 * self.font_size);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn show_operand(&mut self, operand: Option<&Object>) {
        if let Some(Object::String(bytes, _)) = operand {
            let text = decode_operand(bytes);
            self.show(&text);
        }
    }
}

/// Searchable text of a whole document
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    pages: Vec<(PageFrame, PageText)>,
}

impl TextIndex {
    /// Extract positioned text from every page
    pub fn build(doc: &Document, surface_scale: f64) -> Self {
        let mut pages = Vec::new();
        for (page_num, page_id) in doc.get_pages() {
            let frame = PageFrame::for_page(doc, page_id, surface_scale);
            let mut text = PageText {
                page: page_num,
                ..Default::default()
            };
            match doc
                .get_page_content(page_id)
                .and_then(|bytes| Content::decode(&bytes))
            {
                Ok(content) => {
                    let mut cursor = TextCursor::new(&mut text);
                    for op in &content.operations {
                        cursor.apply(&op.operator, &op.operands);
                    }
                }
                Err(e) => debug!(page = page_num, error = %e, "page content not searchable"),
            }
            pages.push((frame, text));
        }
        Self { pages }
    }

    /// Plain text of a 1-based page
    pub fn page_text(&self, page: u32) -> Option<String> {
        self.pages
            .iter()
            .find(|(_, t)| t.page == page)
            .map(|(_, t)| t.text())
    }

    /// Case-insensitive matches in page order, numbered across the document
    pub fn find(&self, query: &str) -> Vec<SearchResult> {
        let needle: Vec<char> = query.trim().chars().map(fold).collect();
        let mut results = Vec::new();
        if needle.is_empty() {
            return results;
        }
        for (frame, page) in &self.pages {
            let hay: Vec<char> = page.chars.iter().copied().map(fold).collect();
            if hay.len() < needle.len() {
                continue;
            }
            let mut start = 0;
            while start + needle.len() <= hay.len() {
                if hay[start..start + needle.len()] == needle[..] {
                    let end = start + needle.len();
                    results.push(SearchResult {
                        page: page.page,
                        text: snippet(&page.chars, start, end),
                        bounds: enclosing(frame, &page.boxes[start..end]),
                        index: results.len(),
                    });
                    start = end;
                } else {
                    start += 1;
                }
            }
        }
        results
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn snippet(chars: &[char], start: usize, end: usize) -> String {
    let from = start.saturating_sub(SNIPPET_CONTEXT);
    let to = (end + SNIPPET_CONTEXT).min(chars.len());
    chars[from..to].iter().collect::<String>().trim().to_string()
}

fn enclosing(frame: &PageFrame, boxes: &[PdfRect]) -> Bounds {
    let x0 = boxes.iter().map(|b| b.x).fold(f64::INFINITY, f64::min);
    let y0 = boxes.iter().map(|b| b.y).fold(f64::INFINITY, f64::min);
    let x1 = boxes.iter().map(|b| b.x + b.width).fold(f64::NEG_INFINITY, f64::max);
    let y1 = boxes.iter().map(|b| b.y + b.height).fold(f64::NEG_INFINITY, f64::max);
    frame.to_surface_bounds(PdfRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

/// Search handler over a prebuilt index, tracking the selected result
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    index: TextIndex,
    state: SearchState,
}

impl SearchSession {
    pub fn new(index: TextIndex) -> Self {
        Self {
            index,
            state: SearchState::default(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn current(&self) -> Option<&SearchResult> {
        self.state.current()
    }

    pub fn next(&mut self) -> Option<&SearchResult> {
        self.state.next()
    }

    pub fn previous(&mut self) -> Option<&SearchResult> {
        self.state.previous()
    }
}

impl SearchHandler for SearchSession {
    fn on_search(&mut self, query: &str) {
        let results = self.index.find(query);
        debug!(query, matches = results.len(), "search");
        self.state.set_results(query, results);
    }

    fn on_result_select(&mut self, index: usize) {
        self.state.select(index);
    }

    fn results(&self) -> &[SearchResult] {
        &self.state.results
    }

    fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }
}
