//! Content stream interpreter.
//!
//! Walks a page's operators keeping graphics and text state, and turns shown
//! strings into positioned [`Char`]s and painted paths into ruling [`Edge`]s.
//! Coordinates come out in top-left page space.

use crate::document::{dict_get, number, resolve, stream_bytes, PageInfo};
use crate::font::PdfFont;
use crate::geometry::{apply, multiply, Edge, EdgeKind, Matrix, IDENTITY};
use crate::PdfError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::rc::Rc;

/// Form XObjects nested deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 12;

/// A single positioned glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Char {
    pub text: String,
    pub fontname: String,
    /// Rendered size (height of the glyph box)
    pub size: f64,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    /// `top` measured from the top of the first page
    pub doctop: f64,
    /// Baseline runs left to right without rotation
    pub upright: bool,
    pub width: f64,
    pub height: f64,
}

/// Everything the interpreter extracted from one page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub chars: Vec<Char>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Rc<PdfFont>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

#[derive(Debug, Clone, Default)]
struct Subpath {
    /// Points in top-left page space
    points: Vec<(f64, f64)>,
    closed: bool,
    curved: bool,
}

struct Interpreter<'a> {
    doc: &'a Document,
    page_height: f64,
    doctop_offset: f64,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    path: Vec<Subpath>,
    font_cache: HashMap<ObjectId, Rc<PdfFont>>,
    out: PageContent,
}

/// Interpret a page content stream.
pub fn interpret_page(
    doc: &Document,
    content: &[u8],
    resources: Option<&Dictionary>,
    page: &PageInfo,
) -> Result<PageContent, PdfError> {
    let content = Content::decode(content)?;

    let [x0, y0, x1, y1] = page.media_box;
    let ctm = match page.rotation {
        90 => [0.0, -1.0, 1.0, 0.0, -y0, x1],
        180 => [-1.0, 0.0, 0.0, -1.0, x1, y1],
        270 => [0.0, 1.0, -1.0, 0.0, y1, -x0],
        _ => [1.0, 0.0, 0.0, 1.0, -x0, -y0],
    };

    let mut interp = Interpreter {
        doc,
        page_height: page.height,
        doctop_offset: page.doctop_offset,
        state: GraphicsState {
            ctm,
            text: TextState::default(),
        },
        stack: Vec::new(),
        text_matrix: IDENTITY,
        line_matrix: IDENTITY,
        path: Vec::new(),
        font_cache: HashMap::new(),
        out: PageContent::default(),
    };
    interp.run(&content.operations, resources, 0);

    log::debug!(
        "page {}: {} chars, {} edges",
        page.number,
        interp.out.chars.len(),
        interp.out.edges.len()
    );
    Ok(interp.out)
}

fn operands(op: &Operation) -> Vec<f64> {
    op.operands.iter().filter_map(number).collect()
}

impl<'a> Interpreter<'a> {
    fn run(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: usize) {
        for op in operations {
            let nums = operands(op);
            match op.operator.as_str() {
                // Graphics state
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if let Some(saved) = self.stack.pop() {
                        self.state = saved;
                    }
                }
                "cm" => {
                    if nums.len() >= 6 {
                        let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                        self.state.ctm = multiply(&m, &self.state.ctm);
                    }
                }

                // Path construction
                "m" => {
                    if nums.len() >= 2 {
                        let p = self.to_page(nums[0], nums[1]);
                        self.path.push(Subpath {
                            points: vec![p],
                            ..Subpath::default()
                        });
                    }
                }
                "l" => {
                    if nums.len() >= 2 {
                        let p = self.to_page(nums[0], nums[1]);
                        self.extend_path(p, false);
                    }
                }
                "c" => {
                    if nums.len() >= 6 {
                        let p = self.to_page(nums[4], nums[5]);
                        self.extend_path(p, true);
                    }
                }
                "v" | "y" => {
                    if nums.len() >= 4 {
                        let p = self.to_page(nums[2], nums[3]);
                        self.extend_path(p, true);
                    }
                }
                "h" => {
                    if let Some(sp) = self.path.last_mut() {
                        sp.closed = true;
                    }
                }
                "re" => {
                    if nums.len() >= 4 {
                        let (x, y, w, h) = (nums[0], nums[1], nums[2], nums[3]);
                        let points = vec![
                            self.to_page(x, y),
                            self.to_page(x + w, y),
                            self.to_page(x + w, y + h),
                            self.to_page(x, y + h),
                        ];
                        self.path.push(Subpath {
                            points,
                            closed: true,
                            curved: false,
                        });
                    }
                }

                // Path painting
                "S" | "f" | "F" | "f*" | "B" | "B*" => self.paint_path(),
                "s" | "b" | "b*" => {
                    if let Some(sp) = self.path.last_mut() {
                        sp.closed = true;
                    }
                    self.paint_path();
                }
                "n" => self.path.clear(),

                // Text objects
                "BT" => {
                    self.text_matrix = IDENTITY;
                    self.line_matrix = IDENTITY;
                }
                "ET" => {}

                // Text state
                "Tf" => {
                    if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                        self.state.text.font = Some(self.load_font(resources, name));
                    }
                    if let Some(&size) = nums.last() {
                        self.state.text.font_size = size;
                    }
                }
                "Tc" => {
                    if let Some(&v) = nums.first() {
                        self.state.text.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(&v) = nums.first() {
                        self.state.text.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(&v) = nums.first() {
                        self.state.text.horizontal_scale = v / 100.0;
                    }
                }
                "TL" => {
                    if let Some(&v) = nums.first() {
                        self.state.text.leading = v;
                    }
                }
                "Ts" => {
                    if let Some(&v) = nums.first() {
                        self.state.text.rise = v;
                    }
                }

                // Text positioning
                "Td" => {
                    if nums.len() >= 2 {
                        self.move_line(nums[0], nums[1]);
                    }
                }
                "TD" => {
                    if nums.len() >= 2 {
                        self.state.text.leading = -nums[1];
                        self.move_line(nums[0], nums[1]);
                    }
                }
                "Tm" => {
                    if nums.len() >= 6 {
                        self.line_matrix = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                        self.text_matrix = self.line_matrix;
                    }
                }
                "T*" => self.next_line(),

                // Text showing
                "Tj" => {
                    if let Some(bytes) = op.operands.first().and_then(string_bytes) {
                        self.show_string(bytes);
                    }
                }
                "TJ" => {
                    if let Some(Ok(array)) = op.operands.first().map(|o| o.as_array()) {
                        for item in array {
                            match item {
                                Object::String(bytes, _) => self.show_string(bytes),
                                other => {
                                    if let Some(n) = number(other) {
                                        let ts = &self.state.text;
                                        let tx = -n / 1000.0 * ts.font_size * ts.horizontal_scale;
                                        self.advance(tx);
                                    }
                                }
                            }
                        }
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(bytes) = op.operands.first().and_then(string_bytes) {
                        self.show_string(bytes);
                    }
                }
                "\"" => {
                    if nums.len() >= 2 {
                        self.state.text.word_spacing = nums[0];
                        self.state.text.char_spacing = nums[1];
                    }
                    self.next_line();
                    if let Some(bytes) = op.operands.get(2).and_then(string_bytes) {
                        self.show_string(bytes);
                    }
                }

                // External objects
                "Do" => {
                    if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                        self.do_xobject(resources, name, depth);
                    }
                }

                other => {
                    log::trace!("ignoring operator {}", other);
                }
            }
        }
    }

    /// User space to top-left page space through the current CTM.
    fn to_page(&self, x: f64, y: f64) -> (f64, f64) {
        let (dx, dy) = apply(&self.state.ctm, x, y);
        (dx, self.page_height - dy)
    }

    fn extend_path(&mut self, p: (f64, f64), curved: bool) {
        if let Some(sp) = self.path.last_mut().filter(|sp| !sp.closed) {
            sp.points.push(p);
            sp.curved |= curved;
            return;
        }
        // A closed subpath leaves the current point at its start
        let start = self
            .path
            .last()
            .and_then(|sp| sp.points.first().copied())
            .unwrap_or(p);
        self.path.push(Subpath {
            points: vec![start, p],
            closed: false,
            curved,
        });
    }

    fn paint_path(&mut self) {
        for sp in self.path.drain(..) {
            self.out.edges.extend(subpath_edges(&sp));
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f64) {
        self.text_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, 0.0], &self.text_matrix);
    }

    fn load_font(&mut self, resources: Option<&'a Dictionary>, name: &[u8]) -> Rc<PdfFont> {
        let doc = self.doc;
        let entry = resources
            .and_then(|r| dict_get(doc, r, b"Font"))
            .and_then(|o| o.as_dict().ok())
            .and_then(|fonts| fonts.get(name).ok());

        let Some(entry) = entry else {
            log::debug!("font /{} not found, using fallback", String::from_utf8_lossy(name));
            return Rc::new(PdfFont::fallback());
        };

        if let Object::Reference(id) = entry {
            if let Some(font) = self.font_cache.get(id) {
                return Rc::clone(font);
            }
        }

        let font = match resolve(doc, entry).as_dict() {
            Ok(dict) => Rc::new(PdfFont::from_dict(doc, dict)),
            Err(_) => Rc::new(PdfFont::fallback()),
        };
        if let Object::Reference(id) = entry {
            self.font_cache.insert(*id, Rc::clone(&font));
        }
        font
    }

    fn show_string(&mut self, bytes: &[u8]) {
        let ts = self.state.text.clone();
        let font = ts.font.clone().unwrap_or_else(|| Rc::new(PdfFont::fallback()));

        for glyph in font.decode(bytes) {
            let trm = multiply(&self.text_matrix, &self.state.ctm);
            let adv = glyph.width * ts.font_size * ts.horizontal_scale;
            let lo = font.descent * ts.font_size + ts.rise;
            let hi = lo + ts.font_size;

            if !glyph.text.is_empty() {
                let corners = [
                    apply(&trm, 0.0, lo),
                    apply(&trm, adv, lo),
                    apply(&trm, 0.0, hi),
                    apply(&trm, adv, hi),
                ];
                let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
                let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
                let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
                let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

                let top = self.page_height - max_y;
                let bottom = self.page_height - min_y;
                let height = bottom - top;
                self.out.chars.push(Char {
                    text: glyph.text.clone(),
                    fontname: font.base_name.clone(),
                    size: height,
                    x0: min_x,
                    x1: max_x,
                    top,
                    bottom,
                    doctop: top + self.doctop_offset,
                    upright: trm[0] * trm[3] > 0.0 && trm[1] * trm[2] <= 0.0,
                    width: max_x - min_x,
                    height,
                });
            }

            let mut tx = glyph.width * ts.font_size + ts.char_spacing;
            if glyph.is_word_space {
                tx += ts.word_spacing;
            }
            self.advance(tx * ts.horizontal_scale);
        }
    }

    fn do_xobject(&mut self, resources: Option<&'a Dictionary>, name: &[u8], depth: usize) {
        if depth >= MAX_FORM_DEPTH {
            log::warn!("form XObject nesting too deep, skipping /{}", String::from_utf8_lossy(name));
            return;
        }
        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|r| dict_get(doc, r, b"XObject"))
            .and_then(|o| o.as_dict().ok())
            .and_then(|x| dict_get(doc, x, name))
            .and_then(|o| o.as_stream().ok())
        else {
            return;
        };

        let is_form = dict_get(doc, &stream.dict, b"Subtype")
            .and_then(|o| o.as_name().ok())
            .map(|s| s == b"Form")
            .unwrap_or(false);
        if !is_form {
            return;
        }

        let content = match Content::decode(&stream_bytes(stream)) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("failed to decode form XObject /{}: {}", String::from_utf8_lossy(name), e);
                return;
            }
        };

        let matrix = dict_get(doc, &stream.dict, b"Matrix")
            .and_then(|o| o.as_array().ok())
            .map(|a| a.iter().filter_map(|o| number(resolve(doc, o))).collect::<Vec<_>>())
            .filter(|v| v.len() == 6)
            .map(|v| [v[0], v[1], v[2], v[3], v[4], v[5]])
            .unwrap_or(IDENTITY);
        let form_resources = dict_get(doc, &stream.dict, b"Resources")
            .and_then(|o| o.as_dict().ok())
            .or(resources);

        self.stack.push(self.state.clone());
        self.state.ctm = multiply(&matrix, &self.state.ctm);
        let saved_path = std::mem::take(&mut self.path);
        self.run(&content.operations, form_resources, depth + 1);
        self.path = saved_path;
        if let Some(saved) = self.stack.pop() {
            self.state = saved;
        }
    }
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}

/// Ruling edges for one painted subpath. Diagonal segments are dropped.
fn subpath_edges(sp: &Subpath) -> Vec<Edge> {
    let mut points = sp.points.clone();
    points.dedup();

    if points.len() < 2 {
        return Vec::new();
    }
    if points.len() == 2 && !sp.curved {
        return Edge::between(points[0], points[1], EdgeKind::Line)
            .into_iter()
            .collect();
    }

    if sp.closed && points.first() != points.last() {
        points.push(points[0]);
    }

    let kind = if !sp.curved && is_axis_rect(&points) {
        EdgeKind::RectEdge
    } else {
        EdgeKind::CurveEdge
    };
    points
        .windows(2)
        .filter_map(|w| Edge::between(w[0], w[1], kind))
        .collect()
}

/// Closed five-point ring whose four sides alternate horizontal and vertical.
fn is_axis_rect(points: &[(f64, f64)]) -> bool {
    const EPS: f64 = 1e-6;
    if points.len() != 5 || points[0] != points[4] {
        return false;
    }
    let horiz = |a: (f64, f64), b: (f64, f64)| (a.1 - b.1).abs() < EPS;
    let vert = |a: (f64, f64), b: (f64, f64)| (a.0 - b.0).abs() < EPS;
    let sides: Vec<_> = points.windows(2).map(|w| (w[0], w[1])).collect();
    let starts_h = sides.iter().enumerate().all(|(i, &(a, b))| {
        if i % 2 == 0 {
            horiz(a, b)
        } else {
            vert(a, b)
        }
    });
    let starts_v = sides.iter().enumerate().all(|(i, &(a, b))| {
        if i % 2 == 0 {
            vert(a, b)
        } else {
            horiz(a, b)
        }
    });
    starts_h || starts_v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;
    use lopdf::{dictionary, Stream};

    fn letter() -> PageInfo {
        PageInfo {
            number: 1,
            width: 612.0,
            height: 792.0,
            rotation: 0,
            media_box: [0.0, 0.0, 612.0, 792.0],
            doctop_offset: 0.0,
        }
    }

    fn run(content: &str) -> PageContent {
        let doc = Document::with_version("1.5");
        interpret_page(&doc, content.as_bytes(), None, &letter()).unwrap()
    }

    #[test]
    fn test_text_positions_with_fallback_font() {
        let page = run("BT /F1 12 Tf 100 685 Td (AB) Tj ET");
        assert_eq!(page.chars.len(), 2);

        let a = &page.chars[0];
        assert_eq!(a.text, "A");
        assert!((a.x0 - 100.0).abs() < 1e-9);
        assert!((a.x1 - 108.004).abs() < 1e-9);
        assert!((a.top - 95.0).abs() < 1e-9);
        assert!((a.bottom - 107.0).abs() < 1e-9);
        assert!(a.upright);
        assert!((a.size - 12.0).abs() < 1e-9);

        let b = &page.chars[1];
        assert!((b.x0 - a.x1).abs() < 1e-9);
    }

    #[test]
    fn test_tj_negative_adjustment_widens_gap() {
        let page = run("BT /F1 10 Tf 0 700 Td [(A) -1000 (B)] TJ ET");
        let gap = page.chars[1].x0 - page.chars[0].x1;
        assert!((gap - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_leading_and_next_line() {
        let page = run("BT /F1 10 Tf 14 TL 50 700 Td (A) Tj T* (B) Tj ET");
        assert!((page.chars[1].top - page.chars[0].top - 14.0).abs() < 1e-9);
        assert!((page.chars[1].x0 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_state_restored_after_q() {
        let page = run("q 1 0 0 1 100 0 cm BT /F1 10 Tf 0 700 Td (A) Tj ET Q BT /F1 10 Tf 0 700 Td (A) Tj ET");
        assert!((page.chars[0].x0 - 100.0).abs() < 1e-9);
        assert!(page.chars[1].x0.abs() < 1e-9);
    }

    #[test]
    fn test_line_and_rect_edges() {
        let page = run("100 700 m 400 700 l S 100 600 50 20 re f 0 0 m 10 10 l S");
        let lines: Vec<_> = page.edges.iter().filter(|e| e.kind == EdgeKind::Line).collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].orientation, Orientation::Horizontal);
        assert_eq!((lines[0].x0, lines[0].x1, lines[0].top), (100.0, 400.0, 92.0));

        let rect: Vec<_> = page.edges.iter().filter(|e| e.kind == EdgeKind::RectEdge).collect();
        assert_eq!(rect.len(), 4);
        assert!(rect.iter().any(|e| e.orientation == Orientation::Vertical
            && e.x0 == 150.0
            && e.top == 172.0
            && e.bottom == 192.0));
    }

    #[test]
    fn test_unpainted_path_discarded() {
        let page = run("100 700 m 400 700 l n");
        assert!(page.edges.is_empty());
    }

    #[test]
    fn test_closed_polygon_is_rect() {
        let page = run("10 10 m 20 10 l 20 30 l 10 30 l h S");
        assert_eq!(page.edges.len(), 4);
        assert!(page.edges.iter().all(|e| e.kind == EdgeKind::RectEdge));
    }

    #[test]
    fn test_rotated_page_origin() {
        let doc = Document::with_version("1.5");
        let info = PageInfo {
            rotation: 90,
            width: 792.0,
            height: 612.0,
            ..letter()
        };
        let page = interpret_page(&doc, b"0 0 m 0 100 l S", None, &info).unwrap();
        let e = &page.edges[0];
        assert_eq!(e.orientation, Orientation::Horizontal);
        assert_eq!((e.x0, e.x1, e.top), (0.0, 100.0, 0.0));
    }

    #[test]
    fn test_form_xobject_matrix_and_resources() {
        let mut doc = Document::with_version("1.5");
        let courier = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let form_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 200.into(), 792.into()],
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 0.into()],
                "Resources" => dictionary! { "Font" => dictionary! { "F2" => courier } },
            },
            b"BT /F2 10 Tf 0 700 Td (ii) Tj ET 0 600 m 50 600 l S".to_vec(),
        ));
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
            },
            vec![0],
        ));
        let resources = dictionary! {
            "XObject" => dictionary! { "Fx" => form_id, "Im1" => image_id },
        };

        let page = interpret_page(
            &doc,
            b"/Im1 Do /Fx Do 0 0 m 10 0 l S",
            Some(&resources),
            &letter(),
        )
        .unwrap();

        // Courier comes from the form's own resources
        assert_eq!(page.chars.len(), 2);
        assert_eq!(page.chars[0].fontname, "Courier");
        assert!((page.chars[0].x0 - 100.0).abs() < 1e-9);
        assert!((page.chars[1].x0 - 106.0).abs() < 1e-9);

        // the form's line is shifted by /Matrix, the page's is not
        assert_eq!(page.edges.len(), 2);
        assert_eq!((page.edges[0].x0, page.edges[0].x1), (100.0, 150.0));
        assert_eq!((page.edges[1].x0, page.edges[1].x1), (0.0, 10.0));
    }

    #[test]
    fn test_self_referencing_form_stops_at_depth_limit() {
        let mut doc = Document::with_version("1.5");
        let form_id = doc.new_object_id();
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "Resources" => dictionary! { "XObject" => dictionary! { "Fx" => form_id } },
            },
            b"0 0 m 10 0 l S /Fx Do".to_vec(),
        );
        doc.objects.insert(form_id, Object::Stream(form));
        let resources = dictionary! { "XObject" => dictionary! { "Fx" => form_id } };

        let page = interpret_page(&doc, b"/Fx Do", Some(&resources), &letter()).unwrap();
        assert_eq!(page.edges.len(), MAX_FORM_DEPTH);
    }
}
