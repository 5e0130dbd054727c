//! Per-type rendering of annotations into native page content
//!
//! Each annotation becomes a self-contained `q ... Q` group of content
//! operators. Resources the operators reference (fonts, opacity states,
//! images) are collected on the canvas and installed on the page afterwards.

use crate::config::ExportConfig;
use crate::coords::PageFrame;
use crate::fonts::{approx_text_width, encode_win_ansi, resource_name, standard_font};
use annotation_types::{AnnotationData, Color, Point, ShapeKind};
use lopdf::content::Operation;
use lopdf::{Object, ObjectId, StringFormat};
use std::collections::BTreeMap;

/// Cubic Bezier control distance for a quarter circle
const KAPPA: f64 = 0.552_284_749_8;

/// Text line height as a multiple of the font size
const LINE_HEIGHT: f64 = 1.16;

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn name(n: &str) -> Object {
    Object::Name(n.as_bytes().to_vec())
}

enum Paint {
    Fill,
    Stroke,
    FillStroke,
}

impl Paint {
    fn operator(&self) -> &'static str {
        match self {
            Paint::Fill => "f",
            Paint::Stroke => "S",
            Paint::FillStroke => "B",
        }
    }
}

/// Content operators and resource requirements for one page
pub struct PageCanvas<'a> {
    frame: PageFrame,
    config: &'a ExportConfig,
    ops: Vec<Operation>,
    /// resource name -> base font
    pub(crate) fonts: BTreeMap<String, &'static str>,
    /// resource name -> fill/stroke alpha
    pub(crate) opacity_states: BTreeMap<String, f32>,
    /// resource name -> image XObject
    pub(crate) images: BTreeMap<String, ObjectId>,
    groups: usize,
}

impl<'a> PageCanvas<'a> {
    pub fn new(frame: PageFrame, config: &'a ExportConfig) -> Self {
        Self {
            frame,
            config,
            ops: Vec::new(),
            fonts: BTreeMap::new(),
            opacity_states: BTreeMap::new(),
            images: BTreeMap::new(),
            groups: 0,
        }
    }

    pub fn frame(&self) -> &PageFrame {
        &self.frame
    }

    /// Number of annotations drawn so far
    pub fn group_count(&self) -> usize {
        self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.ops
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn group(&mut self, draw: impl FnOnce(&mut Self)) {
        self.op("q", vec![]);
        draw(self);
        self.op("Q", vec![]);
        self.groups += 1;
    }

    fn fill_color(&mut self, c: Color) {
        self.op("rg", vec![real(c.r as f64), real(c.g as f64), real(c.b as f64)]);
    }

    fn stroke_color(&mut self, c: Color) {
        self.op("RG", vec![real(c.r as f64), real(c.g as f64), real(c.b as f64)]);
    }

    fn line_width(&mut self, surface_width: f64) {
        let w = self.frame.to_pdf_len(surface_width);
        self.op("w", vec![real(w)]);
    }

    fn use_font(&mut self, base: &'static str) -> String {
        let res = resource_name(base);
        self.fonts.insert(res.clone(), base);
        res
    }

    fn use_opacity(&mut self, alpha: f32) -> String {
        let res = format!("AnnGs{}", (alpha * 100.0).round() as u32);
        self.opacity_states.insert(res.clone(), alpha);
        res
    }

    fn rect_path(&mut self, data: &AnnotationData) {
        let r = self.frame.to_pdf_rect(data.bounds());
        self.op("re", vec![real(r.x), real(r.y), real(r.width), real(r.height)]);
    }

    fn show_text_at(&mut self, font: &str, size: f64, x: f64, y: f64, text: &str) {
        self.op("BT", vec![]);
        self.op("Tf", vec![name(font), real(size)]);
        self.op("Td", vec![real(x), real(y)]);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.op("Td", vec![real(0.0), real(-size * LINE_HEIGHT)]);
            }
            self.op(
                "Tj",
                vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
            );
        }
        self.op("ET", vec![]);
    }

    /// Literal text with its first baseline at the bottom of the surface box
    pub fn draw_text(&mut self, data: &AnnotationData) {
        let Some(text) = data.text.as_deref().filter(|t| !t.is_empty()) else {
            return;
        };
        let size = self.frame.to_pdf_len(data.font_size.unwrap_or(self.config.text_font_size));
        let color = data
            .fill
            .as_deref()
            .and_then(Color::try_parse)
            .unwrap_or_else(|| Color::parse(&self.config.text_color));
        let r = self.frame.to_pdf_rect(data.bounds());
        self.group(|c| {
            let font = c.use_font(standard_font(data.font_family.as_deref(), false));
            c.fill_color(color);
            c.show_text_at(&font, size, r.x, r.y, text);
        });
    }

    /// Translucent filled rectangle; yellow unless the snapshot names a color
    pub fn draw_highlight(&mut self, data: &AnnotationData) {
        let color = data
            .fill
            .as_deref()
            .and_then(Color::try_parse)
            .unwrap_or_else(|| Color::parse(&self.config.highlight_color));
        let alpha = self.config.highlight_opacity;
        self.group(|c| {
            let gs = c.use_opacity(alpha);
            c.op("gs", vec![name(&gs)]);
            c.fill_color(color);
            c.rect_path(data);
            c.op("f", vec![]);
        });
    }

    /// Each freehand path as a polyline through its recorded points
    pub fn draw_freehand(&mut self, data: &AnnotationData) {
        let strokes: Vec<_> = data
            .paths
            .iter()
            .filter(|p| !p.points.is_empty())
            .collect();
        if strokes.is_empty() {
            return;
        }
        self.group(|c| {
            c.op("J", vec![Object::Integer(1)]);
            c.op("j", vec![Object::Integer(1)]);
            for path in strokes {
                let color = path
                    .stroke
                    .as_deref()
                    .or(data.stroke.as_deref())
                    .and_then(Color::try_parse)
                    .unwrap_or_else(|| Color::parse(&c.config.drawing_color));
                let width = path
                    .stroke_width
                    .or(data.stroke_width)
                    .unwrap_or(c.config.drawing_width);
                c.stroke_color(color);
                c.line_width(width);
                c.polyline(&path.points);
                c.op("S", vec![]);
            }
        });
    }

    fn polyline(&mut self, points: &[Point]) {
        let Some(first) = points.first() else {
            return;
        };
        let (x, y) = self.frame.to_pdf_point(*first);
        self.op("m", vec![real(x), real(y)]);
        if points.len() == 1 {
            // Zero-length segment renders as a dot with round caps
            self.op("l", vec![real(x), real(y)]);
        }
        for p in &points[1..] {
            let (x, y) = self.frame.to_pdf_point(*p);
            self.op("l", vec![real(x), real(y)]);
        }
    }

    /// Embedded image stretched over the stamp's bounds
    pub fn draw_stamp_image(&mut self, data: &AnnotationData, image: ObjectId) {
        let r = self.frame.to_pdf_rect(data.bounds());
        let res = format!("AnnIm{}", image.0);
        self.images.insert(res.clone(), image);
        self.group(|c| {
            c.op(
                "cm",
                vec![
                    real(r.width),
                    real(0.0),
                    real(0.0),
                    real(r.height),
                    real(r.x),
                    real(r.y),
                ],
            );
            c.op("Do", vec![name(&res)]);
        });
    }

    /// Bordered gray rectangle standing in for an image that could not be embedded
    pub fn draw_stamp_placeholder(&mut self, data: &AnnotationData) {
        let fill = Color::gray(self.config.stamp_placeholder_fill);
        let border = Color::gray(self.config.stamp_placeholder_border);
        self.group(|c| {
            c.fill_color(fill);
            c.stroke_color(border);
            c.op("w", vec![real(1.0)]);
            c.rect_path(data);
            c.op("B", vec![]);
        });
    }

    /// The on-screen stamp composition: border in the stamp color plus its label
    pub fn draw_stamp_label(&mut self, data: &AnnotationData) {
        let color = data
            .stroke
            .as_deref()
            .and_then(Color::try_parse)
            .unwrap_or(Color::RED);
        let width = data.stroke_width.unwrap_or(2.0);
        let r = self.frame.to_pdf_rect(data.bounds());
        let label = data.text.clone().unwrap_or_default();
        let size = self
            .frame
            .to_pdf_len(data.font_size.unwrap_or(data.height * 0.45));
        self.group(|c| {
            c.stroke_color(color);
            c.line_width(width);
            c.rect_path(data);
            c.op("S", vec![]);
            if !label.is_empty() {
                let font = c.use_font(standard_font(data.font_family.as_deref(), true));
                let text_w = approx_text_width(&label, size);
                let x = r.x + (r.width - text_w).max(0.0) / 2.0;
                let y = r.y + (r.height - size) / 2.0 + size * 0.2;
                c.fill_color(color);
                c.show_text_at(&font, size, x, y, &label);
            }
        });
    }

    /// Rect, circle, line or arrow per the snapshot's `type`
    pub fn draw_shape(&mut self, data: &AnnotationData) {
        let shape = data.shape.unwrap_or_default();
        let fill = data.fill.as_deref().and_then(Color::try_parse);
        let stroke = data
            .stroke
            .as_deref()
            .and_then(Color::try_parse)
            .or_else(|| fill.is_none().then(|| Color::parse(&self.config.shape_stroke)));
        let width = data.stroke_width.unwrap_or(self.config.shape_stroke_width);

        self.group(|c| {
            if let Some(f) = fill {
                c.fill_color(f);
            }
            if let Some(s) = stroke {
                c.stroke_color(s);
                c.line_width(width);
            }
            let paint = match (fill.is_some(), stroke.is_some()) {
                (true, true) => Paint::FillStroke,
                (true, false) => Paint::Fill,
                _ => Paint::Stroke,
            };
            match shape {
                ShapeKind::Rect => {
                    c.rect_path(data);
                    c.op(paint.operator(), vec![]);
                }
                ShapeKind::Circle => {
                    c.circle_path(data);
                    c.op(paint.operator(), vec![]);
                }
                ShapeKind::Line => {
                    c.line_path(data);
                    c.op("S", vec![]);
                }
                ShapeKind::Arrow => {
                    c.line_path(data);
                    c.arrow_head(data);
                    c.op("S", vec![]);
                }
            }
        });
    }

    fn circle_path(&mut self, data: &AnnotationData) {
        let radius = data
            .radius
            .unwrap_or_else(|| data.width.min(data.height) / 2.0);
        let (cx, cy) = self
            .frame
            .to_pdf_point(Point::new(data.left + radius, data.top + radius));
        let r = self.frame.to_pdf_len(radius);
        let k = r * KAPPA;
        self.op("m", vec![real(cx + r), real(cy)]);
        for [a, b, d] in [
            [(cx + r, cy + k), (cx + k, cy + r), (cx, cy + r)],
            [(cx - k, cy + r), (cx - r, cy + k), (cx - r, cy)],
            [(cx - r, cy - k), (cx - k, cy - r), (cx, cy - r)],
            [(cx + k, cy - r), (cx + r, cy - k), (cx + r, cy)],
        ] {
            self.op(
                "c",
                vec![real(a.0), real(a.1), real(b.0), real(b.1), real(d.0), real(d.1)],
            );
        }
        self.op("h", vec![]);
    }

    fn line_path(&mut self, data: &AnnotationData) {
        let (start, end) = data.endpoints();
        self.polyline(&[start, end]);
    }

    /// Two strokes back from the line's end, at +/- the configured half-angle
    fn arrow_head(&mut self, data: &AnnotationData) {
        let (start, end) = data.endpoints();
        let (x1, y1) = self.frame.to_pdf_point(start);
        let (x2, y2) = self.frame.to_pdf_point(end);
        let angle = (y2 - y1).atan2(x2 - x1);
        let len = self.config.arrow_head_length;
        let spread = self.config.arrow_head_angle_deg.to_radians();
        for side in [angle - spread, angle + spread] {
            self.op("m", vec![real(x2), real(y2)]);
            self.op(
                "l",
                vec![real(x2 - len * side.cos()), real(y2 - len * side.sin())],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotation_types::PathData;

    const LETTER: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

    fn canvas(config: &ExportConfig) -> PageCanvas<'_> {
        PageCanvas::new(PageFrame::new(LETTER, 1.0), config)
    }

    fn floats(op: &Operation) -> Vec<f64> {
        op.operands
            .iter()
            .filter_map(|o| o.as_float().ok().map(f64::from))
            .collect()
    }

    fn find<'o>(ops: &'o [Operation], operator: &str) -> Vec<&'o Operation> {
        ops.iter().filter(|o| o.operator == operator).collect()
    }

    #[test]
    fn test_text_baseline_is_flipped_box_bottom() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_text(&AnnotationData {
            text: Some("Hello".to_string()),
            font_size: Some(14.0),
            ..AnnotationData::at(100.0, 50.0, 120.0, 20.0)
        });
        assert!(c.fonts.contains_key("AnnHelvetica"));
        let ops = c.into_operations();
        assert_eq!(floats(find(&ops, "Td")[0]), vec![100.0, 722.0]);
        assert_eq!(floats(find(&ops, "Tf")[0]), vec![14.0]);
        let tj = find(&ops, "Tj")[0];
        assert_eq!(tj.operands[0].as_str().unwrap(), b"Hello");
    }

    #[test]
    fn test_multiline_text_steps_down() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_text(&AnnotationData {
            text: Some("a\nb".to_string()),
            font_size: Some(10.0),
            ..AnnotationData::at(0.0, 0.0, 10.0, 10.0)
        });
        let ops = c.into_operations();
        assert_eq!(find(&ops, "Tj").len(), 2);
        let step = floats(find(&ops, "Td")[1]);
        assert!((step[1] + 11.6).abs() < 1e-4);
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_text(&AnnotationData::at(0.0, 0.0, 10.0, 10.0));
        assert!(c.is_empty());
        assert_eq!(c.group_count(), 0);
    }

    #[test]
    fn test_highlight_defaults_to_translucent_yellow() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_highlight(&AnnotationData::at(10.0, 10.0, 100.0, 12.0));
        assert_eq!(c.opacity_states.get("AnnGs30"), Some(&0.3));
        let ops = c.into_operations();
        assert_eq!(floats(find(&ops, "rg")[0]), vec![1.0, 1.0, 0.0]);
        assert_eq!(find(&ops, "f").len(), 1);
        assert_eq!(floats(find(&ops, "re")[0]), vec![10.0, 770.0, 100.0, 12.0]);
    }

    #[test]
    fn test_freehand_defaults_red_width_two() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_freehand(&AnnotationData {
            paths: vec![PathData {
                points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
                stroke: None,
                stroke_width: None,
            }],
            ..Default::default()
        });
        let ops = c.into_operations();
        assert_eq!(floats(find(&ops, "RG")[0]), vec![1.0, 0.0, 0.0]);
        assert_eq!(floats(find(&ops, "w")[0]), vec![2.0]);
        assert_eq!(find(&ops, "m").len(), 1);
        assert_eq!(find(&ops, "l").len(), 2);
        assert_eq!(floats(find(&ops, "l")[1]), vec![10.0, 782.0]);
    }

    #[test]
    fn test_shape_rect_fill_and_stroke() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_shape(&AnnotationData {
            shape: Some(ShapeKind::Rect),
            fill: Some("#00ff00".to_string()),
            stroke: Some("#0000ff".to_string()),
            stroke_width: Some(3.0),
            ..AnnotationData::at(0.0, 0.0, 50.0, 50.0)
        });
        let ops = c.into_operations();
        assert_eq!(find(&ops, "B").len(), 1);
        assert_eq!(floats(find(&ops, "w")[0]), vec![3.0]);
    }

    #[test]
    fn test_shape_fill_only_and_transparent_fill() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_shape(&AnnotationData {
            fill: Some("#00ff00".to_string()),
            ..AnnotationData::at(0.0, 0.0, 5.0, 5.0)
        });
        c.draw_shape(&AnnotationData {
            fill: Some("transparent".to_string()),
            ..AnnotationData::at(0.0, 0.0, 5.0, 5.0)
        });
        let ops = c.into_operations();
        assert_eq!(find(&ops, "f").len(), 1);
        assert_eq!(find(&ops, "S").len(), 1);
    }

    #[test]
    fn test_circle_is_four_curves() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_shape(&AnnotationData {
            shape: Some(ShapeKind::Circle),
            radius: Some(10.0),
            ..AnnotationData::at(100.0, 100.0, 20.0, 20.0)
        });
        let ops = c.into_operations();
        assert_eq!(find(&ops, "c").len(), 4);
        // Starts at the rightmost point of a circle centered at (110, 682)
        assert_eq!(floats(find(&ops, "m")[0]), vec![120.0, 682.0]);
    }

    #[test]
    fn test_arrow_head_geometry() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        // Horizontal arrow pointing right along surface y = 92 (page y = 700)
        c.draw_shape(&AnnotationData {
            shape: Some(ShapeKind::Arrow),
            x1: Some(0.0),
            y1: Some(92.0),
            x2: Some(100.0),
            y2: Some(92.0),
            ..Default::default()
        });
        let ops = c.into_operations();
        let lines = find(&ops, "l");
        assert_eq!(lines.len(), 3);
        let expected_dx = 100.0 - 10.0 * 30f64.to_radians().cos();
        let expected_dy = 10.0 * 30f64.to_radians().sin();
        for (line, sign) in lines[1..].iter().zip([1.0, -1.0]) {
            let p = floats(line);
            assert!((p[0] - expected_dx).abs() < 1e-3);
            assert!((p[1] - (700.0 + sign * expected_dy)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_stamp_image_and_placeholder() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        let data = AnnotationData::at(10.0, 20.0, 120.0, 40.0);
        c.draw_stamp_image(&data, (7, 0));
        c.draw_stamp_placeholder(&data);
        assert_eq!(c.images.get("AnnIm7"), Some(&(7, 0)));
        let ops = c.into_operations();
        assert_eq!(floats(find(&ops, "cm")[0]), vec![120.0, 0.0, 0.0, 40.0, 10.0, 732.0]);
        assert_eq!(find(&ops, "Do").len(), 1);
        assert_eq!(find(&ops, "B").len(), 1);
    }

    #[test]
    fn test_stamp_label_uses_bold_font() {
        let config = ExportConfig::default();
        let mut c = canvas(&config);
        c.draw_stamp_label(&AnnotationData {
            text: Some("APPROVED".to_string()),
            stroke: Some("#d32f2f".to_string()),
            ..AnnotationData::at(0.0, 0.0, 120.0, 40.0)
        });
        assert!(c.fonts.contains_key("AnnHelveticaBold"));
        let ops = c.into_operations();
        assert_eq!(find(&ops, "S").len(), 1);
        assert_eq!(find(&ops, "Tj").len(), 1);
    }
}
