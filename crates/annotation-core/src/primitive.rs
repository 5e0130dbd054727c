//! Graphical objects living on an interactive surface

use annotation_types::{
    AnnotationData, AnnotationId, AnnotationType, Bounds, PathData, Point, ShapeKind,
};

/// Runtime shape of a primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Text,
    Rect,
    Ellipse,
    Line,
    Path,
    Group,
}

/// Metadata the manager writes onto a primitive when it creates or restores it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveMeta {
    /// Classification chosen by the creating tool
    pub tag: Option<AnnotationType>,
    /// Annotation id to re-attach instead of generating a new one
    pub annotation_id: Option<AnnotationId>,
    /// Page to record instead of the session's current page
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub meta: PrimitiveMeta,
    pub props: AnnotationData,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind, props: AnnotationData) -> Self {
        Self {
            kind,
            meta: PrimitiveMeta::default(),
            props,
        }
    }

    pub fn tagged(mut self, tag: AnnotationType) -> Self {
        self.meta.tag = Some(tag);
        self
    }

    /// Rebuild a primitive from a persisted snapshot
    pub fn from_data(kind: AnnotationType, data: &AnnotationData) -> Self {
        let shape = match kind {
            AnnotationType::Text => PrimitiveKind::Text,
            AnnotationType::Highlight => PrimitiveKind::Rect,
            AnnotationType::Stamp => PrimitiveKind::Group,
            AnnotationType::Drawing => PrimitiveKind::Path,
            AnnotationType::Shape => match data.shape.unwrap_or_default() {
                ShapeKind::Rect => PrimitiveKind::Rect,
                ShapeKind::Circle => PrimitiveKind::Ellipse,
                ShapeKind::Line | ShapeKind::Arrow => PrimitiveKind::Line,
            },
        };
        Primitive::new(shape, data.clone()).tagged(kind)
    }

    /// Freehand stroke through the given points
    pub fn stroke(points: Vec<Point>, color: &str, width: f64) -> Self {
        let bounds = Bounds::enclosing(&points).unwrap_or_default();
        let props = AnnotationData {
            stroke: Some(color.to_string()),
            stroke_width: Some(width),
            paths: vec![PathData {
                points,
                stroke: Some(color.to_string()),
                stroke_width: Some(width),
            }],
            ..AnnotationData::at(bounds.left, bounds.top, bounds.width, bounds.height)
        };
        Primitive::new(PrimitiveKind::Path, props)
    }

    pub fn snapshot(&self) -> AnnotationData {
        self.props.clone()
    }

    pub fn bounds(&self) -> Bounds {
        self.props.bounds()
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let p = &mut self.props;
        p.left += dx;
        p.top += dy;
        for (coord, delta) in [(&mut p.x1, dx), (&mut p.y1, dy), (&mut p.x2, dx), (&mut p.y2, dy)] {
            if let Some(v) = coord {
                *v += delta;
            }
        }
        for path in &mut p.paths {
            for point in &mut path.points {
                point.x += dx;
                point.y += dy;
            }
        }
    }

    /// Grow the primitive from its anchor towards `to`, as a drag does
    pub fn drag_to(&mut self, to: Point) {
        let p = &mut self.props;
        match self.kind {
            PrimitiveKind::Line => {
                let start = Point::new(p.x1.unwrap_or(p.left), p.y1.unwrap_or(p.top));
                p.x1 = Some(start.x);
                p.y1 = Some(start.y);
                p.x2 = Some(to.x);
                p.y2 = Some(to.y);
                if let Some(b) = Bounds::enclosing(&[start, to]) {
                    p.left = b.left;
                    p.top = b.top;
                    p.width = b.width;
                    p.height = b.height;
                }
            }
            PrimitiveKind::Ellipse => {
                let diameter = (to.x - p.left).max(to.y - p.top).max(0.0);
                p.width = diameter;
                p.height = diameter;
                p.radius = Some(diameter / 2.0);
            }
            PrimitiveKind::Path => {}
            _ => {
                p.width = (to.x - p.left).max(0.0);
                p.height = (to.y - p.top).max(0.0);
            }
        }
    }

    /// Whether `point` lies within `radius` of the primitive's ink
    pub fn hit_test(&self, point: &Point, radius: f64) -> bool {
        match self.kind {
            PrimitiveKind::Path => self.props.paths.iter().any(|path| match path.points.as_slice() {
                [] => false,
                [only] => only.distance_to(point) <= radius,
                points => points
                    .windows(2)
                    .any(|w| point.distance_to_segment(&w[0], &w[1]) <= radius),
            }),
            PrimitiveKind::Line => {
                let (a, b) = self.props.endpoints();
                point.distance_to_segment(&a, &b) <= radius
            }
            _ => {
                let b = self.bounds();
                Bounds::new(
                    b.left - radius,
                    b.top - radius,
                    b.width + 2.0 * radius,
                    b.height + 2.0 * radius,
                )
                .contains(point)
            }
        }
    }
}
