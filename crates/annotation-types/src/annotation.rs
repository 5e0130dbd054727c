//! Annotation records and their persisted form

use crate::data::AnnotationData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an annotation
///
/// Assigned once at creation, never reused. It is the join key between the
/// live record list and any persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(Uuid);

impl AnnotationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnnotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle to a primitive living on an interactive surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(u64);

impl PrimitiveId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Classification of a finalized mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Text,
    Highlight,
    Drawing,
    Stamp,
    Shape,
}

impl AnnotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationType::Text => "text",
            AnnotationType::Highlight => "highlight",
            AnnotationType::Drawing => "drawing",
            AnnotationType::Stamp => "stamp",
            AnnotationType::Shape => "shape",
        }
    }
}

/// Read access shared by live and persisted annotations
pub trait AnnotationRecord {
    fn kind(&self) -> AnnotationType;
    /// 1-based page number
    fn page(&self) -> u32;
    fn data(&self) -> &AnnotationData;
}

/// A live annotation bound to one surface primitive
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationType,
    pub object: PrimitiveId,
    pub page: u32,
    pub data: AnnotationData,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Annotation {
    pub fn to_saved(&self) -> SavedAnnotation {
        SavedAnnotation {
            id: self.id,
            kind: self.kind,
            page: self.page,
            data: self.data.clone(),
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

impl AnnotationRecord for Annotation {
    fn kind(&self) -> AnnotationType {
        self.kind
    }

    fn page(&self) -> u32 {
        self.page
    }

    fn data(&self) -> &AnnotationData {
        &self.data
    }
}

/// Persisted layout of an annotation: everything except the surface handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAnnotation {
    pub id: AnnotationId,
    #[serde(rename = "type")]
    pub kind: AnnotationType,
    pub page: u32,
    pub data: AnnotationData,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl AnnotationRecord for SavedAnnotation {
    fn kind(&self) -> AnnotationType {
        self.kind
    }

    fn page(&self) -> u32 {
        self.page
    }

    fn data(&self) -> &AnnotationData {
        &self.data
    }
}

/// Partial update applied by `update_annotation`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPatch {
    pub page: Option<u32>,
    pub data: Option<AnnotationData>,
}
