//! Shared types used throughout the library.

mod element;

pub use element::ElementKind;

use glam::DVec3;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// One exterior boundary ring in document coordinates (x=east, y=north, z=elevation).
///
/// The ring may be closed (last point equal to the first).
pub type Polygon = Vec<DVec3>;

/// Inline metadata of a source element (`name`, `description`, enrichment attributes).
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Geometry records keyed by `gml:id`, in document discovery order.
pub type GeometryMap = IndexMap<String, GeometryRecord>;

/// Geometry and metadata extracted for one identified element.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    /// Tag of the source element.
    pub element_type: ElementKind,
    /// Exterior rings with at least three distinct points.
    pub polygons: Vec<Polygon>,
    /// Inline metadata.
    pub metadata: Metadata,
}

impl GeometryRecord {
    pub fn new(element_type: ElementKind) -> Self {
        Self {
            element_type,
            polygons: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_polygon(mut self, polygon: Polygon) -> Self {
        self.polygons.push(polygon);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check if this record has no geometry to mesh.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Iterate over every vertex of every polygon.
    pub fn vertices(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.polygons.iter().flat_map(|p| p.iter().copied())
    }
}

/// Building-level attributes gathered in a second pass over the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingAttributes {
    /// The building `gml:id`.
    pub id: String,
    pub description: Option<String>,
    pub measured_height: Option<f64>,
    pub storeys_above_ground: Option<u32>,
    pub storeys_below_ground: Option<u32>,
    /// Identifiers of the semantic surfaces nested in this building.
    pub surfaces: Vec<String>,
    /// Number of polygons per surface kind.
    pub surface_types: BTreeMap<String, usize>,
}

impl BuildingAttributes {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// All surface polygons of one `Building`, merged into a single group.
///
/// Surface kinds are only kept as counts in [`BuildingAttributes::surface_types`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingGroup {
    pub attributes: BuildingAttributes,
    pub polygons: Vec<Polygon>,
}

impl BuildingGroup {
    pub fn id(&self) -> &str {
        &self.attributes.id
    }
}

/// An axis-aligned bounding box in document precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = DVec3>) -> Option<Self> {
        let mut min = DVec3::splat(f64::MAX);
        let mut max = DVec3::splat(f64::MIN);
        let mut has_points = false;

        for p in points {
            has_points = true;
            min = min.min(p);
            max = max.max(p);
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) / 2.0
    }

    pub fn dimensions(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}
