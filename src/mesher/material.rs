//! Element kind to material mapping for the OBJ material library.

use crate::types::ElementKind;

/// Fixed shading constants of one MTL material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDef {
    pub name: &'static str,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

/// Material used by element kinds without an entry in the table.
pub const DEFAULT_MATERIAL: &str = "default";

/// Every material written to the library, in file order. The last entry is the fallback.
pub const MATERIALS: [MaterialDef; 6] = [
    // Terracotta
    MaterialDef { name: "roof", ambient: [0.8, 0.3, 0.2], diffuse: [0.8, 0.3, 0.2], specular: [0.2, 0.2, 0.2], shininess: 50.0 },
    // Light gray
    MaterialDef { name: "wall", ambient: [0.7, 0.7, 0.7], diffuse: [0.7, 0.7, 0.7], specular: [0.3, 0.3, 0.3], shininess: 30.0 },
    // Brown
    MaterialDef { name: "ground", ambient: [0.5, 0.4, 0.3], diffuse: [0.5, 0.4, 0.3], specular: [0.1, 0.1, 0.1], shininess: 20.0 },
    // Blue
    MaterialDef { name: "closure", ambient: [0.3, 0.4, 0.7], diffuse: [0.3, 0.4, 0.7], specular: [0.2, 0.2, 0.2], shininess: 40.0 },
    MaterialDef { name: "building", ambient: [0.6, 0.6, 0.6], diffuse: [0.6, 0.6, 0.6], specular: [0.2, 0.2, 0.2], shininess: 30.0 },
    MaterialDef { name: DEFAULT_MATERIAL, ambient: [0.5, 0.5, 0.5], diffuse: [0.5, 0.5, 0.5], specular: [0.2, 0.2, 0.2], shininess: 25.0 },
];

/// Material name for an element kind.
pub fn material_for(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::RoofSurface => "roof",
        ElementKind::WallSurface => "wall",
        ElementKind::GroundSurface => "ground",
        ElementKind::ClosureSurface => "closure",
        ElementKind::Building => "building",
        ElementKind::FloorSurface | ElementKind::CeilingSurface => DEFAULT_MATERIAL,
    }
}
