//! Element kinds harvested from a CityGML building model.

use std::fmt;

/// Tag of a source element carrying an identifier and geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Building,
    RoofSurface,
    WallSurface,
    GroundSurface,
    ClosureSurface,
    FloorSurface,
    CeilingSurface,
}

impl ElementKind {
    /// The six semantic boundary surface kinds, in harvesting order.
    pub const SURFACES: [ElementKind; 6] = [
        ElementKind::RoofSurface,
        ElementKind::WallSurface,
        ElementKind::GroundSurface,
        ElementKind::ClosureSurface,
        ElementKind::FloorSurface,
        ElementKind::CeilingSurface,
    ];

    /// Local tag name in the building namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Building => "Building",
            ElementKind::RoofSurface => "RoofSurface",
            ElementKind::WallSurface => "WallSurface",
            ElementKind::GroundSurface => "GroundSurface",
            ElementKind::ClosureSurface => "ClosureSurface",
            ElementKind::FloorSurface => "FloorSurface",
            ElementKind::CeilingSurface => "CeilingSurface",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_tags() {
        let names: Vec<String> = ElementKind::SURFACES.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["RoofSurface", "WallSurface", "GroundSurface", "ClosureSurface", "FloorSurface", "CeilingSurface"]
        );
        assert_eq!(ElementKind::Building.as_str(), "Building");
    }
}
