//! Building-level pass: attributes and per-building surface grouping.

use super::namespace::{self as ns, QName};
use super::parser::{exterior_ring, CityModel};
use crate::mesher::triangulate::is_valid_ring;
use crate::types::{BuildingAttributes, BuildingGroup, ElementKind};
use indexmap::IndexMap;
use log::{debug, info, warn};
use roxmltree::Node;
use std::str::FromStr;

impl<'input> CityModel<'input> {
    /// Group the polygons of every semantic surface by the `Building` that contains them.
    ///
    /// Buildings without `gml:id` are skipped. Buildings without surface polygons are
    /// still returned (with no polygons) so that their attributes stay available.
    pub fn building_groups(&self) -> Vec<BuildingGroup> {
        let root = self.document().root_element();
        let mut groups: IndexMap<String, BuildingGroup> = IndexMap::new();

        for building in ns::find_all_descendants(root, ns::BLDG_BUILDING) {
            let Some(id) = ns::gml_id(building) else {
                debug!("Skipping Building without gml:id");
                continue;
            };
            if groups.contains_key(id) {
                warn!("Duplicate Building gml:id '{}', keeping the first occurrence", id);
                continue;
            }

            let mut group = BuildingGroup {
                attributes: read_attributes(building, id),
                polygons: Vec::new(),
            };

            for kind in ElementKind::SURFACES {
                let qname = QName::new(ns::BLDG, kind.as_str());
                for surface in ns::find_all_descendants(building, qname) {
                    if let Some(surface_id) = ns::gml_id(surface) {
                        group.attributes.surfaces.push(surface_id.to_string());
                    }
                    for polygon in ns::find_all_descendants(surface, ns::GML_POLYGON) {
                        let Some(ring) = exterior_ring(polygon).filter(|r| is_valid_ring(r)) else {
                            continue;
                        };
                        group.polygons.push(ring);
                        *group
                            .attributes
                            .surface_types
                            .entry(kind.as_str().to_string())
                            .or_default() += 1;
                    }
                }
            }

            debug!("  Building {}: {} surface polygons", id, group.polygons.len());
            groups.insert(id.to_string(), group);
        }

        info!("Grouped surfaces into {} buildings", groups.len());
        groups.into_values().collect()
    }

    /// Building attributes keyed by building `gml:id`, for metadata enrichment.
    pub fn building_attributes(&self) -> IndexMap<String, BuildingAttributes> {
        attributes_by_id(&self.building_groups())
    }
}

/// Attributes of already grouped buildings, keyed by building `gml:id`.
pub fn attributes_by_id(groups: &[BuildingGroup]) -> IndexMap<String, BuildingAttributes> {
    groups
        .iter()
        .map(|group| (group.id().to_string(), group.attributes.clone()))
        .collect()
}

fn read_attributes(building: Node, id: &str) -> BuildingAttributes {
    let mut attributes = BuildingAttributes::new(id);
    attributes.description = ns::find_child(building, ns::GML_DESCRIPTION)
        .and_then(ns::text)
        .map(str::to_string);
    attributes.measured_height = read_value(building, ns::BLDG_MEASURED_HEIGHT, id);
    attributes.storeys_above_ground = read_value(building, ns::BLDG_STOREYS_ABOVE, id);
    attributes.storeys_below_ground = read_value(building, ns::BLDG_STOREYS_BELOW, id);
    attributes
}

/// First matching descendant parsed as `T`; unparsable values are logged and treated as absent.
///
/// The lookup is not limited to direct children, so a building without its own
/// value takes the first one found in a nested `bldg:BuildingPart`.
fn read_value<T: FromStr>(building: Node, name: QName, id: &str) -> Option<T> {
    let text = ns::find_descendant(building, name).and_then(ns::text)?;
    match text.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Building {}: ignoring invalid {} '{}'", id, name.local, text);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::attributes_by_id;
    use crate::citygml::test_data::{single_wall_building, two_buildings, wrap_city_model};
    use crate::citygml::CityModel;

    #[test]
    fn test_groups_surfaces_by_building() {
        let xml = two_buildings();
        let model = CityModel::parse(&xml).unwrap();
        let groups = model.building_groups();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id(), "BLD_A");
        assert_eq!(groups[0].polygons.len(), 2);
        assert_eq!(groups[0].attributes.surfaces, vec!["ROOF_A", "WALL_A"]);
        assert_eq!(groups[0].attributes.surface_types["RoofSurface"], 1);
        assert_eq!(groups[0].attributes.surface_types["WallSurface"], 1);
        assert_eq!(groups[1].id(), "BLD_B");
        assert_eq!(groups[1].polygons.len(), 1);
    }

    #[test]
    fn test_building_attributes() {
        let xml = single_wall_building();
        let model = CityModel::parse(&xml).unwrap();
        let attributes = model.building_attributes();
        let building = &attributes["BLD_1"];

        assert_eq!(building.description.as_deref(), Some("Main building"));
        assert_eq!(building.measured_height, Some(12.5));
        assert_eq!(building.storeys_above_ground, Some(3));
        assert_eq!(building.storeys_below_ground, None);
        assert_eq!(building.surfaces, vec!["WALL_1"]);
    }

    #[test]
    fn test_invalid_attribute_values_are_absent() {
        let xml = wrap_city_model(
            r#"<bldg:Building gml:id="B">
                 <bldg:measuredHeight uom="m">tall</bldg:measuredHeight>
                 <bldg:storeysAboveGround>-1</bldg:storeysAboveGround>
               </bldg:Building>"#,
        );
        let model = CityModel::parse(&xml).unwrap();
        let groups = model.building_groups();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].polygons.is_empty());
        assert_eq!(groups[0].attributes.measured_height, None);
        assert_eq!(groups[0].attributes.storeys_above_ground, None);
    }

    #[test]
    fn test_attributes_from_groups() {
        let xml = two_buildings();
        let model = CityModel::parse(&xml).unwrap();
        let attributes = attributes_by_id(&model.building_groups());

        assert_eq!(attributes, model.building_attributes());
        assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["BLD_A", "BLD_B"]);
        assert_eq!(attributes["BLD_B"].surfaces, vec!["WALL_B"]);
    }

    #[test]
    fn test_values_from_building_part() {
        let xml = wrap_city_model(
            r#"<bldg:Building gml:id="B">
                 <bldg:storeysAboveGround>2</bldg:storeysAboveGround>
                 <bldg:consistsOfBuildingPart><bldg:BuildingPart gml:id="B_PART">
                   <bldg:measuredHeight uom="m">8.25</bldg:measuredHeight>
                   <bldg:storeysAboveGround>5</bldg:storeysAboveGround>
                 </bldg:BuildingPart></bldg:consistsOfBuildingPart>
               </bldg:Building>"#,
        );
        let model = CityModel::parse(&xml).unwrap();
        let attributes = model.building_attributes();

        assert_eq!(attributes["B"].measured_height, Some(8.25));
        assert_eq!(attributes["B"].storeys_above_ground, Some(2));
    }
}
