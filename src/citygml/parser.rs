//! Geometry extraction from a CityGML document.

use super::namespace::{self as ns, QName};
use crate::error::{ConvertError, Result};
use crate::mesher::triangulate::is_valid_ring;
use crate::types::{BoundingBox, ElementKind, GeometryMap, GeometryRecord, Metadata, Polygon};
use glam::DVec3;
use log::{debug, info, warn};
use roxmltree::{Document, Node};

/// A parsed CityGML document.
///
/// The whole tree stays in memory for the duration of a run, so the geometry
/// pass and the building attribute pass read the same document.
pub struct CityModel<'input> {
    doc: Document<'input>,
}

impl<'input> CityModel<'input> {
    /// Parse a CityGML document from text.
    ///
    /// Fails if the XML is malformed or if the root element declares neither the
    /// CityGML core nor the building namespace.
    pub fn parse(xml: &'input str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        let declares_citygml = root
            .namespaces()
            .any(|n| n.uri() == ns::CORE || n.uri() == ns::BLDG);
        if !declares_citygml {
            return Err(ConvertError::NotCityGml(format!(
                "root element <{}> does not declare {} or {}",
                root.tag_name().name(),
                ns::CORE,
                ns::BLDG
            )));
        }
        Ok(Self { doc })
    }

    pub(crate) fn document(&self) -> &Document<'input> {
        &self.doc
    }

    /// Extract one geometry record per identified building and semantic surface.
    ///
    /// Buildings come first in document order, followed by the surface kinds in
    /// [`ElementKind::SURFACES`] order. A building record aggregates every polygon
    /// nested below it; each surface record only holds its own.
    pub fn geometries(&self) -> GeometryMap {
        let root = self.doc.root_element();
        let mut geometries = GeometryMap::new();

        let kinds = std::iter::once(ElementKind::Building).chain(ElementKind::SURFACES);
        for kind in kinds {
            let qname = QName::new(ns::BLDG, kind.as_str());
            let mut found = 0usize;

            for element in ns::find_all_descendants(root, qname) {
                found += 1;
                let Some(id) = ns::gml_id(element) else {
                    debug!("Skipping {} without gml:id", kind);
                    continue;
                };
                if geometries.contains_key(id) {
                    warn!("Duplicate gml:id '{}' on {}, keeping the first occurrence", id, kind);
                    continue;
                }

                let record = extract_record(element, kind, id);
                debug!("  {} {}: {} polygons", kind, id, record.polygons.len());
                geometries.insert(id.to_string(), record);
            }

            info!("Found {} {} elements", found, kind);
        }

        info!("Total extracted: {} objects", geometries.len());
        geometries
    }

    /// The document envelope (`gml:Envelope` lower and upper corner), if declared.
    pub fn envelope(&self) -> Option<BoundingBox> {
        let envelope = ns::find_descendant(self.doc.root_element(), ns::GML_ENVELOPE)?;
        let lower = ns::find_child(envelope, ns::GML_LOWER_CORNER).and_then(ns::text)?;
        let upper = ns::find_child(envelope, ns::GML_UPPER_CORNER).and_then(ns::text)?;
        Some(BoundingBox::new(parse_point(lower)?, parse_point(upper)?))
    }
}

fn extract_record(element: Node, kind: ElementKind, id: &str) -> GeometryRecord {
    let mut record = GeometryRecord::new(kind);
    record.metadata = extract_metadata(element);

    let mut dropped = 0usize;
    for polygon in ns::find_all_descendants(element, ns::GML_POLYGON) {
        match exterior_ring(polygon) {
            Some(ring) if is_valid_ring(&ring) => record.polygons.push(ring),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("{} {}: dropped {} polygons with fewer than 3 distinct points", kind, id, dropped);
    }

    let references = ns::find_all_descendants(element, ns::GML_SURFACE_MEMBER)
        .filter(|member| ns::attribute(*member, ns::XLINK_HREF).is_some())
        .count();
    if references > 0 {
        debug!("{} {}: {} xlink surface references left unresolved", kind, id, references);
    }

    record
}

/// First `gml:name` and first `gml:description` directly below `element`.
fn extract_metadata(element: Node) -> Metadata {
    let mut metadata = Metadata::new();
    for (key, qname) in [("name", ns::GML_NAME), ("description", ns::GML_DESCRIPTION)] {
        if let Some(node) = ns::find_child(element, qname) {
            let value = ns::text(node)
                .map(|t| serde_json::Value::String(t.to_string()))
                .unwrap_or(serde_json::Value::Null);
            metadata.insert(key.to_string(), value);
        }
    }
    metadata
}

/// Read the exterior ring of a `gml:Polygon`. Interior rings are ignored.
///
/// A non-empty `gml:posList` takes precedence over individual `gml:pos` children.
pub(crate) fn exterior_ring(polygon: Node) -> Option<Polygon> {
    let exterior = ns::find_child(polygon, ns::GML_EXTERIOR)?;
    let ring = ns::find_descendant(exterior, ns::GML_LINEAR_RING)?;

    if let Some(text) = ns::find_child(ring, ns::GML_POS_LIST).and_then(ns::text) {
        return Some(parse_pos_list(text));
    }

    let points = ns::children(ring, ns::GML_POS)
        .filter_map(|pos| {
            let text = ns::text(pos).unwrap_or_default();
            let point = parse_point(text);
            if point.is_none() {
                warn!("Skipping invalid gml:pos '{}'", text);
            }
            point
        })
        .collect();
    Some(points)
}

/// Parse a flat coordinate list into points, three values per point.
///
/// Non-numeric triples and a trailing incomplete triple are skipped with a warning.
pub fn parse_pos_list(text: &str) -> Polygon {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut points = Vec::with_capacity(tokens.len() / 3);

    for triple in tokens.chunks(3) {
        if triple.len() < 3 {
            warn!(
                "Coordinate list length {} is not a multiple of 3, ignoring trailing {:?}",
                tokens.len(),
                triple
            );
            break;
        }
        match parse_triple(triple) {
            Some(p) => points.push(p),
            None => warn!("Skipping invalid coordinate triple {:?}", triple),
        }
    }

    points
}

/// Parse `"x y z"`; extra values beyond the third are ignored.
pub fn parse_point(text: &str) -> Option<DVec3> {
    let tokens: Vec<&str> = text.split_whitespace().take(3).collect();
    if tokens.len() < 3 {
        return None;
    }
    parse_triple(&tokens)
}

fn parse_triple(tokens: &[&str]) -> Option<DVec3> {
    let x = tokens[0].parse::<f64>().ok()?;
    let y = tokens[1].parse::<f64>().ok()?;
    let z = tokens[2].parse::<f64>().ok()?;
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return None;
    }
    Some(DVec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citygml::test_data::{single_wall_building, wrap_city_model};

    #[test]
    fn test_parse_pos_list() {
        let points = parse_pos_list("0 0 0  1 0 0\n1 1 0");
        assert_eq!(points, vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0)]);
    }

    #[test]
    fn test_parse_pos_list_skips_bad_triples() {
        let points = parse_pos_list("0 0 0 a b c 1 1 1 2 2");
        assert_eq!(points, vec![DVec3::ZERO, DVec3::ONE]);
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point(" 1.5 2 3 "), Some(DVec3::new(1.5, 2.0, 3.0)));
        assert_eq!(parse_point("1 2"), None);
        assert_eq!(parse_point("1 2 x"), None);
        assert_eq!(parse_point("1 2 NaN"), None);
    }

    #[test]
    fn test_rejects_non_citygml() {
        let result = CityModel::parse("<kml xmlns=\"http://www.opengis.net/kml/2.2\"/>");
        assert!(matches!(result, Err(ConvertError::NotCityGml(_))));
    }

    #[test]
    fn test_rejects_malformed_xml() {
        let result = CityModel::parse("<CityModel");
        assert!(matches!(result, Err(ConvertError::Xml(_))));
    }

    #[test]
    fn test_building_and_surface_records() {
        let xml = single_wall_building();
        let model = CityModel::parse(&xml).unwrap();
        let geometries = model.geometries();

        let keys: Vec<&str> = geometries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["BLD_1", "WALL_1"]);

        let building = &geometries["BLD_1"];
        assert_eq!(building.element_type, ElementKind::Building);
        assert_eq!(building.polygons.len(), 1);
        assert_eq!(building.metadata["name"], "Town hall");

        let wall = &geometries["WALL_1"];
        assert_eq!(wall.element_type, ElementKind::WallSurface);
        assert_eq!(wall.polygons.len(), 1);
        assert_eq!(wall.polygons[0].len(), 5);
    }

    #[test]
    fn test_pos_elements_and_precedence() {
        let xml = wrap_city_model(
            r#"<bldg:RoofSurface gml:id="ROOF_1">
              <bldg:lod2MultiSurface><gml:MultiSurface><gml:surfaceMember><gml:Polygon>
                <gml:exterior><gml:LinearRing>
                  <gml:pos>0 0 5</gml:pos><gml:pos>1 0 5</gml:pos>
                  <gml:pos>bad</gml:pos><gml:pos>1 1 5</gml:pos>
                </gml:LinearRing></gml:exterior>
              </gml:Polygon></gml:surfaceMember>
              <gml:surfaceMember><gml:Polygon>
                <gml:exterior><gml:LinearRing>
                  <gml:posList>0 0 6 1 0 6 1 1 6</gml:posList>
                  <gml:pos>9 9 9</gml:pos>
                </gml:LinearRing></gml:exterior>
                <gml:interior><gml:LinearRing>
                  <gml:posList>0.2 0.2 6 0.4 0.2 6 0.4 0.4 6</gml:posList>
                </gml:LinearRing></gml:interior>
              </gml:Polygon></gml:surfaceMember></gml:MultiSurface></bldg:lod2MultiSurface>
            </bldg:RoofSurface>"#,
        );
        let model = CityModel::parse(&xml).unwrap();
        let geometries = model.geometries();
        let roof = &geometries["ROOF_1"];

        assert_eq!(roof.polygons.len(), 2);
        assert_eq!(roof.polygons[0].len(), 3);
        assert_eq!(roof.polygons[1], vec![
            DVec3::new(0.0, 0.0, 6.0),
            DVec3::new(1.0, 0.0, 6.0),
            DVec3::new(1.0, 1.0, 6.0),
        ]);
    }

    #[test]
    fn test_empty_pos_list_falls_back_to_pos() {
        let xml = wrap_city_model(
            r#"<bldg:RoofSurface gml:id="ROOF_1">
              <gml:Polygon><gml:exterior><gml:LinearRing>
                <gml:posList/>
                <gml:pos>0 0 5</gml:pos><gml:pos>1 0 5</gml:pos><gml:pos>1 1 5</gml:pos>
              </gml:LinearRing></gml:exterior></gml:Polygon>
              <gml:Polygon><gml:exterior><gml:LinearRing>
                <gml:posList>   </gml:posList>
                <gml:pos>0 0 6</gml:pos><gml:pos>1 0 6</gml:pos><gml:pos>1 1 6</gml:pos>
              </gml:LinearRing></gml:exterior></gml:Polygon>
            </bldg:RoofSurface>"#,
        );
        let model = CityModel::parse(&xml).unwrap();
        let geometries = model.geometries();
        let roof = &geometries["ROOF_1"];

        assert_eq!(roof.polygons.len(), 2);
        assert_eq!(roof.polygons[0], vec![
            DVec3::new(0.0, 0.0, 5.0),
            DVec3::new(1.0, 0.0, 5.0),
            DVec3::new(1.0, 1.0, 5.0),
        ]);
        assert_eq!(roof.polygons[1].len(), 3);
    }

    #[test]
    fn test_degenerate_polygon_keeps_object() {
        let xml = wrap_city_model(
            r#"<bldg:GroundSurface gml:id="GND_1"><gml:name>tiny</gml:name>
              <gml:Polygon><gml:exterior><gml:LinearRing>
                <gml:posList>0 0 0 1 0 0 0 0 0</gml:posList>
              </gml:LinearRing></gml:exterior></gml:Polygon>
            </bldg:GroundSurface>"#,
        );
        let model = CityModel::parse(&xml).unwrap();
        let geometries = model.geometries();
        let ground = &geometries["GND_1"];
        assert!(ground.is_empty());
        assert_eq!(ground.metadata["name"], "tiny");
    }

    #[test]
    fn test_skips_missing_id_and_foreign_namespace() {
        let xml = wrap_city_model(
            r#"<bldg:WallSurface><gml:Polygon/></bldg:WallSurface>
               <x:WallSurface xmlns:x="urn:not-citygml" gml:id="FOREIGN"/>
               <bldg:FloorSurface gml:id="FLOOR_1"/>"#,
        );
        let model = CityModel::parse(&xml).unwrap();
        let geometries = model.geometries();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries["FLOOR_1"].element_type, ElementKind::FloorSurface);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let xml = wrap_city_model(
            r#"<bldg:WallSurface gml:id="S"><gml:name>wall</gml:name></bldg:WallSurface>
               <bldg:RoofSurface gml:id="S"><gml:name>roof</gml:name></bldg:RoofSurface>"#,
        );
        let model = CityModel::parse(&xml).unwrap();
        let geometries = model.geometries();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries["S"].element_type, ElementKind::RoofSurface);
    }

    #[test]
    fn test_envelope() {
        let xml = wrap_city_model(
            r#"<gml:boundedBy><gml:Envelope srsDimension="3">
                 <gml:lowerCorner>10 20 0</gml:lowerCorner>
                 <gml:upperCorner>30 40 15</gml:upperCorner>
               </gml:Envelope></gml:boundedBy>"#,
        );
        let model = CityModel::parse(&xml).unwrap();
        let envelope = model.envelope().unwrap();
        assert_eq!(envelope.min, DVec3::new(10.0, 20.0, 0.0));
        assert_eq!(envelope.max, DVec3::new(30.0, 40.0, 15.0));
    }
}
