//! Namespace table and namespace-qualified tree queries.
//!
//! Every lookup goes through a [`QName`], so an element is only matched when both
//! its namespace URI and its local name agree. Elements from unrelated schemas that
//! happen to share a local name (`name`, `Polygon`, ...) are never picked up.

use roxmltree::Node;

/// CityGML 2.0 core module.
pub const CORE: &str = "http://www.opengis.net/citygml/2.0";
/// GML 3.1.1 geometry.
pub const GML: &str = "http://www.opengis.net/gml";
/// CityGML 2.0 building module.
pub const BLDG: &str = "http://www.opengis.net/citygml/building/2.0";
/// CityGML 2.0 generics module.
pub const GEN: &str = "http://www.opengis.net/citygml/generics/2.0";
/// XLink cross references.
pub const XLINK: &str = "http://www.w3.org/1999/xlink";

/// Prefix table as declared by the CityGML 2.0 schemas.
pub const NAMESPACES: [(&str, &str); 5] = [
    ("core", CORE),
    ("gml", GML),
    ("bldg", BLDG),
    ("gen", GEN),
    ("xlink", XLINK),
];

/// A namespace-qualified element or attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QName {
    pub ns: &'static str,
    pub local: &'static str,
}

impl QName {
    pub const fn new(ns: &'static str, local: &'static str) -> Self {
        Self { ns, local }
    }

    /// Check if `node` is an element with this name.
    pub fn matches(&self, node: &Node) -> bool {
        node.is_element() && node.has_tag_name((self.ns, self.local))
    }
}

pub const GML_ID: QName = QName::new(GML, "id");
pub const GML_NAME: QName = QName::new(GML, "name");
pub const GML_DESCRIPTION: QName = QName::new(GML, "description");
pub const GML_POLYGON: QName = QName::new(GML, "Polygon");
pub const GML_EXTERIOR: QName = QName::new(GML, "exterior");
pub const GML_LINEAR_RING: QName = QName::new(GML, "LinearRing");
pub const GML_POS_LIST: QName = QName::new(GML, "posList");
pub const GML_POS: QName = QName::new(GML, "pos");
pub const GML_SURFACE_MEMBER: QName = QName::new(GML, "surfaceMember");
pub const GML_ENVELOPE: QName = QName::new(GML, "Envelope");
pub const GML_LOWER_CORNER: QName = QName::new(GML, "lowerCorner");
pub const GML_UPPER_CORNER: QName = QName::new(GML, "upperCorner");
pub const XLINK_HREF: QName = QName::new(XLINK, "href");
pub const BLDG_BUILDING: QName = QName::new(BLDG, "Building");
pub const BLDG_MEASURED_HEIGHT: QName = QName::new(BLDG, "measuredHeight");
pub const BLDG_STOREYS_ABOVE: QName = QName::new(BLDG, "storeysAboveGround");
pub const BLDG_STOREYS_BELOW: QName = QName::new(BLDG, "storeysBelowGround");

/// First direct child element with the given name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, name: QName) -> Option<Node<'a, 'input>> {
    node.children().find(|n| name.matches(n))
}

/// All direct child elements with the given name.
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: QName,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| name.matches(n))
}

/// First element with the given name below `node` (document order, `node` excluded).
pub fn find_descendant<'a, 'input>(node: Node<'a, 'input>, name: QName) -> Option<Node<'a, 'input>> {
    find_all_descendants(node, name).next()
}

/// Every element with the given name below `node` (document order, `node` excluded).
pub fn find_all_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    name: QName,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().skip(1).filter(move |n| name.matches(n))
}

/// Namespace-qualified attribute value.
pub fn attribute<'a, 'input>(node: Node<'a, 'input>, name: QName) -> Option<&'a str> {
    node.attribute((name.ns, name.local))
}

/// The `gml:id` of an element, if present and non-empty.
pub fn gml_id<'a, 'input>(node: Node<'a, 'input>) -> Option<&'a str> {
    attribute(node, GML_ID).filter(|id| !id.trim().is_empty())
}

/// Trimmed text content of an element, `None` when empty.
pub fn text<'a, 'input>(node: Node<'a, 'input>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|t| !t.is_empty())
}
