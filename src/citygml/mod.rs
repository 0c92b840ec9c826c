//! CityGML 2.0 document reading.
//!
//! [`CityModel`] wraps a parsed document and offers two passes over it: per-object
//! geometry records ([`CityModel::geometries`]) and per-building surface groups with
//! building attributes ([`CityModel::building_groups`]).

pub mod building;
pub mod namespace;
pub mod parser;

pub use parser::{parse_point, parse_pos_list, CityModel};
