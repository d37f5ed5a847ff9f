pub mod bson;
pub mod params;
