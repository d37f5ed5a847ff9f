use mongodb::bson::{Bson, Document};
use serde::Serialize;
use serde_json::{Map, Value};

use super::filter::LATEST_GRADE_FIELD;
use crate::utils::bson::{bson_to_json, grade_date};

/// One restaurant as returned to API clients.
///
/// Well-known fields are typed; any other top-level field is carried through
/// as plain JSON in `extra`. Absent fields are omitted from the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RestaurantRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borough: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grades: Option<Vec<GradeRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_grade: Option<GradeRow>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coord: Option<Vec<f64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GradeRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
}

impl RestaurantRow {
    pub fn from_document(doc: Document) -> Self {
        let mut row = RestaurantRow::default();

        for (key, value) in doc {
            let value = match (key.as_str(), value) {
                ("restaurant_id", Bson::String(s)) => {
                    row.restaurant_id = Some(s);
                    continue;
                }
                ("name", Bson::String(s)) => {
                    row.name = Some(s);
                    continue;
                }
                ("borough", Bson::String(s)) => {
                    row.borough = Some(s);
                    continue;
                }
                ("cuisine", Bson::String(s)) => {
                    row.cuisine = Some(s);
                    continue;
                }
                ("address", Bson::Document(d)) => {
                    row.address = Some(Address::from_document(d));
                    continue;
                }
                ("grades", Bson::Array(items)) => {
                    row.grades = Some(items.into_iter().map(GradeRow::from_bson).collect());
                    continue;
                }
                (LATEST_GRADE_FIELD, Bson::Document(d)) => {
                    row.latest_grade = Some(GradeRow::from_document(d));
                    continue;
                }
                (LATEST_GRADE_FIELD, _) => continue,
                (_, value) => value,
            };

            row.extra.insert(key, bson_to_json(value));
        }

        row
    }
}

impl Address {
    pub fn from_document(doc: Document) -> Self {
        let mut address = Address::default();

        for (key, value) in doc {
            let value = match (key.as_str(), value) {
                ("building", Bson::String(s)) => {
                    address.building = Some(s);
                    continue;
                }
                ("street", Bson::String(s)) => {
                    address.street = Some(s);
                    continue;
                }
                ("zipcode", Bson::String(s)) => {
                    address.zipcode = Some(s);
                    continue;
                }
                ("coord", Bson::Array(items)) => match coordinates(&items) {
                    Some(coord) => {
                        address.coord = Some(coord);
                        continue;
                    }
                    None => Bson::Array(items),
                },
                (_, value) => value,
            };

            address.extra.insert(key, bson_to_json(value));
        }

        address
    }
}

impl GradeRow {
    pub fn from_bson(value: Bson) -> Self {
        match value {
            Bson::Document(d) => Self::from_document(d),
            _ => GradeRow::default(),
        }
    }

    pub fn from_document(mut doc: Document) -> Self {
        let date = doc.remove("date").and_then(grade_date);
        let grade = match doc.remove("grade") {
            None | Some(Bson::Null) => None,
            Some(Bson::String(s)) => Some(s),
            Some(other) => Some(bson_to_json(other).to_string()),
        };
        let score = match doc.remove("score") {
            None | Some(Bson::Null) => None,
            Some(other) => Some(bson_to_json(other)),
        };

        Self { date, grade, score }
    }
}

fn coordinates(items: &[Bson]) -> Option<Vec<f64>> {
    items
        .iter()
        .map(|item| match item {
            Bson::Double(f) => Some(*f),
            Bson::Int32(i) => Some(f64::from(*i)),
            Bson::Int64(i) => Some(*i as f64),
            _ => None,
        })
        .collect()
}
