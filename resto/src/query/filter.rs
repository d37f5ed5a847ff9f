use mongodb::bson::{doc, Bson, Document};

use super::QuerySpec;

/// Text fields scanned by the free-text search.
pub const SEARCH_FIELDS: [&str; 5] = [
    "name",
    "cuisine",
    "borough",
    "address.street",
    "address.zipcode",
];

pub const LATEST_GRADE_FIELD: &str = "latestGrade";

/// Builds the base filter shared by the plain and the score-filtered queries.
///
/// The search text is matched literally, case-insensitively, anywhere in the
/// field. Borough and cuisine are exact matches, whitespace included.
pub fn build_filter(spec: &QuerySpec) -> Document {
    let mut filter = Document::new();

    if let Some(search) = &spec.search {
        let pattern = regex::escape(search);
        let clauses: Vec<Bson> = SEARCH_FIELDS
            .iter()
            .map(|field| {
                let mut clause = Document::new();
                clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
                Bson::Document(clause)
            })
            .collect();
        filter.insert("$or", clauses);
    }

    if let Some(borough) = &spec.borough {
        filter.insert("borough", borough.as_str());
    }

    if let Some(cuisine) = &spec.cuisine {
        filter.insert("cuisine", cuisine.as_str());
    }

    filter
}

/// Stages that keep restaurants whose most recent grade scores at most
/// `max_score`.
///
/// Stored grade order is not trusted: the grades are sorted by date, newest
/// first, and the head is exposed as `latestGrade` before filtering on it.
/// Restaurants without grades never match.
pub fn latest_grade_stages(base: Document, max_score: f64) -> Vec<Document> {
    let latest = doc! {
        "$arrayElemAt": [
            { "$sortArray": { "input": "$grades", "sortBy": { "date": -1 } } },
            0
        ]
    };

    let mut add_fields = Document::new();
    add_fields.insert(LATEST_GRADE_FIELD, latest);

    let mut threshold = Document::new();
    threshold.insert(
        format!("{LATEST_GRADE_FIELD}.score"),
        doc! { "$lte": max_score },
    );

    vec![
        doc! { "$match": base },
        doc! { "$addFields": add_fields },
        doc! { "$match": threshold },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortSpec;

    fn spec() -> QuerySpec {
        QuerySpec::default()
    }

    #[test]
    fn test_empty_spec_matches_everything() {
        assert_eq!(build_filter(&spec()), Document::new());
    }

    #[test]
    fn test_search_covers_all_text_fields() {
        let filter = build_filter(&QuerySpec {
            search: Some("pizza".into()),
            ..spec()
        });

        assert_eq!(
            filter,
            doc! {
                "$or": [
                    { "name": { "$regex": "pizza", "$options": "i" } },
                    { "cuisine": { "$regex": "pizza", "$options": "i" } },
                    { "borough": { "$regex": "pizza", "$options": "i" } },
                    { "address.street": { "$regex": "pizza", "$options": "i" } },
                    { "address.zipcode": { "$regex": "pizza", "$options": "i" } },
                ]
            }
        );
    }

    #[test]
    fn test_search_text_is_matched_literally() {
        let filter = build_filter(&QuerySpec {
            search: Some("Joe's (Pizza)+".into()),
            ..spec()
        });

        let clauses = filter.get_array("$or").unwrap();
        let first = clauses[0].as_document().unwrap();
        let pattern = first.get_document("name").unwrap().get_str("$regex").unwrap();
        assert_eq!(pattern, r"Joe's \(Pizza\)\+");
    }

    #[test]
    fn test_exact_matches_combine_with_search() {
        let filter = build_filter(&QuerySpec {
            search: Some("restaurant".into()),
            borough: Some("Brooklyn".into()),
            cuisine: Some("American ".into()),
            sort: SortSpec::new(Some("borough"), None),
            ..spec()
        });

        assert_eq!(filter.get_str("borough").unwrap(), "Brooklyn");
        assert_eq!(filter.get_str("cuisine").unwrap(), "American ");
        assert_eq!(filter.get_array("$or").unwrap().len(), 5);
    }

    #[test]
    fn test_latest_grade_stages() {
        let stages = latest_grade_stages(doc! { "borough": "Queens" }, 20.0);

        assert_eq!(
            stages,
            vec![
                doc! { "$match": { "borough": "Queens" } },
                doc! {
                    "$addFields": {
                        "latestGrade": {
                            "$arrayElemAt": [
                                { "$sortArray": { "input": "$grades", "sortBy": { "date": -1 } } },
                                0
                            ]
                        }
                    }
                },
                doc! { "$match": { "latestGrade.score": { "$lte": 20.0 } } },
            ]
        );
    }
}
