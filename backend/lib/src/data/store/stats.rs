//! Grouped record counts
//!
//! One routine serves every grouping (category, type, ...); stores without a
//! native aggregation run it over their full collection.

use std::collections::HashMap;

use serde_json::Value;

use crate::{
    constants::store::UNSET_GROUP_KEY,
    models::{shop::Shop, stats::GroupCounts},
};

/// Count `shops` per value of `field`.
///
/// Single pass: each new key is appended in first-seen order, then a stable
/// sort by descending count keeps that order among equal counts.
pub fn group_counts<'a>(shops: impl IntoIterator<Item = &'a Shop>, field: &str) -> GroupCounts {
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for shop in shops {
        let key = group_key(shop.field_value(field));
        match positions.get(&key) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts.sort_by(|(_, a), (_, b)| b.cmp(a));
    GroupCounts::from_ordered(counts)
}

/// Map a field value to the key of its group
pub fn group_key(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => UNSET_GROUP_KEY.to_string(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::constants::test::{sample_shops, scenario_shops, shop};

    #[test]
    fn groups_and_sorts_by_count() {
        let shops = sample_shops();
        let by_category = group_counts(&shops, "category");

        assert_eq!(
            by_category.iter().collect::<Vec<_>>(),
            vec![("food", 2), ("housing", 1), ("beauty", 1)]
        );
        assert_eq!(by_category.total(), shops.len() as u64);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let shops = vec![
            shop(json!({"id": "1", "type": "cafe"})),
            shop(json!({"id": "2", "type": "bar"})),
            shop(json!({"id": "3", "type": "bar"})),
            shop(json!({"id": "4", "type": "cafe"})),
            shop(json!({"id": "5", "type": "gym"})),
        ];

        let by_type = group_counts(&shops, "type");
        assert_eq!(by_type.keys().collect::<Vec<_>>(), vec!["cafe", "bar", "gym"]);
    }

    #[test]
    fn missing_and_null_share_a_bucket() {
        let shops = vec![
            shop(json!({"id": "1", "type": "cafe"})),
            shop(json!({"id": "2"})),
            shop(json!({"id": "3", "type": null})),
        ];

        let by_type = group_counts(&shops, "type");
        assert_eq!(by_type.get(UNSET_GROUP_KEY), Some(2));
        assert_eq!(by_type.get("cafe"), Some(1));
        assert_eq!(by_type.keys().next(), Some(UNSET_GROUP_KEY));
    }

    #[test]
    fn opaque_fields_can_be_grouped() {
        let shops = vec![
            shop(json!({"id": "1", "area": "Headingley"})),
            shop(json!({"id": "2", "area": "Hyde Park"})),
            shop(json!({"id": "3", "area": "Headingley", "floor": 2})),
        ];

        assert_eq!(group_counts(&shops, "area").get("Headingley"), Some(2));
        assert_eq!(group_counts(&shops, "floor").get("2"), Some(1));
    }

    #[test]
    fn scenario_counts() {
        let shops = scenario_shops();
        let by_category = group_counts(&shops, "category");

        assert_eq!(by_category.get("food"), Some(1));
        assert_eq!(by_category.get("housing"), Some(1));
        assert_eq!(by_category.len(), 2);
    }

    #[test]
    fn empty_collection() {
        assert!(group_counts(&Vec::<Shop>::new(), "category").is_empty());
    }
}
