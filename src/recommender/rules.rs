use serde::Serialize;
use uuid::Uuid;

use crate::foods::repo_types::Food;

pub const MIN_PROTEIN_PER_100G: f64 = 10.0;
pub const MAX_CALORIES_PER_100G: f64 = 200.0;
pub const MAX_RECOMMENDATIONS: usize = 7;
pub const LEAN_PROTEIN_REASON: &str = "High protein, moderate calories";

const MEAT_WORDS: [&str; 3] = ["chicken", "beef", "pork"];
const ANIMAL_PRODUCT_WORDS: [&str; 3] = ["egg", "yogurt", "milk"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub reason: &'static str,
}

/// Words a food name must not contain under the given restrictions.
fn excluded_words(restrictions: &[String]) -> Vec<&'static str> {
    let has = |wanted: &str| restrictions.iter().any(|r| r.eq_ignore_ascii_case(wanted));
    let vegan = has("vegan");
    let mut words = Vec::new();
    if vegan || has("vegetarian") {
        words.extend(MEAT_WORDS);
    }
    if vegan {
        words.extend(ANIMAL_PRODUCT_WORDS);
    }
    words
}

/// Keeps lean, protein-dense foods that pass the restrictions, in input order.
pub fn lean_protein_picks(foods: Vec<Food>, restrictions: &[String]) -> Vec<Recommendation> {
    let excluded = excluded_words(restrictions);
    foods
        .into_iter()
        .filter(|f| {
            f.protein_per_100g >= MIN_PROTEIN_PER_100G
                && f.calories_per_100g <= MAX_CALORIES_PER_100G
        })
        .filter(|f| {
            let name = f.name.to_lowercase();
            !excluded.iter().any(|w| name.contains(w))
        })
        .take(MAX_RECOMMENDATIONS)
        .map(|f| Recommendation {
            id: f.id,
            name: f.name,
            calories_per_100g: f.calories_per_100g,
            protein_per_100g: f.protein_per_100g,
            reason: LEAN_PROTEIN_REASON,
        })
        .collect()
}

/// Splits `a, b,,c` into trimmed, lowercased, non-empty entries.
pub fn parse_restrictions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn food(name: &str, calories: f64, protein: f64) -> Food {
        Food {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            calories_per_100g: calories,
            protein_per_100g: protein,
            carbs_per_100g: 0.0,
            fats_per_100g: 0.0,
            fiber_per_100g: 0.0,
            sugar_per_100g: 0.0,
            sodium_per_100g: 0.0,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn names(picks: &[Recommendation]) -> Vec<&str> {
        picks.iter().map(|r| r.name.as_str()).collect()
    }

    fn pantry() -> Vec<Food> {
        vec![
            food("Chicken Breast", 165.0, 31.0),
            food("Greek Yogurt", 59.0, 10.0),
            food("Tofu", 76.0, 8.0),
            food("Tempeh", 192.0, 20.0),
            food("Lean Beef Mince", 176.0, 20.0),
            food("Egg White", 52.0, 11.0),
            food("Peanut Butter", 588.0, 25.0),
            food("Lentils", 116.0, 9.0),
            food("Seitan", 150.0, 25.0),
        ]
    }

    #[test]
    fn keeps_only_lean_protein_dense_foods() {
        let picks = lean_protein_picks(pantry(), &[]);
        assert_eq!(
            names(&picks),
            vec!["Chicken Breast", "Greek Yogurt", "Tempeh", "Lean Beef Mince", "Egg White", "Seitan"]
        );
        assert!(picks.iter().all(|r| r.reason == LEAN_PROTEIN_REASON));
    }

    #[test]
    fn vegetarian_drops_meat_case_insensitively() {
        let picks = lean_protein_picks(pantry(), &["Vegetarian".to_string()]);
        assert_eq!(names(&picks), vec!["Greek Yogurt", "Tempeh", "Egg White", "Seitan"]);
    }

    #[test]
    fn vegan_drops_meat_and_animal_products() {
        let picks = lean_protein_picks(pantry(), &["vegan".to_string()]);
        assert_eq!(names(&picks), vec!["Tempeh", "Seitan"]);
    }

    #[test]
    fn unknown_restrictions_filter_nothing() {
        let picks = lean_protein_picks(pantry(), &["gluten-free".to_string()]);
        assert_eq!(picks.len(), 6);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let picks = lean_protein_picks(vec![food("Edge", 200.0, 10.0)], &[]);
        assert_eq!(picks.len(), 1);
    }

    #[test]
    fn at_most_seven_results() {
        let foods = (0..12).map(|i| food(&format!("Tofu {i}"), 100.0, 15.0)).collect();
        let picks = lean_protein_picks(foods, &[]);
        assert_eq!(picks.len(), MAX_RECOMMENDATIONS);
        assert_eq!(picks[0].name, "Tofu 0");
    }

    #[test]
    fn restriction_list_parsing() {
        assert_eq!(
            parse_restrictions(" Vegan, ,vegetarian,"),
            vec!["vegan".to_string(), "vegetarian".to_string()]
        );
        assert!(parse_restrictions("").is_empty());
    }
}
