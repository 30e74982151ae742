use super::{DayTotals, MealLine, MealTotals, NutritionError};

/// Rounds to two decimals, ties away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn validate(lines: &[MealLine<'_>]) -> Result<(), NutritionError> {
    for line in lines {
        if !line.quantity_g.is_finite() || line.quantity_g < 0.0 {
            return Err(NutritionError::InvalidQuantity {
                food: line.profile.name.clone(),
                quantity_g: line.quantity_g,
            });
        }
        line.profile.validate()?;
    }
    Ok(())
}

fn sum_lines(lines: &[MealLine<'_>]) -> DayTotals {
    lines.iter().fold(DayTotals::default(), |acc, line| {
        let p = line.profile;
        let multiplier = line.quantity_g / 100.0;
        DayTotals {
            total_calories: acc.total_calories + p.calories * multiplier,
            total_protein: acc.total_protein + p.protein * multiplier,
            total_carbs: acc.total_carbs + p.carbs * multiplier,
            total_fats: acc.total_fats + p.fats * multiplier,
            total_fiber: acc.total_fiber + p.fiber * multiplier,
            total_sugar: acc.total_sugar + p.sugar * multiplier,
            total_sodium: acc.total_sodium + p.sodium * multiplier,
        }
    })
}

/// Sums calories, protein, carbs and fats over the lines of one meal.
pub fn aggregate_meal(lines: &[MealLine<'_>]) -> Result<MealTotals, NutritionError> {
    validate(lines)?;
    let raw = sum_lines(lines);
    Ok(MealTotals {
        total_calories: round2(raw.total_calories),
        total_protein: round2(raw.total_protein),
        total_carbs: round2(raw.total_carbs),
        total_fats: round2(raw.total_fats),
    })
}

/// Sums all seven nutrients over every line eaten in a day.
pub fn aggregate_day(lines: &[MealLine<'_>]) -> Result<DayTotals, NutritionError> {
    validate(lines)?;
    let raw = sum_lines(lines);
    Ok(DayTotals {
        total_calories: round2(raw.total_calories),
        total_protein: round2(raw.total_protein),
        total_carbs: round2(raw.total_carbs),
        total_fats: round2(raw.total_fats),
        total_fiber: round2(raw.total_fiber),
        total_sugar: round2(raw.total_sugar),
        total_sodium: round2(raw.total_sodium),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::FoodProfile;

    fn food(name: &str, calories: f64, protein: f64, carbs: f64, fats: f64) -> FoodProfile {
        FoodProfile {
            name: name.into(),
            calories,
            protein,
            carbs,
            fats,
            fiber: 0.0,
            sugar: 0.0,
            sodium: 0.0,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn chicken_rice_broccoli_plate() {
        let chicken = food("Chicken Breast", 165.0, 31.0, 0.0, 3.6);
        let rice = food("Brown Rice", 111.0, 2.6, 23.0, 0.9);
        let broccoli = food("Broccoli", 35.0, 2.8, 7.0, 0.4);
        let lines = [
            MealLine::new(&chicken, 200.0),
            MealLine::new(&rice, 150.0),
            MealLine::new(&broccoli, 200.0),
        ];

        let totals = aggregate_meal(&lines).expect("valid meal");
        assert!(close(totals.total_calories, 566.5));
        assert!(close(totals.total_protein, 71.5));
        assert!(close(totals.total_carbs, 48.5));
        assert!(close(totals.total_fats, 9.35));
    }

    #[test]
    fn empty_meal_is_all_zero() {
        assert_eq!(aggregate_meal(&[]).unwrap(), MealTotals::default());
        assert_eq!(aggregate_day(&[]).unwrap(), DayTotals::default());
    }

    #[test]
    fn zero_quantity_contributes_nothing() {
        let oats = food("Oats", 389.0, 16.9, 66.3, 6.9);
        let totals = aggregate_meal(&[MealLine::new(&oats, 0.0)]).unwrap();
        assert_eq!(totals, MealTotals::default());
    }

    #[test]
    fn order_does_not_change_totals() {
        let a = food("Salmon", 208.0, 20.0, 0.0, 12.0);
        let b = food("Greek Yogurt", 59.0, 10.0, 3.6, 0.4);
        let c = food("Almonds", 579.0, 21.2, 21.6, 49.9);
        let forward = [
            MealLine::new(&a, 120.0),
            MealLine::new(&b, 170.0),
            MealLine::new(&c, 28.0),
        ];
        let reversed = [forward[2], forward[1], forward[0]];
        assert_eq!(aggregate_meal(&forward), aggregate_meal(&reversed));
        assert_eq!(aggregate_day(&forward), aggregate_day(&reversed));
    }

    #[test]
    fn calories_match_per_line_formula() {
        let a = food("Banana", 89.0, 1.1, 22.8, 0.3);
        let b = food("Peanut Butter", 588.0, 25.0, 20.0, 50.0);
        let lines = [MealLine::new(&a, 118.0), MealLine::new(&b, 32.0)];
        let expected: f64 = lines
            .iter()
            .map(|l| l.quantity_g / 100.0 * l.profile.calories)
            .sum();
        let totals = aggregate_meal(&lines).unwrap();
        assert!((totals.total_calories - expected).abs() <= 0.01);
    }

    #[test]
    fn negative_quantity_fails_before_summing() {
        let a = food("Rice", 130.0, 2.7, 28.0, 0.3);
        let b = food("Beans", 127.0, 8.7, 22.8, 0.5);
        let lines = [MealLine::new(&a, 100.0), MealLine::new(&b, -5.0)];
        let err = aggregate_meal(&lines).unwrap_err();
        assert_eq!(
            err,
            NutritionError::InvalidQuantity {
                food: "Beans".into(),
                quantity_g: -5.0
            }
        );
        assert!(aggregate_day(&lines).is_err());
    }

    #[test]
    fn negative_nutrient_is_invalid_profile() {
        let mut bad = food("Mystery", 100.0, 5.0, 5.0, 5.0);
        bad.sodium = -1.0;
        let err = aggregate_day(&[MealLine::new(&bad, 50.0)]).unwrap_err();
        assert!(matches!(
            err,
            NutritionError::InvalidProfile { nutrient: "sodium", .. }
        ));
    }

    #[test]
    fn nan_nutrient_is_invalid_profile() {
        let bad = food("Broken", f64::NAN, 1.0, 1.0, 1.0);
        assert!(aggregate_meal(&[MealLine::new(&bad, 10.0)]).is_err());
    }

    #[test]
    fn rounding_ties_go_up() {
        // 0.25 kcal/100g * 50 g = 0.125 exactly
        let tiny = food("Tea", 0.25, 0.0, 0.0, 0.0);
        let totals = aggregate_meal(&[MealLine::new(&tiny, 50.0)]).unwrap();
        assert!(close(totals.total_calories, 0.13));
    }

    #[test]
    fn day_totals_include_micros() {
        let mut rice = food("Brown Rice", 111.0, 2.6, 23.0, 0.9);
        rice.fiber = 1.8;
        rice.sugar = 0.4;
        rice.sodium = 5.0;
        let day = aggregate_day(&[MealLine::new(&rice, 200.0)]).unwrap();
        assert!(close(day.total_fiber, 3.6));
        assert!(close(day.total_sugar, 0.8));
        assert!(close(day.total_sodium, 10.0));
        assert!(close(day.total_calories, 222.0));
    }
}
