//! MealDB wire shapes and their normalization into domain records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{
        Ingredient, Recipe, RecipeId, DEFAULT_AREA, DEFAULT_CATEGORY, DEFAULT_INSTRUCTIONS,
        MAX_INGREDIENTS,
    },
    error::NormalizeError,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealDbResponse {
    #[serde(default)]
    pub meals: Option<Vec<RawMeal>>,
}

impl MealDbResponse {
    pub fn into_meals(self) -> Vec<RawMeal> {
        self.meals.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMeal {
    #[serde(rename = "idMeal", default)]
    pub id: Option<String>,
    #[serde(rename = "strMeal", default)]
    pub name: Option<String>,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub youtube: Option<String>,
    /// `strIngredientN`, `strMeasureN` and whatever else the API adds.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl RawMeal {
    pub fn normalize(self) -> Result<Recipe, NormalizeError> {
        let id = self
            .id
            .as_deref()
            .and_then(RecipeId::parse)
            .ok_or(NormalizeError::MissingField { field: "idMeal" })?;
        let name = non_blank(self.name.as_deref())
            .ok_or(NormalizeError::MissingField { field: "strMeal" })?;
        let thumbnail_url = non_blank(self.thumbnail.as_deref())
            .ok_or(NormalizeError::MissingField {
                field: "strMealThumb",
            })?;
        let ingredients = self.ingredients();

        Ok(Recipe {
            id,
            name,
            category: non_blank(self.category.as_deref())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            area: non_blank(self.area.as_deref()).unwrap_or_else(|| DEFAULT_AREA.to_string()),
            instructions: non_blank(self.instructions.as_deref())
                .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
            thumbnail_url,
            youtube_url: non_blank(self.youtube.as_deref()),
            ingredients,
            price: None,
        })
    }

    fn ingredients(&self) -> Vec<Ingredient> {
        (1..=MAX_INGREDIENTS)
            .filter_map(|slot| {
                let name = self.extra_str(&format!("strIngredient{slot}"))?;
                let measure = self
                    .extra_str(&format!("strMeasure{slot}"))
                    .unwrap_or_default();
                Some(Ingredient { name, measure })
            })
            .collect()
    }

    fn extra_str(&self, key: &str) -> Option<String> {
        non_blank(self.extra.get(key).and_then(Value::as_str))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
