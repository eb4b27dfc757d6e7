use serde::Deserialize;

use super::FoodCategory;
use crate::{
    error::ApiError,
    nutrients::{NutrientField, NutrientVector},
};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    pub name: String,
    pub category: FoodCategory,
    pub serving_size: f64,
    pub serving_unit: String,
    #[serde(default)]
    pub nutrients: NutrientVector,
    #[serde(default)]
    pub kidney_friendly: bool,
}

impl CreateFoodRequest {
    pub fn validate(&mut self) -> Result<(), ApiError> {
        self.name = self.name.trim().to_string();
        self.serving_unit = self.serving_unit.trim().to_string();
        if self.name.is_empty() {
            return Err(ApiError::BadRequest("name is required".into()));
        }
        if self.serving_unit.is_empty() {
            return Err(ApiError::BadRequest("servingUnit is required".into()));
        }
        if !(self.serving_size > 0.0 && self.serving_size.is_finite()) {
            return Err(ApiError::BadRequest("servingSize must be positive".into()));
        }
        self.nutrients.validate()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSearchQuery {
    pub q: Option<String>,
    pub category: Option<FoodCategory>,
    pub kidney_friendly: Option<bool>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FoodSearchQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn sort(&self) -> Result<FoodSort, ApiError> {
        match self.sort.as_deref().map(str::trim) {
            None | Some("") => Ok(FoodSort::default()),
            Some(s) => FoodSort::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("unsupported sort: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Nutrient(NutrientField),
}

/// `name`, `calories`, `-potassium`, ... A leading `-` sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FoodSort {
    pub key: SortKey,
    pub descending: bool,
}

impl FoodSort {
    pub fn parse(s: &str) -> Option<Self> {
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let key = match name {
            "name" => SortKey::Name,
            other => SortKey::Nutrient(NutrientField::parse(other)?),
        };
        Some(Self { key, descending })
    }

    /// ORDER BY clause built only from whitelisted column names.
    pub fn order_by(&self) -> String {
        let column = match self.key {
            SortKey::Name => "lower(name)",
            SortKey::Nutrient(f) => f.as_str(),
        };
        let dir = if self.descending { "DESC" } else { "ASC" };
        format!("{column} {dir}, id ASC")
    }
}

/// Escapes LIKE wildcards so the search term matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parsing() {
        assert_eq!(FoodSort::parse("name"), Some(FoodSort::default()));
        assert_eq!(
            FoodSort::parse("-potassium"),
            Some(FoodSort {
                key: SortKey::Nutrient(NutrientField::Potassium),
                descending: true
            })
        );
        assert_eq!(FoodSort::parse("sugar"), None);
        assert_eq!(FoodSort::parse("name; DROP TABLE foods"), None);
    }

    #[test]
    fn order_by_uses_column_names() {
        assert_eq!(FoodSort::default().order_by(), "lower(name) ASC, id ASC");
        let s = FoodSort::parse("-sodium").unwrap();
        assert_eq!(s.order_by(), "sodium DESC, id ASC");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rice"), "%rice%");
        assert_eq!(like_pattern("100%_juice"), "%100\\%\\_juice%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn pagination_is_clamped() {
        let q = FoodSearchQuery {
            limit: Some(1000),
            offset: Some(-5),
            ..Default::default()
        };
        assert_eq!(q.limit(), MAX_LIMIT);
        assert_eq!(q.offset(), 0);
        assert_eq!(FoodSearchQuery::default().limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn search_query_reports_bad_sort() {
        let q = FoodSearchQuery {
            sort: Some("fiber".into()),
            ..Default::default()
        };
        assert!(q.sort().is_err());
    }

    #[test]
    fn create_request_validation() {
        let mut req: CreateFoodRequest = serde_json::from_str(
            r#"{"name":"  Chicken breast ","category":"proteins","servingSize":100,
                "servingUnit":"g","nutrients":{"calories":165,"protein":31},
                "kidneyFriendly":true}"#,
        )
        .unwrap();
        req.validate().unwrap();
        assert_eq!(req.name, "Chicken breast");
        assert_eq!(req.nutrients.calories, 165.0);

        req.serving_size = 0.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_rejects_negative_nutrients() {
        let mut req: CreateFoodRequest = serde_json::from_str(
            r#"{"name":"Rice","category":"grains","servingSize":100,"servingUnit":"g",
                "nutrients":{"sodium":-1}}"#,
        )
        .unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("sodium"));
    }
}
