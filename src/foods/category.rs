use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed catalog tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Fruits,
    Vegetables,
    Grains,
    Proteins,
    Dairy,
    Beverages,
    Snacks,
    Condiments,
}

impl FoodCategory {
    pub const ALL: [Self; 8] = [
        Self::Fruits,
        Self::Vegetables,
        Self::Grains,
        Self::Proteins,
        Self::Dairy,
        Self::Beverages,
        Self::Snacks,
        Self::Condiments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fruits => "fruits",
            Self::Vegetables => "vegetables",
            Self::Grains => "grains",
            Self::Proteins => "proteins",
            Self::Dairy => "dairy",
            Self::Beverages => "beverages",
            Self::Snacks => "snacks",
            Self::Condiments => "condiments",
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FoodCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown food category: {s}"))
    }
}
