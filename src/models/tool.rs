use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse grouping of the category tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductDomain {
    Shelter,
    Pack,
    SleepSystem,
    Clothing,
    Bikepacking,
    Cookware,
    FieldGear,
    Consumables,
    Other,
}

macro_rules! product_categories {
    ($($variant:ident => $tag:literal, $domain:ident;)+) => {
        /// Closed set of gear categories. The tag string is what the model
        /// emits and what is stored in the `tools.type` column.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ProductCategory {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl ProductCategory {
            pub const ALL: &'static [ProductCategory] = &[$(ProductCategory::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ProductCategory::$variant => $tag,)+
                }
            }

            #[allow(dead_code)]
            pub fn domain(&self) -> ProductDomain {
                match self {
                    $(ProductCategory::$variant => ProductDomain::$domain,)+
                }
            }
        }
    };
}

product_categories! {
    Tent => "Tent", Shelter;
    Tarp => "Tarp", Shelter;
    TentAccessory => "Tent Accessory", Shelter;

    Backpack => "Backpack", Pack;
    SackPouch => "Sack / Waist Pouch", Pack;
    BackpackAccessory => "Backpack Accessory", Pack;
    TravelBag => "Travel Bag / Tote", Pack;

    SleepingBag => "Sleeping Bag", SleepSystem;
    Bivy => "Bivy", SleepSystem;
    Hammock => "Hammock", SleepSystem;
    SleepingMat => "Sleeping Mat", SleepSystem;
    Pillow => "Pillow", SleepSystem;
    Groundsheet => "Groundsheet", SleepSystem;
    SleepingAccessory => "Sleeping Accessory", SleepSystem;

    Tops => "Tops", Clothing;
    Shirt => "T-shirt / Shirt", Clothing;
    Shell => "Shell", Clothing;
    Insulation => "Insulation", Clothing;
    Bottoms => "Bottoms", Clothing;
    Pants => "Pants / Shorts", Clothing;
    Headgear => "Headgear", Clothing;
    Eyewear => "Eyewear", Clothing;
    Neckwear => "Neckwear", Clothing;
    Gloves => "Gloves", Clothing;
    Socks => "Socks", Clothing;
    Shoes => "Shoes", Clothing;

    BikeBag => "Bike Bag", Bikepacking;
    BikeAccessory => "Bike Accessory", Bikepacking;

    Cooker => "Cooker", Cookware;
    Cutlery => "Cutlery", Cookware;
    Table => "Table", Cookware;
    Stove => "Stove / Fuel", Cookware;
    Firepit => "Firepit", Cookware;
    BottlePurifier => "Bottle / Water Purifier", Cookware;

    StuffSack => "Stuff Sack", FieldGear;
    FieldAccessory => "Field Accessory", FieldGear;
    Knife => "Knife", FieldGear;
    Wallet => "Wallet", FieldGear;
    Umbrella => "Umbrella", FieldGear;
    Crampons => "Crampons", FieldGear;
    Emergency => "Emergency", FieldGear;
    Lighting => "Lantern / Headlight", FieldGear;

    Food => "Food", Consumables;
    Alcohol => "Alcohol", Consumables;

    Other => "Other", Other;
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    /// Matches the tag case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown product category: {}", wanted))
    }
}

/// One piece of equipment mentioned in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub brand: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub category: Option<ProductCategory>,
}

impl Tool {
    /// Builds a tool with trimmed fields. A blank brand becomes `None` so that
    /// null and empty-string brands share one dedup key.
    pub fn new(brand: Option<&str>, name: &str, category: Option<ProductCategory>) -> Self {
        let brand = brand
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        Self {
            brand,
            name: name.trim().to_string(),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRecord {
    pub id: i64,
    pub summary_id: String,
    pub brand: Option<String>,
    pub name: String,
    pub category: Option<ProductCategory>,
}
