use serde::{Deserialize, Serialize};

/// Reference data for a bookable venue. Loaded once from the static
/// catalog and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attraction {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub location: Location,
    /// Ticket price in whole currency units (IDR has no minor unit).
    pub base_price: i64,
    pub currency: String,
    pub tags: Vec<String>,
    /// Maximum daily visitors. Must be positive.
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ThemePark,
    Museum,
    Nature,
    Entertainment,
    Cultural,
    Aquarium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The built-in Jakarta attraction catalog.
pub fn builtin_catalog() -> Vec<Attraction> {
    vec![
        Attraction {
            id: "attr_001".to_string(),
            name: "Dufan (Dunia Fantasi)".to_string(),
            description: "Jakarta's largest theme park with thrilling rides, family \
                          attractions, and entertainment shows at Ancol"
                .to_string(),
            category: Category::ThemePark,
            location: Location {
                city: "Jakarta".to_string(),
                country: "Indonesia".to_string(),
                latitude: -6.1247,
                longitude: 106.8420,
            },
            base_price: 200_000,
            currency: "IDR".to_string(),
            tags: vec![
                "family-friendly".to_string(),
                "outdoor".to_string(),
                "entertainment".to_string(),
                "rides".to_string(),
                "waterfront".to_string(),
            ],
            capacity: 25_000,
        },
        Attraction {
            id: "attr_002".to_string(),
            name: "Taman Mini Indonesia Indah (TMII)".to_string(),
            description: "Cultural park showcasing Indonesian diversity with pavilions \
                          representing all provinces, museums, and gardens"
                .to_string(),
            category: Category::Cultural,
            location: Location {
                city: "Jakarta".to_string(),
                country: "Indonesia".to_string(),
                latitude: -6.3025,
                longitude: 106.8953,
            },
            base_price: 25_000,
            currency: "IDR".to_string(),
            tags: vec![
                "cultural".to_string(),
                "educational".to_string(),
                "outdoor".to_string(),
                "family-friendly".to_string(),
                "museum".to_string(),
            ],
            capacity: 30_000,
        },
        Attraction {
            id: "attr_003".to_string(),
            name: "Jakarta Aquarium & Safari".to_string(),
            description: "Modern aquarium featuring diverse marine life, interactive \
                          exhibits, and safari-themed experiences"
                .to_string(),
            category: Category::Aquarium,
            location: Location {
                city: "Jakarta".to_string(),
                country: "Indonesia".to_string(),
                latitude: -6.2254,
                longitude: 106.8209,
            },
            base_price: 150_000,
            currency: "IDR".to_string(),
            tags: vec![
                "family-friendly".to_string(),
                "indoor".to_string(),
                "educational".to_string(),
                "marine-life".to_string(),
                "interactive".to_string(),
            ],
            capacity: 8_000,
        },
        Attraction {
            id: "attr_004".to_string(),
            name: "Taman Margasatwa Ragunan".to_string(),
            description: "Sprawling zoo in south Jakarta with native Indonesian \
                          wildlife, a primate centre, and shaded picnic grounds"
                .to_string(),
            category: Category::Nature,
            location: Location {
                city: "Jakarta".to_string(),
                country: "Indonesia".to_string(),
                latitude: -6.3124,
                longitude: 106.8201,
            },
            base_price: 4_500,
            currency: "IDR".to_string(),
            tags: vec![
                "nature".to_string(),
                "outdoor".to_string(),
                "family-friendly".to_string(),
                "wildlife".to_string(),
            ],
            capacity: 40_000,
        },
        Attraction {
            id: "attr_005".to_string(),
            name: "Museum Nasional Indonesia".to_string(),
            description: "The national museum of Indonesia, holding one of the \
                          region's richest archaeology and ethnography collections"
                .to_string(),
            category: Category::Museum,
            location: Location {
                city: "Jakarta".to_string(),
                country: "Indonesia".to_string(),
                latitude: -6.1766,
                longitude: 106.8217,
            },
            base_price: 50_000,
            currency: "IDR".to_string(),
            tags: vec![
                "cultural".to_string(),
                "indoor".to_string(),
                "educational".to_string(),
                "history".to_string(),
            ],
            capacity: 5_000,
        },
    ]
}
