//! Product record returned by the results endpoint

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x300.png";

/// Product identifier; the backend may send either a string or any number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A product search result.
///
/// Every field is optional. A missing field, or one whose value has an
/// unexpected type, decodes to `None` so that one odd record never fails
/// the whole result list. Gaps are rendered through the `display_*` helpers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<ProductId>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ratings: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub no_ratings: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub discount_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub actual_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub keywords: Option<Vec<String>>,
}

impl Product {
    pub fn display_name(&self) -> &str {
        non_empty(&self.name).unwrap_or("No Title")
    }

    pub fn display_category(&self) -> &str {
        non_empty(&self.category).unwrap_or("Uncategorized")
    }

    /// Discounted price as shown on the card, `N/A` when unknown
    pub fn price_label(&self) -> String {
        match self.discount_price {
            Some(price) if price != 0.0 => format!("${:.2}", price),
            _ => "N/A".to_string(),
        }
    }

    /// Original price, only when the backend sent one
    pub fn original_price_label(&self) -> Option<String> {
        self.actual_price
            .filter(|price| *price != 0.0)
            .map(|price| format!("${:.2}", price))
    }

    /// Image to show; non-http references fall back to a labelled placeholder
    pub fn image_url(&self) -> String {
        match self.image.as_deref() {
            Some(image) if image.starts_with("http") => image.to_string(),
            _ => {
                let label = non_empty(&self.name).unwrap_or("No Image");
                let encoded: String = url::form_urlencoded::byte_serialize(label.as_bytes())
                    .collect::<String>()
                    .replace('+', "%20");
                format!("{}?text={}", PLACEHOLDER_IMAGE, encoded)
            }
        }
    }

    /// Rating summary such as `4.8 (1200)`, or `N/A`
    pub fn rating_label(&self) -> String {
        match (self.ratings, self.no_ratings) {
            (Some(r), Some(n)) => format!("{:.1} ({})", r, n),
            (Some(r), None) => format!("{:.1}", r),
            _ => "N/A".to_string(),
        }
    }
}

/// Decode a field, turning a type mismatch into `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
