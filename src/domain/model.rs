use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// One lead search: a free-text query near a free-form location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub location: String,
    pub radius: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, location: impl Into<String>, radius: u32) -> Self {
        Self {
            query: query.into(),
            location: location.into(),
            radius,
        }
    }

    /// Cache key: trimmed, lower-cased text plus radius.
    pub fn normalized(&self) -> Self {
        Self {
            query: self.query.trim().to_lowercase(),
            location: self.location.trim().to_lowercase(),
            radius: self.radius,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSearchPage {
    pub place_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Raw Place Details `result` object for one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub place_id: String,
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Flattened, CSV-safe view of a place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    pub formatted_phone_number: String,
    pub website: String,
    pub url: String,
    pub types: String,
    pub business_status: String,
}

impl Lead {
    pub fn from_record(record: &PlaceRecord) -> Self {
        let types = record
            .data
            .get("types")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(value_to_string)
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .unwrap_or_default();

        Self {
            place_id: record.place_id.clone(),
            name: safe_get_str(&record.data, "name"),
            formatted_address: safe_get_str(&record.data, "formatted_address"),
            formatted_phone_number: safe_get_str(&record.data, "formatted_phone_number"),
            website: safe_get_str(&record.data, "website"),
            url: safe_get_str(&record.data, "url"),
            types,
            business_status: safe_get_str(&record.data, "business_status"),
        }
    }

    /// Field value by column name; unknown columns read as empty.
    pub fn field(&self, column: &str) -> &str {
        match column {
            "place_id" => &self.place_id,
            "name" => &self.name,
            "formatted_address" => &self.formatted_address,
            "formatted_phone_number" => &self.formatted_phone_number,
            "website" => &self.website,
            "url" => &self.url,
            "types" => &self.types,
            "business_status" => &self.business_status,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub leads: Vec<Lead>,
}

/// String value for `data[key]`, empty when missing or null.
pub fn safe_get_str(data: &serde_json::Map<String, serde_json::Value>, key: &str) -> String {
    data.get(key).map(value_to_string).unwrap_or_default()
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
