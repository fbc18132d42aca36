use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

/// One physician returned by the directory search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResult {
    #[serde(deserialize_with = "npi_from_text_or_number")]
    pub npi: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(rename = "practice_address", default)]
    pub address: Address,
}

impl SuggestionResult {
    /// Text written into the input when this result is committed
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "City, ST 12345" with the zip cut to five digits
    pub fn address_line(&self) -> String {
        let zip: String = self.address.zip.chars().take(5).collect();
        format!("{}, {} {}", self.address.city, self.address.state, zip)
    }

    pub fn same_identity(&self, other: &SuggestionResult) -> bool {
        self.npi == other.npi
    }
}

/// Search endpoint response envelope
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub result: Vec<SuggestionResult>,
}

fn npi_from_text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Npi {
        Text(String),
        Number(u64),
    }

    Ok(match Npi::deserialize(deserializer)? {
        Npi::Text(s) => s,
        Npi::Number(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<SuggestionResult>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SuggestionResult>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_numeric_and_text_npi() {
        let body = r#"{
            "meta": {"rowCount": 2},
            "result": [
                {"npi": 1234567890, "first_name": "JOHN", "last_name": "SMITH",
                 "practice_address": {"city": "BOSTON", "state": "MA", "zip": "021154321", "address_line": "1 MAIN ST"}},
                {"npi": "1987654321", "first_name": "JANE", "last_name": "SMYTHE",
                 "practice_address": {"city": "AUSTIN", "state": "TX", "zip": "78701"}}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.result.len(), 2);
        assert_eq!(response.result[0].npi, "1234567890");
        assert_eq!(response.result[1].npi, "1987654321");
        assert_eq!(response.result[0].address.city, "BOSTON");
    }

    #[test]
    fn test_missing_or_null_result_is_empty() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.result.is_empty());
        let response: SearchResponse = serde_json::from_str(r#"{"result": null}"#).unwrap();
        assert!(response.result.is_empty());
    }

    #[test]
    fn test_display_fields() {
        let result = SuggestionResult {
            npi: "1".to_string(),
            first_name: "JOHN".to_string(),
            last_name: "SMITH".to_string(),
            address: Address {
                city: "BOSTON".to_string(),
                state: "MA".to_string(),
                zip: "021154321".to_string(),
            },
        };
        assert_eq!(result.display_name(), "JOHN SMITH");
        assert_eq!(result.address_line(), "BOSTON, MA 02115");

        let short = SuggestionResult {
            address: Address {
                zip: "021".to_string(),
                ..result.address.clone()
            },
            ..result
        };
        assert_eq!(short.address_line(), "BOSTON, MA 021");
    }
}
