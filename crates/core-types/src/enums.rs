use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer gender as recorded in the customer table.
///
/// Deserialization is lenient: `"M"`, `"male"` and `"Male"` all map to `Male`,
/// anything unrecognised becomes `Unknown` instead of failing the whole load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Gender::Male,
            "f" | "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Gender::from(value.as_str())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Customer marital status. Same lenient parsing rules as [`Gender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
    Unknown,
}

impl From<&str> for MaritalStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "s" | "single" => MaritalStatus::Single,
            "m" | "married" => MaritalStatus::Married,
            "d" | "divorced" => MaritalStatus::Divorced,
            "w" | "widowed" => MaritalStatus::Widowed,
            _ => MaritalStatus::Unknown,
        }
    }
}

impl From<String> for MaritalStatus {
    fn from(value: String) -> Self {
        MaritalStatus::from(value.as_str())
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MaritalStatus::Single => "Single",
            MaritalStatus::Married => "Married",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Widowed => "Widowed",
            MaritalStatus::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_gender_parsing() {
        assert_eq!(Gender::from("M"), Gender::Male);
        assert_eq!(Gender::from(" female "), Gender::Female);
        assert_eq!(Gender::from("n/a"), Gender::Unknown);
    }

    #[test]
    fn test_marital_status_round_trips_through_json() {
        let status: MaritalStatus = serde_json::from_str("\"married\"").unwrap();
        assert_eq!(status, MaritalStatus::Married);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Married\"");
    }
}
