use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub destination: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, with = "budget")]
    pub budget_total: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub creator_id: i64,
}

impl Trip {
    /// A trip is archived once its end date lies strictly before `today`.
    pub fn is_archived(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TripCreate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "budget")]
    pub budget_total: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TripUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "budget")]
    pub budget_total: Option<f64>,
}

/// Budgets arrive either as JSON numbers or as decimal strings.
mod budget {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(v)) => Ok(Some(v)),
            Some(Raw::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| de::Error::custom(format!("invalid budget {s:?}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trip(endDate: Option<&str>) -> Trip {
        serde_json::from_value(json!({
            "id": 1,
            "title": "Alps",
            "destination": "Chamonix",
            "end_date": endDate,
            "budget_total": "1250.50",
            "created_at": "2024-05-01T10:00:00Z",
            "creator_id": 7
        }))
        .unwrap()
    }

    #[test]
    fn budget_accepts_decimal_strings() {
        assert_eq!(trip(None).budget_total, Some(1250.5));

        let fromNumber: TripUpdate = serde_json::from_value(json!({ "budget_total": 300 })).unwrap();
        assert_eq!(fromNumber.budget_total, Some(300.0));
    }

    #[test]
    fn archived_only_after_end_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert!(trip(Some("2024-06-09")).is_archived(today));
        assert!(!trip(Some("2024-06-10")).is_archived(today));
        assert!(!trip(None).is_archived(today));
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = TripUpdate {
            title: Some("Dolomites".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "title": "Dolomites" }));
    }
}
