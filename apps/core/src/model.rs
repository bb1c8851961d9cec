//! Wire model for the `/recommend` endpoint.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ViewError;

/// Body of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendRequest {
    pub song_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_range: Option<[i32; 2]>,
}

impl RecommendRequest {
    pub fn new(song_name: impl Into<String>) -> Self {
        Self {
            song_name: song_name.into(),
            limit: None,
            year_range: None,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_year_range(mut self, start: i32, end: i32) -> Self {
        self.year_range = Some([start, end]);
        self
    }
}

/// Error document the backend sends with 4xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Response of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub input_song: FeatureVector,
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationResponse {
    pub fn from_json(body: &[u8]) -> Result<Self, ViewError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn top_match(&self) -> Option<&Recommendation> {
        self.recommendations.first()
    }
}

/// Named audio features in the order the backend sent them.
///
/// Key order is significant: it becomes the axis order of the radar chart.
/// Inserting an existing name overwrites the value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut features = Self::new();
        for (name, value) in iter {
            features.insert(name, value);
        }
        features
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FeatureVisitor;

        impl<'de> Visitor<'de> for FeatureVisitor {
            type Value = FeatureVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of feature names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut features = FeatureVector::new();
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    features.insert(name, value);
                }
                Ok(features)
            }
        }

        deserializer.deserialize_map(FeatureVisitor)
    }
}

/// One recommended track.
///
/// The backend mixes audio features with descriptive fields in the same
/// record, so every field is kept and read on demand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recommendation {
    fields: Map<String, Value>,
}

impl Recommendation {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn feature(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }

    pub fn track_name(&self) -> Option<&str> {
        self.text("track_name").or_else(|| self.text("name"))
    }

    /// Artist credit; the catalogue stores either a string or a list of names.
    pub fn artists(&self) -> Option<String> {
        match self.fields.get("artists").or_else(|| self.fields.get("artist"))? {
            Value::String(artists) => Some(artists.clone()),
            Value::Array(names) => {
                let names = names
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>();
                (!names.is_empty()).then(|| names.join(", "))
            }
            _ => None,
        }
    }

    pub fn album(&self) -> Option<&str> {
        self.text("album")
    }

    pub fn year(&self) -> Option<i64> {
        let year = self.fields.get("year")?;
        #[allow(clippy::cast_possible_truncation)]
        year.as_i64().or_else(|| year.as_f64().map(|year| year as i64))
    }

    pub fn match_score(&self) -> Option<f64> {
        self.feature("match_score")
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Recommendation {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_unset_options() -> Result<(), serde_json::Error> {
        let body = serde_json::to_string(&RecommendRequest::new("Blinding Lights"))?;
        assert_eq!(body, r#"{"song_name":"Blinding Lights"}"#);

        let body = serde_json::to_string(
            &RecommendRequest::new("Blinding Lights")
                .with_limit(5)
                .with_year_range(1990, 2005),
        )?;
        assert_eq!(
            body,
            r#"{"song_name":"Blinding Lights","limit":5,"year_range":[1990,2005]}"#
        );
        Ok(())
    }

    #[test]
    fn feature_vector_keeps_wire_order() -> Result<(), serde_json::Error> {
        let features: FeatureVector =
            serde_json::from_str(r#"{"valence":0.1,"energy":0.9,"acousticness":0.4}"#)?;

        assert_eq!(
            features.names().collect::<Vec<_>>(),
            ["valence", "energy", "acousticness"]
        );
        assert_eq!(features.values().collect::<Vec<_>>(), [0.1, 0.9, 0.4]);
        assert_eq!(
            serde_json::to_string(&features)?,
            r#"{"valence":0.1,"energy":0.9,"acousticness":0.4}"#
        );
        Ok(())
    }

    #[test]
    fn duplicate_feature_keeps_first_position_and_last_value() -> Result<(), serde_json::Error> {
        let features: FeatureVector =
            serde_json::from_str(r#"{"tempo":0.2,"energy":0.5,"tempo":0.7}"#)?;

        assert_eq!(features.names().collect::<Vec<_>>(), ["tempo", "energy"]);
        assert_eq!(features.get("tempo"), Some(0.7));
        Ok(())
    }

    #[test]
    fn non_numeric_feature_is_rejected() {
        let parsed = serde_json::from_str::<FeatureVector>(r#"{"tempo":"fast"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn recommendation_exposes_descriptive_fields() -> Result<(), serde_json::Error> {
        let track: Recommendation = serde_json::from_str(
            r#"{
                "track_name": "Midnight City",
                "artists": ["M83"],
                "album": "Hurry Up, We're Dreaming",
                "year": 2011.0,
                "energy": 0.71,
                "match_score": 93
            }"#,
        )?;

        assert_eq!(track.track_name(), Some("Midnight City"));
        assert_eq!(track.artists().as_deref(), Some("M83"));
        assert_eq!(track.album(), Some("Hurry Up, We're Dreaming"));
        assert_eq!(track.year(), Some(2011));
        assert_eq!(track.feature("energy"), Some(0.71));
        assert_eq!(track.match_score(), Some(93.0));
        assert_eq!(track.feature("album"), None);
        Ok(())
    }

    #[test]
    fn response_requires_recommendations_field() {
        let parsed = RecommendationResponse::from_json(br#"{"input_song":{"tempo":0.8}}"#);
        assert!(matches!(parsed, Err(ViewError::Malformed(_))));
    }
}
