//! Raw Overpass JSON element types.
//!
//! Elements are decoded one at a time so a single malformed element
//! (e.g. a non-numeric `lat`) is dropped instead of failing the whole
//! response.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::OverpassError;

/// `OpenStreetMap` tags of an element.
pub type Tags = BTreeMap<String, String>;

/// Center point Overpass emits for ways and relations with `out center`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ElementCenter {
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
}

/// A single element from an Overpass `[out:json]` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverpassElement {
    /// `node`, `way` or `relation`.
    #[serde(rename = "type")]
    pub element_type: String,
    /// Numeric `OpenStreetMap` id.
    pub id: i64,
    /// Element tags.
    #[serde(default)]
    pub tags: Tags,
    /// Direct latitude (nodes).
    pub lat: Option<f64>,
    /// Direct longitude (nodes).
    pub lon: Option<f64>,
    /// Computed center (ways and relations).
    pub center: Option<ElementCenter>,
}

/// Extracts the elements of an Overpass response body.
///
/// A body without an `elements` field yields no elements. Elements that
/// fail to decode are skipped.
///
/// # Errors
///
/// Returns [`OverpassError::Parse`] if the body is not an object or
/// `elements` is not an array.
pub fn parse_elements(body: &serde_json::Value) -> Result<Vec<OverpassElement>, OverpassError> {
    let object = body.as_object().ok_or_else(|| OverpassError::Parse {
        message: "Overpass response is not an object".to_string(),
    })?;

    let Some(elements) = object.get("elements") else {
        return Ok(Vec::new());
    };

    let elements = elements.as_array().ok_or_else(|| OverpassError::Parse {
        message: "Overpass `elements` is not an array".to_string(),
    })?;

    Ok(elements
        .iter()
        .filter_map(|raw| match OverpassElement::deserialize(raw) {
            Ok(element) => Some(element),
            Err(e) => {
                log::debug!("Skipping undecodable Overpass element: {e}");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_and_way_with_center() {
        let body = serde_json::json!({
            "version": 0.6,
            "elements": [
                {
                    "type": "node",
                    "id": 42,
                    "lat": 43.5,
                    "lon": -79.7,
                    "tags": { "amenity": "hospital" }
                },
                {
                    "type": "way",
                    "id": 7,
                    "center": { "lat": 43.46, "lon": -79.68 },
                    "tags": { "amenity": "social_facility", "social_facility": "shelter" }
                }
            ]
        });

        let elements = parse_elements(&body).unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].element_type, "node");
        assert_eq!(elements[0].tags["amenity"], "hospital");
        assert_eq!(elements[1].lat, None);
        assert_eq!(
            elements[1].center,
            Some(ElementCenter {
                lat: Some(43.46),
                lon: Some(-79.68)
            })
        );
    }

    #[test]
    fn missing_elements_is_empty() {
        let body = serde_json::json!({ "remark": "runtime error" });
        assert!(parse_elements(&body).unwrap().is_empty());
    }

    #[test]
    fn skips_undecodable_elements() {
        let body = serde_json::json!({
            "elements": [
                { "type": "node", "id": 1, "lat": "north", "lon": -79.7 },
                { "type": "node", "id": 2, "lat": 43.5, "lon": -79.7 }
            ]
        });
        let elements = parse_elements(&body).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].id, 2);
        assert!(elements[0].tags.is_empty());
    }

    #[test]
    fn rejects_non_array_elements() {
        let body = serde_json::json!({ "elements": "nope" });
        assert!(parse_elements(&body).is_err());
        assert!(parse_elements(&serde_json::json!([])).is_err());
    }
}
