// src/classify/validator.rs
use log::debug;

use super::types::WasteAnalysis;
use crate::error::ClassifyError;

/// Turn the model's raw reply into a [`WasteAnalysis`].
///
/// The text must be a JSON object carrying all six fields as strings, with `category`
/// spelled exactly as one of `GREEN`, `YELLOW`, `RED` or `GREY`. Nothing is trimmed,
/// case-folded or defaulted; any deviation is a parse failure. Extra fields are ignored.
pub fn parse_analysis(text: &str) -> Result<WasteAnalysis, ClassifyError> {
    if text.trim().is_empty() {
        return Err(ClassifyError::EmptyResponse);
    }

    let analysis: WasteAnalysis = serde_json::from_str(text).map_err(|e| {
        debug!("Rejected model reply ({} bytes): {}", text.len(), e);
        ClassifyError::Unparseable(e)
    })?;

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::types::{BinCategory, ANALYSIS_FIELDS};
    use serde_json::{json, Value};

    fn reply(category: &str) -> Value {
        json!({
            "category": category,
            "binNameEn": "Hazard",
            "binNameUr": "خطرناک",
            "explanationEn": "Batteries leak heavy metals.",
            "explanationUr": "بیٹریاں خطرناک ہیں۔",
            "identifiedItem": "AA battery"
        })
    }

    #[test]
    fn accepts_every_category_exactly() {
        for category in BinCategory::ALL {
            let text = reply(category.as_str()).to_string();
            let analysis = parse_analysis(&text).unwrap();
            assert_eq!(analysis.category, category);
            assert_eq!(analysis.identified_item, "AA battery");
        }
    }

    #[test]
    fn returns_fields_unchanged() {
        let mut value = reply("RED");
        value["binNameEn"] = json!("  Hazard  ");
        let analysis = parse_analysis(&value.to_string()).unwrap();
        assert_eq!(analysis.bin_name_en, "  Hazard  ");
        assert_eq!(analysis.bin_name_ur, "خطرناک");
    }

    #[test]
    fn rejects_each_missing_field() {
        for field in ANALYSIS_FIELDS {
            let mut value = reply("GREEN");
            value.as_object_mut().unwrap().remove(field);
            let err = parse_analysis(&value.to_string()).unwrap_err();
            assert!(err.is_validation(), "{field}: {err}");
        }
    }

    #[test]
    fn rejects_several_missing_fields() {
        let err = parse_analysis(r#"{"category":"GREEN","identifiedItem":"can"}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Unparseable(_)));
    }

    #[test]
    fn rejects_unknown_categories_without_coercion() {
        for category in ["BLUE", "green", " GREEN", "GREY ", "Grey", "GRAY", ""] {
            let err = parse_analysis(&reply(category).to_string()).unwrap_err();
            assert!(matches!(err, ClassifyError::Unparseable(_)), "{category:?} was accepted");
        }
    }

    #[test]
    fn rejects_wrong_field_types() {
        let mut value = reply("GREEN");
        value["explanationEn"] = json!(42);
        assert!(parse_analysis(&value.to_string()).is_err());

        let mut value = reply("GREEN");
        value["binNameUr"] = Value::Null;
        assert!(parse_analysis(&value.to_string()).is_err());
    }

    #[test]
    fn rejects_text_that_is_not_json() {
        for text in ["Sure! This is a battery.", "{\"category\": \"RED\", \"binNa", "[]", "null"] {
            let err = parse_analysis(text).unwrap_err();
            assert!(err.is_validation(), "{text:?}");
        }
    }

    #[test]
    fn empty_reply_is_a_validation_failure() {
        let err = parse_analysis("  \n").unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyResponse));
        assert!(err.is_validation());
    }

    #[test]
    fn ignores_extra_fields() {
        let mut value = reply("YELLOW");
        value["confidence"] = json!(0.93);
        let analysis = parse_analysis(&value.to_string()).unwrap();
        assert_eq!(analysis.category, BinCategory::Yellow);
    }
}
