use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::models::FoodAnalysis;

pub const SYSTEM_PROMPT: &str = "You are a nutrition expert that analyzes food images. \
Provide the name of the food, estimated calories, protein content in grams, carbs in grams, \
and fats in grams. Return ONLY a JSON object with fields: name, calories (number), \
protein (number), carbs (number), fats (number).";

pub const USER_PROMPT: &str =
    "What food is in this image? Estimate calories, protein, carbs, and fats content.";

/// Estimates nutrition from a food photo.
///
/// The CLI implements this over HTTP. Errors mean the request itself failed
/// and should be surfaced as retryable; a reply that cannot be read yields
/// [`fallback_estimate`] instead.
pub trait FoodImageAnalyzer: Send + Sync {
    fn analyze(&self, image_base64: &str) -> Result<FoodAnalysis>;
}

/// Returns [`sample_estimate`] without any network access.
pub struct OfflineAnalyzer;

impl FoodImageAnalyzer for OfflineAnalyzer {
    fn analyze(&self, _image_base64: &str) -> Result<FoodAnalysis> {
        Ok(sample_estimate())
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub completion: String,
}

#[must_use]
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Chat-style request body carrying the fixed prompts and the image.
#[must_use]
pub fn build_request(image_base64: &str) -> Value {
    json!({
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": USER_PROMPT },
                    { "type": "image", "image": image_base64 }
                ]
            }
        ]
    })
}

#[must_use]
pub fn fallback_estimate() -> FoodAnalysis {
    FoodAnalysis {
        name: "Unknown Food".to_string(),
        calories: 200.0,
        protein: 5.0,
        carbs: Some(20.0),
        fats: Some(8.0),
    }
}

#[must_use]
pub fn sample_estimate() -> FoodAnalysis {
    FoodAnalysis {
        name: "Sample Food Item".to_string(),
        calories: 350.0,
        protein: 15.0,
        carbs: Some(30.0),
        fats: Some(12.0),
    }
}

/// Read the model's completion text as a nutrition estimate.
///
/// Missing or non-numeric values count as zero and a missing name becomes
/// "Unknown Food". Anything that is not a JSON object yields the fallback estimate.
#[must_use]
pub fn parse_completion(completion: &str) -> FoodAnalysis {
    let body = strip_code_fence(completion);
    let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) else {
        tracing::warn!(completion, "could not parse analysis response; using fallback estimate");
        return fallback_estimate();
    };

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown Food")
        .to_string();

    FoodAnalysis {
        name,
        calories: number_or_zero(obj.get("calories")),
        protein: number_or_zero(obj.get("protein")),
        carbs: Some(number_or_zero(obj.get("carbs"))),
        fats: Some(number_or_zero(obj.get("fats"))),
    }
}

fn number_or_zero(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn strip_code_fence(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_complete() {
        let a = parse_completion(
            r#"{"name": "Chicken Salad", "calories": 420, "protein": 35.5, "carbs": 12, "fats": 22}"#,
        );
        assert_eq!(a.name, "Chicken Salad");
        assert_eq!(a.calories, 420.0);
        assert_eq!(a.protein, 35.5);
        assert_eq!(a.carbs, Some(12.0));
        assert_eq!(a.fats, Some(22.0));
    }

    #[test]
    fn test_parse_completion_missing_fields() {
        let a = parse_completion(r#"{"calories": "310"}"#);
        assert_eq!(a.name, "Unknown Food");
        assert_eq!(a.calories, 310.0);
        assert_eq!(a.protein, 0.0);
        assert_eq!(a.carbs, Some(0.0));
        assert_eq!(a.fats, Some(0.0));
    }

    #[test]
    fn test_parse_completion_non_numeric_values_are_zero() {
        let a = parse_completion(r#"{"name": "Soup", "calories": "lots", "protein": null}"#);
        assert_eq!(a.name, "Soup");
        assert_eq!(a.calories, 0.0);
        assert_eq!(a.protein, 0.0);
    }

    #[test]
    fn test_parse_completion_garbage_uses_fallback() {
        assert_eq!(parse_completion("I think this is a burger."), fallback_estimate());
        assert_eq!(parse_completion("[1, 2, 3]"), fallback_estimate());
        assert_eq!(parse_completion(""), fallback_estimate());
    }

    #[test]
    fn test_parse_completion_tolerates_code_fence() {
        let a = parse_completion("```json\n{\"name\": \"Toast\", \"calories\": 90, \"protein\": 3}\n```");
        assert_eq!(a.name, "Toast");
        assert_eq!(a.calories, 90.0);
    }

    #[test]
    fn test_build_request_shape() {
        let req = build_request("aGVsbG8=");
        let messages = req["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], SYSTEM_PROMPT);
        assert_eq!(messages[1]["content"][0]["text"], USER_PROMPT);
        assert_eq!(messages[1]["content"][1]["type"], "image");
        assert_eq!(messages[1]["content"][1]["image"], "aGVsbG8=");
    }

    #[test]
    fn test_encode_image() {
        assert_eq!(encode_image(b"hello"), "aGVsbG8=");
    }

    #[test]
    fn test_completion_response_deserialize() {
        let resp: CompletionResponse =
            serde_json::from_str(r#"{"completion": "{\"name\": \"Egg\"}"}"#).unwrap();
        assert_eq!(parse_completion(&resp.completion).name, "Egg");
    }

    #[test]
    fn test_offline_analyzer() {
        let a = OfflineAnalyzer.analyze("ignored").unwrap();
        assert_eq!(a, sample_estimate());
    }
}
