//! LUIS v3 prediction response, converted into [`RecognitionResult`].

use nlubot_core::{Intent, RecognitionResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct PredictionResponse {
    #[serde(default)]
    pub query: String,
    pub prediction: Prediction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Prediction {
    #[serde(default)]
    pub top_intent: Option<String>,
    #[serde(default)]
    pub intents: HashMap<String, IntentScore>,
    #[serde(default)]
    pub entities: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IntentScore {
    #[serde(default)]
    pub score: Option<f64>,
}

impl From<PredictionResponse> for RecognitionResult {
    fn from(response: PredictionResponse) -> Self {
        let Prediction {
            top_intent,
            intents,
            entities,
        } = response.prediction;

        let top_intent = top_intent.map(|name| {
            let confidence = intents
                .get(&name)
                .and_then(|s| s.score)
                .unwrap_or(0.0);
            Intent { name, confidence }
        });

        // `$instance` and friends are service metadata, not entity types.
        let entities = entities
            .into_iter()
            .filter(|(key, _)| !key.starts_with('$'))
            .map(|(key, value)| {
                let values = match value {
                    Value::Array(items) => items,
                    Value::Null => Vec::new(),
                    other => vec![other],
                };
                (key, values)
            })
            .collect();

        RecognitionResult {
            query: response.query,
            top_intent,
            entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prediction_to_recognition_result() {
        let response: PredictionResponse = serde_json::from_value(json!({
            "query": "set an alarm for 7",
            "prediction": {
                "topIntent": "SetAlarm",
                "intents": {"SetAlarm": {"score": 0.87}, "None": {"score": 0.02}},
                "entities": {
                    "number": [7],
                    "datetimeV2": [{"type": "time", "values": [{"timex": "T07"}]}],
                    "$instance": {"number": [{"startIndex": 17}]}
                }
            }
        }))
        .unwrap();

        let result = RecognitionResult::from(response);
        assert_eq!(result.query, "set an alarm for 7");
        let intent = result.top_intent.clone().unwrap();
        assert_eq!(intent.name, "SetAlarm");
        assert!((intent.confidence - 0.87).abs() < f64::EPSILON);
        assert_eq!(result.entity_values("number"), &[json!(7)]);
        assert_eq!(result.entity_values("datetimeV2").len(), 1);
        assert!(!result.entities.contains_key("$instance"));
    }

    #[test]
    fn test_prediction_without_intent_scores_or_entities() {
        let response: PredictionResponse = serde_json::from_value(json!({
            "query": "hm",
            "prediction": {"topIntent": "None"}
        }))
        .unwrap();

        let result = RecognitionResult::from(response);
        assert_eq!(result.top_intent.as_ref().unwrap().confidence, 0.0);
        assert!(result.recognized_intent(0.0).is_none());
        assert!(result.entities.is_empty());
    }
}
