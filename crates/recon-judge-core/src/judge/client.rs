use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{JudgeError, JudgeResult};
use crate::providers::llm::LlmClient;

/// Parsed model output plus accounting for the call that produced it.
#[derive(Debug, Clone)]
pub struct Judgment<T> {
    pub data: T,
    pub model: String,
    pub total_tokens: u64,
    pub cost_usd: f64,
}

/// Shape the system prompt asks the model to produce.
#[derive(Debug, Clone, Deserialize)]
pub struct RawJudgeOutput {
    pub evaluations: Vec<RawEvaluation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvaluation {
    pub claim_id: String,
    /// Unclamped; may be fractional or out of range.
    pub score: f64,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
}

/// Call the model once and parse its text into `T`.
pub async fn invoke_structured<T: DeserializeOwned>(
    client: &dyn LlmClient,
    system: &str,
    prompt: &str,
) -> JudgeResult<Judgment<T>> {
    let resp = client.complete(system, prompt).await?;
    let data = parse_json_payload(&resp.text)?;
    Ok(Judgment {
        data,
        model: resp.model,
        total_tokens: resp.total_tokens,
        cost_usd: resp.cost_usd,
    })
}

/// Parse the first JSON value in `text`, skipping any prose or code fence before it.
pub(crate) fn parse_json_payload<T: DeserializeOwned>(text: &str) -> JudgeResult<T> {
    let text = text.trim();
    let start = text
        .find(|c: char| c == '{' || c == '[')
        .ok_or_else(|| JudgeError::malformed("no JSON object found in judge output"))?;

    let value: serde_json::Value = serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or_else(|| JudgeError::malformed("no JSON object found in judge output"))?
        .map_err(|e| JudgeError::malformed(format!("invalid JSON: {}", e)))?;

    serde_json::from_value(value)
        .map_err(|e| JudgeError::malformed(format!("unexpected judge output shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::llm::fake::FakeClient;

    #[test]
    fn parses_fenced_payload() {
        let text = "```json\n{\"evaluations\": [{\"claim_id\": \"c1\", \"score\": 7}]}\n```";
        let out: RawJudgeOutput = parse_json_payload(text).unwrap();
        assert_eq!(out.evaluations.len(), 1);
        assert_eq!(out.evaluations[0].score, 7.0);
        assert!(out.evaluations[0].evidence_refs.is_empty());
    }

    #[test]
    fn rejects_wrong_shape() {
        let err = parse_json_payload::<RawJudgeOutput>("{\"scores\": []}").unwrap_err();
        assert!(matches!(err, JudgeError::MalformedOutput { .. }));
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_json_payload::<RawJudgeOutput>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, JudgeError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn invoke_structured_carries_accounting() {
        let client = FakeClient::new("fake-model")
            .with_response(r#"{"evaluations": []}"#)
            .with_usage(1234, 0.0042);
        let judgment: Judgment<RawJudgeOutput> =
            invoke_structured(&client, "sys", "prompt").await.unwrap();
        assert!(judgment.data.evaluations.is_empty());
        assert_eq!(judgment.total_tokens, 1234);
        assert_eq!(judgment.model, "fake-model");
        assert!((judgment.cost_usd - 0.0042).abs() < 1e-12);
    }
}
