//! Book-wide sentiment analysis over cached chunks.
//!
//! The generative collaborator is asked for a fixed-shape JSON payload.
//! Output that fails to parse is replaced by a fixed placeholder report
//! carrying the raw text, so callers always get a well-formed result.

use log::warn;
use serde::{Deserialize, Serialize};

/// Temperature used for the sentiment call.
pub const SENTIMENT_TEMPERATURE: f32 = 0.3;

/// Sentiment breakdown. The three scores sum to 1.0 and `compound` is in
/// [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub overall: String,
    pub compound: f64,
}

/// One word-frequency entry for the word cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub text: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordcloudData {
    pub words: Vec<WordEntry>,
}

/// Structured sentiment result.
///
/// `raw_response` is only present on the fallback path, carrying the
/// unparsed model output for diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub sentiment: SentimentScores,
    pub wordcloud_data: WordcloudData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Build the fixed-shape analysis prompt for a sample of book text.
pub fn build_prompt(sample_text: &str) -> String {
    format!(
        r#"Analyze the following text and provide a detailed sentiment analysis.

Text to analyze:
{sample_text}

Provide your analysis in JSON format:
{{
    "sentiment": {{
        "positive": 0.0 to 1.0,
        "negative": 0.0 to 1.0,
        "neutral": 0.0 to 1.0,
        "overall": "positive/negative/neutral",
        "compound": -1.0 to 1.0
    }},
    "wordcloud_data": {{
        "words": [
            {{ "text": "word1", "value": frequency_count }},
            {{ "text": "word2", "value": frequency_count }}
        ]
    }}
}}

Make sure the positive, negative, and neutral scores add up to 1.0. The wordcloud_data.words list should contain at least 50 of the most significant words from the text with their frequency counts. Respond with the JSON object only."#
    )
}

/// Parse the model's raw output into a report.
///
/// Output that is not the expected JSON shape is replaced by
/// [`fallback_report`], never surfaced as an error.
pub fn parse_response(raw: &str) -> SentimentReport {
    match serde_json::from_str::<SentimentReport>(raw) {
        Ok(report) => report,
        Err(err) => {
            warn!("sentiment response was not parseable JSON ({}), using fallback", err);
            fallback_report(raw)
        }
    }
}

/// The fixed degrade-gracefully payload for unparseable output.
pub fn fallback_report(raw: &str) -> SentimentReport {
    SentimentReport {
        sentiment: SentimentScores {
            positive: 0.5,
            negative: 0.1,
            neutral: 0.4,
            overall: "positive".to_string(),
            compound: 0.4,
        },
        wordcloud_data: WordcloudData {
            words: vec![
                WordEntry {
                    text: "Error".to_string(),
                    value: 100,
                },
                WordEntry {
                    text: "Parsing".to_string(),
                    value: 80,
                },
                WordEntry {
                    text: "JSON".to_string(),
                    value: 60,
                },
            ],
        },
        raw_response: Some(raw.to_string()),
    }
}
