use serde::{Deserialize, Serialize};

use super::de::opt_string_or_number;

/// What the training service reports after ingesting a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingReceipt {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawReceipt {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RawReceiptData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceiptData {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    document_id: Option<String>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    #[serde(default)]
    pages: Option<u64>,
    #[serde(default)]
    word_count: Option<u64>,
}

impl<'de> Deserialize<'de> for TrainingReceipt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawReceipt::deserialize(deserializer)?;
        let data = raw.data.unwrap_or_default();
        let metadata = data.metadata.unwrap_or_default();
        Ok(TrainingReceipt {
            // A 2xx without an explicit flag is still an accepted upload.
            success: raw.success.unwrap_or(true),
            message: raw.message,
            document_id: data.document_id,
            pages: metadata.pages,
            word_count: metadata.word_count,
        })
    }
}
