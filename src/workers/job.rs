use serde::{Deserialize, Serialize};

/// The single task kind currently published by the upload endpoint.
pub const TASK_GENERATE_BLOG_POST: &str = "generate_blog_post";

/// Substituted when a message body decodes but carries no `file_key`.
pub const UNKNOWN_FILE_KEY: &str = "unknown";

fn default_file_key() -> String {
    UNKNOWN_FILE_KEY.to_string()
}

/// One unit of deferred work. Serialized as `{"file_key": ..., "task": ...}`
/// and published to the job queue, one message per uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    #[serde(default = "default_file_key")]
    pub file_key: String,
    #[serde(default)]
    pub task: String,
}

impl JobMessage {
    pub fn new(file_key: impl Into<String>) -> Self {
        Self {
            file_key: file_key.into(),
            task: TASK_GENERATE_BLOG_POST.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_fields() {
        let job = JobMessage::new("report.pdf");
        let json = job.to_json().unwrap();
        let parsed = JobMessage::from_json(&json).unwrap();
        assert_eq!(parsed, job);
        assert_eq!(parsed.file_key, "report.pdf");
        assert_eq!(parsed.task, TASK_GENERATE_BLOG_POST);
    }

    #[test]
    fn wire_format_uses_expected_field_names() {
        let job = JobMessage::new("notes.txt");
        let value: serde_json::Value = serde_json::from_str(&job.to_json().unwrap()).unwrap();
        assert_eq!(value["file_key"], "notes.txt");
        assert_eq!(value["task"], "generate_blog_post");
    }

    #[test]
    fn missing_file_key_falls_back_to_sentinel() {
        let parsed = JobMessage::from_json(r#"{"task": "generate_blog_post"}"#).unwrap();
        assert_eq!(parsed.file_key, UNKNOWN_FILE_KEY);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(JobMessage::from_json("not json").is_err());
    }
}
