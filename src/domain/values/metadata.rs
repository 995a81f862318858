/// Free-form item metadata, stored alongside each vector.
pub type Metadata = serde_json::Map<String, serde_json::Value>;
