use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModelId(pub String);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        ModelId(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub display_name: String,
    pub description: String,
}

/// Models selectable in the top-bar dropdown. The simulated provider accepts
/// any of these; routing to a real gateway comes later.
pub fn builtin_models() -> Vec<Model> {
    vec![
        Model {
            id: ModelId("deepseek-r1".into()),
            display_name: "DeepSeek R1".into(),
            description: "Reasoning".into(),
        },
        Model {
            id: ModelId("deepseek-v3".into()),
            display_name: "DeepSeek V3".into(),
            description: "Code Generation".into(),
        },
        Model {
            id: ModelId("gemini-2.5-flash".into()),
            display_name: "Gemini 2.5 Flash".into(),
            description: "Planning".into(),
        },
        Model {
            id: ModelId("mistral-devstral".into()),
            display_name: "Mistral Devstral Small".into(),
            description: "Lightweight".into(),
        },
    ]
}

pub fn default_model() -> Model {
    Model {
        id: ModelId("deepseek-v3".into()),
        display_name: "DeepSeek V3".into(),
        description: "Code Generation".into(),
    }
}

/// Look a model up by id or display name, case-insensitive.
pub fn find_model(name: &str) -> Option<Model> {
    let needle = name.trim().to_lowercase();
    builtin_models()
        .into_iter()
        .find(|m| m.id.0.to_lowercase() == needle || m.display_name.to_lowercase() == needle)
}
