use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Numeric question identifier. Ids also fix the traversal order.
pub type QuestionId = u32;

/// Supported input styles, each carrying the data it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one option; choosing it moves the wizard forward.
    Single { options: Vec<String> },
    /// Any number of options.
    Multi { options: Vec<String> },
    /// At most `limit` options.
    MultiLimited { limit: usize, options: Vec<String> },
    /// Free-form text.
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
}

impl QuestionKind {
    pub fn options(&self) -> &[String] {
        match self {
            QuestionKind::Single { options }
            | QuestionKind::Multi { options }
            | QuestionKind::MultiLimited { options, .. } => options,
            QuestionKind::Text { .. } => &[],
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self {
            QuestionKind::Text { placeholder } => placeholder.as_deref(),
            _ => None,
        }
    }

    /// Selection cap for limited multi-choice questions.
    pub fn limit(&self) -> Option<usize> {
        match self {
            QuestionKind::MultiLimited { limit, .. } => Some(*limit),
            _ => None,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            QuestionKind::Multi { .. } | QuestionKind::MultiLimited { .. }
        )
    }

    /// Wire label, identical to the serialized `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Single { .. } => "single",
            QuestionKind::Multi { .. } => "multi",
            QuestionKind::MultiLimited { .. } => "multi_limited",
            QuestionKind::Text { .. } => "text",
        }
    }
}

/// Definition of a single survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: QuestionId,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl QuestionSpec {
    pub fn offers(&self, option: &str) -> bool {
        self.kind.options().iter().any(|candidate| candidate == option)
    }

    /// Option label by 1-based position, as shown to respondents.
    pub fn option_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|index| self.kind.options().get(index))
            .map(String::as_str)
    }
}
