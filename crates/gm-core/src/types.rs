use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation with structured content blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ConversationTurn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Concatenated text of all text blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content block, serialized in the Anthropic messages wire shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// A tool as advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Builds a descriptor whose schema is normalized to an object schema
    /// with `properties` and `required` arrays present.
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: normalize_object_schema(schema),
        }
    }
}

fn normalize_object_schema(schema: Value) -> Value {
    let mut obj = match schema {
        Value::Object(obj) => obj,
        _ => serde_json::Map::new(),
    };
    obj.insert("type".to_string(), Value::String("object".to_string()));
    if !obj.get("properties").is_some_and(Value::is_object) {
        obj.insert("properties".to_string(), json!({}));
    }
    if !obj.get("required").is_some_and(Value::is_array) {
        obj.insert("required".to_string(), json!([]));
    }
    Value::Object(obj)
}

/// A tool call emitted by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// Provider-assigned call id, when the provider sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolInvocationRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

/// Outcome of executing one `ToolInvocationRequest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    pub name: String,
    pub arguments: Value,
    pub outcome: ToolOutcome,
}

impl ToolInvocationResult {
    pub fn success(request: &ToolInvocationRequest, value: Value) -> Self {
        Self {
            name: request.name.clone(),
            arguments: request.arguments.clone(),
            outcome: ToolOutcome::Success(value),
        }
    }

    pub fn failure(request: &ToolInvocationRequest, message: impl Into<String>) -> Self {
        Self {
            name: request.name.clone(),
            arguments: request.arguments.clone(),
            outcome: ToolOutcome::Failure(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Failure(_))
    }

    /// The value shown to the model: the result, or `{"error": "<message>"}`
    pub fn result_value(&self) -> Value {
        match &self.outcome {
            ToolOutcome::Success(value) => value.clone(),
            ToolOutcome::Failure(message) => json!({ "error": message }),
        }
    }
}

/// What a single model call produced
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    Text(String),
    ToolCalls(Vec<ToolInvocationRequest>),
}

/// Sampling parameters sent with every model call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

/// Request to a `ModelClient`
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system: String,
    pub turns: Vec<ConversationTurn>,
    pub tools: Vec<ToolDescriptor>,
    pub sampling: SamplingParams,
}

impl ModelRequest {
    /// A system prompt plus one user turn
    pub fn single_turn(system: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            turns: vec![ConversationTurn::user_text(user_text)],
            tools: Vec::new(),
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Text of the most recent user turn
    pub fn last_user_text(&self) -> Option<String> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(ConversationTurn::text)
    }

    pub fn offers_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name == name)
    }
}
