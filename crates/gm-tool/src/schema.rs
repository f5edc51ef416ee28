use serde_json::{Map, Value};

/// Tool schema builder for manual schema creation
#[derive(Debug, Clone, Default)]
pub struct ToolSchema {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        type_: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut prop = Map::new();
        prop.insert("type".to_string(), Value::String(type_.into()));
        prop.insert("description".to_string(), Value::String(description.into()));

        self.properties.insert(name.into(), Value::Object(prop));
        self
    }

    /// A string property restricted to `values`
    pub fn enum_property<I, S>(
        mut self,
        name: impl Into<String>,
        values: I,
        description: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut prop = Map::new();
        prop.insert("type".to_string(), Value::String("string".to_string()));
        prop.insert("description".to_string(), Value::String(description.into()));
        prop.insert(
            "enum".to_string(),
            Value::Array(values.into_iter().map(|v| Value::String(v.into())).collect()),
        );

        self.properties.insert(name.into(), Value::Object(prop));
        self
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    pub fn build(self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(self.properties));
        schema.insert(
            "required".to_string(),
            Value::Array(self.required.into_iter().map(Value::String).collect()),
        );

        Value::Object(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_schema_builder() {
        let schema = ToolSchema::new()
            .property("notation", "string", "Dice notation such as 2d6+1")
            .required("notation")
            .build();

        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].is_object());
        assert_eq!(
            schema["required"],
            Value::Array(vec![Value::String("notation".to_string())])
        );
    }

    #[test]
    fn test_enum_property() {
        let schema = ToolSchema::new()
            .enum_property("dice_type", ["d4", "d6"], "Die size")
            .build();

        assert_eq!(schema["properties"]["dice_type"]["enum"][1], "d6");
        assert_eq!(schema["required"], Value::Array(vec![]));
    }
}
