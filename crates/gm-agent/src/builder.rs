use crate::game_master::GameMaster;
use gm_core::{Error, GmConfig, ModelClient, Result, SamplingParams};
use gm_tool::ToolRegistry;
use std::sync::Arc;

pub struct GameMasterBuilder {
    model: Option<Arc<dyn ModelClient>>,
    tools: Option<Arc<ToolRegistry>>,
    system_prompt: Option<String>,
    sampling: SamplingParams,
}

impl GameMasterBuilder {
    pub fn new() -> Self {
        Self {
            model: None,
            tools: None,
            system_prompt: None,
            sampling: SamplingParams::default(),
        }
    }

    /// Takes the system prompt and sampling parameters from configuration
    pub fn config(mut self, config: &GmConfig) -> Self {
        self.system_prompt = Some(config.model.system_prompt.clone());
        self.sampling = config.model.sampling();
        self
    }

    pub fn model(mut self, model: Arc<dyn ModelClient>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn build(self) -> Result<GameMaster> {
        let model = self
            .model
            .ok_or_else(|| Error::config_error("A model client is required"))?;
        let system_prompt = self
            .system_prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::config_error("A system prompt is required"))?;

        Ok(GameMaster {
            model,
            tools: self.tools.unwrap_or_default(),
            system_prompt,
            sampling: self.sampling,
        })
    }
}

impl Default for GameMasterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[test]
    fn test_builder_requires_model() {
        let result = GameMasterBuilder::new().system_prompt("You are the GM.").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_prompt() {
        let result = GameMasterBuilder::new()
            .model(Arc::new(ScriptedModel::new()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_reads_config() {
        let mut config = GmConfig::test_defaults();
        config.model.temperature = 0.2;
        config.model.system_prompt = "Be terse.".to_string();

        let gm = GameMasterBuilder::new()
            .config(&config)
            .model(Arc::new(ScriptedModel::new()))
            .build()
            .unwrap();

        assert_eq!(gm.system_prompt(), "Be terse.");
        assert!(gm.tools().is_empty());
    }
}
