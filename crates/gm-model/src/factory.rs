//! Model selection from configuration

use crate::{BedrockModel, OfflineModel};
use gm_core::{ModelClient, ModelConfig, Result};
use std::sync::Arc;

/// Creates the model client the configuration asks for.
///
/// Degraded mode is only used when `degraded_mode` is set; a missing
/// credential is an error, never a silent fallback.
///
/// # Example
/// ```
/// use gm_core::ModelConfig;
/// use gm_model::create_model;
///
/// let config = ModelConfig { degraded_mode: true, ..ModelConfig::default() };
/// let model = create_model(&config).unwrap();
/// assert!(model.is_degraded());
/// ```
pub fn create_model(config: &ModelConfig) -> Result<Arc<dyn ModelClient>> {
    if config.degraded_mode {
        tracing::warn!("Degraded mode enabled; replies are canned and labelled");
        return Ok(Arc::new(OfflineModel::new()));
    }

    let model = BedrockModel::connect(config)?;
    tracing::info!(
        model = %config.model_id,
        endpoint = %model.settings().endpoint,
        "Connected Bedrock model"
    );
    Ok(Arc::new(model))
}
