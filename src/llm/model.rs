use crate::error::{OcmError, Result};
use crate::llm::ModelService;

/// Pick the model to generate with
///
/// A configured, non-blank name is returned verbatim without contacting the
/// server. Otherwise the first model `/api/tags` reports is used.
pub async fn resolve_model(configured: Option<&str>, service: &dyn ModelService) -> Result<String> {
    if let Some(name) = configured
        && !name.trim().is_empty()
    {
        tracing::debug!("Using configured model '{}'", name);
        return Ok(name.to_string());
    }

    let models = service.list_models().await?;
    let first = models.into_iter().next().ok_or(OcmError::NoModelsInstalled)?;
    tracing::debug!("No model configured, using first installed model '{}'", first.name);
    Ok(first.name)
}
