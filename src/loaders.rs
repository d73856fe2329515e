//! Hugging Face Hub loading utilities.
//!
//! Everything here is synchronous and blocking: files are fetched (and cached on
//! disk) through `hf_hub`'s sync API, with a small retry loop for the hub's lock
//! acquisition failures.

use std::path::PathBuf;
use std::time::Duration;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};

/// A single file in a Hub model repository.
#[derive(Debug, Clone)]
pub(crate) struct HubFile {
    repo: String,
    filename: String,
}

impl HubFile {
    pub(crate) fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    /// Download the file if needed and return its local path.
    pub(crate) fn load(&self) -> Result<PathBuf> {
        let api = Api::new()?;
        let repo = api.model(self.repo.clone());

        let max_retries = 3;
        for attempt in 0..max_retries {
            match repo.get(&self.filename) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    let message = e.to_string();
                    if message.contains("Lock acquisition failed") && attempt < max_retries - 1 {
                        std::thread::sleep(Duration::from_millis(100 * (1 << attempt)));
                        continue;
                    }
                    return Err(PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        self.filename, self.repo, message
                    )));
                }
            }
        }

        Err(PipelineError::Download(format!(
            "Download of '{}' from '{}' did not complete after {} attempts",
            self.filename, self.repo, max_retries
        )))
    }
}

/// Load the tokenizer shipped with a model repository.
pub(crate) fn load_tokenizer(repo_id: &str) -> Result<Tokenizer> {
    let tokenizer_path = HubFile::new(repo_id, "tokenizer.json").load()?;
    let path_str = tokenizer_path.display().to_string();
    Tokenizer::from_file(&tokenizer_path).map_err(|e| {
        PipelineError::Tokenization(format!("Failed to load tokenizer from '{path_str}': {e}"))
    })
}

/// Load a repository's weight file into a [`VarBuilder`], preferring safetensors.
pub(crate) fn load_weights(repo_id: &str, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = HubFile::new(repo_id, "model.safetensors")
        .load()
        .or_else(|_| HubFile::new(repo_id, "pytorch_model.bin").load())?;

    let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
    } else {
        VarBuilder::from_pth(&weights_path, DType::F32, device)?
    };

    Ok(vb)
}
