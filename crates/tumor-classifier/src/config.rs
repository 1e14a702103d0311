use std::path::{Path, PathBuf};

use burn::config::Config;

use crate::error::AppError;
use crate::model::TumorNetConfig;

pub const DEFAULT_MODEL_PATH: &str = "brain_tumor_model.mpk";

#[derive(Config, Debug)]
pub struct AppConfig {
	#[config(default = "PathBuf::from(DEFAULT_MODEL_PATH)")]
	pub model_path: PathBuf,
	#[config(default = "TumorNetConfig::new()")]
	pub model: TumorNetConfig,
}

impl AppConfig {
	/// Read a JSON config, falling back to defaults when no path is given.
	pub fn from_file(path: Option<&Path>) -> Result<Self, AppError> {
		match path {
			Some(path) => AppConfig::load(path).map_err(|err| AppError::Config {
				path: path.to_path_buf(),
				reason: format!("{err:?}"),
			}),
			None => Ok(AppConfig::new()),
		}
	}

	pub fn model_path(&self) -> &Path {
		&self.model_path
	}
}
