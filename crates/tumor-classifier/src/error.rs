use std::path::PathBuf;

use image::{ImageError, ImageFormat};
use thiserror::Error;

/// Failures turning uploaded bytes into a classifier input.
#[derive(Debug, Error)]
pub enum PreprocessError {
	#[error("could not decode image: {0}")]
	Decode(#[source] ImageError),
	#[error("unsupported image format {0:?}, expected JPEG or PNG")]
	Unsupported(ImageFormat),
	#[error("unexpected image shape {actual:?}, expected [1, 224, 224, 3]")]
	Shape { actual: Vec<usize> },
	#[error("could not read image")]
	Io(#[from] std::io::Error),
}

impl PreprocessError {
	/// The uploaded bytes were not a usable JPEG or PNG.
	pub fn is_decode(&self) -> bool {
		matches!(self, PreprocessError::Decode(_) | PreprocessError::Unsupported(_))
	}
}

#[derive(Debug, Error)]
pub enum ClassifierError {
	#[error("model file not found at {}", .0.display())]
	ModelNotFound(PathBuf),
	#[error("failed to load model from {}: {reason}", path.display())]
	ModelLoad { path: PathBuf, reason: String },
	#[error("model predicts {actual} classes but the label set has {expected}")]
	LabelMismatch { expected: usize, actual: usize },
	#[error("failed to save model: {0}")]
	Save(String),
	#[error("Std IO error")]
	StdIoError(#[from] std::io::Error),
}

impl ClassifierError {
	pub(crate) fn load<P: Into<PathBuf>>(path: P, reason: impl ToString) -> Self {
		ClassifierError::ModelLoad {
			path: path.into(),
			reason: reason.to_string(),
		}
	}
}

/// Top level error of the binary.
#[derive(Debug, Error)]
pub enum AppError {
	#[error(transparent)]
	Classifier(#[from] ClassifierError),
	#[error(transparent)]
	Preprocess(#[from] PreprocessError),
	#[error("failed to read config {}: {reason}", path.display())]
	Config { path: PathBuf, reason: String },
	#[error("Std IO error")]
	StdIoError(#[from] std::io::Error),
}
