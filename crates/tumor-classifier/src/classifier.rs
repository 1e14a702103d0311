use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use burn::module::Module;
use burn::prelude::Backend;
use burn::record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder};
use burn::tensor::activation::softmax;
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};
use log::{debug, info};

use crate::error::ClassifierError;
use crate::labels::{TumorLabel, NUM_CLASSES};
use crate::model::{TumorNet, TumorNetConfig, TumorNetRecord};
use crate::preprocess::NormalizedImage;

/// On-disk encoding of a model artifact, picked by file extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArtifactFormat {
	/// burn named MessagePack record
	Burn,
	/// PyTorch state dict (`.pt` / `.pth`)
	PyTorch,
}

impl ArtifactFormat {
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|e| e.to_str()) {
			Some("pt") | Some("pth") => ArtifactFormat::PyTorch,
			_ => ArtifactFormat::Burn,
		}
	}
}

/// Probabilities over [TumorLabel::ALL], in label order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Distribution([f32; NUM_CLASSES]);

impl Distribution {
	pub fn new(probabilities: [f32; NUM_CLASSES]) -> Self {
		Self(probabilities)
	}

	pub fn probabilities(&self) -> &[f32; NUM_CLASSES] {
		&self.0
	}

	pub fn get(&self, label: TumorLabel) -> f32 {
		self.0[label.index()]
	}

	pub fn iter(&self) -> impl Iterator<Item = (TumorLabel, f32)> + '_ {
		TumorLabel::ALL.into_iter().zip(self.0.iter().copied())
	}

	/// Most likely label. Ties go to the lowest index.
	pub fn argmax(&self) -> (TumorLabel, f32) {
		let mut best = 0;
		for (i, p) in self.0.iter().enumerate().skip(1) {
			if *p > self.0[best] {
				best = i;
			}
		}
		(TumorLabel::ALL[best], self.0[best])
	}
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Prediction {
	pub label: TumorLabel,
	pub probability: f32,
	pub distribution: Distribution,
}

impl Prediction {
	pub fn from_distribution(distribution: Distribution) -> Self {
		let (label, probability) = distribution.argmax();
		Self {
			label,
			probability,
			distribution,
		}
	}

	pub fn confidence_percent(&self) -> f32 {
		self.probability * 100.0
	}
}

/// A loaded model. Read-only after construction.
#[derive(Debug)]
pub struct Classifier<B: Backend> {
	model: TumorNet<B>,
	device: B::Device,
}

impl<B: Backend> Classifier<B> {
	pub fn load<P: AsRef<Path>>(path: P, config: &TumorNetConfig, device: &B::Device) -> Result<Self, ClassifierError> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(ClassifierError::ModelNotFound(path.to_path_buf()));
		}

		let format = ArtifactFormat::from_path(path);
		info!("Loading {:?} model from {}", format, path.display());
		let time = Instant::now();

		let record: TumorNetRecord<B> = match format {
			ArtifactFormat::Burn => {
				let bytes = fs::read(path).map_err(|err| ClassifierError::load(path, err))?;
				if bytes.is_empty() {
					return Err(ClassifierError::load(path, "artifact is empty"));
				}
				NamedMpkBytesRecorder::<FullPrecisionSettings>::default()
					.load(bytes, device)
					.map_err(|err| ClassifierError::load(path, format!("{err:?}")))?
			}
			ArtifactFormat::PyTorch => {
				let len = fs::metadata(path).map_err(|err| ClassifierError::load(path, err))?.len();
				if len == 0 {
					return Err(ClassifierError::load(path, "artifact is empty"));
				}
				load_pytorch_record(path, device)?
			}
		};

		let actual = record.num_classes();
		if actual != NUM_CLASSES {
			return Err(ClassifierError::LabelMismatch {
				expected: NUM_CLASSES,
				actual,
			});
		}

		// load_record panics on a Vec length mismatch, so check stage depths first
		let depths = record.stage_depths();
		if depths != config.blocks {
			return Err(ClassifierError::load(
				path,
				format!("artifact has stage depths {depths:?} but the configured network has {:?}", config.blocks),
			));
		}

		let template = config.init::<B>(device);
		let expected_params = template.num_params();
		let model = template.load_record(record);
		if model.num_params() != expected_params {
			return Err(ClassifierError::load(
				path,
				format!(
					"artifact has {} parameters but the configured network has {expected_params}",
					model.num_params()
				),
			));
		}

		info!("Model loaded in {:.3}s", time.elapsed().as_secs_f64());
		Self::from_model(model, device)
	}

	/// Wrap a model that is already in memory.
	pub fn from_model(model: TumorNet<B>, device: &B::Device) -> Result<Self, ClassifierError> {
		let actual = model.num_classes();
		if actual != NUM_CLASSES {
			return Err(ClassifierError::LabelMismatch {
				expected: NUM_CLASSES,
				actual,
			});
		}

		Ok(Self {
			model,
			device: device.clone(),
		})
	}

	/// Write the model as a burn record, loadable again with [Classifier::load].
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ClassifierError> {
		let bytes = NamedMpkBytesRecorder::<FullPrecisionSettings>::default()
			.record(self.model.clone().into_record(), ())
			.map_err(|err| ClassifierError::Save(format!("{err:?}")))?;
		fs::write(path, bytes)?;
		Ok(())
	}

	pub fn predict(&self, input: &NormalizedImage<B>) -> Prediction {
		// [1, H, W, C] -> [1, C, H, W]
		let x = input.tensor().clone().permute([0, 3, 1, 2]);
		let logits = self.model.forward(x);
		let probabilities = softmax(logits, 1).into_data();

		let mut distribution = [0.0; NUM_CLASSES];
		for (slot, p) in distribution.iter_mut().zip(probabilities.iter::<f32>()) {
			*slot = p;
		}
		debug!("Distribution: {distribution:?}");

		Prediction::from_distribution(Distribution::new(distribution))
	}

	pub fn device(&self) -> &B::Device {
		&self.device
	}
}

fn load_pytorch_record<B: Backend>(path: &Path, device: &B::Device) -> Result<TumorNetRecord<B>, ClassifierError> {
	let load_args = LoadArgs::new(PathBuf::from(path))
		// Map *.downsample.0.* -> *.downsample.conv.*
		.with_key_remap("(.+)\\.downsample\\.0\\.(.+)", "$1.downsample.conv.$2")
		// Map *.downsample.1.* -> *.downsample.bn.*
		.with_key_remap("(.+)\\.downsample\\.1\\.(.+)", "$1.downsample.bn.$2")
		// Map layer[i].[j].* -> layer[i].blocks.[j].*
		.with_key_remap("(layer[1-4])\\.([0-9]+)\\.(.+)", "$1.blocks.$2.$3");

	PyTorchFileRecorder::<FullPrecisionSettings>::new()
		.load(load_args, device)
		.map_err(|err| ClassifierError::load(path, format!("{err:?}")))
}
