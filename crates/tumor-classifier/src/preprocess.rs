use std::path::Path;

use burn::prelude::{Backend, Tensor, TensorData};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat};
use log::debug;

use crate::error::PreprocessError;

pub const SIDE: u32 = 224;
pub const CHANNELS: usize = 3;
/// [batch, height, width, channels]
pub const INPUT_SHAPE: [usize; 4] = [1, SIDE as usize, SIDE as usize, CHANNELS];

// bicubic
const FILTER: FilterType = FilterType::CatmullRom;

/// A single image scaled to the classifier input, values in [0, 1].
///
/// Only [normalize] builds one, so the shape is always [INPUT_SHAPE].
#[derive(Debug, Clone)]
pub struct NormalizedImage<B: Backend> {
	tensor: Tensor<B, 4>,
}

impl<B: Backend> NormalizedImage<B> {
	pub fn tensor(&self) -> &Tensor<B, 4> {
		&self.tensor
	}

	pub fn dims(&self) -> [usize; 4] {
		self.tensor.dims()
	}
}

/// Decode uploaded bytes. Only JPEG and PNG are accepted.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
	let format = image::guess_format(bytes).map_err(PreprocessError::Decode)?;

	match format {
		ImageFormat::Jpeg | ImageFormat::Png => {
			image::load_from_memory_with_format(bytes, format).map_err(PreprocessError::Decode)
		}
		other => Err(PreprocessError::Unsupported(other)),
	}
}

pub fn open<P: AsRef<Path>>(path: P) -> Result<DynamicImage, PreprocessError> {
	let bytes = std::fs::read(path)?;
	decode(&bytes)
}

/// RGB, resize to 224x224, scale to [0, 1], then add the batch dimension.
pub fn normalize<B: Backend>(image: &DynamicImage, device: &B::Device) -> Result<NormalizedImage<B>, PreprocessError> {
	debug!("Normalizing {}x{} {:?} image", image.width(), image.height(), image.color());

	let rgb = image.to_rgb8();
	let resized = imageops::resize(&rgb, SIDE, SIDE, FILTER);
	let (width, height) = resized.dimensions();

	let pixels: Vec<f32> = resized.into_raw().into_iter().map(|x| (x as f32) / 255.0).collect();
	let data = TensorData::new(pixels, [height as usize, width as usize, CHANNELS]);
	let tensor = Tensor::<B, 3>::from_data(data.convert::<B::FloatElem>(), device).unsqueeze::<4>();

	let actual = tensor.dims();
	if actual != INPUT_SHAPE {
		return Err(PreprocessError::Shape { actual: actual.to_vec() });
	}

	Ok(NormalizedImage { tensor })
}
