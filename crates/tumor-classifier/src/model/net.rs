use burn::module::Module;
use burn::nn::conv::Conv2d;
use burn::nn::pool::{AdaptiveAvgPool2d, MaxPool2d};
use burn::nn::{BatchNorm, Linear, Relu};
use burn::prelude::Backend;
use burn::tensor::Tensor;

use crate::model::block::Stage;

/// ResNet with basic blocks. Field names follow torchvision so PyTorch
/// state dicts map onto it with a few key remaps.
#[derive(Debug, Module)]
pub struct TumorNet<B: Backend> {
	pub(crate) conv1: Conv2d<B>,
	pub(crate) bn1: BatchNorm<B, 2>,
	pub(crate) relu: Relu,
	pub(crate) maxpool: MaxPool2d,
	pub(crate) layer1: Stage<B>,
	pub(crate) layer2: Stage<B>,
	pub(crate) layer3: Stage<B>,
	pub(crate) layer4: Stage<B>,
	pub(crate) avgpool: AdaptiveAvgPool2d,
	pub(crate) fc: Linear<B>,
}

impl<B: Backend> TumorNet<B> {
	/// [B, 3, H, W] -> [B, num_classes] logits
	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
		let x = self.conv1.forward(input);
		let x = self.bn1.forward(x);
		let x = self.relu.forward(x);
		let x = self.maxpool.forward(x);

		let x = self.layer1.forward(x);
		let x = self.layer2.forward(x);
		let x = self.layer3.forward(x);
		let x = self.layer4.forward(x);

		let x = self.avgpool.forward(x);
		let x = x.flatten(1, 3);

		self.fc.forward(x)
	}

	pub fn num_classes(&self) -> usize {
		head_width(&self.fc.weight.dims())
	}
}

impl<B: Backend> TumorNetRecord<B> {
	pub fn num_classes(&self) -> usize {
		head_width(&self.fc.weight.dims())
	}

	/// Residual blocks stored per stage, comparable with `TumorNetConfig::blocks`.
	pub fn stage_depths(&self) -> [usize; 4] {
		[&self.layer1, &self.layer2, &self.layer3, &self.layer4].map(|stage| stage.blocks.len())
	}
}

// Linear weights are stored [d_input, d_output]
fn head_width(dims: &[usize; 2]) -> usize {
	dims[1]
}
