use burn::nn::conv::Conv2d;
use burn::nn::{BatchNorm, Relu};
use burn::prelude::{Backend, Module, Tensor};

/// Two 3x3 convolutions with an identity (or projected) skip.
#[derive(Debug, Module)]
pub struct BasicBlock<B: Backend> {
	pub(crate) conv1: Conv2d<B>,
	pub(crate) bn1: BatchNorm<B, 2>,
	pub(crate) conv2: Conv2d<B>,
	pub(crate) bn2: BatchNorm<B, 2>,
	pub(crate) relu: Relu,
	pub(crate) downsample: Option<Downsample<B>>,
}

impl<B: Backend> BasicBlock<B> {
	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		let identity = match &self.downsample {
			Some(downsample) => downsample.forward(input.clone()),
			None => input.clone(),
		};

		let x = self.conv1.forward(input);
		let x = self.bn1.forward(x);
		let x = self.relu.forward(x);

		let x = self.conv2.forward(x);
		let x = self.bn2.forward(x);

		self.relu.forward(x + identity)
	}
}

/// 1x1 projection used when a block changes width or stride.
#[derive(Debug, Module)]
pub struct Downsample<B: Backend> {
	pub(crate) conv: Conv2d<B>,
	pub(crate) bn: BatchNorm<B, 2>,
}

impl<B: Backend> Downsample<B> {
	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		self.bn.forward(self.conv.forward(input))
	}
}

/// One resolution stage of the network.
#[derive(Debug, Module)]
pub struct Stage<B: Backend> {
	pub(crate) blocks: Vec<BasicBlock<B>>,
}

impl<B: Backend> Stage<B> {
	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		self.blocks.iter().fold(input, |x, block| block.forward(x))
	}
}
