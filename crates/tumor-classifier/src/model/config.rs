use std::f64::consts::SQRT_2;

use burn::nn::conv::Conv2dConfig;
use burn::nn::pool::{AdaptiveAvgPool2dConfig, MaxPool2dConfig};
use burn::nn::{BatchNormConfig, Initializer, LinearConfig, PaddingConfig2d, Relu};
use burn::prelude::{Backend, Config, Device};

use crate::labels::NUM_CLASSES;
use crate::model::block::{BasicBlock, Downsample, Stage};
use crate::model::net::TumorNet;

fn kaiming() -> Initializer {
	Initializer::KaimingNormal {
		gain: SQRT_2, // recommended value for ReLU
		fan_out_only: true,
	}
}

fn conv(channels: [usize; 2], kernel: usize, stride: usize, padding: usize) -> Conv2dConfig {
	Conv2dConfig::new(channels, [kernel, kernel])
		.with_stride([stride, stride])
		.with_padding(PaddingConfig2d::Explicit(padding, padding))
		.with_bias(false)
		.with_initializer(kaiming())
}

/// Hyper-parameters of the classifier network. Must match the artifact being loaded.
#[derive(Config, Debug, PartialEq)]
pub struct TumorNetConfig {
	/// Residual blocks per stage. `[2, 2, 2, 2]` is ResNet-18.
	#[config(default = "[2, 2, 2, 2]")]
	pub blocks: [usize; 4],
	/// Channels of the stem and first stage; each later stage doubles it.
	#[config(default = 64)]
	pub width: usize,
	#[config(default = "NUM_CLASSES")]
	pub num_classes: usize,
}

impl TumorNetConfig {
	pub fn init<B: Backend>(&self, device: &Device<B>) -> TumorNet<B> {
		let w = self.width;
		let widths = [w, w * 2, w * 4, w * 8];

		// 7x7 conv, /2 then 3x3 maxpool, /2
		let conv1 = conv([3, w], 7, 2, 3).init(device);
		let bn1 = BatchNormConfig::new(w).init(device);
		let maxpool = MaxPool2dConfig::new([3, 3])
			.with_strides([2, 2])
			.with_padding(PaddingConfig2d::Explicit(1, 1))
			.init();

		let in_widths = [w, widths[0], widths[1], widths[2]];
		let [layer1, layer2, layer3, layer4] = std::array::from_fn(|i| {
			let stride = if i == 0 { 1 } else { 2 };
			stage(in_widths[i], widths[i], self.blocks[i], stride, device)
		});

		TumorNet {
			conv1,
			bn1,
			relu: Relu::new(),
			maxpool,
			layer1,
			layer2,
			layer3,
			layer4,
			avgpool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
			fc: LinearConfig::new(widths[3], self.num_classes).init(device),
		}
	}
}

fn stage<B: Backend>(in_channels: usize, out_channels: usize, num_blocks: usize, stride: usize, device: &Device<B>) -> Stage<B> {
	let blocks = (0..num_blocks)
		.map(|b| {
			if b == 0 {
				// First block uses the stage stride
				basic_block(in_channels, out_channels, stride, device)
			} else {
				basic_block(out_channels, out_channels, 1, device)
			}
		})
		.collect();

	Stage { blocks }
}

fn basic_block<B: Backend>(in_channels: usize, out_channels: usize, stride: usize, device: &Device<B>) -> BasicBlock<B> {
	let downsample = if in_channels != out_channels || stride != 1 {
		Some(Downsample {
			conv: conv([in_channels, out_channels], 1, stride, 0).init(device),
			bn: BatchNormConfig::new(out_channels).init(device),
		})
	} else {
		None
	};

	BasicBlock {
		conv1: conv([in_channels, out_channels], 3, stride, 1).init(device),
		bn1: BatchNormConfig::new(out_channels).init(device),
		conv2: conv([out_channels, out_channels], 3, 1, 1).init(device),
		bn2: BatchNormConfig::new(out_channels).init(device),
		relu: Relu::new(),
		downsample,
	}
}
