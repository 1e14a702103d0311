use std::fmt;

use crate::classifier::Prediction;
use crate::labels::{TumorLabel, DISCLAIMER};

const BAR_WIDTH: usize = 30;

/// What the user sees for one classified image.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
	pub label: TumorLabel,
	/// 0-100
	pub confidence: f32,
}

impl Report {
	pub fn new(prediction: &Prediction) -> Self {
		Self {
			label: prediction.label,
			confidence: prediction.confidence_percent(),
		}
	}

	pub fn description(&self) -> &'static str {
		self.label.description()
	}

	/// Fill level of the confidence indicator, clamped to 0-100.
	pub fn bar_fill(&self) -> f32 {
		self.confidence.clamp(0.0, 100.0)
	}

	pub fn bar(&self) -> String {
		let filled = ((self.bar_fill() / 100.0) * BAR_WIDTH as f32).round() as usize;
		let filled = filled.min(BAR_WIDTH);
		format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
	}
}

impl fmt::Display for Report {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Result: {}", self.label)?;
		writeln!(f, "Confidence: {:.2}%", self.confidence)?;
		writeln!(f, "{}", self.bar())?;
		writeln!(f, "{}", self.description())?;
		write!(f, "{DISCLAIMER}")
	}
}
