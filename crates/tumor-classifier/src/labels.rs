use std::fmt;

pub const NUM_CLASSES: usize = 4;

pub const DISCLAIMER: &str = "Disclaimer: this is a diagnostic aid and does not replace professional medical judgement.";

/// Classes the model was trained on, in output order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TumorLabel {
	Glioma,
	Meningioma,
	PituitaryTumor,
	NoTumor,
}

impl TumorLabel {
	pub const ALL: [TumorLabel; NUM_CLASSES] = [
		TumorLabel::Glioma,
		TumorLabel::Meningioma,
		TumorLabel::PituitaryTumor,
		TumorLabel::NoTumor,
	];

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn name(self) -> &'static str {
		match self {
			TumorLabel::Glioma => "Glioma",
			TumorLabel::Meningioma => "Meningioma",
			TumorLabel::PituitaryTumor => "Pituitary Tumor",
			TumorLabel::NoTumor => "No Tumor",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			TumorLabel::Glioma => "A glioma is a tumor that starts in the glial cells of the brain or spinal cord. \
				It is usually found in the cerebrum and can range from benign to malignant.",
			TumorLabel::Meningioma => "A meningioma is a tumor that grows from the meninges, the protective layers around \
				the brain and spinal cord. Most are benign, but they can cause symptoms when they press on the brain.",
			TumorLabel::PituitaryTumor => "A pituitary tumor is an abnormal growth in the pituitary gland, which regulates \
				hormones. It is usually benign but can affect hormonal function.",
			TumorLabel::NoTumor => "No tumor was detected in the MRI image. Consult a doctor for further examination.",
		}
	}
}

impl TryFrom<usize> for TumorLabel {
	type Error = usize;

	fn try_from(index: usize) -> Result<Self, Self::Error> {
		TumorLabel::ALL.get(index).copied().ok_or(index)
	}
}

impl fmt::Display for TumorLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
