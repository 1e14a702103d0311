use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use burn::prelude::Backend;
use log::{debug, info, warn};

use crate::classifier::Classifier;
use crate::error::PreprocessError;
use crate::preprocess;
use crate::report::Report;

const PROMPT: &str = "image> ";

/// One user request. Lives only as long as it takes to classify it.
#[derive(Debug, Clone)]
pub struct Interaction {
	pub source: PathBuf,
}

impl Interaction {
	pub fn new<P: AsRef<Path>>(source: P) -> Self {
		Self {
			source: source.as_ref().to_path_buf(),
		}
	}

	/// Decode, normalize and classify the image.
	pub fn run<B: Backend>(&self, classifier: &Classifier<B>) -> Result<Report, PreprocessError> {
		debug!("Classifying {}", self.source.display());

		let image = preprocess::open(&self.source)?;
		let input = preprocess::normalize::<B>(&image, classifier.device())?;
		let prediction = classifier.predict(&input);

		info!(
			"{}: {} ({:.2}%)",
			self.source.display(),
			prediction.label,
			prediction.confidence_percent()
		);

		Ok(Report::new(&prediction))
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
	pub classified: usize,
	pub failed: usize,
}

/// Reads one image path per line and answers each with a report or an error.
pub struct Session<'a, B: Backend> {
	classifier: &'a Classifier<B>,
}

impl<'a, B: Backend> Session<'a, B> {
	pub fn new(classifier: &'a Classifier<B>) -> Self {
		Self { classifier }
	}

	/// Runs until `quit`, `exit` or end of input. Only I/O errors on `input` or `output` stop it.
	pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> std::io::Result<SessionSummary> {
		let mut summary = SessionSummary::default();

		write!(output, "{PROMPT}")?;
		output.flush()?;

		for line in input.lines() {
			let line = line?;
			let request = line.trim();

			match request {
				"" => {}
				"quit" | "exit" => break,
				path => match Interaction::new(path).run(self.classifier) {
					Ok(report) => {
						summary.classified += 1;
						writeln!(output, "{report}\n")?;
					}
					Err(err) => {
						summary.failed += 1;
						warn!("{path}: {err}");
						writeln!(output, "Error processing image: {err}\n")?;
					}
				},
			}

			write!(output, "{PROMPT}")?;
			output.flush()?;
		}

		Ok(summary)
	}
}
