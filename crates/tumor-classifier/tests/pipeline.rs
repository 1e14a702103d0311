use std::fs;
use std::io::Cursor;
use std::path::Path;

use burn::backend::NdArray;
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use tumor_classifier::model::TumorNetConfig;
use tumor_classifier::{normalize, Classifier, ClassifierError, Interaction, Session, SessionSummary, TumorLabel};

type TestBackend = NdArray;

fn small_config() -> TumorNetConfig {
	TumorNetConfig::new().with_blocks([1, 1, 1, 1]).with_width(4)
}

fn classifier() -> Classifier<TestBackend> {
	let device = Default::default();
	Classifier::from_model(small_config().init(&device), &device).unwrap()
}

fn scan() -> DynamicImage {
	DynamicImage::ImageRgb8(RgbImage::from_fn(96, 80, |x, y| {
		Rgb([(x * 2 % 256) as u8, (y * 3 % 256) as u8, ((x ^ y) % 256) as u8])
	}))
}

fn write_png(path: &Path, image: &DynamicImage) {
	image.save_with_format(path, ImageFormat::Png).unwrap();
}

#[test]
fn distribution_is_a_probability_vector() {
	let classifier = classifier();
	let inputs = [
		scan(),
		DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 300, Luma([12]))),
		DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]))),
	];

	for image in &inputs {
		let input = normalize::<TestBackend>(image, classifier.device()).unwrap();
		let prediction = classifier.predict(&input);
		let probabilities = prediction.distribution.probabilities();

		assert_eq!(probabilities.len(), TumorLabel::ALL.len());
		assert!(probabilities.iter().all(|p| *p >= 0.0));
		let sum: f32 = probabilities.iter().sum();
		assert!((sum - 1.0).abs() < 1e-5, "sum = {sum}");

		let max = probabilities.iter().cloned().fold(f32::MIN, f32::max);
		assert_eq!(prediction.probability, max);
		assert_eq!(prediction.distribution.get(prediction.label), max);
	}
}

#[test]
fn prediction_is_deterministic() {
	let classifier = classifier();
	let image = scan();

	let first = classifier.predict(&normalize::<TestBackend>(&image, classifier.device()).unwrap());
	let second = classifier.predict(&normalize::<TestBackend>(&image, classifier.device()).unwrap());

	assert_eq!(first, second);
}

#[test]
fn missing_artifact_is_not_found() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("brain_tumor_model.mpk");

	let err = Classifier::<TestBackend>::load(&path, &small_config(), &Default::default()).unwrap_err();
	assert!(matches!(err, ClassifierError::ModelNotFound(p) if p == path));
}

#[test]
fn empty_artifact_fails_to_load() {
	let dir = tempfile::tempdir().unwrap();

	for name in ["model.mpk", "model.pt"] {
		let path = dir.path().join(name);
		fs::write(&path, b"").unwrap();

		let err = Classifier::<TestBackend>::load(&path, &small_config(), &Default::default()).unwrap_err();
		assert!(matches!(err, ClassifierError::ModelLoad { .. }), "{name}: {err}");
	}
}

#[test]
fn corrupt_artifact_fails_to_load() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("model.mpk");
	fs::write(&path, b"this is not a MessagePack record").unwrap();

	let err = Classifier::<TestBackend>::load(&path, &small_config(), &Default::default()).unwrap_err();
	assert!(matches!(err, ClassifierError::ModelLoad { .. }));
}

#[test]
fn saved_artifact_predicts_the_same() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("brain_tumor_model.mpk");
	let original = classifier();
	original.save(&path).unwrap();

	let loaded = Classifier::<TestBackend>::load(&path, &small_config(), &Default::default()).unwrap();
	let input = normalize::<TestBackend>(&scan(), loaded.device()).unwrap();

	let expected = original.predict(&input);
	let actual = loaded.predict(&input);
	assert_eq!(actual.label, expected.label);
	for (a, b) in actual.distribution.iter().zip(expected.distribution.iter()) {
		assert_eq!(a.0, b.0);
		assert!((a.1 - b.1).abs() < 1e-6);
	}
}

fn save_artifact(path: &Path, config: &TumorNetConfig) {
	let device = Default::default();
	Classifier::<TestBackend>::from_model(config.init(&device), &device)
		.unwrap()
		.save(path)
		.unwrap();
}

#[test]
fn stage_depth_mismatch_fails_to_load() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("deeper.mpk");
	save_artifact(&path, &small_config().with_blocks([2, 1, 1, 1]));

	let config = small_config().with_blocks([1, 1, 1, 2]);
	let err = Classifier::<TestBackend>::load(&path, &config, &Default::default()).unwrap_err();
	assert!(matches!(err, ClassifierError::ModelLoad { .. }), "{err}");
}

#[test]
fn width_mismatch_fails_to_load() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("wider.mpk");
	save_artifact(&path, &small_config().with_width(8));

	let err = Classifier::<TestBackend>::load(&path, &small_config(), &Default::default()).unwrap_err();
	assert!(matches!(err, ClassifierError::ModelLoad { .. }), "{err}");
}

#[test]
fn head_width_must_match_label_set() {
	let device = Default::default();
	let three_classes = small_config().with_num_classes(3).init::<TestBackend>(&device);

	let err = Classifier::from_model(three_classes.clone(), &device).unwrap_err();
	assert!(matches!(err, ClassifierError::LabelMismatch { expected: 4, actual: 3 }));

	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("three.mpk");
	let bytes = NamedMpkBytesRecorder::<FullPrecisionSettings>::default()
		.record(three_classes.into_record(), ())
		.unwrap();
	fs::write(&path, bytes).unwrap();

	let err = Classifier::<TestBackend>::load(&path, &small_config(), &device).unwrap_err();
	assert!(matches!(err, ClassifierError::LabelMismatch { expected: 4, actual: 3 }));
}

#[test]
fn interaction_reports_prediction() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("scan.png");
	write_png(&path, &scan());

	let classifier = classifier();
	let report = Interaction::new(&path).run(&classifier).unwrap();
	let expected = classifier.predict(&normalize::<TestBackend>(&scan(), classifier.device()).unwrap());

	assert_eq!(report.label, expected.label);
	assert!((report.confidence - expected.confidence_percent()).abs() < 1e-4);
	assert!((0.0..=100.0).contains(&report.bar_fill()));
}

#[test]
fn session_survives_bad_input() {
	let dir = tempfile::tempdir().unwrap();
	let good = dir.path().join("scan.png");
	write_png(&good, &scan());
	let bad = dir.path().join("notes.png");
	fs::write(&bad, b"not really a png").unwrap();

	let input = format!("{}\n\n{}\n{}\nquit\n{}\n", bad.display(), good.display(), dir.path().join("gone.jpg").display(), good.display());
	let mut output = Vec::new();

	let classifier = classifier();
	let summary = Session::new(&classifier).run(Cursor::new(input), &mut output).unwrap();

	assert_eq!(summary, SessionSummary { classified: 1, failed: 2 });

	let output = String::from_utf8(output).unwrap();
	assert_eq!(output.matches("Error processing image").count(), 2);
	assert_eq!(output.matches("Result: ").count(), 1);
	assert!(output.contains("Confidence: "));
}
