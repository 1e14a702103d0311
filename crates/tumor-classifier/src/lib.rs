//! Brain tumor MRI classification: normalize an image, run it through a
//! pre-trained ResNet and report the most likely of four classes.

pub mod classifier;
pub mod config;
pub mod error;
pub mod labels;
pub mod model;
pub mod preprocess;
pub mod report;
pub mod session;

pub use classifier::{ArtifactFormat, Classifier, Distribution, Prediction};
pub use config::AppConfig;
pub use error::{AppError, ClassifierError, PreprocessError};
pub use labels::TumorLabel;
pub use preprocess::{normalize, NormalizedImage};
pub use report::Report;
pub use session::{Interaction, Session, SessionSummary};
