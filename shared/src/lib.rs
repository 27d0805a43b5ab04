use serde::{Deserialize, Serialize};

pub mod classifier;
pub mod config;
pub mod display;
pub mod intake;
pub mod multipart;
pub mod notice;
pub mod session;
pub mod telemetry;

pub use classifier::{
    Classifier, ClassifierClient, ClassifierError, ClassifierTransport, HealthVariant, HttpReply,
    TransportVariant,
};
pub use config::{ClassifierConfig, SessionConfig};
pub use display::{Disease, DisplayEntry, ResultView};
pub use intake::{ImageFile, RejectionReason, UploadedImage};
pub use notice::{Notice, NoticeLevel};
pub use session::{
    AnalysisSession, AnalysisState, ClassifyRequest, Generation, IntakeApplied, IntakeTicket,
    ScheduledAnalysis,
};

/// Body returned by `POST /predict`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PredictResponse {
    pub predictions: Vec<RawPrediction>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RawPrediction {
    pub class_name: String,
    pub confidence: f64,
}

/// One label/confidence pair as handed to the session and the result view.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: clamp_confidence(confidence),
        }
    }
}

impl From<RawPrediction> for ClassificationResult {
    fn from(raw: RawPrediction) -> Self {
        Self::new(raw.class_name, raw.confidence as f32)
    }
}

fn clamp_confidence(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
