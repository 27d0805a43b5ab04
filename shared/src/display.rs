//! How classifier output is presented: which labels are shown, under what
//! name, and when a condition counts as detected.

use std::str::FromStr;

use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::ClassificationResult;

/// Confidence strictly above this is reported as "Detected".
pub const DETECTION_THRESHOLD: f32 = 0.5;

/// Labels the result view will ever render. Anything else the classifier
/// returns is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr)]
pub enum Disease {
    Pneumonia,
    Fibrosis,
    Consolidation,
    Emphysema,
    Effusion,
    #[strum(serialize = "Pleural_Thickening")]
    PleuralThickening,
}

impl Disease {
    pub fn from_label(label: &str) -> Option<Self> {
        Disease::from_str(label).ok()
    }

    /// Pleural thickening is reported together with effusion.
    pub fn display_as(self) -> Disease {
        match self {
            Disease::PleuralThickening => Disease::Effusion,
            other => other,
        }
    }

    pub fn display_label(self) -> String {
        self.display_as().as_ref().replace('_', " ")
    }

    pub fn finding(self, detected: bool) -> &'static str {
        match (self.display_as(), detected) {
            (Disease::Pneumonia, true) => "Opacities consistent with pneumonia are present.",
            (Disease::Pneumonia, false) => "No radiographic signs of pneumonia.",
            (Disease::Fibrosis, true) => "Reticular changes suggest pulmonary fibrosis.",
            (Disease::Fibrosis, false) => "No significant fibrotic changes detected.",
            (Disease::Consolidation, true) => "Significant consolidation present in the lung fields.",
            (Disease::Consolidation, false) => "No lung consolidation detected.",
            (Disease::Emphysema, true) => "Hyperinflation pattern consistent with emphysema.",
            (Disease::Emphysema, false) => "No evidence of emphysematous changes.",
            (_, true) => "Pleural fluid or thickening is likely present.",
            (_, false) => "No significant pleural effusion detected.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEntry {
    pub disease: Disease,
    pub label: String,
    pub confidence: f32,
    pub detected: bool,
}

impl DisplayEntry {
    pub fn percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }

    pub fn finding(&self) -> &'static str {
        self.disease.finding(self.detected)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// Nothing on the allow-list crossed the threshold.
    Healthy,
    Findings(Vec<DisplayEntry>),
}

/// Allow-listed entries in the order the classifier returned them.
pub fn display_entries(results: &[ClassificationResult]) -> Vec<DisplayEntry> {
    results
        .iter()
        .filter_map(|result| {
            let disease = Disease::from_label(&result.label)?;
            Some(DisplayEntry {
                disease: disease.display_as(),
                label: disease.display_label(),
                confidence: result.confidence,
                detected: result.confidence > DETECTION_THRESHOLD,
            })
        })
        .collect()
}

pub fn detected_count(results: &[ClassificationResult]) -> usize {
    display_entries(results).iter().filter(|e| e.detected).count()
}

pub fn build_view(results: &[ClassificationResult]) -> ResultView {
    let entries = display_entries(results);
    if entries.iter().any(|e| e.detected) {
        ResultView::Findings(entries)
    } else {
        ResultView::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn result(label: &str, confidence: f32) -> ClassificationResult {
        ClassificationResult::new(label, confidence)
    }

    #[test]
    fn pleural_thickening_shows_as_effusion_and_unknown_labels_drop() {
        let view = build_view(&[
            result("Pleural_Thickening", 0.6),
            result("Cardiomegaly", 0.9),
        ]);

        let ResultView::Findings(entries) = view else {
            panic!("expected findings");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "Effusion");
        assert_eq!(entries[0].disease, Disease::Effusion);
        assert_eq!(entries[0].percent(), 60);
        assert!(entries[0].detected);
    }

    #[test]
    fn nothing_above_threshold_is_healthy() {
        let results: Vec<_> = Disease::iter().map(|d| result(d.as_ref(), 0.3)).collect();
        assert_eq!(build_view(&results), ResultView::Healthy);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(build_view(&[result("Pneumonia", 0.5)]), ResultView::Healthy);
        assert_eq!(detected_count(&[result("Pneumonia", 0.51)]), 1);
    }

    #[test]
    fn only_unknown_labels_is_healthy() {
        assert_eq!(
            build_view(&[result("Nodule", 0.99), result("Mass", 0.97)]),
            ResultView::Healthy
        );
    }

    #[test]
    fn order_of_allowed_entries_is_preserved() {
        let entries = display_entries(&[
            result("Emphysema", 0.7),
            result("Hernia", 0.2),
            result("Pneumonia", 0.1),
            result("Consolidation", 0.65),
        ]);
        let labels: Vec<_> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Emphysema", "Pneumonia", "Consolidation"]);
    }

    #[test]
    fn labels_match_exactly() {
        assert_eq!(Disease::from_label("pneumonia"), None);
        assert_eq!(Disease::from_label(" Fibrosis "), None);
        assert_eq!(Disease::from_label("Fibrosis"), Some(Disease::Fibrosis));
        assert_eq!(Disease::PleuralThickening.as_ref(), "Pleural_Thickening");
    }
}
