//! The single analysis session behind the page.
//!
//! The session is a synchronous state machine. Anything asynchronous (file
//! decoding, classification, delayed retries) is handed back to the caller
//! as a request tagged with a [`Generation`]; the caller runs it and feeds the
//! outcome back. Outcomes tagged with an older generation are dropped, which
//! is how a response for a replaced image is kept from overwriting the newer
//! session.

use std::time::Duration;

use derive_more::Display;

use crate::classifier::ClassifierError;
use crate::config::SessionConfig;
use crate::display::{self, ResultView};
use crate::intake::{RejectionReason, UploadedImage};
use crate::notice::Notice;
use crate::ClassificationResult;

/// Canned results shown when the classifier cannot be reached.
pub const FALLBACK_RESULTS: [(&str, f32); 5] = [
    ("Pneumonia", 0.92),
    ("Fibrosis", 0.17),
    ("Consolidation", 0.89),
    ("Emphysema", 0.08),
    ("Effusion", 0.12),
];

pub fn fallback_results() -> Vec<ClassificationResult> {
    FALLBACK_RESULTS
        .iter()
        .map(|(label, confidence)| ClassificationResult::new(*label, *confidence))
        .collect()
}

const MAX_RETRIES: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
#[display(fmt = "gen-{}", _0)]
pub struct Generation(u64);

/// Orders file decodes so only the most recent submission is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[display(fmt = "intake-{}", _0)]
pub struct IntakeTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    ImageReady,
    Analyzing,
    ResultReady {
        results: Vec<ClassificationResult>,
        is_simulated: bool,
    },
}

impl AnalysisState {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::ImageReady => "image-ready",
            AnalysisState::Analyzing => "analyzing",
            AnalysisState::ResultReady { .. } => "result-ready",
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self, AnalysisState::Analyzing)
    }
}

/// A classification the caller should run, optionally after `delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyRequest<F> {
    pub generation: Generation,
    pub file: F,
    pub delay: Option<Duration>,
}

/// An automatic analysis start the caller should trigger after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAnalysis {
    pub generation: Generation,
    pub delay: Duration,
}

/// What [`AnalysisSession::apply_intake`] did with a finished decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeApplied {
    /// A newer submission superseded this one; nothing changed.
    Stale,
    Rejected,
    /// The image replaced the previous one. Any timer armed for an earlier
    /// auto-analysis is obsolete.
    Accepted(Option<ScheduledAnalysis>),
}

impl IntakeApplied {
    pub fn scheduled(self) -> Option<ScheduledAnalysis> {
        match self {
            IntakeApplied::Accepted(scheduled) => scheduled,
            _ => None,
        }
    }
}

pub struct AnalysisSession<F> {
    state: AnalysisState,
    image: Option<UploadedImage<F>>,
    generation: Generation,
    intake: IntakeTicket,
    retries: u8,
    notices: Vec<Notice>,
    config: SessionConfig,
}

impl<F: Clone> AnalysisSession<F> {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: AnalysisState::Idle,
            image: None,
            generation: Generation::default(),
            intake: IntakeTicket::default(),
            retries: 0,
            notices: Vec::new(),
            config,
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn image(&self) -> Option<&UploadedImage<F>> {
        self.image.as_ref()
    }

    pub fn display_data(&self) -> Option<&str> {
        self.image.as_ref().map(|image| image.display_data.as_str())
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn retries_used(&self) -> u8 {
        self.retries
    }

    pub fn is_simulated(&self) -> bool {
        matches!(
            self.state,
            AnalysisState::ResultReady {
                is_simulated: true,
                ..
            }
        )
    }

    pub fn result_view(&self) -> Option<ResultView> {
        match &self.state {
            AnalysisState::ResultReady { results, .. } => Some(display::build_view(results)),
            _ => None,
        }
    }

    pub fn pending_notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Starts a new submission. Decodes finishing for an older ticket are
    /// ignored by [`apply_intake`](Self::apply_intake).
    pub fn begin_intake(&mut self) -> IntakeTicket {
        self.intake = IntakeTicket(self.intake.0 + 1);
        self.intake
    }

    pub fn apply_intake(
        &mut self,
        ticket: IntakeTicket,
        outcome: Result<UploadedImage<F>, RejectionReason>,
    ) -> IntakeApplied {
        if ticket != self.intake {
            log::debug!("Dropping {} outcome, {} is current", ticket, self.intake);
            return IntakeApplied::Stale;
        }

        match outcome {
            Ok(image) => {
                self.generation = Generation(self.generation.0 + 1);
                self.image = Some(image);
                self.retries = 0;
                self.state = AnalysisState::ImageReady;
                log::info!("Image accepted, session now at {}", self.generation);

                IntakeApplied::Accepted(self.config.auto_analyze.then_some(ScheduledAnalysis {
                    generation: self.generation,
                    delay: self.config.auto_analyze_delay,
                }))
            }
            Err(reason) => {
                log::warn!("Upload rejected: {}", reason);
                self.notices.push(Notice::Rejected(reason));
                IntakeApplied::Rejected
            }
        }
    }

    pub fn clear(&mut self) {
        self.generation = Generation(self.generation.0 + 1);
        self.image = None;
        self.retries = 0;
        self.state = AnalysisState::Idle;
        log::info!("Session cleared at {}", self.generation);
    }

    pub fn analyze(&mut self) -> Option<ClassifyRequest<F>> {
        if self.state.is_analyzing() {
            log::debug!("Analysis already in flight for {}, ignoring", self.generation);
            return None;
        }

        let Some(file) = self.image.as_ref().and_then(|image| image.raw_file.clone()) else {
            self.notices.push(Notice::NoImage);
            return None;
        };

        self.state = AnalysisState::Analyzing;
        log::info!("Analyzing image for {}", self.generation);
        Some(ClassifyRequest {
            generation: self.generation,
            file,
            delay: None,
        })
    }

    /// Starts an analysis scheduled by [`apply_intake`](Self::apply_intake)
    /// if the image it was scheduled for is still the current one.
    pub fn start_scheduled(&mut self, generation: Generation) -> Option<ClassifyRequest<F>> {
        if generation != self.generation || self.state != AnalysisState::ImageReady {
            return None;
        }
        self.analyze()
    }

    pub fn apply_classification(
        &mut self,
        generation: Generation,
        outcome: Result<Vec<ClassificationResult>, ClassifierError>,
    ) -> Option<ClassifyRequest<F>> {
        if generation != self.generation || !self.state.is_analyzing() {
            log::debug!(
                "Discarding stale classification for {} (current {}, {})",
                generation,
                self.generation,
                self.state.name()
            );
            return None;
        }

        match outcome {
            Ok(results) if !results.is_empty() => {
                let detected = display::detected_count(&results);
                self.state = AnalysisState::ResultReady {
                    results,
                    is_simulated: false,
                };
                self.notices.push(Notice::Completed { detected });
                None
            }
            Ok(_) if self.retries < MAX_RETRIES => match self.retry_request() {
                Some(request) => {
                    self.retries += 1;
                    log::warn!("Empty classification, retrying in {:?}", self.config.retry_delay);
                    self.notices.push(Notice::Retrying);
                    Some(request)
                }
                None => {
                    self.fall_back();
                    None
                }
            },
            Ok(_) => {
                self.fall_back();
                None
            }
            Err(err) => {
                log::error!("Classification failed: {}", err);
                self.fall_back();
                None
            }
        }
    }

    fn retry_request(&self) -> Option<ClassifyRequest<F>> {
        let file = self.image.as_ref()?.raw_file.clone()?;
        Some(ClassifyRequest {
            generation: self.generation,
            file,
            delay: Some(self.config.retry_delay),
        })
    }

    fn fall_back(&mut self) {
        log::warn!("Using simulated results for {}", self.generation);
        self.state = AnalysisState::ResultReady {
            results: fallback_results(),
            is_simulated: true,
        };
        self.notices.push(Notice::Simulated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::tests::MemoryFile;

    fn session() -> AnalysisSession<MemoryFile> {
        AnalysisSession::new(SessionConfig {
            auto_analyze: false,
            ..SessionConfig::default()
        })
    }

    fn image(name: &str) -> UploadedImage<MemoryFile> {
        UploadedImage {
            display_data: format!("data:image/png;base64,{name}"),
            raw_file: Some(MemoryFile::png(name)),
        }
    }

    fn upload(session: &mut AnalysisSession<MemoryFile>, name: &str) {
        let ticket = session.begin_intake();
        session.apply_intake(ticket, Ok(image(name)));
    }

    fn found() -> Vec<ClassificationResult> {
        vec![ClassificationResult::new("Pneumonia", 0.8)]
    }

    #[test]
    fn rejected_upload_keeps_idle() {
        let mut session = session();
        let ticket = session.begin_intake();
        session.apply_intake(ticket, Err(RejectionReason::NotAnImage));

        assert_eq!(session.state(), &AnalysisState::Idle);
        assert!(session.image().is_none());
        assert_eq!(
            session.take_notices(),
            vec![Notice::Rejected(RejectionReason::NotAnImage)]
        );
    }

    #[test]
    fn accepted_upload_is_image_ready() {
        let mut session = session();
        upload(&mut session, "a.png");

        assert_eq!(session.state(), &AnalysisState::ImageReady);
        let image = session.image().unwrap();
        assert!(image.raw_file.is_some());
        assert!(session.display_data().is_some());
    }

    #[test]
    fn analyze_without_image_notifies_once() {
        let mut session = session();
        assert!(session.analyze().is_none());

        assert_eq!(session.state(), &AnalysisState::Idle);
        assert_eq!(session.take_notices(), vec![Notice::NoImage]);
    }

    #[test]
    fn analyze_without_raw_file_keeps_image_ready() {
        let mut session = session();
        let ticket = session.begin_intake();
        session.apply_intake(
            ticket,
            Ok(UploadedImage {
                display_data: "data:image/png;base64,AAAA".to_string(),
                raw_file: None,
            }),
        );

        assert!(session.analyze().is_none());
        assert_eq!(session.state(), &AnalysisState::ImageReady);
        assert_eq!(session.take_notices(), vec![Notice::NoImage]);
    }

    #[test]
    fn analyze_while_analyzing_is_ignored() {
        let mut session = session();
        upload(&mut session, "a.png");
        assert!(session.analyze().is_some());
        assert!(session.analyze().is_none());
        assert!(session.pending_notices().is_empty());
        assert!(session.state().is_analyzing());
    }

    #[test]
    fn clear_returns_to_idle_and_suppresses_in_flight_result() {
        let mut session = session();
        upload(&mut session, "a.png");
        let request = session.analyze().unwrap();
        session.clear();

        assert_eq!(session.state(), &AnalysisState::Idle);
        assert!(session.display_data().is_none());
        assert!(session
            .apply_classification(request.generation, Ok(found()))
            .is_none());
        assert_eq!(session.state(), &AnalysisState::Idle);
    }

    #[test]
    fn non_empty_result_completes_with_detected_count() {
        let mut session = session();
        upload(&mut session, "a.png");
        let request = session.analyze().unwrap();
        session.apply_classification(request.generation, Ok(found()));

        assert_eq!(
            session.state(),
            &AnalysisState::ResultReady {
                results: found(),
                is_simulated: false
            }
        );
        assert_eq!(session.take_notices(), vec![Notice::Completed { detected: 1 }]);
        assert!(session.result_view().is_some());
    }

    #[test]
    fn empty_result_retries_once_with_delay() {
        let mut session = session();
        upload(&mut session, "a.png");
        let first = session.analyze().unwrap();
        let retry = session
            .apply_classification(first.generation, Ok(Vec::new()))
            .unwrap();

        assert_eq!(retry.delay, Some(Duration::from_secs(1)));
        assert_eq!(retry.generation, first.generation);
        assert!(session.state().is_analyzing());
        assert_eq!(session.retries_used(), 1);

        session.apply_classification(retry.generation, Ok(found()));
        assert!(!session.is_simulated());
        assert_eq!(
            session.take_notices(),
            vec![Notice::Retrying, Notice::Completed { detected: 1 }]
        );
    }

    #[test]
    fn outright_error_falls_back_immediately() {
        let mut session = session();
        upload(&mut session, "a.png");
        let request = session.analyze().unwrap();
        let next = session.apply_classification(
            request.generation,
            Err(ClassifierError::Transport("offline".into())),
        );

        assert!(next.is_none());
        assert!(session.is_simulated());
        assert_eq!(session.take_notices(), vec![Notice::Simulated]);
    }

    #[test]
    fn retry_budget_is_per_image_not_per_analyze() {
        let mut session = session();
        upload(&mut session, "a.png");

        let first = session.analyze().unwrap();
        let retry = session
            .apply_classification(first.generation, Ok(Vec::new()))
            .unwrap();
        session.apply_classification(retry.generation, Ok(Vec::new()));
        assert!(session.is_simulated());

        let again = session.analyze().unwrap();
        assert!(session
            .apply_classification(again.generation, Ok(Vec::new()))
            .is_none());
        assert!(session.is_simulated());

        upload(&mut session, "b.png");
        assert_eq!(session.retries_used(), 0);
        let fresh = session.analyze().unwrap();
        assert!(session
            .apply_classification(fresh.generation, Ok(Vec::new()))
            .is_some());
    }

    #[test]
    fn raw_file_survives_results_for_reanalysis() {
        let mut session = session();
        upload(&mut session, "a.png");
        let request = session.analyze().unwrap();
        session.apply_classification(request.generation, Ok(found()));

        assert!(session.image().and_then(|i| i.raw_file.as_ref()).is_some());
        let again = session.analyze().unwrap();
        assert_eq!(again.file.name, "a.png");
    }

    #[test]
    fn new_upload_discards_results() {
        let mut session = session();
        upload(&mut session, "a.png");
        let request = session.analyze().unwrap();
        session.apply_classification(request.generation, Ok(found()));

        upload(&mut session, "b.png");
        assert_eq!(session.state(), &AnalysisState::ImageReady);
        assert!(session.result_view().is_none());
    }

    #[test]
    fn stale_intake_is_ignored() {
        let mut session = session();
        let older = session.begin_intake();
        let newer = session.begin_intake();
        assert!(matches!(
            session.apply_intake(newer, Ok(image("new.png"))),
            IntakeApplied::Accepted(_)
        ));
        assert_eq!(
            session.apply_intake(older, Ok(image("old.png"))),
            IntakeApplied::Stale
        );

        assert_eq!(
            session.display_data(),
            Some("data:image/png;base64,new.png")
        );
    }

    #[test]
    fn auto_analysis_is_tied_to_its_generation() {
        let mut session = AnalysisSession::new(SessionConfig::default());
        let ticket = session.begin_intake();
        let scheduled = session
            .apply_intake(ticket, Ok(image("a.png")))
            .scheduled()
            .unwrap();
        assert_eq!(scheduled.delay, Duration::from_millis(500));

        let ticket = session.begin_intake();
        session.apply_intake(ticket, Ok(image("b.png")));
        assert!(session.start_scheduled(scheduled.generation).is_none());
        assert_eq!(session.state(), &AnalysisState::ImageReady);

        let current = session.generation();
        let request = session.start_scheduled(current).unwrap();
        assert_eq!(request.file.name, "b.png");
    }

    #[test]
    fn late_stale_decode_leaves_current_auto_analysis_armed() {
        let mut session = AnalysisSession::new(SessionConfig::default());
        let older = session.begin_intake();
        let newer = session.begin_intake();
        let scheduled = session
            .apply_intake(newer, Ok(image("new.png")))
            .scheduled()
            .unwrap();

        let late = session.apply_intake(older, Ok(image("old.png")));
        assert_eq!(late, IntakeApplied::Stale);
        assert_eq!(late.scheduled(), None);

        let request = session.start_scheduled(scheduled.generation).unwrap();
        assert_eq!(request.file.name, "new.png");
    }

    #[test]
    fn rejected_decode_does_not_schedule() {
        let mut session = AnalysisSession::<MemoryFile>::new(SessionConfig::default());
        let ticket = session.begin_intake();
        assert_eq!(
            session.apply_intake(ticket, Err(RejectionReason::NotAnImage)),
            IntakeApplied::Rejected
        );
    }

    #[test]
    fn fallback_results_are_fixed() {
        let labels: Vec<_> = fallback_results().into_iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec!["Pneumonia", "Fibrosis", "Consolidation", "Emphysema", "Effusion"]
        );
    }
}
