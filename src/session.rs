// src/session.rs
use chrono::{DateTime, Local};
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ai::AiConnector;
use crate::capture::EncodedImage;
use crate::classify::{self, WasteAnalysis};
use crate::error::ClassifyError;

/// The picture the user handed in, plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionImage {
    pub source: String,
    pub encoded: EncodedImage,
}

/// Identifies one submission so late completions can be told apart after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Success,
    Failure,
}

pub enum SessionEvent {
    Submit(SessionImage),
    Succeeded(Ticket, WasteAnalysis),
    Failed(Ticket, ClassifyError),
    Reset,
}

/// State of one upload-to-result cycle.
#[derive(Debug, Clone, Default)]
pub struct Session {
    image: Option<SessionImage>,
    loading: bool,
    result: Option<WasteAnalysis>,
    error: Option<String>,
    submitted_at: Option<DateTime<Local>>,
    completed_at: Option<DateTime<Local>>,
    ticket: Ticket,
}

impl Session {
    pub fn image(&self) -> Option<&SessionImage> {
        self.image.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&WasteAnalysis> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submitted_at(&self) -> Option<DateTime<Local>> {
        self.submitted_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Local>> {
        self.completed_at
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Submitting
        } else if self.result.is_some() {
            Phase::Success
        } else if self.error.is_some() {
            Phase::Failure
        } else {
            Phase::Idle
        }
    }

    /// Apply one transition. Only `Submit` can be refused.
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), ClassifyError> {
        match event {
            SessionEvent::Submit(image) => {
                match self.phase() {
                    Phase::Idle => {}
                    Phase::Submitting => return Err(ClassifyError::Busy),
                    Phase::Success | Phase::Failure => return Err(ClassifyError::NotReset),
                }
                self.ticket = Ticket(self.ticket.0 + 1);
                info!("Submitting {} as request #{}", image.source, self.ticket.0);
                self.image = Some(image);
                self.loading = true;
                self.result = None;
                self.error = None;
                self.submitted_at = Some(Local::now());
                self.completed_at = None;
            }
            SessionEvent::Succeeded(ticket, analysis) => {
                if self.is_stale(ticket) {
                    return Ok(());
                }
                self.finish_timing(ticket);
                self.loading = false;
                self.result = Some(analysis);
            }
            SessionEvent::Failed(ticket, reason) => {
                if self.is_stale(ticket) {
                    return Ok(());
                }
                error!("Request #{} failed: {}", ticket.0, reason);
                self.finish_timing(ticket);
                self.loading = false;
                self.error = Some(reason.user_message().to_string());
            }
            SessionEvent::Reset => {
                // keep the counter so in-flight work from before the reset stays stale
                *self = Session {
                    ticket: self.ticket,
                    ..Session::default()
                };
            }
        }
        Ok(())
    }

    fn finish_timing(&mut self, ticket: Ticket) {
        let now = Local::now();
        if let Some(started) = self.submitted_at {
            info!("Request #{} settled after {} ms", ticket.0, (now - started).num_milliseconds());
        }
        self.completed_at = Some(now);
    }

    fn is_stale(&self, ticket: Ticket) -> bool {
        let stale = !self.loading || ticket != self.ticket;
        if stale {
            warn!("Dropping completion of request #{} (session moved on)", ticket.0);
        }
        stale
    }
}

/// A session shared between the UI and the worker that talks to the model.
#[derive(Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    /// Move to `Submitting`, refusing if another request is still out.
    pub fn begin(&self, image: SessionImage) -> Result<Ticket, ClassifyError> {
        let mut session = self.lock();
        session.apply(SessionEvent::Submit(image))?;
        Ok(session.ticket())
    }

    pub fn finish(&self, ticket: Ticket, outcome: Result<WasteAnalysis, ClassifyError>) {
        let event = match outcome {
            Ok(analysis) => SessionEvent::Succeeded(ticket, analysis),
            Err(reason) => SessionEvent::Failed(ticket, reason),
        };
        // completions are never refused
        let _ = self.lock().apply(event);
    }

    pub fn reset(&self) {
        let _ = self.lock().apply(SessionEvent::Reset);
    }

    /// Run the submitted request to completion. The lock is not held during the call.
    pub fn run(&self, connector: &dyn AiConnector, ticket: Ticket, image: EncodedImage) {
        let outcome = classify::classify(connector, image);
        self.finish(ticket, outcome);
    }

    /// Begin, call the model and record the outcome, all on the calling thread.
    pub fn classify_with(&self, connector: &dyn AiConnector, image: SessionImage) -> Result<Phase, ClassifyError> {
        let encoded = image.encoded.clone();
        let ticket = self.begin(image)?;
        self.run(connector, ticket, encoded);
        Ok(self.lock().phase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockConnector;
    use crate::classify::BinCategory;
    use crate::error::USER_FAILURE_MESSAGE;
    use serde_json::json;

    fn photo() -> SessionImage {
        SessionImage {
            source: "battery.jpg".into(),
            encoded: EncodedImage {
                mime_type: "image/jpeg".into(),
                data: "/9j/4AAQ".into(),
            },
        }
    }

    fn battery_reply() -> String {
        json!({
            "category": "RED",
            "binNameEn": "Hazard",
            "binNameUr": "خطرناک",
            "explanationEn": "Battery",
            "explanationUr": "...",
            "identifiedItem": "AA battery"
        })
        .to_string()
    }

    fn battery_analysis() -> WasteAnalysis {
        WasteAnalysis {
            category: BinCategory::Red,
            bin_name_en: "Hazard".into(),
            bin_name_ur: "خطرناک".into(),
            explanation_en: "Battery".into(),
            explanation_ur: "...".into(),
            identified_item: "AA battery".into(),
        }
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = Session::default();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.image().is_none());
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn successful_classification_stores_exact_record() {
        let shared = SharedSession::default();
        let connector = MockConnector::replying(battery_reply());

        let phase = shared.classify_with(&connector, photo()).unwrap();

        assert_eq!(phase, Phase::Success);
        let session = shared.snapshot();
        assert_eq!(session.result(), Some(&battery_analysis()));
        assert!(session.error().is_none());
        assert!(!session.is_loading());
        assert_eq!(session.image(), Some(&photo()));
        assert!(session.completed_at() >= session.submitted_at());
    }

    #[test]
    fn invalid_reply_leaves_result_unset() {
        let shared = SharedSession::default();
        let connector = MockConnector::replying("{\"category\": \"RED\", \"binNameEn\": \"Haz");

        let phase = shared.classify_with(&connector, photo()).unwrap();

        assert_eq!(phase, Phase::Failure);
        let session = shared.snapshot();
        assert!(session.result().is_none());
        assert_eq!(session.error(), Some(USER_FAILURE_MESSAGE));
        assert!(!session.is_loading());
    }

    #[test]
    fn transport_failure_reads_the_same_as_parse_failure() {
        let shared = SharedSession::default();
        let connector = MockConnector::failing(|| ClassifyError::Api {
            status: 403,
            message: "permission denied".into(),
        });

        shared.classify_with(&connector, photo()).unwrap();

        assert_eq!(shared.snapshot().error(), Some(USER_FAILURE_MESSAGE));
    }

    #[test]
    fn reset_after_success_clears_everything() {
        let shared = SharedSession::default();
        let connector = MockConnector::replying(battery_reply());
        shared.classify_with(&connector, photo()).unwrap();

        shared.reset();

        let session = shared.snapshot();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.image().is_none());
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(session.submitted_at().is_none());
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut session = Session::default();
        session.apply(SessionEvent::Submit(photo())).unwrap();

        let err = session.apply(SessionEvent::Submit(photo())).unwrap_err();
        assert!(matches!(err, ClassifyError::Busy));
        assert_eq!(session.phase(), Phase::Submitting);
    }

    #[test]
    fn finished_session_must_be_reset_before_resubmitting() {
        let mut session = Session::default();
        session.apply(SessionEvent::Submit(photo())).unwrap();
        let ticket = session.ticket();
        session
            .apply(SessionEvent::Failed(ticket, ClassifyError::EmptyResponse))
            .unwrap();

        let err = session.apply(SessionEvent::Submit(photo())).unwrap_err();
        assert!(matches!(err, ClassifyError::NotReset));

        session.apply(SessionEvent::Reset).unwrap();
        assert!(session.apply(SessionEvent::Submit(photo())).is_ok());
    }

    #[test]
    fn completion_after_reset_is_dropped() {
        let shared = SharedSession::default();
        let stale = shared.begin(photo()).unwrap();
        shared.reset();

        shared.finish(stale, Ok(battery_analysis()));
        assert_eq!(shared.snapshot().phase(), Phase::Idle);

        let fresh = shared.begin(photo()).unwrap();
        assert_ne!(fresh, stale);
        shared.finish(stale, Err(ClassifyError::EmptyResponse));
        assert_eq!(shared.snapshot().phase(), Phase::Submitting);

        shared.finish(fresh, Ok(battery_analysis()));
        assert_eq!(shared.snapshot().phase(), Phase::Success);
    }

    #[test]
    fn only_one_of_many_concurrent_submits_wins() {
        let shared = SharedSession::default();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.begin(photo()).is_ok())
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(shared.snapshot().ticket(), Ticket(1));
    }
}
