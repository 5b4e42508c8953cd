//! Per-session form state.
//!
//! The in-flight flag and the submitted selection live in one `Phase`, so
//! disabling re-submission and applying a result happen in the same state
//! transition. Requests are tagged with a ticket; a result that does not match
//! the current ticket is dropped.

use crate::data::PredictionError;
use crate::domain::{FormDraft, FormSelection, PredictionSource};

use super::pipeline::{Outcome, SubmitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// A short message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn incomplete() -> Self {
        Self {
            title: "Campos obrigatórios",
            description: "Por favor, preencha todos os campos para obter a previsão.".to_string(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn prediction_failed() -> Self {
        Self {
            title: "Erro na previsão",
            description: "Houve um problema ao calcular a previsão. Tente novamente.".to_string(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn success(source: PredictionSource, failure: Option<&PredictionError>) -> Self {
        match source {
            PredictionSource::Remote => Self {
                title: "Previsão calculada!",
                description: "Resultados dos 4 algoritmos obtidos com sucesso!".to_string(),
                variant: NoticeVariant::Default,
            },
            PredictionSource::LocalFallback => Self {
                title: "Estimativa local",
                description: match failure {
                    Some(err) => format!("API indisponível ({err}); exibindo estimativa por pontuação."),
                    None => "API indisponível; exibindo estimativa por pontuação.".to_string(),
                },
                variant: NoticeVariant::Default,
            },
        }
    }

    pub fn for_error(err: &SubmitError) -> Self {
        match err {
            SubmitError::Incomplete(_) => Self::incomplete(),
            SubmitError::Prediction(_) => Self::prediction_failed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting { ticket: u64 },
    Showing(Outcome),
}

/// Handle for one outstanding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub selection: FormSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    draft: FormDraft,
    phase: Phase,
    notice: Option<Notice>,
    next_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(FormDraft::default())
    }
}

impl Session {
    pub fn new(draft: FormDraft) -> Self {
        Self {
            draft,
            phase: Phase::Editing,
            notice: None,
            next_ticket: 1,
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FormDraft {
        &mut self.draft
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Submitting { .. })
    }

    /// Validate the draft and enter `Submitting`.
    ///
    /// Returns `None` while a request is already in flight, or when the draft
    /// is incomplete (which also posts the "required fields" notice).
    pub fn begin_submit(&mut self) -> Option<Ticket> {
        if self.is_busy() {
            return None;
        }

        match self.draft.complete() {
            Ok(selection) => {
                let id = self.next_ticket;
                self.next_ticket += 1;
                self.phase = Phase::Submitting { ticket: id };
                self.notice = None;
                Some(Ticket { id, selection })
            }
            Err(_) => {
                self.notice = Some(Notice::incomplete());
                None
            }
        }
    }

    /// Apply the result of ticket `id`, leaving `Submitting`.
    ///
    /// Success moves to `Showing`; failure returns to `Editing` with a notice.
    /// Returns `false` when the ticket is stale.
    pub fn settle(&mut self, id: u64, result: Result<Outcome, SubmitError>) -> bool {
        if !matches!(self.phase, Phase::Submitting { ticket } if ticket == id) {
            return false;
        }

        match result {
            Ok(outcome) => {
                self.notice = Some(Notice::success(outcome.source, outcome.failure.as_ref()));
                self.phase = Phase::Showing(outcome);
            }
            Err(err) => {
                self.notice = Some(Notice::for_error(&err));
                self.phase = Phase::Editing;
            }
        }
        true
    }

    /// Leave the results view, keeping the draft.
    pub fn back_to_form(&mut self) {
        if matches!(self.phase, Phase::Showing(_)) {
            self.phase = Phase::Editing;
            self.notice = None;
        }
    }

    /// Leave the results view with a fresh form.
    pub fn new_prediction(&mut self) {
        if matches!(self.phase, Phase::Showing(_)) {
            self.draft = FormDraft::default();
            self.phase = Phase::Editing;
            self.notice = None;
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PredictionResult;

    fn filled() -> FormDraft {
        FormDraft {
            experience_level: Some("MI".to_string()),
            employment_type: Some("FT".to_string()),
            job_title: Some("Data Scientist".to_string()),
            employee_residence: Some("CA".to_string()),
            remote_ratio: Some(50),
            company_location: Some("CA".to_string()),
            company_size: Some("M".to_string()),
        }
    }

    fn remote_outcome(selection: FormSelection) -> Outcome {
        Outcome {
            selection,
            predictions: PredictionResult::uniform("100k–150k"),
            source: PredictionSource::Remote,
            failure: None,
        }
    }

    #[test]
    fn incomplete_draft_posts_notice_and_stays_editing() {
        let mut session = Session::default();
        assert!(session.begin_submit().is_none());
        assert_eq!(session.phase(), &Phase::Editing);
        assert_eq!(session.notice(), Some(&Notice::incomplete()));
        assert_eq!(session.notice().map(|n| n.variant), Some(NoticeVariant::Destructive));
    }

    #[test]
    fn second_submit_is_rejected_while_in_flight() {
        let mut session = Session::new(filled());
        let ticket = session.begin_submit().unwrap();
        assert!(session.is_busy());
        assert!(session.begin_submit().is_none());

        assert!(session.settle(ticket.id, Ok(remote_outcome(ticket.selection.clone()))));
        assert!(!session.is_busy());
        match session.phase() {
            Phase::Showing(outcome) => assert_eq!(outcome.selection, ticket.selection),
            other => panic!("expected results, got {other:?}"),
        }
    }

    #[test]
    fn failure_returns_to_form_with_destructive_notice() {
        let mut session = Session::new(filled());
        let ticket = session.begin_submit().unwrap();
        session.settle(ticket.id, Err(SubmitError::Prediction(PredictionError::Status(500))));
        assert_eq!(session.phase(), &Phase::Editing);
        assert_eq!(session.notice(), Some(&Notice::prediction_failed()));
        // The draft survives so the user can retry.
        assert!(session.draft().is_complete());
        assert!(session.begin_submit().is_some());
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut session = Session::new(filled());
        let ticket = session.begin_submit().unwrap();
        assert!(!session.settle(ticket.id + 1, Ok(remote_outcome(ticket.selection.clone()))));
        assert!(session.is_busy());
    }

    #[test]
    fn new_prediction_resets_the_form() {
        let mut session = Session::new(filled());
        let ticket = session.begin_submit().unwrap();
        session.settle(ticket.id, Ok(remote_outcome(ticket.selection)));

        session.back_to_form();
        assert_eq!(session.phase(), &Phase::Editing);
        assert!(session.draft().is_complete());

        let ticket = session.begin_submit().unwrap();
        session.settle(ticket.id, Ok(remote_outcome(ticket.selection)));
        session.new_prediction();
        assert_eq!(session.draft(), &FormDraft::default());
    }

    #[test]
    fn fallback_notice_mentions_the_failure() {
        let notice = Notice::success(PredictionSource::LocalFallback, Some(&PredictionError::Status(503)));
        assert_eq!(notice.variant, NoticeVariant::Default);
        assert!(notice.description.contains("503"));
    }
}
