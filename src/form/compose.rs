use std::path::Path;

use tokio::sync::watch;

use crate::api::{CreatePostRequest, PostalLookupOutcome, ResolvedAddress};
use crate::app::Result;
use crate::domain::{Attachment, DraftSubmission, Field};
use crate::form::format::{digits_only, format_phone, format_postal_code, is_complete_postal_code};
use crate::form::preview::ImagePreview;
use crate::form::validate::{validate, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Editing,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// User-visible message raised outside the per-field error set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    GeolocationUnsupported,
    GeolocationFailed(String),
    ReverseGeocodingFailed,
    SubmitFailed,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::GeolocationUnsupported => {
                "Geolocalização não é suportada pelo seu navegador".to_string()
            }
            Notice::GeolocationFailed(reason) => format!("Erro ao obter localização: {reason}"),
            Notice::ReverseGeocodingFailed => "Erro ao obter endereço da localização".to_string(),
            Notice::SubmitFailed => "Erro ao criar publicação. Tente novamente.".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitRejected {
    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("post already submitted; start a new one")]
    AlreadySucceeded,

    #[error("{} field(s) failed validation", .0.len())]
    Invalid(FieldErrors),
}

/// Issued when a postal code becomes complete; only the newest ticket applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    seq: u64,
    digits: String,
}

impl LookupTicket {
    pub fn digits(&self) -> &str {
        &self.digits
    }
}

/// Proof that a geolocation request was started.
#[derive(Debug)]
pub struct LocateTicket {
    _private: (),
}

/// Why a location could not be turned into an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateFailure {
    Unsupported,
    Position(String),
    Address,
}

/// State of one compose session: the draft, its errors and in-flight flags.
///
/// Async work is split into `begin_*`/`apply_*`/`finish_*` pairs so edits can
/// keep flowing while a request is outstanding.
pub struct ComposeForm {
    draft: DraftSubmission,
    errors: FieldErrors,
    phase: SubmissionPhase,
    notice: Option<Notice>,
    preview: Option<ImagePreview>,
    loading_postal_code: bool,
    loading_location: bool,
    lookup_seq: u64,
    revision: watch::Sender<u64>,
}

impl ComposeForm {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            draft: DraftSubmission::default(),
            errors: FieldErrors::new(),
            phase: SubmissionPhase::Editing,
            notice: None,
            preview: None,
            loading_postal_code: false,
            loading_location: false,
            lookup_seq: 0,
            revision,
        }
    }

    pub fn draft(&self) -> &DraftSubmission {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn preview(&self) -> Option<&ImagePreview> {
        self.preview.as_ref()
    }

    pub fn is_loading_postal_code(&self) -> bool {
        self.loading_postal_code
    }

    pub fn is_loading_location(&self) -> bool {
        self.loading_location
    }

    /// Receives the form revision after every visible change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn touch(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn leave_failed(&mut self) {
        if self.phase == SubmissionPhase::Failed {
            self.phase = SubmissionPhase::Editing;
        }
    }

    /// Apply one edit. Phone and postal code are masked; the field's error is
    /// cleared. Returns a lookup ticket when the postal code becomes complete.
    pub fn set_field(&mut self, field: Field, value: &str) -> Option<LookupTicket> {
        let value = match field {
            Field::Phone => format_phone(value),
            Field::PostalCode => format_postal_code(value),
            _ => value.to_string(),
        };

        let ticket = if field == Field::PostalCode && is_complete_postal_code(&value) {
            self.lookup_seq += 1;
            self.loading_postal_code = true;
            Some(LookupTicket {
                seq: self.lookup_seq,
                digits: digits_only(&value),
            })
        } else {
            None
        };

        self.draft.set(field, value);
        self.errors.clear(field);
        self.leave_failed();
        self.touch();
        ticket
    }

    pub fn set_phone(&mut self, raw: &str) {
        self.set_field(Field::Phone, raw);
    }

    pub fn set_postal_code(&mut self, raw: &str) -> Option<LookupTicket> {
        self.set_field(Field::PostalCode, raw)
    }

    /// Apply a finished postal lookup. Returns whether any field changed.
    ///
    /// A ticket superseded by a newer one is dropped. Failures are logged and
    /// otherwise ignored so the user can keep typing the address by hand.
    pub fn apply_postal_lookup(
        &mut self,
        ticket: LookupTicket,
        outcome: Result<PostalLookupOutcome>,
    ) -> bool {
        if ticket.seq != self.lookup_seq {
            tracing::debug!("Discarding stale lookup for {}", ticket.digits);
            return false;
        }
        self.loading_postal_code = false;

        let applied = match outcome {
            Ok(PostalLookupOutcome::Found(address)) => {
                self.draft.address = address.street;
                self.draft.neighborhood = address.neighborhood;
                self.draft.city = address.city;
                self.draft.state = address.state;
                self.errors.clear(Field::Address);
                true
            }
            Ok(PostalLookupOutcome::NotFound) => {
                tracing::debug!("Postal code {} not found", ticket.digits);
                false
            }
            Err(e) => {
                tracing::warn!("Postal lookup for {} failed: {}", ticket.digits, e);
                false
            }
        };
        self.touch();
        applied
    }

    /// Report that the platform has no geolocation capability.
    pub fn report_geolocation_unsupported(&mut self) {
        self.notice = Some(Notice::GeolocationUnsupported);
        self.touch();
    }

    /// `None` while another locate is outstanding.
    pub fn begin_locate(&mut self) -> Option<LocateTicket> {
        if self.loading_location {
            return None;
        }
        self.loading_location = true;
        self.touch();
        Some(LocateTicket { _private: () })
    }

    pub fn finish_locate(
        &mut self,
        _ticket: LocateTicket,
        outcome: std::result::Result<ResolvedAddress, LocateFailure>,
    ) {
        self.loading_location = false;
        match outcome {
            Ok(address) => {
                self.draft.cep = format_postal_code(&address.cep);
                self.draft.address = address.street;
                if let Some(number) = address.number {
                    self.draft.number = number;
                    self.errors.clear(Field::Number);
                }
                self.draft.neighborhood = address.neighborhood;
                self.draft.city = address.city;
                self.draft.state = address.state;
                self.errors.clear(Field::PostalCode);
                self.errors.clear(Field::Address);
                // Outstanding postal lookups must not clobber the located address.
                self.lookup_seq += 1;
                self.loading_postal_code = false;
            }
            Err(LocateFailure::Unsupported) => {
                self.notice = Some(Notice::GeolocationUnsupported);
            }
            Err(LocateFailure::Position(reason)) => {
                self.notice = Some(Notice::GeolocationFailed(reason));
            }
            Err(LocateFailure::Address) => {
                self.notice = Some(Notice::ReverseGeocodingFailed);
            }
        }
        self.touch();
    }

    pub fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.touch();
        }
    }

    /// Replace or clear the attachment; the previous preview is dropped.
    pub fn set_attachment(&mut self, attachment: Option<Attachment>) {
        self.preview = attachment.as_ref().and_then(ImagePreview::from_attachment);
        self.draft.file = attachment;
        self.touch();
    }

    /// Read a file from disk and attach it.
    pub async fn attach_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let attachment = Attachment::from_path(path).await?;
        self.set_attachment(Some(attachment));
        Ok(())
    }

    pub fn clear_attachment(&mut self) {
        self.set_attachment(None);
    }

    /// Validate and, if clean, move to `Submitting` with a request snapshot.
    pub fn begin_submit(&mut self) -> std::result::Result<CreatePostRequest, SubmitRejected> {
        match self.phase {
            SubmissionPhase::Submitting | SubmissionPhase::Validating => {
                return Err(SubmitRejected::AlreadySubmitting)
            }
            SubmissionPhase::Succeeded => return Err(SubmitRejected::AlreadySucceeded),
            SubmissionPhase::Editing | SubmissionPhase::Failed => {}
        }

        self.phase = SubmissionPhase::Validating;
        self.errors = validate(&self.draft);

        if !self.errors.is_empty() {
            self.phase = SubmissionPhase::Editing;
            self.touch();
            return Err(SubmitRejected::Invalid(self.errors.clone()));
        }

        self.phase = SubmissionPhase::Submitting;
        self.notice = None;
        self.touch();
        Ok(CreatePostRequest::from(&self.draft))
    }

    /// Record the create-post response. Failures keep the draft intact.
    pub fn finish_submit(&mut self, outcome: Result<()>) {
        if self.phase != SubmissionPhase::Submitting {
            tracing::warn!("Ignoring submit result outside of a submission");
            return;
        }

        match outcome {
            Ok(()) => {
                tracing::info!("Post submitted");
                self.phase = SubmissionPhase::Succeeded;
                self.draft = DraftSubmission::default();
                self.errors = FieldErrors::new();
                self.preview = None;
                // A lookup landing now would refill the cleared draft.
                self.lookup_seq += 1;
                self.loading_postal_code = false;
            }
            Err(e) => {
                tracing::warn!("Post submission failed: {}", e);
                self.phase = SubmissionPhase::Failed;
                self.notice = Some(Notice::SubmitFailed);
            }
        }
        self.touch();
    }

    /// Leave the success screen for a fresh compose session.
    pub fn start_new(&mut self) {
        self.draft = DraftSubmission::default();
        self.errors = FieldErrors::new();
        self.phase = SubmissionPhase::Editing;
        self.notice = None;
        self.preview = None;
        self.loading_postal_code = false;
        self.loading_location = false;
        // Keep counting so lookups from the old session stay stale.
        self.lookup_seq += 1;
        self.touch();
    }
}

impl Default for ComposeForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SosError;

    fn found(street: &str) -> PostalLookupOutcome {
        PostalLookupOutcome::Found(ResolvedAddress {
            cep: "01310-100".into(),
            street: street.into(),
            number: None,
            neighborhood: "Bela Vista".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
        })
    }

    fn filled_form() -> ComposeForm {
        let mut form = ComposeForm::new();
        form.set_field(Field::Name, "Carlos");
        form.set_field(Field::Content, "Deslizamento de terra na encosta");
        form.set_field(Field::Category, "landslide");
        form.set_phone("11988887777");
        let _ = form.set_postal_code("04001000");
        form.set_field(Field::Address, "Rua Tutóia");
        form.set_field(Field::Number, "12");
        form
    }

    #[test]
    fn test_set_field_masks_phone_and_postal_code() {
        let mut form = ComposeForm::new();
        form.set_phone("11999998888");
        assert_eq!(form.draft().phone, "(11) 99999-8888");

        assert!(form.set_postal_code("0131").is_none());
        assert_eq!(form.draft().cep, "0131");
        assert!(!form.is_loading_postal_code());
    }

    #[test]
    fn test_complete_postal_code_issues_ticket() {
        let mut form = ComposeForm::new();
        let ticket = form.set_postal_code("01310100").unwrap();
        assert_eq!(ticket.digits(), "01310100");
        assert_eq!(form.draft().cep, "01310-100");
        assert!(form.is_loading_postal_code());
    }

    #[test]
    fn test_edit_clears_only_that_fields_error() {
        let mut form = ComposeForm::new();
        tokio_test::assert_err!(form.begin_submit());
        assert_eq!(form.errors().len(), 7);

        form.set_field(Field::Name, "Bia");
        assert!(!form.errors().contains(Field::Name));
        assert_eq!(form.errors().len(), 6);
    }

    #[test]
    fn test_lookup_found_overwrites_address_fields() {
        let mut form = ComposeForm::new();
        let _ = form.begin_submit();
        assert!(form.errors().contains(Field::Address));

        let ticket = form.set_postal_code("01310100").unwrap();
        assert!(form.apply_postal_lookup(ticket, Ok(found("Avenida Paulista"))));
        assert_eq!(form.draft().address, "Avenida Paulista");
        assert_eq!(form.draft().neighborhood, "Bela Vista");
        assert_eq!(form.draft().city, "São Paulo");
        assert_eq!(form.draft().state, "SP");
        assert!(!form.errors().contains(Field::Address));
        assert!(!form.is_loading_postal_code());
    }

    #[test]
    fn test_lookup_not_found_preserves_manual_entry() {
        let mut form = ComposeForm::new();
        form.set_field(Field::Address, "Rua Manual");
        form.set_field(Field::Neighborhood, "Bairro");
        form.set_field(Field::City, "Cidade");
        form.set_field(Field::State, "MG");
        let before = form.draft().clone();

        let ticket = form.set_postal_code("99999999").unwrap();
        assert!(!form.apply_postal_lookup(ticket, Ok(PostalLookupOutcome::NotFound)));
        assert_eq!(form.draft().address, before.address);
        assert_eq!(form.draft().neighborhood, before.neighborhood);
        assert_eq!(form.draft().city, before.city);
        assert_eq!(form.draft().state, before.state);
        assert!(!form.is_loading_postal_code());
    }

    #[test]
    fn test_lookup_failure_is_silent() {
        let mut form = ComposeForm::new();
        form.set_field(Field::Address, "Rua Manual");
        let ticket = form.set_postal_code("01310100").unwrap();

        assert!(!form.apply_postal_lookup(ticket, Err(SosError::Status(503))));
        assert_eq!(form.draft().address, "Rua Manual");
        assert!(form.errors().is_empty());
        assert!(form.notice().is_none());
    }

    #[test]
    fn test_stale_lookup_is_discarded_and_newest_applies() {
        let mut form = ComposeForm::new();
        let first = form.set_postal_code("01310100").unwrap();
        let second = form.set_postal_code("04001000").unwrap();

        assert!(form.apply_postal_lookup(second, Ok(found("Rua Nova"))));
        assert!(!form.apply_postal_lookup(first, Ok(found("Rua Velha"))));
        assert_eq!(form.draft().address, "Rua Nova");
    }

    #[test]
    fn test_lookup_applies_after_partial_edit() {
        let mut form = ComposeForm::new();
        let ticket = form.set_postal_code("01310100").unwrap();
        // User deletes a digit while the lookup is in flight.
        assert!(form.set_postal_code("0131010").is_none());

        assert!(form.apply_postal_lookup(ticket, Ok(found("Avenida Paulista"))));
        assert_eq!(form.draft().address, "Avenida Paulista");
        assert_eq!(form.draft().cep, "01310-10");
    }

    #[test]
    fn test_locate_is_exclusive() {
        let mut form = ComposeForm::new();
        let ticket = form.begin_locate().unwrap();
        assert!(form.is_loading_location());
        assert!(form.begin_locate().is_none());

        form.finish_locate(ticket, Err(LocateFailure::Position("denied".into())));
        assert!(!form.is_loading_location());
        assert!(form.begin_locate().is_some());
    }

    #[test]
    fn test_locate_success_overwrites_and_clears_errors() {
        let mut form = ComposeForm::new();
        let _ = form.begin_submit();
        let pending = form.set_postal_code("99999999").unwrap();

        let ticket = form.begin_locate().unwrap();
        form.finish_locate(
            ticket,
            Ok(ResolvedAddress {
                cep: "01310100".into(),
                street: "Av. Paulista".into(),
                number: Some("1000".into()),
                neighborhood: "Bela Vista".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
            }),
        );

        assert_eq!(form.draft().cep, "01310-100");
        assert_eq!(form.draft().address, "Av. Paulista");
        assert_eq!(form.draft().number, "1000");
        assert!(!form.errors().contains(Field::PostalCode));
        assert!(!form.errors().contains(Field::Address));
        assert!(!form.is_loading_location());

        // The older lookup no longer wins.
        assert!(!form.apply_postal_lookup(pending, Ok(found("Rua Velha"))));
        assert_eq!(form.draft().address, "Av. Paulista");
    }

    #[test]
    fn test_locate_failure_surfaces_notice_without_changes() {
        let mut form = ComposeForm::new();
        form.set_field(Field::Address, "Rua Manual");
        let ticket = form.begin_locate().unwrap();
        form.finish_locate(ticket, Err(LocateFailure::Address));

        assert_eq!(form.draft().address, "Rua Manual");
        assert_eq!(form.notice(), Some(&Notice::ReverseGeocodingFailed));
        form.dismiss_notice();
        assert!(form.notice().is_none());
    }

    #[test]
    fn test_invalid_submit_never_reaches_submitting() {
        let mut form = filled_form();
        form.set_field(Field::Content, "ok");
        match form.begin_submit() {
            Err(SubmitRejected::Invalid(errors)) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec![Field::Content]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(form.phase(), SubmissionPhase::Editing);
    }

    #[test]
    fn test_resubmit_while_submitting_is_rejected() {
        let mut form = filled_form();
        let request = tokio_test::assert_ok!(form.begin_submit());
        assert_eq!(request.title, "Carlos");
        assert_eq!(request.phone, "(11) 98888-7777");
        assert_eq!(form.phase(), SubmissionPhase::Submitting);

        assert!(matches!(
            form.begin_submit(),
            Err(SubmitRejected::AlreadySubmitting)
        ));
    }

    #[test]
    fn test_successful_submit_resets_draft_and_preview() {
        let mut form = filled_form();
        form.set_attachment(Some(Attachment::new("a.png", "image/png", vec![1, 2])));
        assert!(form.preview().is_some());

        let _ = form.begin_submit().unwrap();
        form.finish_submit(Ok(()));

        assert_eq!(form.phase(), SubmissionPhase::Succeeded);
        assert!(form.draft().is_empty());
        assert!(form.preview().is_none());
        assert!(matches!(
            form.begin_submit(),
            Err(SubmitRejected::AlreadySucceeded)
        ));

        form.start_new();
        assert_eq!(form.phase(), SubmissionPhase::Editing);
    }

    #[test]
    fn test_lookup_after_successful_submit_is_discarded() {
        let mut form = filled_form();
        let ticket = form.set_postal_code("04001000").unwrap();
        let _ = form.begin_submit().unwrap();
        form.finish_submit(Ok(()));
        assert!(!form.is_loading_postal_code());

        assert!(!form.apply_postal_lookup(ticket, Ok(found("Rua Atrasada"))));
        assert_eq!(form.phase(), SubmissionPhase::Succeeded);
        assert!(form.draft().is_empty());
    }

    #[test]
    fn test_edits_flow_while_submit_is_in_flight() {
        let mut form = filled_form();
        let _request = form.begin_submit().unwrap();

        form.set_field(Field::Number, "99");
        assert_eq!(form.draft().number, "99");
        assert_eq!(form.phase(), SubmissionPhase::Submitting);
        assert!(matches!(
            form.begin_submit(),
            Err(SubmitRejected::AlreadySubmitting)
        ));

        form.finish_submit(Err(SosError::Status(502)));
        assert_eq!(form.draft().number, "99");
        assert_eq!(form.phase(), SubmissionPhase::Failed);
    }

    #[test]
    fn test_locate_unsupported_failure_sets_notice() {
        let mut form = ComposeForm::new();
        let ticket = form.begin_locate().unwrap();
        form.finish_locate(ticket, Err(LocateFailure::Unsupported));
        assert_eq!(form.notice(), Some(&Notice::GeolocationUnsupported));
        assert!(!form.is_loading_location());
    }

    #[test]
    fn test_failed_submit_preserves_draft() {
        let mut form = filled_form();
        let before = form.draft().clone();

        let _ = form.begin_submit().unwrap();
        form.finish_submit(Err(SosError::Status(500)));

        assert_eq!(form.phase(), SubmissionPhase::Failed);
        assert_eq!(form.draft(), &before);
        assert_eq!(form.notice(), Some(&Notice::SubmitFailed));

        form.set_field(Field::Number, "13");
        assert_eq!(form.phase(), SubmissionPhase::Editing);
        tokio_test::assert_ok!(form.begin_submit());
    }

    #[test]
    fn test_replacing_attachment_drops_preview() {
        let mut form = ComposeForm::new();
        form.set_attachment(Some(Attachment::new("a.png", "image/png", vec![1])));
        assert!(form.preview().is_some());

        form.set_attachment(Some(Attachment::new("a.pdf", "application/pdf", vec![1])));
        assert!(form.preview().is_none());
        assert!(form.draft().file.is_some());

        form.clear_attachment();
        assert!(form.draft().file.is_none());
    }

    #[tokio::test]
    async fn test_attach_file_reads_and_previews() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, [0xff, 0xd8]).unwrap();

        let mut form = ComposeForm::new();
        form.attach_file(&path).await.unwrap();
        assert_eq!(form.draft().file.as_ref().unwrap().file_name, "photo.jpg");
        assert!(form.preview().unwrap().data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_revisions_are_published() {
        let mut form = ComposeForm::new();
        let rx = form.subscribe();
        form.set_field(Field::Name, "x");
        form.set_phone("11");
        assert_eq!(*rx.borrow(), 2);
    }
}
