use std::sync::Arc;
use std::time::Duration;

use crate::api::{CreatePostRequest, PostsApi};
use crate::app::{Result, SosError};
use crate::form::compose::{ComposeForm, SubmissionPhase, SubmitRejected};

/// What a submit attempt ended in.
#[derive(Debug)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    Rejected(SubmitRejected),
}

/// Validate → multipart → create, driving the form's phase transitions.
pub struct SubmissionPipeline {
    api: Arc<dyn PostsApi + Send + Sync>,
    timeout: Duration,
}

impl SubmissionPipeline {
    pub fn new(api: Arc<dyn PostsApi + Send + Sync>) -> Self {
        Self {
            api,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn submit(&self, form: &mut ComposeForm) -> SubmitOutcome {
        let request = match form.begin_submit() {
            Ok(request) => request,
            Err(rejected) => return SubmitOutcome::Rejected(rejected),
        };

        let result = self.send(&request).await;
        form.finish_submit(result);

        match form.phase() {
            SubmissionPhase::Succeeded => SubmitOutcome::Succeeded,
            _ => SubmitOutcome::Failed,
        }
    }

    /// Create the post from a snapshot taken by [`ComposeForm::begin_submit`],
    /// bounded by the pipeline timeout. The form stays free for edits meanwhile.
    pub async fn send(&self, request: &CreatePostRequest) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.api.create_post(request)).await {
            Ok(result) => result,
            Err(_) => Err(SosError::Timeout("post submission".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, PostRecord};
    use crate::form::compose::Notice;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingApi {
        status: Option<u16>,
        requests: Mutex<Vec<CreatePostRequest>>,
    }

    #[async_trait]
    impl PostsApi for RecordingApi {
        async fn list_posts(&self, _page: u32) -> Result<Vec<PostRecord>> {
            Ok(Vec::new())
        }

        async fn create_post(&self, request: &CreatePostRequest) -> Result<()> {
            self.requests.lock().unwrap().push(request.clone());
            match self.status {
                Some(code) => Err(SosError::Status(code)),
                None => Ok(()),
            }
        }
    }

    struct HangingApi;

    #[async_trait]
    impl PostsApi for HangingApi {
        async fn list_posts(&self, _page: u32) -> Result<Vec<PostRecord>> {
            Ok(Vec::new())
        }

        async fn create_post(&self, _request: &CreatePostRequest) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn filled_form() -> ComposeForm {
        let mut form = ComposeForm::new();
        form.set_field(Field::Name, "Paula");
        form.set_field(Field::Content, "Queda de energia no bairro todo");
        form.set_field(Field::Category, "power");
        form.set_phone("2133334444");
        let _ = form.set_postal_code("20040002");
        form.set_field(Field::Address, "Rua da Assembleia");
        form.set_field(Field::Number, "10");
        form
    }

    #[tokio::test]
    async fn test_invalid_draft_makes_no_request() {
        let api = Arc::new(RecordingApi::default());
        let pipeline = SubmissionPipeline::new(api.clone());
        let mut form = ComposeForm::new();
        form.set_field(Field::Content, "ok");

        let outcome = pipeline.submit(&mut form).await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(SubmitRejected::Invalid(_))));
        assert!(api.requests.lock().unwrap().is_empty());
        assert!(form.errors().contains(Field::Content));
    }

    #[tokio::test]
    async fn test_success_sends_snapshot_and_resets() {
        let api = Arc::new(RecordingApi::default());
        let pipeline = SubmissionPipeline::new(api.clone());
        let mut form = filled_form();

        let outcome = pipeline.submit(&mut form).await;
        assert!(matches!(outcome, SubmitOutcome::Succeeded));

        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].title, "Paula");
        assert_eq!(requests[0].phone, "(21) 3333-4444");
        assert_eq!(requests[0].cep, "20040-002");
        assert!(form.draft().is_empty());
    }

    #[tokio::test]
    async fn test_non_2xx_preserves_draft() {
        let api = Arc::new(RecordingApi {
            status: Some(500),
            ..Default::default()
        });
        let pipeline = SubmissionPipeline::new(api);
        let mut form = filled_form();
        let before = form.draft().clone();

        let outcome = pipeline.submit(&mut form).await;
        assert!(matches!(outcome, SubmitOutcome::Failed));
        assert_eq!(form.draft(), &before);
        assert_eq!(form.notice(), Some(&Notice::SubmitFailed));
    }

    #[tokio::test]
    async fn test_send_leaves_form_editable() {
        let api = Arc::new(RecordingApi::default());
        let pipeline = SubmissionPipeline::new(api.clone());
        let mut form = filled_form();

        let request = form.begin_submit().unwrap();
        let pending = pipeline.send(&request);
        form.set_field(Field::Neighborhood, "Centro");
        assert_eq!(form.phase(), SubmissionPhase::Submitting);

        form.finish_submit(pending.await);
        assert_eq!(form.phase(), SubmissionPhase::Succeeded);
        assert_eq!(api.requests.lock().unwrap()[0].neighborhood, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_times_out() {
        let pipeline =
            SubmissionPipeline::new(Arc::new(HangingApi)).with_timeout(Duration::from_secs(5));
        let form = filled_form();
        let request = CreatePostRequest::from(form.draft());
        tokio_test::assert_err!(pipeline.send(&request).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let pipeline =
            SubmissionPipeline::new(Arc::new(HangingApi)).with_timeout(Duration::from_secs(5));
        let mut form = filled_form();

        let outcome = pipeline.submit(&mut form).await;
        assert!(matches!(outcome, SubmitOutcome::Failed));
        assert_eq!(form.phase(), SubmissionPhase::Failed);
        assert_eq!(form.draft().name, "Paula");
    }
}
