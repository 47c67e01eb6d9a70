use crate::error::EMPTY_DESCRIPTION_ERROR;
use crate::export;
use crate::models::clamp_top_n;
use crate::traits::RankingService;
use crate::{
    ConsoleConfig, MatchError, MatchRequest, MatchResponse, Query, RequestState, ResultSet,
};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One outstanding request, handed out by [`MatchConsole::begin_submit`].
///
/// Not `Clone`: completing a ticket consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct SubmissionTicket {
    id: Uuid,
    request: MatchRequest,
}

impl SubmissionTicket {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &MatchRequest {
        &self.request
    }
}

/// Holds the user's query, the request lifecycle and the last ranked results.
pub struct MatchConsole<S>
where
    S: RankingService,
{
    service: S,
    config: ConsoleConfig,
    query: Query,
    state: RequestState,
    result_set: Option<ResultSet>,
    pending: HashSet<Uuid>,
}

impl<S> MatchConsole<S>
where
    S: RankingService + Send + Sync,
{
    pub fn new(service: S, config: ConsoleConfig) -> Self {
        Self {
            service,
            config,
            query: Query::default(),
            state: RequestState::Idle,
            result_set: None,
            pending: HashSet::new(),
        }
    }

    pub async fn submit(&mut self, query: Query) -> Result<&ResultSet, MatchError> {
        let ticket = self.begin_submit(query)?;
        let outcome = self.service.rank(ticket.request()).await;
        self.complete(ticket, outcome)
    }

    /// Validates and records `query`, clearing earlier results and errors.
    ///
    /// The caller is expected to send `ticket.request()` and hand the outcome
    /// to [`MatchConsole::complete`].
    pub fn begin_submit(&mut self, query: Query) -> Result<SubmissionTicket, MatchError> {
        self.query = Query {
            top_n: clamp_top_n(query.top_n),
            ..query
        };
        self.result_set = None;

        if self.query.is_blank() {
            self.state = RequestState::Failed(EMPTY_DESCRIPTION_ERROR.to_string());
            return Err(MatchError::Validation(EMPTY_DESCRIPTION_ERROR.to_string()));
        }

        if !self.pending.is_empty() {
            warn!(
                outstanding = self.pending.len(),
                "submitting while a request is still pending"
            );
        }

        let ticket = SubmissionTicket {
            id: Uuid::new_v4(),
            request: MatchRequest::from(&self.query),
        };
        self.state = RequestState::InFlight;
        self.pending.insert(ticket.id);

        info!(
            submission = %ticket.id,
            num_candidates = ticket.request.num_candidates,
            include_analysis = ticket.request.include_analysis,
            "ranking request started"
        );
        Ok(ticket)
    }

    /// Applies the outcome of a ticket. The most recently completed ticket
    /// always determines the console state; tickets this console did not
    /// issue are rejected and leave the state untouched.
    pub fn complete(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<MatchResponse, MatchError>,
    ) -> Result<&ResultSet, MatchError> {
        if !self.pending.remove(&ticket.id) {
            warn!(submission = %ticket.id, "ignoring outcome for an unknown submission");
            return Err(MatchError::UnknownSubmission(ticket.id.to_string()));
        }

        match outcome {
            Ok(response) => {
                info!(
                    submission = %ticket.id,
                    candidates = response.ranked_candidates.len(),
                    "ranking request succeeded"
                );
                self.state = RequestState::Succeeded;
                let result_set = self
                    .result_set
                    .insert(ResultSet::new(response, self.query.top_n));
                Ok(&*result_set)
            }
            Err(error) => {
                let message = error.display_message();
                warn!(submission = %ticket.id, error = %error, "ranking request failed");
                self.result_set = None;
                self.state = RequestState::Failed(message);
                Err(error)
            }
        }
    }

    /// Re-slices the shown candidates without contacting the service.
    pub fn set_visible_count(&mut self, count: usize) {
        self.query.top_n = clamp_top_n(count);
        if let Some(result_set) = self.result_set.as_mut() {
            result_set.set_visible_count(self.query.top_n);
            debug!(
                visible = result_set.visible().len(),
                fetched = result_set.all_ranked().len(),
                "visible window changed"
            );
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.query.description = description.into();
    }

    pub fn set_include_analysis(&mut self, include_analysis: bool) {
        self.query.include_analysis = include_analysis;
    }

    pub fn export_text(&self) -> Option<String> {
        self.result_set.as_ref().map(export::export_text)
    }

    pub async fn export_to(&self, path: &Path) -> Result<(), MatchError> {
        let text = self.export_text().ok_or(MatchError::NothingToExport)?;
        export::write_export(path, &text).await
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        self.result_set.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_busy()
    }

    pub fn can_export(&self) -> bool {
        self.result_set.is_some()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Analysis, AnalysisEntry, RankedCandidate};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use url::Url;

    enum Scripted {
        Ranked(MatchResponse),
        Rejected(Option<String>),
        Unreachable,
    }

    struct FakeRankingService {
        script: Scripted,
        calls: AtomicUsize,
        last_request: Mutex<Option<MatchRequest>>,
    }

    impl FakeRankingService {
        fn new(script: Scripted) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RankingService for FakeRankingService {
        async fn rank(&self, request: &MatchRequest) -> Result<MatchResponse, MatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.script {
                Scripted::Ranked(response) => Ok(response.clone()),
                Scripted::Rejected(detail) => Err(MatchError::Service {
                    status: 500,
                    message: detail
                        .clone()
                        .unwrap_or_else(|| crate::error::GENERIC_SERVICE_ERROR.to_string()),
                }),
                Scripted::Unreachable => {
                    Err(MatchError::Transport("connection refused".to_string()))
                }
            }
        }

        fn resume_url(&self, file_name: &str) -> Url {
            Url::parse("http://fake/resumes/").unwrap().join(file_name).unwrap()
        }
    }

    fn ranked(count: usize) -> MatchResponse {
        MatchResponse {
            ranked_candidates: (0..count)
                .map(|index| RankedCandidate {
                    file_name: format!("candidate-{index}.pdf"),
                    similarity_score: Some(0.9 - index as f64 * 0.05),
                })
                .collect(),
            analysis: Some(Analysis::Entries(vec![AnalysisEntry {
                file_name: "candidate-0.pdf".to_string(),
                analysis: "solid match".to_string(),
            }])),
        }
    }

    fn console(script: Scripted) -> MatchConsole<FakeRankingService> {
        MatchConsole::new(FakeRankingService::new(script), ConsoleConfig::default())
    }

    #[tokio::test]
    async fn successful_submit_shows_top_n_prefix() {
        for (top_n, fetched) in [(3, 10), (5, 2), (20, 20), (1, 0)] {
            let mut console = console(Scripted::Ranked(ranked(fetched)));
            let result = console
                .submit(Query::new("Senior Rust engineer").with_top_n(top_n))
                .await
                .expect("submit should succeed");

            let expected = top_n.min(fetched);
            assert_eq!(result.visible().len(), expected);
            assert_eq!(result.visible(), &result.all_ranked()[..expected]);
            assert_eq!(console.state(), &RequestState::Succeeded);
            assert!(console.can_submit());
        }
    }

    #[tokio::test]
    async fn request_carries_the_full_query() {
        let mut console = console(Scripted::Ranked(ranked(4)));
        console
            .submit(Query::new("Data engineer").with_top_n(4).with_analysis(false))
            .await
            .unwrap();

        let sent = console.service().last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            sent,
            MatchRequest {
                description: "Data engineer".to_string(),
                include_analysis: false,
                num_candidates: 4,
            }
        );
    }

    #[tokio::test]
    async fn changing_visible_count_never_requeries() {
        let mut console = console(Scripted::Ranked(ranked(8)));
        console.submit(Query::new("backend").with_top_n(5)).await.unwrap();
        assert_eq!(console.service().calls(), 1);

        for count in [1, 3, 8, 12, 20] {
            console.set_visible_count(count);
            let result = console.result_set().unwrap();
            let expected = count.min(result.all_ranked().len());
            assert_eq!(result.visible(), &result.all_ranked()[..expected]);
            assert_eq!(console.state(), &RequestState::Succeeded);
        }
        assert_eq!(console.service().calls(), 1);
        assert_eq!(console.query().top_n, 20);
    }

    #[tokio::test]
    async fn blank_description_is_rejected_without_a_request() {
        let mut console = console(Scripted::Ranked(ranked(3)));
        console.submit(Query::new("first")).await.unwrap();

        let error = console.submit(Query::new("   \n\t")).await.unwrap_err();
        assert!(matches!(error, MatchError::Validation(_)));
        assert_eq!(console.service().calls(), 1);
        assert_eq!(console.error_message(), Some(EMPTY_DESCRIPTION_ERROR));
        assert!(console.result_set().is_none());
        assert!(!console.can_export());
    }

    #[tokio::test]
    async fn service_detail_is_displayed_verbatim() {
        let mut console = console(Scripted::Rejected(Some("X".to_string())));
        let error = console.submit(Query::new("ops")).await.unwrap_err();
        assert!(matches!(error, MatchError::Service { .. }));
        assert_eq!(console.error_message(), Some("X"));
    }

    #[tokio::test]
    async fn missing_detail_falls_back_to_generic_message() {
        let mut console = console(Scripted::Rejected(None));
        console.submit(Query::new("ops")).await.unwrap_err();
        assert_eq!(console.error_message(), Some("Server error"));
    }

    #[tokio::test]
    async fn transport_failure_is_reported_inline() {
        let mut console = console(Scripted::Unreachable);
        console.submit(Query::new("ops")).await.unwrap_err();
        assert_eq!(console.error_message(), Some("connection refused"));
        assert!(!console.is_busy());
    }

    #[tokio::test]
    async fn new_submission_clears_previous_results_immediately() {
        let mut console = console(Scripted::Ranked(ranked(3)));
        console.submit(Query::new("first")).await.unwrap();
        assert!(console.result_set().is_some());

        let ticket = console.begin_submit(Query::new("second")).unwrap();
        assert!(console.result_set().is_none());
        assert_eq!(console.state(), &RequestState::InFlight);
        assert!(console.is_busy());
        assert!(!console.can_submit());
        assert_eq!(ticket.request().description, "second");
    }

    #[test]
    fn last_completed_ticket_wins() {
        let mut console = console(Scripted::Unreachable);
        let first = console.begin_submit(Query::new("first").with_top_n(2)).unwrap();
        let second = console.begin_submit(Query::new("second").with_top_n(2)).unwrap();
        assert_ne!(first.id(), second.id());

        console
            .complete(second, Err(MatchError::Transport("timed out".to_string())))
            .unwrap_err();
        assert!(console.is_busy());

        console.complete(first, Ok(ranked(4))).unwrap();
        assert_eq!(console.state(), &RequestState::Succeeded);
        assert_eq!(console.result_set().unwrap().visible().len(), 2);
        assert!(!console.is_busy());
    }

    #[test]
    fn foreign_ticket_does_not_release_a_pending_request() {
        let mut other = console(Scripted::Unreachable);
        let mut console = console(Scripted::Unreachable);
        let first = console.begin_submit(Query::new("first")).unwrap();
        let second = console.begin_submit(Query::new("second")).unwrap();
        let stray = other.begin_submit(Query::new("stray")).unwrap();

        console.complete(first, Ok(ranked(3))).unwrap();
        let error = console.complete(stray, Ok(ranked(1))).unwrap_err();
        assert!(matches!(error, MatchError::UnknownSubmission(_)));
        assert!(console.is_busy());
        assert!(!console.can_submit());
        assert_eq!(console.state(), &RequestState::Succeeded);
        assert_eq!(console.result_set().unwrap().all_ranked().len(), 3);

        console.complete(second, Ok(ranked(2))).unwrap();
        assert!(!console.is_busy());
        assert!(console.can_submit());
        assert!(other.is_busy());
    }

    #[tokio::test]
    async fn candidate_links_are_resolved_by_the_service() {
        let mut console = console(Scripted::Ranked(ranked(1)));
        console.submit(Query::new("backend")).await.unwrap();

        let text = crate::render_candidates(console.result_set().unwrap(), console.service());
        assert!(text.ends_with("http://fake/resumes/candidate-0.pdf"));
    }

    #[tokio::test]
    async fn export_is_unavailable_without_results() {
        let console = console(Scripted::Ranked(ranked(1)));
        assert!(console.export_text().is_none());
        let dir = tempfile::tempdir().unwrap();
        let error = console.export_to(&dir.path().join("out.txt")).await.unwrap_err();
        assert!(matches!(error, MatchError::NothingToExport));
    }

    #[tokio::test]
    async fn export_writes_rendered_analysis() {
        let mut console = console(Scripted::Ranked(ranked(2)));
        console.submit(Query::new("backend")).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume_match_results.txt");
        console.export_to(&path).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "1. candidate-0.pdf:\nsolid match\n");
    }
}
