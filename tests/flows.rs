//! End-to-end flow tests against an in-memory service.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use datamapper::mappings::{PLACEHOLDER, SubmitOutcome};
use datamapper::{
    Banner, ClientError, FieldMapping, FlagController, FlagState, Flow, ForwardError, Listing,
    MapperApi, MappingBook, MappingId, NewFieldMapping, PayloadForwarder, Reporter,
    SchedulerFlag, Settled,
};
use serde_json::Value;

/// Service double: stores mappings, counts every call and can be told to
/// answer the scheduler with scripted values or to fail.
#[derive(Default)]
struct FakeService {
    mappings: RefCell<Vec<FieldMapping>>,
    next_id: Cell<i64>,
    calls: Cell<usize>,
    set_requests: RefCell<Vec<bool>>,
    scheduler_answers: RefCell<VecDeque<Result<SchedulerFlag, ClientError>>>,
    webhooks: RefCell<Vec<Value>>,
    fail_all: Cell<bool>,
}

impl FakeService {
    fn failing() -> Self {
        let service = Self::default();
        service.fail_all.set(true);
        service
    }

    fn answer_scheduler(&self, answer: Result<SchedulerFlag, ClientError>) {
        self.scheduler_answers.borrow_mut().push_back(answer);
    }

    fn hit(&self) -> Result<(), ClientError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail_all.get() {
            Err(ClientError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn next_scheduler_answer(&self) -> Result<SchedulerFlag, ClientError> {
        self.scheduler_answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Status { status: 404, detail: None }))
    }
}

#[async_trait(?Send)]
impl MapperApi for FakeService {
    async fn create_mapping(&self, mapping: &NewFieldMapping) -> Result<FieldMapping, ClientError> {
        self.hit()?;
        self.next_id.set(self.next_id.get() + 1);
        let created = FieldMapping {
            id: MappingId::Number(self.next_id.get()),
            api_field: mapping.api_field().to_string(),
            db_field: mapping.db_field().to_string(),
        };
        self.mappings.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn list_mappings(&self) -> Result<Vec<FieldMapping>, ClientError> {
        self.hit()?;
        Ok(self.mappings.borrow().clone())
    }

    async fn get_mapping(&self, api_field: &str) -> Result<FieldMapping, ClientError> {
        self.hit()?;
        self.mappings
            .borrow()
            .iter()
            .find(|m| m.api_field == api_field)
            .cloned()
            .ok_or(ClientError::Status { status: 404, detail: None })
    }

    async fn get_scheduler(&self, _task_name: &str) -> Result<SchedulerFlag, ClientError> {
        self.hit()?;
        self.next_scheduler_answer()
    }

    async fn set_scheduler(
        &self,
        _task_name: &str,
        enabled: bool,
    ) -> Result<SchedulerFlag, ClientError> {
        self.hit()?;
        self.set_requests.borrow_mut().push(enabled);
        self.next_scheduler_answer()
    }

    async fn create_scheduler(&self, flag: &SchedulerFlag) -> Result<SchedulerFlag, ClientError> {
        self.hit()?;
        Ok(flag.clone())
    }

    async fn forward_webhook(&self, payload: &Value) -> Result<(), ClientError> {
        self.hit()?;
        self.webhooks.borrow_mut().push(payload.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Recorder(RefCell<Vec<Flow>>);

impl Reporter for Recorder {
    fn failure(&self, flow: Flow, _error: &ClientError) {
        self.0.borrow_mut().push(flow);
    }
}

fn flag(enabled: bool) -> SchedulerFlag {
    SchedulerFlag {
        task_name: "fetch_data".to_string(),
        enabled,
    }
}

#[tokio::test]
async fn test_submit_then_list_contains_record() {
    let service = FakeService::default();
    let reporter = Recorder::default();

    let pairs = [("email", "user_email"), ("zip", "postal_code"), ("x", "y")];
    for (api_field, db_field) in pairs {
        let mut book = MappingBook::new();
        book.set_api_field(api_field);
        book.set_db_field(db_field);
        assert!(matches!(
            book.submit(&service, &reporter).await,
            SubmitOutcome::Added(_)
        ));
    }

    let mut fresh = MappingBook::new();
    let listing = fresh.load(&service, &reporter).await;
    for (api_field, db_field) in pairs {
        assert!(
            fresh
                .mappings()
                .iter()
                .any(|m| m.api_field == api_field && m.db_field == db_field)
        );
    }
    assert_eq!(
        listing,
        Listing::Rows(vec![
            "email → user_email".to_string(),
            "zip → postal_code".to_string(),
            "x → y".to_string(),
        ])
    );
    assert!(reporter.0.borrow().is_empty());
}

#[tokio::test]
async fn test_submit_appends_to_same_book() {
    let service = FakeService::default();
    let reporter = Recorder::default();
    let mut book = MappingBook::new();

    assert_eq!(
        book.load(&service, &reporter).await,
        Listing::Placeholder(PLACEHOLDER)
    );

    book.set_api_field("email");
    book.set_db_field("user_email");
    book.submit(&service, &reporter).await;

    assert_eq!(
        book.listing(),
        Listing::Rows(vec!["email → user_email".to_string()])
    );
    assert_eq!(book.api_field(), "");
    assert_eq!(
        book.notice().map(|n| n.message),
        Some("Mapping added successfully!")
    );
}

#[tokio::test]
async fn test_empty_field_never_reaches_network() {
    let service = FakeService::default();
    let reporter = Recorder::default();

    for (api_field, db_field) in [("", "user_email"), ("email", ""), ("", ""), (" ", "\t")] {
        let mut book = MappingBook::new();
        book.set_api_field(api_field);
        book.set_db_field(db_field);
        assert!(matches!(
            book.submit(&service, &reporter).await,
            SubmitOutcome::Invalid(_)
        ));
    }

    assert_eq!(service.calls.get(), 0);
}

#[tokio::test]
async fn test_submit_failure_is_reported() {
    let service = FakeService::failing();
    let reporter = Recorder::default();
    let mut book = MappingBook::new();
    book.set_api_field("email");
    book.set_db_field("user_email");

    assert_eq!(book.submit(&service, &reporter).await, SubmitOutcome::Failed);
    assert_eq!(service.calls.get(), 1);
    assert_eq!(book.notice().map(|n| n.message), Some("Failed to add mapping."));
    assert_eq!(*reporter.0.borrow(), vec![Flow::CreateMapping]);
}

#[tokio::test]
async fn test_empty_list_renders_placeholder() {
    let service = FakeService::default();
    let reporter = Recorder::default();
    let mut book = MappingBook::new();

    let listing = book.load(&service, &reporter).await;

    assert_eq!(listing, Listing::Placeholder("No mappings available."));
    assert_eq!(service.calls.get(), 1);
}

#[tokio::test]
async fn test_toggle_sends_negation_once() {
    let service = FakeService::default();
    let reporter = Recorder::default();
    let mut controller = FlagController::new("fetch_data");

    service.answer_scheduler(Ok(flag(true)));
    controller.fetch(&service, &reporter).await;
    assert_eq!(controller.state(), FlagState::Enabled);

    service.answer_scheduler(Ok(flag(false)));
    let calls_before = service.calls.get();
    let (request, settled) = controller.toggle(&service, &reporter).await;

    assert_eq!(service.calls.get(), calls_before + 1);
    assert!(!request.enabled);
    assert_eq!(*service.set_requests.borrow(), vec![false]);
    assert_eq!(settled, Settled::Applied);
    assert_eq!(controller.state(), FlagState::Disabled);
}

#[tokio::test]
async fn test_toggle_adopts_server_value_verbatim() {
    let service = FakeService::default();
    let reporter = Recorder::default();
    let mut controller = FlagController::new("fetch_data");

    service.answer_scheduler(Ok(flag(false)));
    controller.fetch(&service, &reporter).await;

    // The server ignores the write and stays disabled.
    service.answer_scheduler(Ok(flag(false)));
    let (request, _) = controller.toggle(&service, &reporter).await;

    assert!(request.enabled);
    assert_eq!(controller.state(), FlagState::Disabled);
    assert_eq!(controller.label(), "Disabled");

    // Next toggle negates what the server said, not what was asked for.
    service.answer_scheduler(Ok(flag(true)));
    let (request, _) = controller.toggle(&service, &reporter).await;
    assert!(request.enabled);
    assert_eq!(*service.set_requests.borrow(), vec![true, true]);
}

#[tokio::test]
async fn test_failed_fetch_is_observable() {
    let service = FakeService::default();
    let reporter = Recorder::default();
    let mut controller = FlagController::new("fetch_data");

    let settled = controller.fetch(&service, &reporter).await;

    assert_eq!(settled, Settled::Failed);
    assert_eq!(controller.state(), FlagState::Disabled);
    assert!(controller.last_error().is_some());
    assert!(controller.notice().is_none());
    assert_eq!(*reporter.0.borrow(), vec![Flow::FetchScheduler]);
}

#[test]
fn test_out_of_order_responses_keep_latest_intent() {
    let reporter = Recorder::default();
    let mut controller = FlagController::new("fetch_data");

    let fetch = controller.begin_fetch();
    let first_click = controller.begin_toggle();
    let second_click = controller.begin_toggle();

    // Responses arrive newest first.
    controller.settle_toggle(second_click.seq, Ok(flag(true)), &reporter);
    controller.settle_toggle(first_click.seq, Ok(flag(false)), &reporter);
    controller.settle_fetch(fetch, Ok(flag(false)), &reporter);

    assert_eq!(controller.state(), FlagState::Enabled);
}

#[tokio::test]
async fn test_send_valid_payload_issues_one_call() {
    let service = FakeService::default();
    let reporter = Recorder::default();
    let mut forwarder = PayloadForwarder::new(r#"{"event":"test"}"#);

    assert_eq!(forwarder.send(&service, &reporter).await, Ok(()));

    assert_eq!(service.calls.get(), 1);
    assert_eq!(service.webhooks.borrow()[0]["event"], "test");
    assert_eq!(forwarder.banner(), Some(Banner::Sent));
    assert_eq!(forwarder.text(), r#"{"event":"test"}"#);
}

#[tokio::test]
async fn test_send_invalid_payload_issues_no_call() {
    let service = FakeService::default();
    let reporter = Recorder::default();
    let mut forwarder = PayloadForwarder::new("not json");

    assert_eq!(
        forwarder.send(&service, &reporter).await,
        Err(ForwardError::InvalidJson)
    );

    assert_eq!(service.calls.get(), 0);
    assert_eq!(*reporter.0.borrow(), vec![Flow::ForwardWebhook]);
}

#[tokio::test]
async fn test_send_failure_replaces_success_banner() {
    let reporter = Recorder::default();
    let mut forwarder = PayloadForwarder::default();

    let service = FakeService::default();
    forwarder.send(&service, &reporter).await.unwrap();
    assert_eq!(forwarder.banner(), Some(Banner::Sent));

    let service = FakeService::failing();
    let result = forwarder.send(&service, &reporter).await;

    assert_eq!(result, Err(ForwardError::SendFailed));
    assert_eq!(
        forwarder.banner(),
        Some(Banner::Failed(ForwardError::SendFailed))
    );
    assert_eq!(*reporter.0.borrow(), vec![Flow::ForwardWebhook]);
}
