use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use serde_json::json;
use survey_spec::{
    Advance, GatewayError, MemoryGateway, PrimaryAction, Submission, SubmissionGateway,
    SubmissionOutcome, SubmissionState, SurveySpec, Toggle, Wizard, WizardError, WizardOptions,
};
use time::OffsetDateTime;
use time::macros::datetime;
use tracing_subscriber::fmt::MakeWriter;

fn coworking() -> Arc<SurveySpec> {
    Arc::new(
        SurveySpec::from_json(include_str!("fixtures/coworking.json"))
            .expect("fixture should parse"),
    )
}

fn fixed_clock() -> OffsetDateTime {
    datetime!(2025-03-04 05:06:07.089 UTC)
}

fn open(gateway: &MemoryGateway) -> Wizard {
    let options = WizardOptions {
        auto_advance: Duration::ZERO,
        clock: fixed_clock,
    };
    Wizard::with_options(coworking(), Arc::new(gateway.clone()), options)
        .expect("wizard should open")
}

/// Shared sink for a test subscriber's formatted output.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Gateway that never answers.
struct StalledGateway;

#[async_trait]
impl SubmissionGateway for StalledGateway {
    async fn submit(&self, _payload: &Submission) -> Result<(), GatewayError> {
        std::future::pending::<Result<(), GatewayError>>().await
    }
}

async fn skip_to(wizard: &mut Wizard, cursor: usize) {
    while wizard.cursor() < cursor {
        wizard.advance().await.expect("advance should succeed");
    }
}

#[tokio::test]
async fn advance_moves_forward_and_stays_editing() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);
    let total = wizard.spec().len();

    for cursor in 0..total - 1 {
        assert_eq!(wizard.cursor(), cursor);
        let step = wizard.advance().await.unwrap();
        assert_eq!(step, Advance::Moved { cursor: cursor + 1 });
        assert_eq!(wizard.state(), SubmissionState::Editing);
    }
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn advance_from_last_step_submits_exactly_once() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);
    skip_to(&mut wizard, 9).await;
    assert_eq!(wizard.primary_action(), PrimaryAction::Finish);

    let step = wizard.advance().await.unwrap();
    assert_eq!(step, Advance::Submitted(SubmissionOutcome::Delivered));
    assert_eq!(wizard.state(), SubmissionState::Submitted);
    assert_eq!(wizard.cursor(), 9);

    assert_eq!(
        wizard.advance().await,
        Err(WizardError::NotEditing(SubmissionState::Submitted))
    );
    assert_eq!(
        wizard.submit().await,
        Err(WizardError::NotEditing(SubmissionState::Submitted))
    );
    assert_eq!(wizard.retreat(), Err(WizardError::NotEditing(SubmissionState::Submitted)));
    assert_eq!(wizard.cursor(), 9);
    assert_eq!(gateway.sent().len(), 1);
}

#[tokio::test]
async fn retreat_on_first_step_is_a_no_op() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);

    assert_eq!(wizard.retreat(), Ok(false));
    assert_eq!(wizard.cursor(), 0);
    assert_eq!(wizard.state(), SubmissionState::Editing);
    assert!(wizard.answers().is_empty());
    assert!(!wizard.can_retreat());
}

#[tokio::test]
async fn retreat_keeps_recorded_answers() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);
    wizard.select_option("From home").await.unwrap();
    assert!(wizard.can_retreat());

    assert_eq!(wizard.retreat(), Ok(true));
    assert_eq!(wizard.cursor(), 0);
    assert!(wizard.is_selected("From home"));
    assert!(!wizard.is_selected("Other"));
}

#[tokio::test]
async fn single_choice_records_and_auto_advances() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);

    let step = wizard.select_option("From home").await.unwrap();
    assert_eq!(step, Advance::Moved { cursor: 1 });
    assert_eq!(wizard.answers().text(1), Some("From home"));
    assert_eq!(wizard.current_question().id, 2);
}

#[tokio::test]
async fn single_choice_waits_for_default_delay() {
    let gateway = MemoryGateway::new();
    let mut wizard = Wizard::new(coworking(), Arc::new(gateway.clone())).unwrap();

    let started = std::time::Instant::now();
    wizard.select_option("Other").await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(250));
    assert_eq!(wizard.cursor(), 1);
}

#[tokio::test]
async fn limited_multi_choice_ignores_additions_past_limit() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);
    skip_to(&mut wizard, 2).await;
    assert_eq!(wizard.current_question().id, 3);

    assert_eq!(wizard.toggle_option("Focus and productivity"), Ok(Toggle::Added));
    assert_eq!(wizard.toggle_option("Networking"), Ok(Toggle::Added));
    assert_eq!(wizard.toggle_option("Specific amenities"), Ok(Toggle::Ignored));

    assert_eq!(
        wizard.answers().selected(3),
        ["Focus and productivity", "Networking"]
    );
    assert_eq!(wizard.cursor(), 2);

    // freeing a slot makes room again
    assert_eq!(wizard.toggle_option("Networking"), Ok(Toggle::Removed));
    assert_eq!(wizard.toggle_option("Specific amenities"), Ok(Toggle::Added));
    assert_eq!(
        wizard.answers().selected(3),
        ["Focus and productivity", "Specific amenities"]
    );
}

#[tokio::test]
async fn unlimited_toggle_is_its_own_inverse() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);
    skip_to(&mut wizard, 3).await;
    assert_eq!(wizard.current_question().id, 4);

    wizard.toggle_option("Open desk seating").unwrap();
    wizard.toggle_option("Workshops").unwrap();
    let before = wizard.answers().selected(4).to_vec();

    assert_eq!(wizard.toggle_option("Mail handling"), Ok(Toggle::Added));
    assert_eq!(wizard.toggle_option("Mail handling"), Ok(Toggle::Removed));
    assert_eq!(wizard.answers().selected(4), before.as_slice());

    for option in wizard.current_question().kind.options().to_vec() {
        assert_ne!(wizard.toggle_option(&option), Ok(Toggle::Ignored));
    }
}

#[tokio::test]
async fn failing_gateway_still_ends_submitted() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let gateway = MemoryGateway::failing("network unreachable");
    let mut wizard = open(&gateway);
    skip_to(&mut wizard, 9).await;
    wizard.set_text("standing desks").unwrap();

    let step = wizard.advance().await;
    assert_eq!(step, Ok(Advance::Submitted(SubmissionOutcome::Failed)));
    assert_eq!(wizard.state(), SubmissionState::Submitted);
    assert_eq!(gateway.sent().len(), 1);

    let logged = logs.contents();
    assert!(logged.contains("submission failed"), "{logged}");
    assert!(logged.contains("network unreachable"), "{logged}");
}

#[tokio::test]
async fn interrupted_submission_stays_submitting() {
    let options = WizardOptions {
        auto_advance: Duration::ZERO,
        clock: fixed_clock,
    };
    let mut wizard =
        Wizard::with_options(coworking(), Arc::new(StalledGateway), options).unwrap();
    skip_to(&mut wizard, 9).await;

    let waited = tokio::time::timeout(Duration::from_millis(50), wizard.advance()).await;
    assert!(waited.is_err(), "gateway should still be waiting");

    assert_eq!(wizard.state(), SubmissionState::Submitting);
    assert_eq!(wizard.primary_action(), PrimaryAction::Sending);
    assert!(!wizard.can_retreat());
    assert_eq!(
        wizard.advance().await,
        Err(WizardError::NotEditing(SubmissionState::Submitting))
    );
}

#[tokio::test]
async fn submitted_payload_carries_answers_and_timestamp() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);

    wizard.select_option("From home").await.unwrap();
    wizard.advance().await.unwrap();
    wizard.toggle_option("Focus and productivity").unwrap();
    wizard.toggle_option("Networking").unwrap();
    skip_to(&mut wizard, 8).await;
    wizard.set_text("A free trial day").unwrap();
    wizard.advance().await.unwrap();
    wizard.advance().await.unwrap();

    let sent = gateway.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(sent[0], Submission::Survey(_)));
    assert_eq!(
        serde_json::to_value(&sent[0]).unwrap(),
        json!({
            "type": "survey",
            "answers": {
                "1": "From home",
                "3": ["Focus and productivity", "Networking"],
                "9": "A free trial day"
            },
            "timestamp": "2025-03-04T05:06:07.089Z"
        })
    );
}

#[tokio::test]
async fn unanswered_questions_never_block() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);
    skip_to(&mut wizard, 9).await;
    wizard.advance().await.unwrap();

    let payload = serde_json::to_value(&gateway.sent()[0]).unwrap();
    assert_eq!(payload["answers"], json!({}));
}

#[tokio::test]
async fn handlers_reject_the_wrong_question_kind() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);

    assert!(matches!(
        wizard.toggle_option("From home"),
        Err(WizardError::KindMismatch { id: 1, .. })
    ));
    assert!(matches!(
        wizard.set_text("hello"),
        Err(WizardError::KindMismatch { id: 1, .. })
    ));
    assert_eq!(
        wizard.select_option("Moon base").await,
        Err(WizardError::UnknownOption {
            id: 1,
            option: "Moon base".into()
        })
    );
    assert_eq!(wizard.cursor(), 0);
    assert!(wizard.answers().is_empty());

    skip_to(&mut wizard, 8).await;
    assert!(matches!(
        wizard.select_option("From home").await,
        Err(WizardError::KindMismatch { id: 9, .. })
    ));
}

#[tokio::test]
async fn submit_is_refused_before_the_last_step() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);

    assert_eq!(
        wizard.submit().await,
        Err(WizardError::NotOnLastStep {
            position: 1,
            total: 10
        })
    );
    assert_eq!(wizard.state(), SubmissionState::Editing);
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn progress_and_primary_action_follow_the_cursor() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);
    assert_eq!(wizard.progress_percent(), 10);
    assert_eq!(wizard.primary_action(), PrimaryAction::Next);

    skip_to(&mut wizard, 4).await;
    assert_eq!(wizard.progress_percent(), 50);

    skip_to(&mut wizard, 9).await;
    assert_eq!(wizard.progress_percent(), 100);
    assert_eq!(wizard.primary_action(), PrimaryAction::Finish);

    wizard.advance().await.unwrap();
    assert_eq!(wizard.primary_action(), PrimaryAction::Sending);
}

#[tokio::test]
async fn free_text_is_overwritten_not_appended() {
    let gateway = MemoryGateway::new();
    let mut wizard = open(&gateway);
    skip_to(&mut wizard, 9).await;

    wizard.set_text("coffee").unwrap();
    wizard.set_text("").unwrap();
    assert_eq!(wizard.answers().text(10), Some(""));
    assert_eq!(wizard.cursor(), 9);
}
