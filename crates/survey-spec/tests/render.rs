use std::sync::Arc;
use std::time::Duration;

use survey_spec::{
    MemoryGateway, PrimaryAction, SurveySpec, Wizard, WizardOptions, build_render_step,
};

fn open() -> Wizard {
    let spec = SurveySpec::from_json(include_str!("fixtures/coworking.json")).unwrap();
    let options = WizardOptions {
        auto_advance: Duration::ZERO,
        ..WizardOptions::default()
    };
    Wizard::with_options(Arc::new(spec), Arc::new(MemoryGateway::new()), options).unwrap()
}

#[tokio::test]
async fn first_step_snapshot() {
    let wizard = open();
    let step = build_render_step(&wizard);

    assert_eq!(step.question_id, 1);
    assert_eq!((step.position, step.total), (1, 10));
    assert_eq!(step.progress_percent, 10);
    assert_eq!(step.options.len(), 6);
    assert_eq!(step.options[0].position, 1);
    assert_eq!(step.options[0].label, "From home");
    assert!(step.options.iter().all(|option| !option.selected));
    assert!(!step.can_retreat);
    assert_eq!(step.primary_action, PrimaryAction::Next);
    assert_eq!(step.limit, None);
}

#[tokio::test]
async fn multi_step_marks_selected_options() {
    let mut wizard = open();
    wizard.advance().await.unwrap();
    wizard.advance().await.unwrap();
    wizard.toggle_option("Reliable internet").unwrap();

    let step = build_render_step(&wizard);
    assert_eq!(step.limit, Some(2));
    let selected: Vec<_> = step
        .options
        .iter()
        .filter(|option| option.selected)
        .map(|option| option.label.as_str())
        .collect();
    assert_eq!(selected, ["Reliable internet"]);
    assert!(step.can_retreat);
}

#[tokio::test]
async fn text_step_shows_placeholder_and_current_text() {
    let mut wizard = open();
    while wizard.cursor() < 9 {
        wizard.advance().await.unwrap();
    }
    wizard.set_text("Bike storage").unwrap();

    let step = build_render_step(&wizard);
    assert!(step.options.is_empty());
    assert!(step.placeholder.is_some());
    assert_eq!(step.text.as_deref(), Some("Bike storage"));
    assert_eq!(step.primary_action, PrimaryAction::Finish);
    assert_eq!(step.progress_percent, 100);
}
