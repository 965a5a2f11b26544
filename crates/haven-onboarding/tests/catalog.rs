use haven_onboarding::catalog::step_ids;
use haven_onboarding::{CatalogError, FlowState, StepCatalog, StepDescriptor};

#[test]
fn standard_catalog_shows_everything_for_new_anonymous_user() {
    let catalog = StepCatalog::standard();
    let state = FlowState::new(false, false);
    let visible = catalog.visible_steps(&state);
    assert_eq!(
        visible.ids(),
        vec![
            step_ids::WELCOME,
            step_ids::PROFILE,
            step_ids::CULTURAL_PREFERENCES,
            step_ids::ACCOUNT,
            step_ids::SCREENING,
            step_ids::PLAN_SELECTION,
            step_ids::COMPLETE,
        ]
    );
    assert!(visible.faults().is_empty());
}

#[test]
fn standard_catalog_hides_account_and_plan_selection() {
    let catalog = StepCatalog::standard();
    let state = FlowState::new(true, true);
    let ids = catalog.visible_steps(&state).ids();
    assert!(!ids.contains(&step_ids::ACCOUNT));
    assert!(!ids.contains(&step_ids::PLAN_SELECTION));
    assert_eq!(ids.len(), 5);
}

#[test]
fn visible_steps_is_pure() {
    let catalog = StepCatalog::standard();
    let state = FlowState::new(true, false);
    let first = catalog.visible_steps(&state);
    let second = catalog.visible_steps(&state.clone());
    assert_eq!(first.indices(), second.indices());
    assert_eq!(first.ids(), second.ids());
}

#[test]
fn failing_predicate_hides_step_and_reports_fault() {
    let catalog = StepCatalog::builder()
        .step(StepDescriptor::always("welcome", "Welcome"))
        .step(StepDescriptor::fallible("follow-up", "Follow up", |state| {
            state
                .get("screening")
                .and_then(|v| v.get("flagged"))
                .and_then(|v| v.as_bool())
                .ok_or_else(|| "screening payload missing 'flagged'".to_string())
        }))
        .step(StepDescriptor::always("done", "Done"))
        .build()
        .unwrap();

    let visible = catalog.visible_steps(&FlowState::default());
    assert_eq!(visible.ids(), vec!["welcome", "done"]);
    assert_eq!(visible.faults().len(), 1);
    assert_eq!(visible.faults()[0].step_id, "follow-up");
    assert!(visible.faults()[0].to_string().contains("missing 'flagged'"));
}

#[test]
fn rank_and_neighbours_follow_catalog_order() {
    let catalog = StepCatalog::standard();
    let state = FlowState::new(true, false);
    let visible = catalog.visible_steps(&state);

    let account = catalog.position(step_ids::ACCOUNT).unwrap();
    let screening = catalog.position(step_ids::SCREENING).unwrap();
    let cultural = catalog.position(step_ids::CULTURAL_PREFERENCES).unwrap();

    assert!(!visible.contains(account));
    assert_eq!(visible.rank(account), None);
    assert_eq!(visible.rank(screening), Some(4));
    assert_eq!(visible.next_after(cultural), Some(screening));
    assert_eq!(visible.prev_before(screening), Some(cultural));
    assert_eq!(visible.first(), Some(0));
}

#[test]
fn empty_catalog_is_rejected() {
    assert!(matches!(StepCatalog::builder().build(), Err(CatalogError::Empty)));
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = StepCatalog::builder()
        .step(StepDescriptor::always("a", "A"))
        .step(StepDescriptor::always("a", "Again"))
        .build()
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateStep(ref id) if id == "a"));
}

#[test]
fn descriptor_debug_omits_predicate() {
    let step = StepDescriptor::always("welcome", "onboarding.steps.welcome");
    let debug = format!("{step:?}");
    assert!(debug.contains("welcome"));
    assert!(debug.ends_with(".. }"));
}
