//! Replays a recorded sequence of host events against an onboarding flow.

use haven_core::flow_keys;
use haven_core::models::{MentalHealthAssessment, PlanRecommendation};
use haven_instruments::recommend::recommend;
use haven_instruments::scoring::{score, ResponseSet, ScoreResult};
use haven_onboarding::{FlowController, FlowError, FlowState, Phase, SharedFlow, StepView};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{oneshot, watch};

use crate::config::HavenConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// The user submits the current step.
    Submit {
        #[serde(default)]
        data: Map<String, Value>,
    },
    /// The user clicks back.
    Back,
    /// The authentication provider reports a new sign-in state.
    Authenticate { value: bool },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    /// Sign-in state when the flow starts.
    #[serde(default)]
    pub authenticated: bool,
    pub events: Vec<ScriptEvent>,
}

/// What happened after one event.
#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub event: ScriptEvent,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepView>,
    /// Set when the event was rejected; the flow is unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub start: Option<StepView>,
    pub outcomes: Vec<EventOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<FlowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<PlanRecommendation>,
}

/// Start `controller`, replay `script`, and score the screening answers if
/// the flow completed.
///
/// Rejected navigation is recorded and replay continues. Running out of
/// visible steps aborts the run.
pub async fn run_script(
    mut controller: FlowController,
    script: &Script,
    config: &HavenConfig,
) -> eyre::Result<RunReport> {
    let (done_tx, mut done_rx) = oneshot::channel();
    controller.on_complete(move |state| {
        let _ = done_tx.send(state.clone());
    });

    let (auth_tx, auth_rx) = watch::channel(script.authenticated);
    let flow = SharedFlow::new(controller, auth_rx)?;
    flow.start().await?;
    let start = flow.current_step().await;

    let mut outcomes = Vec::with_capacity(script.events.len());
    for event in &script.events {
        let result = match event {
            ScriptEvent::Submit { data } => flow.submit_step(data.clone()).await,
            ScriptEvent::Back => flow.go_back().await,
            ScriptEvent::Authenticate { value } => {
                auth_tx.send_replace(*value);
                flow.notify_auth_changed().await
            }
        };

        let rejected = match result {
            Ok(_) => None,
            Err(e @ FlowError::InvalidTransition { .. }) => {
                tracing::warn!(error = %e, "event rejected");
                Some(e.to_string())
            }
            Err(e) => return Err(e.into()),
        };

        outcomes.push(EventOutcome {
            event: event.clone(),
            phase: flow.phase().await,
            step: flow.current_step().await,
            rejected,
        });
    }

    let completed = done_rx.try_recv().ok();
    let (score, recommendation) = match &completed {
        Some(state) => match score_completed(state, config)? {
            Some((result, plan)) => (Some(result), Some(plan)),
            None => (None, None),
        },
        None => {
            tracing::info!(events = script.events.len(), "script ended before completion");
            (None, None)
        }
    };

    Ok(RunReport {
        start,
        outcomes,
        completed,
        score,
        recommendation,
    })
}

/// Score the assessment stored in a completed flow, if there is one.
pub fn score_completed(
    state: &FlowState,
    config: &HavenConfig,
) -> eyre::Result<Option<(ScoreResult, PlanRecommendation)>> {
    let Some(assessment) = flow_keys::read::<MentalHealthAssessment>(
        state.data(),
        flow_keys::MENTAL_HEALTH_ASSESSMENT,
    )?
    else {
        return Ok(None);
    };

    let responses = ResponseSet::from(assessment.responses);
    for error in responses.validate() {
        tracing::warn!(item = %error.item_id, value = error.value, "ignoring invalid response");
    }

    let result = score(&responses, &config.scoring);
    if result.crisis_flag {
        tracing::warn!("crisis item answered at maximum; host must surface crisis resources");
    }
    let plan = recommend(&result, &config.recommendation);
    Ok(Some((result, plan)))
}
