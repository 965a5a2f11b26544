//! haven-instruments
//!
//! Screening questionnaire definitions, scoring, and plan recommendation.
//! Pure data and pure functions: no I/O, no clock, no global state.

pub mod error;
pub mod instruments;
pub mod recommend;
pub mod scoring;

use scoring::{QuestionItem, ResponseSet, ScoreDomain, Severity, ValidationError, MAX_RESPONSE};

/// Trait implemented by each screening instrument.
pub trait Instrument: Send + Sync {
    /// Unique identifier for this instrument (e.g., "phq9", "gad7").
    fn id(&self) -> &str;

    /// Human-readable name (e.g., "PHQ-9").
    fn name(&self) -> &str;

    /// The total every item of this instrument contributes to.
    fn domain(&self) -> ScoreDomain;

    /// Items in presentation order.
    fn items(&self) -> &[QuestionItem];

    /// Map a total onto the instrument's severity bands.
    fn severity(&self, total: u32) -> Severity;

    /// Largest possible total.
    fn max_total(&self) -> u32 {
        self.items().len() as u32 * u32::from(MAX_RESPONSE)
    }

    /// Sum of the answered items belonging to this instrument.
    fn total(&self, responses: &ResponseSet) -> u32 {
        self.items()
            .iter()
            .filter_map(|item| responses.get(&item.id))
            .filter(|v| *v <= MAX_RESPONSE)
            .map(u32::from)
            .sum()
    }

    /// Validate the answers that belong to this instrument.
    fn validate_responses(&self, responses: &ResponseSet) -> Vec<ValidationError> {
        let own: Vec<_> = self.items().iter().map(|i| i.id.as_str()).collect();
        responses
            .validate()
            .into_iter()
            .filter(|e| own.contains(&e.item_id.as_str()))
            .collect()
    }

    /// Format answered items as plain text for a clinician-facing view.
    fn summarize(&self, responses: &ResponseSet) -> String {
        let mut output = format!("## {}\n\n", self.name());
        for item in self.items() {
            if let Some(value) = responses.get(&item.id) {
                let label = item
                    .options
                    .iter()
                    .find(|o| o.value == value)
                    .map(|o| o.label.as_str())
                    .unwrap_or("(invalid)");
                output.push_str(&format!("- {}: {} ({})\n", item.prompt, label, value));
            }
        }
        let total = self.total(responses);
        output.push_str(&format!(
            "\nTotal: {}/{} ({:?})\n",
            total,
            self.max_total(),
            self.severity(total)
        ));
        output
    }
}

/// Return all registered instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![
        Box::new(instruments::phq9::Phq9),
        Box::new(instruments::gad7::Gad7),
    ]
}

/// Look up an instrument by ID.
pub fn get_instrument(id: &str) -> Option<Box<dyn Instrument>> {
    all_instruments().into_iter().find(|i| i.id() == id)
}

/// Look up a question item across all instruments.
pub fn find_item(item_id: &str) -> Option<QuestionItem> {
    all_instruments()
        .iter()
        .flat_map(|i| i.items().iter())
        .find(|item| item.id == item_id)
        .cloned()
}
