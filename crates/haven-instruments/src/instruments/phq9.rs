use crate::scoring::{QuestionItem, ScoreDomain, Severity};
use crate::Instrument;

/// Item asking about thoughts of self-harm. A maximum answer here raises
/// the crisis flag independently of the total.
pub const SELF_HARM_ITEM: &str = "phq9_9";

/// PHQ-9 style depression screen.
/// 9 items, each 0–3. Total 0–27.
pub struct Phq9;

impl Instrument for Phq9 {
    fn id(&self) -> &str {
        "phq9"
    }

    fn name(&self) -> &str {
        "PHQ-9"
    }

    fn domain(&self) -> ScoreDomain {
        ScoreDomain::Depression
    }

    fn items(&self) -> &[QuestionItem] {
        static ITEMS: std::sync::LazyLock<Vec<QuestionItem>> = std::sync::LazyLock::new(|| {
            [
                ("phq9_1", "Little interest or pleasure in doing things"),
                ("phq9_2", "Feeling down, depressed, or hopeless"),
                ("phq9_3", "Trouble falling or staying asleep, or sleeping too much"),
                ("phq9_4", "Feeling tired or having little energy"),
                ("phq9_5", "Poor appetite or overeating"),
                (
                    "phq9_6",
                    "Feeling bad about yourself, or that you are a failure or have let yourself or your family down",
                ),
                (
                    "phq9_7",
                    "Trouble concentrating on things, such as reading or watching television",
                ),
                (
                    "phq9_8",
                    "Moving or speaking so slowly that other people could have noticed, or being so fidgety or restless that you have been moving around a lot more than usual",
                ),
                (
                    SELF_HARM_ITEM,
                    "Thoughts that you would be better off dead, or of hurting yourself in some way",
                ),
            ]
            .iter()
            .map(|(id, prompt)| QuestionItem::new(id, prompt, ScoreDomain::Depression))
            .collect()
        });
        &ITEMS
    }

    /// 0-4 minimal, 5-9 mild, 10-14 moderate, 15-19 moderately severe, 20+ severe.
    fn severity(&self, total: u32) -> Severity {
        match total {
            0..=4 => Severity::Minimal,
            5..=9 => Severity::Mild,
            10..=14 => Severity::Moderate,
            15..=19 => Severity::ModeratelySevere,
            _ => Severity::Severe,
        }
    }
}
