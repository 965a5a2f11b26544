use crate::scoring::{QuestionItem, ScoreDomain, Severity};
use crate::Instrument;

/// GAD-7 style anxiety screen.
/// 7 items, each 0–3. Total 0–21.
pub struct Gad7;

impl Instrument for Gad7 {
    fn id(&self) -> &str {
        "gad7"
    }

    fn name(&self) -> &str {
        "GAD-7"
    }

    fn domain(&self) -> ScoreDomain {
        ScoreDomain::Anxiety
    }

    fn items(&self) -> &[QuestionItem] {
        static ITEMS: std::sync::LazyLock<Vec<QuestionItem>> = std::sync::LazyLock::new(|| {
            [
                ("gad7_1", "Feeling nervous, anxious, or on edge"),
                ("gad7_2", "Not being able to stop or control worrying"),
                ("gad7_3", "Worrying too much about different things"),
                ("gad7_4", "Trouble relaxing"),
                ("gad7_5", "Being so restless that it is hard to sit still"),
                ("gad7_6", "Becoming easily annoyed or irritable"),
                ("gad7_7", "Feeling afraid as if something awful might happen"),
            ]
            .iter()
            .map(|(id, prompt)| QuestionItem::new(id, prompt, ScoreDomain::Anxiety))
            .collect()
        });
        &ITEMS
    }

    // No "moderately severe" band on this scale.
    fn severity(&self, total: u32) -> Severity {
        match total {
            0..=4 => Severity::Minimal,
            5..=9 => Severity::Mild,
            10..=14 => Severity::Moderate,
            _ => Severity::Severe,
        }
    }
}
