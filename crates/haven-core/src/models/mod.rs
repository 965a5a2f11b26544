pub mod plan;
pub mod profile;

pub use plan::{PlanRecommendation, PlanSource, PlanTier, SelectedPlan};
pub use profile::{CulturalPreferences, MentalHealthAssessment, ProfileInfo};
