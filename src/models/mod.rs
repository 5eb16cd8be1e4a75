// SPDX-License-Identifier: MIT

pub mod analysis;
pub mod product;
pub mod routine;
pub mod subscription;
pub mod user;

pub use analysis::{
    AcneAnalysisResults, AcneByRegion, AcneByType, AnalysisStatus, ImageQuality, SkinAnalysis,
    SkinSeverity, StructuredFeedback,
};
pub use product::{PriceRange, Product, ProductBundle, ProductCategory};
pub use routine::{Routine, RoutineFrequency, RoutineStep, RoutineTimeOfDay};
pub use subscription::{BillingPeriod, Subscription, SubscriptionPlatform, SubscriptionStatus};
pub use user::{
    AccountState, BudgetPreference, Gender, SkinCareExperience, SkinGoal, SkinType, User,
    ONBOARDING_COMPLETE_STEP,
};
