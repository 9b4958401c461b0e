pub mod answer;
pub mod billing;
pub mod profile;
pub mod question;
pub mod referral;

pub use answer::Answer;
pub use billing::{PaymentRecord, PremiumPlan, Subscription, SubscriptionStatus};
pub use profile::{AuthSource, Profile};
pub use question::{Question, QuestionSummary};
pub use referral::{Referral, ReferralEntry};
