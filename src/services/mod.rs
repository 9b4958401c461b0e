pub mod analytics;
pub mod billing;
pub mod entitlement;
pub mod moderation;
pub mod og;
pub mod profile;
pub mod qa;
pub mod referral;
pub mod short_id;
