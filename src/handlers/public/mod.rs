// handlers/public/mod.rs - Public handlers (no session required)
//
// Route prefixes: /auth/*, /q/*, /api/og/*, /api/stripe/webhook,
// /api/premium/plans, /api/auth/webhook
pub mod auth;
pub mod billing;
pub mod og;
pub mod questions;
