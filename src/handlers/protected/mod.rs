// handlers/protected/mod.rs - Handlers behind the session guard
//
// Route prefix: /api/*
// Middleware: session_auth_middleware (cookie or Bearer token, with refresh)
//
// Every handler here receives `Extension<CurrentUser>`; ownership checks
// happen in the service layer against that user's id.
pub mod account;
pub mod analytics;
pub mod answers;
pub mod billing;
pub mod moderation;
pub mod questions;
pub mod referrals;
