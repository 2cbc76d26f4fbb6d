//! # Services Module
//!
//! External service integrations. Currently the backend REST API:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  ApiClient                   │
//! │  cache ─▶ dedup ─▶ retry ─▶ auth-aware send  │
//! └──────────────────────┬───────────────────────┘
//!                        │ HTTP/JSON (Transport)
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │              Backend API Server              │
//! │  /api/users/*          /api/transactions/*   │
//! │  /api/contacts/*       /api/tokens/*         │
//! │  /api/ai/*, /api/chat/*                      │
//! │  /api/notifications/*  /api/payment-requests │
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
