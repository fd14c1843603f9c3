//! Email-gated access for static content.
//!
//! `pordego` infers a visitor's email address from a set of detection
//! sources (magic-link URL parameter, stored session, heuristic scan of
//! ambient key/value data) and grants or denies access by comparing the
//! inferred address against a static allowlist of emails and domains.
//!
//! The allowlist lives in configuration shipped to the client, so the gate
//! is a UX convenience, not a security boundary.

pub mod cli;
pub mod gate;
