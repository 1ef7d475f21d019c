// ABOUTME: Domain service layer housing the scheduling, attendance, evaluation, and rating engines
// ABOUTME: Free functions over the Database, with batch writes wrapped in a single transaction each
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Domain services.
//!
//! Each batch operation opens one transaction, processes records
//! sequentially, and rolls back entirely on any failure. Deliberate
//! `NotFound`/`InvalidInput` errors raised inside the transaction pass
//! through unwrapped; anything else is wrapped into a generic bad-request
//! so internal error detail never leaks to the caller.

pub mod attendance;
pub mod evaluations;
pub mod ratings;
pub mod schedule;

use crate::errors::{AppError, ErrorCode};
use tracing::warn;

/// Map a batch failure onto the caller-facing error.
///
/// Deliberate validation and lookup errors are surfaced as-is; unexpected
/// failures (persistence, serialization) are logged and replaced with a
/// generic message.
pub(crate) fn wrap_batch_error(err: AppError, generic_message: &str) -> AppError {
    match err.code {
        ErrorCode::ResourceNotFound | ErrorCode::InvalidInput | ErrorCode::ValueOutOfRange => err,
        _ => {
            warn!("batch operation failed: {err}");
            AppError::invalid_input(generic_message)
        }
    }
}
