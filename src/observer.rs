// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outcome reporting hooks.
//!
//! The planner and the signing engine report what happened through an
//! injected [`MixerObserver`]. Observers must be cheap and must not panic;
//! they run inline on the caller's thread.

use crate::error::MixerError;
use crate::models::MixingPlan;
use crate::ring::{KeyImage, RingMixingSession, Verdict};

/// Receives planning and signing outcomes.
pub trait MixerObserver: Send + Sync {
    fn plan_created(&self, _plan: &MixingPlan) {}

    fn signature_created(&self, _session: &RingMixingSession, _key_image: &KeyImage) {}

    /// `session_id` is `None` only when the session store refused the
    /// session.
    fn signature_failed(&self, _session_id: Option<&str>, _error: &MixerError) {}

    fn verification_completed(&self, _key_image: &KeyImage, _verdict: Verdict) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl MixerObserver for NoopObserver {}
