// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use astrolabe_structures::TrackId;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Operation on a track the lifecycle does not hold
    #[error("Unknown track '{0}'")]
    UnknownTrack(TrackId),

    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    #[error("Invalid runtime configuration: {0}")]
    InvalidConfig(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
