// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Greppable tags prefixed to log lines for errors that cannot be escalated
//! further than the log.
//!
//! ```text
//! grep -F '[AUDIT-WRITE-FAILED]' logs/run_*/astrolabe.log
//! ```

/// Appending an audit entry to the durable history failed
pub const AUDIT_WRITE_FAILED: &str = "[AUDIT-WRITE-FAILED]";

/// Flushing the audit log to stable storage failed
pub const AUDIT_FLUSH_FAILED: &str = "[AUDIT-FLUSH-FAILED]";

/// A guard-table reload was rejected and the previous table kept
pub const GUARD_RELOAD_REJECTED: &str = "[GUARD-RELOAD-REJECTED]";

/// A shard worker failed while the ingress was shutting down
pub const INGRESS_SHUTDOWN_FAILED: &str = "[INGRESS-SHUTDOWN-FAILED]";

/// An outcome could not be handed to its publisher
pub const PUBLISH_FAILED: &str = "[PUBLISH-FAILED]";

/// A shard channel was closed while events were still being routed to it
pub const SHARD_CLOSED: &str = "[SHARD-CLOSED]";

/// Every tag, for tooling that scans logs
pub const ALL: &[&str] = &[
    AUDIT_WRITE_FAILED,
    AUDIT_FLUSH_FAILED,
    GUARD_RELOAD_REJECTED,
    INGRESS_SHUTDOWN_FAILED,
    PUBLISH_FAILED,
    SHARD_CLOSED,
];
