/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress and warning messages, sinks, and helpers for interpolation runs.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress and warning reporting primitives.
//!
//! The solver degrades gracefully on ill-conditioned systems instead of
//! failing, so conditions worth surfacing (a rank-deficient collocation
//! matrix, merged duplicate probes) are emitted as messages through a
//! [`ProgressSink`] rather than being silently absorbed or escalated to
//! errors.

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;

/// Events emitted while aggregating probes and fitting a bed surface.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// Repeated probes of the same `(x, y)` coordinate were merged into
    /// averaged samples.
    DuplicatesMerged { num_merged: usize },

    /// The collocation matrix was numerically rank deficient; the fit fell
    /// back to a least-squares solution.
    IllConditionedSystem { rank: usize, size: usize },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
///
/// The listener exits once every clone of the returned sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}
