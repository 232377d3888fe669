// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::ANALYZER_NAME;
use crate::diagnostics::Diagnostic;
use crate::operation::Operation;

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use tracing::warn;

const TRACE_SEPARATOR: &str = " <-- ";

thread_local! {
    static ISOLATING: Cell<bool> = const { Cell::new(false) };
    // Panic location and backtrace of the last isolated check that panicked on this thread.
    static PANIC_FRAMES: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chains a process-wide hook once. Panics outside `isolate` go to the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !ISOLATING.with(Cell::get) {
                return previous(info);
            }
            let mut frames = vec![];
            if let Some(location) = info.location() {
                frames.push(format!("at {location}"));
            }
            frames.extend(captured(&Backtrace::capture()));
            PANIC_FRAMES.with(|slot| slot.replace(Some(frames)));
        }));
    });
}

/// Marks the current thread as running an isolated check until dropped.
struct Isolating {
    outer: bool,
}

impl Isolating {
    fn enter() -> Self {
        install_panic_hook();
        PANIC_FRAMES.with(|slot| slot.replace(None));
        Self {
            outer: ISOLATING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for Isolating {
    fn drop(&mut self) {
        ISOLATING.with(|flag| flag.set(self.outer));
    }
}

/// Run `check` on `op`, turning an error or a panic into a fault record.
pub(super) fn isolate<F>(op: Operation<'_>, check: F) -> Result<bool, Diagnostic>
where
    F: FnOnce() -> anyhow::Result<bool>,
{
    let outcome = {
        let _isolating = Isolating::enter();
        panic::catch_unwind(AssertUnwindSafe(check))
    };
    let (description, trace) = match outcome {
        Ok(Ok(fired)) => return Ok(fired),
        Ok(Err(error)) => {
            let frames = error
                .chain()
                .map(|cause| cause.to_string())
                .chain(captured(error.backtrace()));
            (error.to_string(), join_flattened(frames))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            let frames = PANIC_FRAMES
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_default();
            let trace = join_flattened(std::iter::once(message.clone()).chain(frames));
            (format!("panic: {message}"), trace)
        }
    };

    warn!(
        location = %op.location(),
        operation = ?op,
        %description,
        "analysis of operation failed"
    );
    Err(Diagnostic::fault(
        ANALYZER_NAME,
        &description,
        &trace,
        op.location().clone(),
    ))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn captured(backtrace: &Backtrace) -> Option<String> {
    (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string())
}

fn join_flattened(frames: impl Iterator<Item = String>) -> String {
    frames
        .map(|frame| flatten(&frame))
        .filter(|frame| !frame.is_empty())
        .collect::<Vec<_>>()
        .join(TRACE_SEPARATOR)
}

fn flatten(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(TRACE_SEPARATOR)
}
