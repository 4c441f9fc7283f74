//! Structured conversion events.
//!
//! A [`Vectorizer`](super::Vectorizer) reports four facts per call through
//! its [`EventSink`]: started, strategy chosen, fallback triggered and
//! finished. Sinks are shared across threads and must not block for long.

use super::Strategy;
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionEvent {
    Started {
        width: u32,
        height: u32,
        target_time: f64,
    },
    StrategyChosen {
        strategy: Strategy,
        /// Set when the caller forced the strategy.
        forced: bool,
    },
    FallbackTriggered {
        reason: String,
    },
    Finished {
        strategy_used: String,
        elements: usize,
        quality_score: f64,
        seconds: f64,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ConversionEvent);
}

/// Renders events as terminal log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &ConversionEvent) {
        match event {
            ConversionEvent::Started {
                width,
                height,
                target_time,
            } => {
                crate::debug!("convert"; "start {}x{} (budget {:.1}s)", width, height, target_time);
            }
            ConversionEvent::StrategyChosen { strategy, forced } => {
                let how = if *forced { "forced" } else { "selected" };
                crate::debug!("convert"; "strategy {} ({})", strategy, how);
            }
            ConversionEvent::FallbackTriggered { reason } => {
                crate::log!("fallback"; "{}", reason);
            }
            ConversionEvent::Finished {
                strategy_used,
                elements,
                quality_score,
                seconds,
            } => {
                crate::debug!(
                    "convert";
                    "done via {}: {} elements, quality {:.3}, {:.2}s",
                    strategy_used,
                    elements,
                    quality_score,
                    seconds
                );
            }
        }
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _: &ConversionEvent) {}
}

/// Keeps events in memory, for inspection in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ConversionEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ConversionEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &ConversionEvent) {
        self.events.lock().push(event.clone());
    }
}
