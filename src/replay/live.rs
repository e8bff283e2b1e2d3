//! Live-follow logic: which step the view should show while an execution
//! is still running.

use crate::domain::StepType;

use super::StepRecord;

/// How long the view stays pinned to a scrape once its screenshot lands.
const SCREENSHOT_LOCK_MS: u64 = 5000;

#[derive(Debug, Clone)]
struct ViewLock {
    step_index: usize,
    until_ms: u64,
}

/// Follows the newest visible step of a running execution. When a scrape
/// step produces a screenshot the view locks onto it for a fixed window so
/// the image is actually seen before newer steps pull focus.
#[derive(Debug, Default)]
pub struct LiveTracker {
    lock: Option<ViewLock>,
    /// Id of the last step that triggered a lock; a step locks only once.
    last_locked: Option<String>,
}

impl LiveTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lock: None,
            last_locked: None,
        }
    }

    /// Current step index given the steps recorded so far. `now_ms` is any
    /// monotonic millisecond clock. Returns `None` until a visible step
    /// exists.
    pub fn observe(&mut self, steps: &[StepRecord], now_ms: u64) -> Option<usize> {
        let visible: Vec<(usize, &StepRecord)> =
            steps.iter().filter(|s| s.is_visible()).enumerate().collect();

        let (latest_index, latest) = visible.last().copied()?;

        if let Some(lock) = &self.lock {
            if now_ms < lock.until_ms {
                return Some(lock.step_index);
            }
            self.lock = None;
        }

        // A scrape with a screenshot pins the view, once per step.
        if matches!(latest.step_type, StepType::Scrape)
            && super::screenshot(latest).is_some()
            && self.last_locked.as_deref() != Some(latest.id.as_str())
        {
            self.lock = Some(ViewLock {
                step_index: latest_index,
                until_ms: now_ms + SCREENSHOT_LOCK_MS,
            });
            self.last_locked = Some(latest.id.clone());
        }

        Some(latest_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RunStatus;
    use serde_json::json;

    fn step(id: &str, step_type: StepType) -> StepRecord {
        StepRecord {
            id: id.to_string(),
            step_type,
            status: RunStatus::Completed,
            description: String::new(),
            input_data: None,
            output_data: None,
        }
    }

    fn scrape_with_screenshot(id: &str) -> StepRecord {
        StepRecord {
            output_data: Some(json!({"screenshot": "data:image/png;base64,xyz"})),
            ..step(id, StepType::Scrape)
        }
    }

    #[test]
    fn follows_latest_visible_step() {
        let mut tracker = LiveTracker::new();

        let steps = vec![step("s1", StepType::Search)];
        assert_eq!(tracker.observe(&steps, 0), Some(0));

        let steps = vec![step("s1", StepType::Search), step("s2", StepType::Analyze)];
        assert_eq!(tracker.observe(&steps, 100), Some(1));
    }

    #[test]
    fn tool_calls_are_never_current() {
        let mut tracker = LiveTracker::new();

        let steps = vec![step("s1", StepType::Search), step("s2", StepType::ToolCall)];
        assert_eq!(tracker.observe(&steps, 0), Some(0));

        let only_tools = vec![step("t", StepType::ToolCall)];
        assert_eq!(tracker.observe(&only_tools, 0), None);
    }

    #[test]
    fn screenshot_locks_view_for_five_seconds() {
        let mut tracker = LiveTracker::new();

        let mut steps = vec![step("s1", StepType::Search), scrape_with_screenshot("s2")];
        assert_eq!(tracker.observe(&steps, 1000), Some(1));

        // Newer steps arrive but the lock holds.
        steps.push(step("s3", StepType::Summarize));
        assert_eq!(tracker.observe(&steps, 3000), Some(1));
        assert_eq!(tracker.observe(&steps, 5999), Some(1));

        // Lock expires, view catches up.
        assert_eq!(tracker.observe(&steps, 6000), Some(2));
    }

    #[test]
    fn same_screenshot_does_not_relock_after_expiry() {
        let mut tracker = LiveTracker::new();

        let steps = vec![scrape_with_screenshot("s1")];
        assert_eq!(tracker.observe(&steps, 0), Some(0));

        // Past the lock window the same step stays current without a new lock.
        let steps = vec![scrape_with_screenshot("s1"), step("s2", StepType::Analyze)];
        assert_eq!(tracker.observe(&steps, 6000), Some(1));
    }
}
