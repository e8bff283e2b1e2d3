//! Plays a computed timeline in real time, emitting frames over a watch
//! channel. Used by the SSE replay stream.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{ReplayTimeline, TimelineEvent};

/// Handle to a running playback. Dropping it stops the playback task.
pub struct TimelinePlayer {
    rx: watch::Receiver<Option<TimelineEvent>>,
    handle: JoinHandle<()>,
}

impl TimelinePlayer {
    /// Start playing a timeline from offset zero. Frames land on the watch
    /// channel at their scheduled offsets; the channel ends up holding the
    /// final frame once playback finishes.
    #[must_use]
    pub fn start(timeline: ReplayTimeline) -> Self {
        let (tx, rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut elapsed = Duration::ZERO;
            for event in timeline.events {
                let at = Duration::from_millis(event.offset_ms);
                if at > elapsed {
                    tokio::time::sleep(at - elapsed).await;
                    elapsed = at;
                }
                if tx.send(Some(event)).is_err() {
                    return;
                }
            }
        });

        Self { rx, handle }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<TimelineEvent>> {
        self.rx.clone()
    }
}

impl Drop for TimelinePlayer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RunStatus, StepType};
    use crate::replay::StepRecord;
    use serde_json::json;

    fn timeline() -> ReplayTimeline {
        let steps = vec![
            StepRecord {
                id: "s1".to_string(),
                step_type: StepType::Search,
                status: RunStatus::Completed,
                description: "searching".to_string(),
                input_data: Some(json!({"query": "rust"})),
                output_data: None,
            },
            StepRecord {
                id: "s2".to_string(),
                step_type: StepType::Analyze,
                status: RunStatus::Completed,
                description: "thinking".to_string(),
                input_data: None,
                output_data: None,
            },
        ];
        ReplayTimeline::build(&steps)
    }

    #[tokio::test(start_paused = true)]
    async fn plays_every_frame_in_order() {
        let timeline = timeline();
        let expected = timeline.events.clone();

        let player = TimelinePlayer::start(timeline);
        let mut rx = player.subscribe();

        let mut seen = Vec::new();
        while seen.len() < expected.len() {
            rx.changed().await.unwrap();
            if let Some(event) = rx.borrow().clone() {
                seen.push(event);
            }
        }

        assert_eq!(seen, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_playback() {
        let player = TimelinePlayer::start(timeline());
        let mut rx = player.subscribe();
        drop(player);

        // The sender side is gone once the task is aborted.
        while rx.changed().await.is_ok() {}
    }
}
