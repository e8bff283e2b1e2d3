//! Deterministic replay timelines for recorded scout executions.
//!
//! A timeline is pure data: given the ordered steps of an execution it
//! computes every animation frame and its offset up front. Playback (the
//! driver) and live following (the tracker) are layered on top.

pub mod driver;
pub mod live;

use serde::Serialize;
use serde_json::Value;

use crate::domain::{RunStatus, StepType};
use crate::entities::scout_execution_steps;

/// Typing animation budget for a search query.
const SEARCH_TYPING_MS: u64 = 1000;
/// Offset at which search results replace the skeleton.
const SEARCH_RESULTS_AT_MS: u64 = 2000;
/// Total time a search step stays on screen.
const SEARCH_ADVANCE_AT_MS: u64 = 4000;
/// How long the scrape skeleton shows before the screenshot.
const SCRAPE_SKELETON_MS: u64 = 1000;
/// Total time a scrape step stays on screen.
const SCRAPE_ADVANCE_AT_MS: u64 = 5000;
/// Per-character typing time for summaries.
const SUMMARY_MS_PER_CHAR: u64 = 15;
const SUMMARY_TYPING_MIN_MS: u64 = 1500;
const SUMMARY_TYPING_MAX_MS: u64 = 3000;
/// Dwell after the summary finishes typing.
const SUMMARY_DWELL_MS: u64 = 2000;
/// Time on screen for step types with no dedicated animation.
const DEFAULT_ADVANCE_MS: u64 = 1500;

/// One recorded step, decoded from storage. Unknown step types degrade to
/// the generic animation instead of erroring.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub id: String,
    pub step_type: StepType,
    pub status: RunStatus,
    pub description: String,
    pub input_data: Option<Value>,
    pub output_data: Option<Value>,
}

impl StepRecord {
    #[must_use]
    pub fn from_model(model: &scout_execution_steps::Model) -> Self {
        Self {
            id: model.id.clone(),
            step_type: model.step_type.parse().unwrap_or(StepType::Analyze),
            status: model.status.parse().unwrap_or(RunStatus::Completed),
            description: model.description.clone(),
            input_data: decode(model.input_data.as_deref()),
            output_data: decode(model.output_data.as_deref()),
        }
    }

    /// Steps shown in replay and live view. Tool calls are engine
    /// bookkeeping and failed steps have nothing to animate.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self.step_type, StepType::ToolCall) && !matches!(self.status, RunStatus::Failed)
    }
}

fn decode(raw: Option<&str>) -> Option<Value> {
    raw.and_then(|s| serde_json::from_str(s).ok())
}

/// A search hit as extracted from a search step's output payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: String,
}

/// What the view shows at a given moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    TypingQuery { query: String, char_delay_ms: u64 },
    SearchSkeleton,
    SearchResults { results: Vec<SearchHit> },
    ScrapeSkeleton,
    ScrapeScreenshot {
        screenshot: Option<String>,
        active_result: Option<usize>,
    },
    TypingSummary { summary: String, char_delay_ms: u64 },
    SummaryComplete,
    Working,
}

/// A scheduled frame. `step_index` counts visible steps only and never
/// decreases across the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub offset_ms: u64,
    pub step_index: usize,
    pub step_id: String,
    #[serde(flatten)]
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayTimeline {
    pub events: Vec<TimelineEvent>,
    pub total_ms: u64,
}

impl ReplayTimeline {
    /// Compute the full frame schedule for an execution's steps (in
    /// recorded order). Invisible steps are dropped before scheduling.
    #[must_use]
    pub fn build(steps: &[StepRecord]) -> Self {
        let visible: Vec<&StepRecord> = steps.iter().filter(|s| s.is_visible()).collect();

        let mut events = Vec::new();
        let mut offset = 0u64;

        for (index, step) in visible.iter().enumerate() {
            let mut push = |at: u64, phase: Phase| {
                events.push(TimelineEvent {
                    offset_ms: offset + at,
                    step_index: index,
                    step_id: step.id.clone(),
                    phase,
                });
            };

            let duration = match step.step_type {
                StepType::Search => {
                    let query = search_query(step);
                    let char_delay_ms = SEARCH_TYPING_MS / (query.chars().count().max(1) as u64);
                    push(0, Phase::TypingQuery {
                        query,
                        char_delay_ms,
                    });
                    push(SEARCH_TYPING_MS, Phase::SearchSkeleton);
                    push(SEARCH_RESULTS_AT_MS, Phase::SearchResults {
                        results: search_hits(step),
                    });
                    SEARCH_ADVANCE_AT_MS
                }
                StepType::Scrape => {
                    push(0, Phase::ScrapeSkeleton);
                    push(SCRAPE_SKELETON_MS, Phase::ScrapeScreenshot {
                        screenshot: screenshot(step),
                        active_result: active_result(&visible, index),
                    });
                    SCRAPE_ADVANCE_AT_MS
                }
                StepType::Summarize => {
                    let summary = summary_text(step);
                    let typing_ms = summary_typing_ms(&summary);
                    let char_delay_ms = typing_ms / (summary.chars().count().max(1) as u64);
                    push(0, Phase::TypingSummary {
                        summary,
                        char_delay_ms,
                    });
                    push(typing_ms, Phase::SummaryComplete);
                    typing_ms + SUMMARY_DWELL_MS
                }
                StepType::Analyze | StepType::ToolCall => {
                    push(0, Phase::Working);
                    DEFAULT_ADVANCE_MS
                }
            };

            offset += duration;
        }

        Self {
            events,
            total_ms: offset,
        }
    }
}

fn summary_typing_ms(summary: &str) -> u64 {
    (summary.chars().count() as u64 * SUMMARY_MS_PER_CHAR)
        .clamp(SUMMARY_TYPING_MIN_MS, SUMMARY_TYPING_MAX_MS)
}

fn search_query(step: &StepRecord) -> String {
    step.input_data
        .as_ref()
        .and_then(|v| v.get("query"))
        .and_then(Value::as_str)
        .map_or_else(|| step.description.clone(), ToString::to_string)
}

/// Search output carries hits under `searchResults` or `results` depending
/// on engine version.
fn search_hits(step: &StepRecord) -> Vec<SearchHit> {
    let Some(output) = step.output_data.as_ref() else {
        return Vec::new();
    };

    let items = output
        .get("searchResults")
        .or_else(|| output.get("results"))
        .and_then(Value::as_array);

    items.map_or_else(Vec::new, |items| {
        items
            .iter()
            .filter_map(|item| {
                let url = item.get("url").and_then(Value::as_str)?.to_string();
                let title = item
                    .get("title")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                Some(SearchHit { title, url })
            })
            .collect()
    })
}

/// Summary output lands under `response`; older engine builds wrote
/// `summary`.
fn summary_text(step: &StepRecord) -> String {
    step.output_data
        .as_ref()
        .and_then(|v| v.get("response").or_else(|| v.get("summary")))
        .and_then(Value::as_str)
        .map_or_else(|| step.description.clone(), ToString::to_string)
}

fn screenshot(step: &StepRecord) -> Option<String> {
    step.output_data
        .as_ref()
        .and_then(|v| v.get("screenshot"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

/// The scraped URL, preferring the output record over the request input.
fn scrape_url(step: &StepRecord) -> Option<String> {
    step.output_data
        .as_ref()
        .and_then(|v| v.get("url"))
        .and_then(Value::as_str)
        .or_else(|| {
            step.input_data
                .as_ref()
                .and_then(|v| v.get("url"))
                .and_then(Value::as_str)
        })
        .map(ToString::to_string)
}

/// Index of the result card a scrape highlights: the scraped URL matched
/// against the most recent preceding search step's hits.
fn active_result(visible: &[&StepRecord], scrape_index: usize) -> Option<usize> {
    let url = scrape_url(visible[scrape_index])?;

    let search = visible[..scrape_index]
        .iter()
        .rev()
        .find(|s| matches!(s.step_type, StepType::Search))?;

    search_hits(search).iter().position(|hit| hit.url == url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(id: &str, step_type: StepType, status: RunStatus) -> StepRecord {
        StepRecord {
            id: id.to_string(),
            step_type,
            status,
            description: format!("step {id}"),
            input_data: None,
            output_data: None,
        }
    }

    fn search_step(id: &str, query: &str, urls: &[&str]) -> StepRecord {
        let results: Vec<_> = urls
            .iter()
            .map(|u| json!({"title": "hit", "url": u}))
            .collect();
        StepRecord {
            input_data: Some(json!({"query": query})),
            output_data: Some(json!({"searchResults": results})),
            ..step(id, StepType::Search, RunStatus::Completed)
        }
    }

    fn scrape_step(id: &str, url: &str) -> StepRecord {
        StepRecord {
            input_data: Some(json!({"url": url})),
            output_data: Some(json!({"screenshot": "data:image/png;base64,xyz"})),
            ..step(id, StepType::Scrape, RunStatus::Completed)
        }
    }

    fn summarize_step(id: &str, summary: &str) -> StepRecord {
        StepRecord {
            output_data: Some(json!({"summary": summary})),
            ..step(id, StepType::Summarize, RunStatus::Completed)
        }
    }

    #[test]
    fn search_scrape_summarize_total_duration() {
        let summary = "a".repeat(100);
        let steps = vec![
            search_step("s1", "rust jobs", &["https://a.example"]),
            scrape_step("s2", "https://a.example"),
            summarize_step("s3", &summary),
        ];

        let timeline = ReplayTimeline::build(&steps);

        // 4000 (search) + 5000 (scrape) + 1500 (typing, clamped up) + 2000
        assert_eq!(timeline.total_ms, 4000 + 5000 + 1500 + 2000);
    }

    #[test]
    fn step_index_is_monotonic_and_dense() {
        let steps = vec![
            search_step("s1", "q", &[]),
            step("s2", StepType::Analyze, RunStatus::Completed),
            summarize_step("s3", "done"),
        ];

        let timeline = ReplayTimeline::build(&steps);

        let mut last = 0;
        for event in &timeline.events {
            assert!(event.step_index >= last);
            assert!(event.step_index <= last + 1);
            last = event.step_index;
        }
        assert_eq!(last, 2);
    }

    #[test]
    fn tool_calls_and_failed_steps_never_appear() {
        let steps = vec![
            step("s1", StepType::ToolCall, RunStatus::Completed),
            search_step("s2", "q", &[]),
            step("s3", StepType::Search, RunStatus::Failed),
            summarize_step("s4", "done"),
        ];

        let timeline = ReplayTimeline::build(&steps);

        let ids: Vec<_> = timeline.events.iter().map(|e| e.step_id.as_str()).collect();
        assert!(!ids.contains(&"s1"));
        assert!(!ids.contains(&"s3"));
        assert!(ids.contains(&"s2"));
        assert!(ids.contains(&"s4"));
    }

    #[test]
    fn search_frames_land_on_the_documented_offsets() {
        let steps = vec![search_step("s1", "rust", &["https://a.example"])];

        let timeline = ReplayTimeline::build(&steps);

        assert_eq!(timeline.events.len(), 3);
        assert_eq!(timeline.events[0].offset_ms, 0);
        assert!(matches!(
            timeline.events[0].phase,
            Phase::TypingQuery { ref query, char_delay_ms } if query == "rust" && char_delay_ms == 250
        ));
        assert_eq!(timeline.events[1].offset_ms, 1000);
        assert_eq!(timeline.events[1].phase, Phase::SearchSkeleton);
        assert_eq!(timeline.events[2].offset_ms, 2000);
        assert_eq!(timeline.total_ms, 4000);
    }

    #[test]
    fn scrape_highlights_matching_search_hit() {
        let steps = vec![
            search_step("s1", "q", &["https://a.example", "https://b.example"]),
            scrape_step("s2", "https://b.example"),
        ];

        let timeline = ReplayTimeline::build(&steps);

        let screenshot_frame = timeline
            .events
            .iter()
            .find(|e| matches!(e.phase, Phase::ScrapeScreenshot { .. }))
            .unwrap();
        assert_eq!(screenshot_frame.offset_ms, 4000 + 1000);
        assert!(matches!(
            screenshot_frame.phase,
            Phase::ScrapeScreenshot { active_result: Some(1), .. }
        ));
    }

    #[test]
    fn scrape_with_unmatched_url_highlights_nothing() {
        let steps = vec![
            search_step("s1", "q", &["https://a.example"]),
            scrape_step("s2", "https://elsewhere.example"),
        ];

        let timeline = ReplayTimeline::build(&steps);

        assert!(timeline.events.iter().any(|e| matches!(
            e.phase,
            Phase::ScrapeScreenshot { active_result: None, .. }
        )));
    }

    #[test]
    fn summary_typing_is_clamped_both_ways() {
        assert_eq!(summary_typing_ms(""), 1500);
        assert_eq!(summary_typing_ms(&"a".repeat(150)), 2250);
        assert_eq!(summary_typing_ms(&"a".repeat(10_000)), 3000);
    }

    #[test]
    fn summary_reads_response_before_legacy_summary() {
        let current = StepRecord {
            output_data: Some(json!({"response": "new text", "summary": "old text"})),
            ..step("s1", StepType::Summarize, RunStatus::Completed)
        };
        assert_eq!(summary_text(&current), "new text");

        let legacy = StepRecord {
            output_data: Some(json!({"summary": "old text"})),
            ..step("s2", StepType::Summarize, RunStatus::Completed)
        };
        assert_eq!(summary_text(&legacy), "old text");
    }

    #[test]
    fn scrape_url_prefers_the_output_record() {
        let scrape = StepRecord {
            input_data: Some(json!({"url": "https://requested.example"})),
            output_data: Some(json!({"url": "https://final.example"})),
            ..step("s1", StepType::Scrape, RunStatus::Completed)
        };
        assert_eq!(scrape_url(&scrape).as_deref(), Some("https://final.example"));

        let input_only = scrape_step("s2", "https://requested.example");
        assert_eq!(
            scrape_url(&input_only).as_deref(),
            Some("https://requested.example")
        );
    }

    #[test]
    fn missing_payloads_degrade_to_placeholders() {
        let steps = vec![
            step("s1", StepType::Search, RunStatus::Completed),
            step("s2", StepType::Scrape, RunStatus::Completed),
        ];

        let timeline = ReplayTimeline::build(&steps);

        // Query falls back to the description, results to an empty list.
        assert!(matches!(
            timeline.events[0].phase,
            Phase::TypingQuery { ref query, .. } if query == "step s1"
        ));
        assert!(timeline.events.iter().any(|e| matches!(
            e.phase,
            Phase::SearchResults { ref results } if results.is_empty()
        )));
        assert!(timeline.events.iter().any(|e| matches!(
            e.phase,
            Phase::ScrapeScreenshot {
                screenshot: None,
                active_result: None
            }
        )));
    }

    #[test]
    fn empty_execution_has_empty_timeline() {
        let timeline = ReplayTimeline::build(&[]);
        assert!(timeline.events.is_empty());
        assert_eq!(timeline.total_ms, 0);
    }
}
