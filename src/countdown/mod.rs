/// 경매 종료 카운트다운
/// `.countdown-timer` 요소마다 독립적인 반복 작업을 하나씩 돌린다.
/// 종료 시각이 지나면 종료 문구를 한 번 그리고 반복 작업을 멈춘다.
// region:    --- Imports
use crate::dom::Document;
use crate::format::parse_timestamp;
use crate::timer::{TimerHandle, TimerKey, TimerSet};
use chrono::{DateTime, Utc};
use indextree::NodeId;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info, warn};

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

// endregion: --- Imports

pub const COUNTDOWN_CLASS: &str = "countdown-timer";
pub const END_TIME_KEY: &str = "end-time";
pub const ENDED_LABEL: &str = "Auktionen har avslutats";
const TIME_UNIT_CLASS: &str = "time-unit";

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

// region:    --- Remaining Time
/// 남은 시간 (일/시/분/초, 내림)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// 남은 밀리초로부터 분해, 음수면 `None`
    pub fn from_millis(distance: i64) -> Option<Self> {
        if distance < 0 {
            return None;
        }
        Some(Self {
            days: distance / MS_PER_DAY,
            hours: (distance % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (distance % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (distance % MS_PER_MINUTE) / MS_PER_SECOND,
        })
    }

    pub fn total_seconds(&self) -> i64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    pub fn units(&self) -> [String; 4] {
        [
            format!("{}d", self.days),
            format!("{}h", self.hours),
            format!("{}m", self.minutes),
            format!("{}s", self.seconds),
        ]
    }
}

/// 카운트다운 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running(Remaining),
    Ended,
}

impl CountdownState {
    /// 종료 시각을 알 수 없으면 이미 끝난 것으로 본다
    pub fn evaluate(end_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        end_time
            .and_then(|end| Remaining::from_millis((end - now).num_milliseconds()))
            .map_or(Self::Ended, Self::Running)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }
}
// endregion: --- Remaining Time

// region:    --- Rendering
/// 요소 내용을 상태에 맞게 다시 그린다
/// 진행 중이고 이미 네 칸이 그려져 있으면 새 요소를 만들지 않고 글자만 바꾼다.
pub fn render(doc: &Document, node: NodeId, state: CountdownState) {
    match state {
        CountdownState::Ended => {
            let ended = doc.element("span").class("ended").text(ENDED_LABEL).build();
            doc.replace_children(node, &[ended]);
        }
        CountdownState::Running(remaining) => {
            let units = remaining.units();
            let existing = doc.children(node);
            let reusable = existing.len() == units.len()
                && existing.iter().all(|&n| doc.has_class(n, TIME_UNIT_CLASS));
            if reusable {
                for (&span, unit) in existing.iter().zip(&units) {
                    doc.set_text(span, unit);
                }
            } else {
                let spans: Vec<NodeId> = units
                    .iter()
                    .map(|unit| doc.element("span").class(TIME_UNIT_CLASS).text(unit).build())
                    .collect();
                doc.replace_children(node, &spans);
            }
        }
    }
}
// endregion: --- Rendering

// region:    --- Countdown Driver
/// 카운트다운 요소에 반복 작업을 붙이는 드라이버
#[derive(Clone)]
pub struct CountdownDriver {
    doc: Document,
    clock: Arc<dyn Clock>,
    tick: Duration,
}

impl CountdownDriver {
    pub fn new(doc: Document, clock: Arc<dyn Clock>, tick: Duration) -> Self {
        Self { doc, clock, tick }
    }

    /// 문서의 모든 카운트다운 요소에 작업 등록, 등록된 요소 수 반환
    pub fn attach_all(&self, timers: &TimerSet) -> usize {
        let nodes = self.doc.elements_by_class(COUNTDOWN_CLASS);
        let mut running = 0;
        for node in &nodes {
            if let Some(handle) = self.attach(*node) {
                timers.insert(TimerKey::Countdown(*node), handle);
                running += 1;
            }
        }
        info!(
            "{:<12} --> 카운트다운 초기화: 전체 {}, 진행 중 {}",
            "Countdown",
            nodes.len(),
            running
        );
        running
    }

    /// 즉시 한 번 그리고, 아직 끝나지 않았다면 반복 작업 반환
    pub fn attach(&self, node: NodeId) -> Option<TimerHandle> {
        let raw = self.doc.dataset(node, END_TIME_KEY);
        let end_time = raw.as_deref().and_then(parse_timestamp);
        if end_time.is_none() {
            warn!(
                "{:<12} --> 종료 시각 해석 실패, 종료로 처리: {:?}",
                "Countdown", raw
            );
        }

        let first = CountdownState::evaluate(end_time, self.clock.now());
        render(&self.doc, node, first);
        if first.is_ended() {
            return None;
        }

        let doc = self.doc.clone();
        let clock = Arc::clone(&self.clock);
        Some(TimerHandle::repeating("countdown", self.tick, move || {
            if !doc.is_connected(node) {
                debug!("{:<12} --> 문서에서 제거된 카운트다운 중단", "Countdown");
                return ControlFlow::Break(());
            }
            let state = CountdownState::evaluate(end_time, clock.now());
            render(&doc, node, state);
            if state.is_ended() {
                info!("{:<12} --> 경매 종료 표시", "Countdown");
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }))
    }
}
// endregion: --- Countdown Driver

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_800_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn breakdown_sums_to_remaining_duration() {
        let now = at(0);
        for secs in [0, 59, 3_600, 86_399, 90_061, 1_000_000] {
            let state = CountdownState::evaluate(Some(at(secs)), now);
            let CountdownState::Running(remaining) = state else {
                panic!("expected running for {secs}");
            };
            assert_eq!(remaining.total_seconds(), secs);
            assert!(remaining.hours < 24 && remaining.minutes < 60 && remaining.seconds < 60);
        }
    }

    #[test]
    fn past_or_unknown_deadline_is_ended() {
        assert_eq!(CountdownState::evaluate(Some(at(-1)), at(0)), CountdownState::Ended);
        assert_eq!(CountdownState::evaluate(None, at(0)), CountdownState::Ended);
    }

    #[test]
    fn partial_seconds_round_down() {
        let remaining = Remaining::from_millis(90_061_999).unwrap();
        assert_eq!(remaining.units(), ["1d", "1h", "1m", "1s"].map(String::from));
        assert_eq!(Remaining::from_millis(-1), None);
    }

    #[test]
    fn render_replaces_previous_content() {
        let doc = Document::new();
        let node = doc
            .element("div")
            .class(COUNTDOWN_CLASS)
            .text("laddar...")
            .append_to(doc.body());

        render(&doc, node, CountdownState::Running(Remaining::from_millis(3_723_000).unwrap()));
        assert_eq!(doc.text_content(node), "0d1h2m3s");
        assert_eq!(doc.children(node).len(), 4);

        render(&doc, node, CountdownState::Ended);
        assert_eq!(doc.text_content(node), ENDED_LABEL);
        let ended = doc.children(node);
        assert_eq!(ended.len(), 1);
        assert!(doc.has_class(ended[0], "ended"));
    }

    #[test]
    fn ticking_reuses_time_unit_spans() {
        let doc = Document::new();
        let node = doc.element("div").class(COUNTDOWN_CLASS).append_to(doc.body());

        render(&doc, node, CountdownState::Running(Remaining::from_millis(1_000_000_000).unwrap()));
        let spans = doc.children(node);
        let nodes_after_first = doc.node_count();

        for tick in 1..=1000 {
            let remaining = Remaining::from_millis(1_000_000_000 - tick * 1000).unwrap();
            render(&doc, node, CountdownState::Running(remaining));
        }

        assert_eq!(doc.node_count(), nodes_after_first);
        assert_eq!(doc.children(node), spans);
        assert_eq!(doc.text_content(node), "11d13h30m0s");
    }
}
