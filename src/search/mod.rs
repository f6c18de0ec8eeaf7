// region:    --- Imports
use crate::dom::Document;
use crate::timer::{TimerHandle, TimerKey, TimerSet};
use indextree::NodeId;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::Duration;
use tracing::{debug, info};

// endregion: --- Imports

pub const SEARCH_INPUT_ID: &str = "search-input";
pub const SEARCH_FORM_ID: &str = "search-form";

/// 검색어 입력 디바운서
/// 입력이 멈춘 뒤 `delay`가 지나야 검색어가 확정된다.
#[derive(Clone)]
pub struct SearchDebouncer {
    doc: Document,
    input: NodeId,
    timers: Arc<TimerSet>,
    delay: Duration,
    settled: Arc<Mutex<Option<String>>>,
}

impl SearchDebouncer {
    /// 검색 입력란과 폼이 모두 있을 때만 등록
    pub fn attach(doc: Document, timers: Arc<TimerSet>, delay: Duration) -> Option<Self> {
        let input = doc.element_by_id(SEARCH_INPUT_ID)?;
        doc.element_by_id(SEARCH_FORM_ID)?;
        info!("{:<12} --> 검색 입력 디바운스 등록", "Search");
        Some(Self {
            doc,
            input,
            timers,
            delay,
            settled: Arc::new(Mutex::new(None)),
        })
    }

    pub fn input(&self) -> NodeId {
        self.input
    }

    /// 입력 이벤트, 대기 중인 확정 작업을 새로 건다
    pub fn on_input(&self) {
        let doc = self.doc.clone();
        let input = self.input;
        let settled = Arc::clone(&self.settled);
        self.timers.insert(
            TimerKey::SearchDebounce,
            TimerHandle::delayed("search-debounce", self.delay, move || {
                let query = doc.value(input).unwrap_or_default();
                debug!("{:<12} --> 검색어 확정: {:?}", "Search", query);
                *settled.lock().unwrap_or_else(PoisonError::into_inner) = Some(query);
            }),
        );
    }

    pub fn settled_query(&self) -> Option<String> {
        self.settled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
