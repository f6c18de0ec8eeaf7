/// 좋아요/싫어요 버튼 클릭 처리
/// 1. 요청 중인 버튼은 `disabled`로 표시하고 추가 클릭은 합친다
/// 2. 버튼당 요청은 최대 하나이므로 응답 순서가 뒤바뀌지 않는다
/// 3. 실패는 로그만 남기고 버튼 상태는 그대로 둔다
/// 4. `shutdown`은 진행 중인 요청을 모두 중단한다
// region:    --- Imports
use super::client::{Polarity, ToggleClient, ToggleError, ToggleResponse};
use crate::dom::Document;
use crate::format::format_amount;
use indextree::NodeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

// endregion: --- Imports

pub const AUCTION_ID_KEY: &str = "auction-id";
pub const COUNT_CLASS: &str = "count";
pub const ACTIVE_CLASS: &str = "active";
const DISABLED_ATTR: &str = "disabled";

/// 좋아요/싫어요 토글러
#[derive(Clone)]
pub struct LikeToggler {
    doc: Document,
    client: Arc<dyn ToggleClient>,
    /// 버튼별 진행 중인 요청
    in_flight: Arc<Mutex<HashMap<NodeId, AbortHandle>>>,
    live: Arc<AtomicBool>,
}

impl LikeToggler {
    pub fn new(doc: Document, client: Arc<dyn ToggleClient>) -> Self {
        Self {
            doc,
            client,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<NodeId, AbortHandle>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 문서에서 토글 버튼 수집
    pub fn discover(&self) -> Vec<(NodeId, Polarity)> {
        let mut buttons = Vec::new();
        for polarity in [Polarity::Like, Polarity::Dislike] {
            for node in self.doc.elements_by_class(polarity.button_class()) {
                buttons.push((node, polarity));
            }
        }
        info!(
            "{:<12} --> 좋아요/싫어요 버튼 초기화: {}개",
            "LikeToggle",
            buttons.len()
        );
        buttons
    }

    pub fn is_in_flight(&self, button: NodeId) -> bool {
        self.in_flight().contains_key(&button)
    }

    /// 클릭 처리, 요청을 보냈다면 해당 작업 핸들 반환
    pub fn click(&self, button: NodeId, polarity: Polarity) -> Option<JoinHandle<()>> {
        if !self.live.load(Ordering::SeqCst) {
            return None;
        }
        let Some(auction_id) = self.doc.dataset(button, AUCTION_ID_KEY) else {
            warn!("{:<12} --> auction-id 없는 버튼 클릭 무시", "LikeToggle");
            return None;
        };

        // 등록 전에 작업이 끝나 finish가 먼저 잠금을 잡는 일이 없도록 잠금을 쥔 채 spawn
        let mut in_flight = self.in_flight();
        if in_flight.contains_key(&button) {
            debug!("{:<12} --> 요청 진행 중, 클릭 합침", "LikeToggle");
            return None;
        }
        self.doc.set_attribute(button, DISABLED_ATTR, "");

        let toggler = self.clone();
        let request = tokio::spawn(async move {
            let result = toggler.client.toggle(&auction_id, polarity).await;
            toggler.finish(button, &auction_id, polarity, result);
        });
        in_flight.insert(button, request.abort_handle());
        Some(request)
    }

    fn finish(
        &self,
        button: NodeId,
        auction_id: &str,
        polarity: Polarity,
        result: Result<ToggleResponse, ToggleError>,
    ) {
        if self.in_flight().remove(&button).is_none() {
            debug!("{:<12} --> 페이지 종료 후 응답 무시", "LikeToggle");
            return;
        }
        self.doc.remove_attribute(button, DISABLED_ATTR);

        match result {
            Ok(response) => self.apply(button, &response),
            Err(e) => error!(
                "{:<12} --> 토글 실패: auction={}, polarity={:?}, error={}",
                "LikeToggle", auction_id, polarity, e
            ),
        }
    }

    fn apply(&self, button: NodeId, response: &ToggleResponse) {
        let count = format_amount(response.count);
        if let Some(node) = self.doc.find_class_within(button, COUNT_CLASS) {
            self.doc.set_text(node, &count);
        }
        let active = self.doc.toggle_class(button, ACTIVE_CLASS);
        info!(
            "{:<12} --> 토글 반영: count={}, active={}",
            "LikeToggle", count, active
        );
    }

    /// 진행 중인 요청을 모두 중단하고 이후 클릭은 무시한다
    pub fn shutdown(&self) -> usize {
        self.live.store(false, Ordering::SeqCst);
        let aborted: Vec<(NodeId, AbortHandle)> = self.in_flight().drain().collect();
        for (button, request) in &aborted {
            request.abort();
            self.doc.remove_attribute(*button, DISABLED_ATTR);
        }
        aborted.len()
    }
}
