/// 경매 페이지
/// 페이지 로드 시 네 가지 초기화(카운트다운, 좋아요/싫어요, 입찰 폼, 플래시 메시지)와
/// 검색 디바운스를 각각 독립적으로 실행하고, 이후 사용자 이벤트를 해당 핸들러로 보낸다.
/// 페이지가 내려가면(`teardown` 또는 drop) 모든 타이머와 진행 중인 토글 요청이 함께 취소된다.
// region:    --- Imports
use crate::bidding::{BidFormGuard, SubmitOutcome};
use crate::config::PageConfig;
use crate::countdown::{Clock, CountdownDriver};
use crate::dom::Document;
use crate::flash::{FlashManager, Severity};
use crate::likes::{LikeToggler, Polarity, ToggleClient};
use crate::search::SearchDebouncer;
use crate::timer::TimerSet;
use indextree::NodeId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

// endregion: --- Imports

/// 클릭 처리 결과
#[derive(Debug, Default)]
pub struct ClickOutcome {
    pub default_prevented: bool,
    /// 토글 요청을 보냈다면 그 작업
    pub request: Option<JoinHandle<()>>,
    pub dismissed_flash: bool,
}

// region:    --- Auction Page
pub struct AuctionPage {
    doc: Document,
    timers: Arc<TimerSet>,
    flash: FlashManager,
    toggler: LikeToggler,
    buttons: HashMap<NodeId, Polarity>,
    bid_guard: Option<BidFormGuard>,
    search: Option<SearchDebouncer>,
}

impl AuctionPage {
    /// 페이지 로드, tokio 런타임 안에서 호출해야 한다
    pub fn load(
        doc: Document,
        config: &PageConfig,
        client: Arc<dyn ToggleClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let timers = Arc::new(TimerSet::new());
        let flash = FlashManager::new(
            doc.clone(),
            Arc::clone(&timers),
            config.flash_lifetime,
            config.flash_fade,
        );
        let toggler = LikeToggler::new(doc.clone(), client);

        // 카운트다운
        CountdownDriver::new(doc.clone(), clock, config.countdown_tick).attach_all(&timers);

        // 좋아요/싫어요
        let buttons = toggler.discover().into_iter().collect();

        // 입찰 폼
        let bid_guard = BidFormGuard::attach(doc.clone(), flash.clone());

        // 플래시 메시지
        flash.enroll_existing();

        // 검색
        let search = SearchDebouncer::attach(doc.clone(), Arc::clone(&timers), config.search_debounce);

        info!("{:<12} --> 경매 페이지 로드 완료", "Page");
        Self {
            doc,
            timers,
            flash,
            toggler,
            buttons,
            bid_guard,
            search,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    /// 클릭 이벤트, 대상에서 가장 가까운 버튼/메시지가 처리한다
    pub fn click(&self, target: NodeId) -> ClickOutcome {
        let button = [Polarity::Like, Polarity::Dislike]
            .into_iter()
            .find_map(|polarity| {
                self.doc
                    .closest(target, polarity.button_class())
                    .filter(|node| self.buttons.get(node) == Some(&polarity))
                    .map(|node| (node, polarity))
            });

        if let Some((button, polarity)) = button {
            return ClickOutcome {
                default_prevented: true,
                request: self.toggler.click(button, polarity),
                dismissed_flash: false,
            };
        }

        if let Some(message) = self.flash.message_for(target) {
            return ClickOutcome {
                dismissed_flash: self.flash.dismiss(message),
                ..Default::default()
            };
        }

        debug!("{:<12} --> 처리할 핸들러 없는 클릭", "Page");
        ClickOutcome::default()
    }

    /// 폼 제출 이벤트, 입찰 폼이 아니면 그대로 통과
    pub fn submit(&self, form: NodeId) -> SubmitOutcome {
        match &self.bid_guard {
            Some(guard) if guard.form() == form => guard.on_submit(),
            _ => SubmitOutcome::passthrough(),
        }
    }

    /// 입력 이벤트
    pub fn input(&self, target: NodeId) {
        if let Some(search) = self.search.as_ref().filter(|s| s.input() == target) {
            search.on_input();
        }
    }

    pub fn settled_search_query(&self) -> Option<String> {
        self.search.as_ref().and_then(SearchDebouncer::settled_query)
    }

    /// 알림 메시지 표시
    pub fn notify(&self, message: &str, severity: Severity) -> NodeId {
        self.flash.notify(message, severity)
    }

    /// 모든 타이머 취소, 이후 도착하는 토글 응답은 무시
    pub fn teardown(&self) {
        let aborted = self.toggler.shutdown();
        let cancelled = self.timers.cancel_all();
        if cancelled + aborted > 0 {
            info!(
                "{:<12} --> 페이지 종료, 타이머 {}개 취소, 토글 요청 {}개 중단",
                "Page", cancelled, aborted
            );
        }
    }
}

impl Drop for AuctionPage {
    fn drop(&mut self) {
        self.teardown();
    }
}
// endregion: --- Auction Page
