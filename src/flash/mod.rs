/// 플래시 메시지 관리
/// 1. 표시 후 일정 시간이 지나면 흐려졌다가 제거
/// 2. 클릭하면 즉시 제거
/// 3. 런타임 알림 메시지 생성
// region:    --- Imports
use crate::dom::Document;
use crate::format::format_amount;
use crate::timer::{TimerHandle, TimerKey, TimerSet};
use indextree::NodeId;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

// endregion: --- Imports

pub const FLASH_CLASS: &str = "flash-message";
pub const CONTAINER_CLASS: &str = "container";

// region:    --- Severity
/// 메시지 심각도
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// `flash-{severity}`
    pub fn class(self) -> String {
        format!("flash-{}", self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "success" => Ok(Severity::Success),
            "warning" => Ok(Severity::Warning),
            "error" | "danger" => Ok(Severity::Error),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}
// endregion: --- Severity

// region:    --- Flash Manager
/// 플래시 메시지 수명 관리자
#[derive(Clone)]
pub struct FlashManager {
    doc: Document,
    timers: Arc<TimerSet>,
    lifetime: Duration,
    fade: Duration,
}

impl FlashManager {
    pub fn new(doc: Document, timers: Arc<TimerSet>, lifetime: Duration, fade: Duration) -> Self {
        Self {
            doc,
            timers,
            lifetime,
            fade,
        }
    }

    /// 페이지에 이미 있는 메시지 등록
    pub fn enroll_existing(&self) -> usize {
        let messages = self.doc.elements_by_class(FLASH_CLASS);
        for &message in &messages {
            self.enroll(message);
        }
        info!("{:<12} --> 플래시 메시지 초기화: {}개", "Flash", messages.len());
        messages.len()
    }

    /// 자동 제거 예약
    pub fn enroll(&self, message: NodeId) {
        let doc = self.doc.clone();
        let lifetime = self.lifetime;
        let fade = self.fade;
        let transition = format!("opacity {}s", format_amount(fade.as_secs_f64()));

        let handle = TimerHandle::spawn("flash-dismiss", async move {
            sleep(lifetime).await;
            doc.set_style(message, "opacity", "0");
            doc.set_style(message, "transition", &transition);
            sleep(fade).await;
            if doc.remove(message) {
                debug!("{:<12} --> 플래시 메시지 자동 제거", "Flash");
            }
        });
        self.timers.insert(TimerKey::FlashDismiss(message), handle);
    }

    /// 알림 메시지 생성 후 컨테이너 맨 앞에 삽입
    pub fn notify(&self, message: &str, severity: Severity) -> NodeId {
        let node = self
            .doc
            .element("div")
            .class(FLASH_CLASS)
            .class(&severity.class())
            .text(message)
            .build();

        let container = self
            .doc
            .first_by_class(CONTAINER_CLASS)
            .unwrap_or_else(|| self.doc.body());
        self.doc.prepend_child(container, node);
        self.enroll(node);

        info!("{:<12} --> 알림 표시 [{}]: {}", "Flash", severity, message);
        node
    }

    /// 클릭으로 즉시 제거, 이미 없는 메시지라면 아무 일도 없다
    pub fn dismiss(&self, message: NodeId) -> bool {
        self.timers.cancel(TimerKey::FlashDismiss(message));
        let removed = self.doc.remove(message);
        if removed {
            debug!("{:<12} --> 플래시 메시지 클릭 제거", "Flash");
        }
        removed
    }

    /// 클릭 대상이 속한 플래시 메시지
    pub fn message_for(&self, target: NodeId) -> Option<NodeId> {
        self.doc.closest(target, FLASH_CLASS)
    }
}
// endregion: --- Flash Manager

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(doc: &Document) -> FlashManager {
        FlashManager::new(
            doc.clone(),
            Arc::new(TimerSet::new()),
            Duration::from_secs(5),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn severity_parses_known_names() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("danger".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!(" Success ".parse::<Severity>(), Ok(Severity::Success));
        assert!("loud".parse::<Severity>().is_err());
        assert_eq!(Severity::default().class(), "flash-info");
    }

    #[tokio::test(start_paused = true)]
    async fn message_fades_then_disappears() {
        let doc = Document::new();
        let flash = manager(&doc);
        let node = flash.notify("Sparat", Severity::Success);

        sleep(Duration::from_millis(4_900)).await;
        assert!(doc.is_connected(node));
        assert_eq!(doc.style(node, "opacity"), None);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(doc.style(node, "opacity").as_deref(), Some("0"));
        assert_eq!(doc.style(node, "transition").as_deref(), Some("opacity 0.5s"));
        assert!(doc.is_connected(node));

        sleep(Duration::from_millis(500)).await;
        assert!(!doc.is_connected(node));
    }

    #[tokio::test(start_paused = true)]
    async fn dismissing_twice_is_harmless() {
        let doc = Document::new();
        let flash = manager(&doc);
        let node = flash.notify("Hej", Severity::Info);

        assert!(flash.dismiss(node));
        assert!(!flash.dismiss(node));

        sleep(Duration::from_secs(6)).await;
        assert!(!doc.is_connected(node));
    }

    #[tokio::test(start_paused = true)]
    async fn notifications_go_first_in_container() {
        let doc = Document::new();
        let container = doc.element("main").class(CONTAINER_CLASS).append_to(doc.body());
        let heading = doc.element("h1").text("Auktioner").append_to(container);
        let flash = manager(&doc);

        let first = flash.notify("ett", Severity::Info);
        let second = flash.notify("två", Severity::Warning);

        assert_eq!(doc.children(container), vec![second, first, heading]);
        assert_eq!(doc.class_name(second), "flash-message flash-warning");
    }
}
