/// 페이지 타이머 관리
/// 반복/지연 작업은 모두 소유된 핸들로 표현되며, 핸들을 취소하거나 버리면 작업도 중단된다.
// region:    --- Imports
use indextree::NodeId;
use std::collections::HashMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Duration, Instant, MissedTickBehavior};
use tracing::debug;

// endregion: --- Imports

// region:    --- Timer Handle
/// 취소 가능한 작업 핸들
/// tokio 런타임 안에서 생성해야 한다.
#[derive(Debug)]
pub struct TimerHandle {
    label: &'static str,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// 임의의 비동기 작업 등록
    pub fn spawn<F>(label: &'static str, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            label,
            task: tokio::spawn(fut),
        }
    }

    /// `period`마다 `tick` 실행, `Break`를 반환하면 스스로 종료
    /// 첫 실행은 한 주기 뒤에 일어난다.
    pub fn repeating<F>(label: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        Self::spawn(label, async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tick().is_break() {
                    debug!("{:<12} --> 반복 작업 종료: {}", "Timer", label);
                    break;
                }
            }
        })
    }

    /// `delay` 후 한 번 실행
    pub fn delayed<F>(label: &'static str, delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn(label, async move {
            sleep(delay).await;
            f();
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
// endregion: --- Timer Handle

// region:    --- Timer Set
/// 타이머 식별 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Countdown(NodeId),
    FlashDismiss(NodeId),
    SearchDebounce,
}

/// 페이지가 소유하는 타이머 묶음
/// 같은 키로 다시 등록하면 이전 작업은 취소된다.
#[derive(Debug, Default)]
pub struct TimerSet {
    handles: Mutex<HashMap<TimerKey, TimerHandle>>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TimerKey, TimerHandle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, key: TimerKey, handle: TimerHandle) {
        let mut handles = self.lock();
        handles.retain(|_, h| !h.is_finished());
        if let Some(previous) = handles.insert(key, handle) {
            debug!(
                "{:<12} --> 기존 작업 교체: {} {:?}",
                "Timer",
                previous.label(),
                key
            );
        }
    }

    /// 키에 해당하는 작업 취소, 실행 중이던 작업이 있었으면 `true`
    pub fn cancel(&self, key: TimerKey) -> bool {
        match self.lock().remove(&key) {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.cancel();
                was_running
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> usize {
        let drained: Vec<TimerHandle> = self.lock().drain().map(|(_, h)| h).collect();
        let running = drained.iter().filter(|h| !h.is_finished()).count();
        for handle in &drained {
            handle.cancel();
        }
        running
    }

    pub fn is_active(&self, key: TimerKey) -> bool {
        self.lock().get(&key).is_some_and(|h| !h.is_finished())
    }

    pub fn active_count(&self) -> usize {
        self.lock().values().filter(|h| !h.is_finished()).count()
    }
}
// endregion: --- Timer Set

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn repeating_stops_on_break() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = TimerHandle::repeating("test", Duration::from_secs(1), move || {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        sleep(Duration::from_millis(10_500)).await;

        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn reinserting_a_key_cancels_the_previous_task() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timers = TimerSet::new();

        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            timers.insert(
                TimerKey::SearchDebounce,
                TimerHandle::delayed("debounce", Duration::from_millis(300), move || {
                    fired.fetch_add(1, Ordering::SeqCst);
                }),
            );
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_secs(1)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_everything() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timers = TimerSet::new();
        let doc = crate::dom::Document::new();
        let node = doc.body();

        let counter = Arc::clone(&fired);
        timers.insert(
            TimerKey::Countdown(node),
            TimerHandle::repeating("countdown", Duration::from_secs(1), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }),
        );
        assert_eq!(timers.active_count(), 1);

        assert_eq!(timers.cancel_all(), 1);
        sleep(Duration::from_secs(5)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timers.active_count(), 0);
    }
}
