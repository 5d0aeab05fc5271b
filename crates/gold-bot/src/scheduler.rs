//! 일일 스케줄러.
//!
//! 상태는 `Idle`과 `Running` 두 가지입니다. 트리거가 오면 `Running`으로 전환해
//! 파이프라인을 실행하고, 성공/실패와 무관하게 `Idle`로 돌아옵니다.
//!
//! 중복 실행 정책은 **건너뛰기**입니다:
//! - 이전 실행이 끝나기 전 시각의 트리거는 건너뜁니다.
//! - 같은 현지 날짜에 이미 실행했다면 건너뜁니다.
//!
//! 대기열은 없으며 건너뛴 트리거는 `warn` 로그만 남깁니다.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use gold_core::GoldError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::pipeline::{PremiumPipeline, RunReport};

/// 현재 시각 제공자.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 트리거 발생원.
#[async_trait]
pub trait TriggerSource: Send {
    /// 다음 트리거까지 기다린 뒤 발생 시각을 반환합니다.
    ///
    /// `None`이면 더 이상 트리거가 없습니다.
    async fn next_trigger(&mut self) -> Option<DateTime<Utc>>;
}

/// `now` 이후(같은 시각 제외) 처음으로 현지 시각이 `time`이 되는 순간.
///
/// 서머타임으로 존재하지 않는 현지 시각은 한 시간 뒤로 밀고,
/// 두 번 존재하는 시각은 앞쪽을 사용합니다.
pub fn next_trigger_after(now: DateTime<Utc>, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    let mut date = now.with_timezone(&tz).date_naive();

    // 오늘, 내일, 그리고 서머타임 경계로 후보가 밀린 경우의 모레까지
    for _ in 0..3 {
        let naive = date.and_time(time);
        let local = match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
        };

        if let Some(candidate) = local.map(|dt| dt.with_timezone(&Utc)) {
            if candidate > now {
                return Some(candidate);
            }
        }
        date = date.succ_opt()?;
    }

    None
}

/// 매일 같은 현지 시각에 발생하는 트리거.
pub struct DailyTrigger {
    time: NaiveTime,
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl DailyTrigger {
    pub fn new(time: NaiveTime, timezone: Tz, clock: Arc<dyn Clock>) -> Self {
        Self {
            time,
            timezone,
            clock,
        }
    }
}

#[async_trait]
impl TriggerSource for DailyTrigger {
    async fn next_trigger(&mut self) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        let at = next_trigger_after(now, self.time, self.timezone)?;
        let wait = (at - now).to_std().unwrap_or_default();

        info!(
            next_run = %at.with_timezone(&self.timezone),
            wait_secs = wait.as_secs(),
            "다음 실행 예약"
        );
        tokio::time::sleep(wait).await;

        Some(at)
    }
}

/// 스케줄러 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// 트리거를 건너뛴 이유.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 이전 실행이 끝나기 전에 발생한 트리거
    Overlap { previous_finished_at: DateTime<Utc> },
    /// 같은 현지 날짜에 이미 실행함
    AlreadyRanToday { date: NaiveDate },
}

/// 트리거 하나의 처리 결과.
#[derive(Debug)]
pub enum TriggerOutcome {
    Completed(Box<RunReport>),
    Failed(GoldError),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy)]
struct LastRun {
    date: NaiveDate,
    finished_at: DateTime<Utc>,
}

/// 일일 프리미엄 알림 스케줄러.
pub struct Scheduler<T> {
    pipeline: Arc<PremiumPipeline>,
    trigger: T,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    state: SchedulerState,
    last_run: Option<LastRun>,
    cancel: CancellationToken,
}

impl<T: TriggerSource> Scheduler<T> {
    pub fn new(
        pipeline: Arc<PremiumPipeline>,
        trigger: T,
        clock: Arc<dyn Clock>,
        timezone: Tz,
    ) -> Self {
        Self {
            pipeline,
            trigger,
            clock,
            timezone,
            state: SchedulerState::Idle,
            last_run: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// 다른 태스크에서 스케줄러를 멈출 때 사용할 토큰.
    pub fn stop_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 중지를 요청합니다. 진행 중인 실행은 끝까지 수행됩니다.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// 중지되거나 트리거가 소진될 때까지 실행합니다.
    pub async fn start(&mut self) {
        info!(timezone = %self.timezone, "스케줄러 시작");

        loop {
            let next = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    info!("스케줄러 중지 요청 수신");
                    break;
                }

                next = self.trigger.next_trigger() => next,
            };

            let Some(fired_at) = next else {
                info!("더 이상 트리거가 없어 스케줄러 종료");
                break;
            };

            self.fire(fired_at).await;
        }

        info!("스케줄러 종료");
    }

    /// 현재 시각 기준으로 한 번 실행합니다 (건너뛰기 정책 적용).
    pub async fn trigger(&mut self) -> TriggerOutcome {
        let now = self.clock.now();
        self.fire(now).await
    }

    async fn fire(&mut self, fired_at: DateTime<Utc>) -> TriggerOutcome {
        if let Some(reason) = self.skip_reason(fired_at) {
            warn!(fired_at = %fired_at, reason = ?reason, "트리거 건너뜀");
            return TriggerOutcome::Skipped(reason);
        }

        self.state = SchedulerState::Running;
        let outcome = self.pipeline.run_once().await;
        self.state = SchedulerState::Idle;

        self.last_run = Some(LastRun {
            date: fired_at.with_timezone(&self.timezone).date_naive(),
            finished_at: self.clock.now(),
        });

        match outcome {
            Ok(report) => {
                report.log_summary();
                TriggerOutcome::Completed(Box::new(report))
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "프리미엄 알림 실행 실패");
                TriggerOutcome::Failed(e)
            }
        }
    }

    fn skip_reason(&self, fired_at: DateTime<Utc>) -> Option<SkipReason> {
        let last = self.last_run?;

        if fired_at < last.finished_at {
            return Some(SkipReason::Overlap {
                previous_finished_at: last.finished_at,
            });
        }

        let date = fired_at.with_timezone(&self.timezone).date_naive();
        (date == last.date).then_some(SkipReason::AlreadyRanToday { date })
    }
}
