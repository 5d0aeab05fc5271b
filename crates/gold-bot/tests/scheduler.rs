//! 스케줄러 중복 실행 정책 및 종료 테스트.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{Duration, NaiveTime, TimeZone, Utc};
use common::*;
use gold_bot::{
    DailyTrigger, PremiumPipeline, Scheduler, SchedulerState, SkipReason, TriggerOutcome,
};
use rust_decimal_macros::dec;

fn kst_nine_on(day: u32) -> chrono::DateTime<Utc> {
    // 09:00 KST == 00:00 UTC
    Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap()
}

#[tokio::test]
async fn test_skips_overlapping_and_same_day_triggers() {
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Arc::new(standard_pipeline(notifier.clone()));
    let clock = Arc::new(ManualClock::new(kst_nine_on(1) - Duration::hours(1)));

    let trigger = ScriptedTrigger::new(
        vec![
            kst_nine_on(1),
            // 첫 실행이 끝나기 전
            kst_nine_on(1) + Duration::seconds(30),
            // 같은 날 18:00 KST
            kst_nine_on(1) + Duration::hours(9),
            kst_nine_on(2),
        ],
        clock.clone(),
        Duration::minutes(1),
    );

    let mut scheduler = Scheduler::new(pipeline, trigger, clock, chrono_tz::Asia::Seoul);
    scheduler.start().await;

    assert_eq!(notifier.count(), 2);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[tokio::test]
async fn test_failed_run_returns_to_idle_and_next_day_runs_again() {
    let notifier = Arc::new(RecordingNotifier::default());
    let international = Arc::new(FakePriceSource::usd(dec!(2000)));
    let pipeline = Arc::new(PremiumPipeline::new(
        international.clone(),
        Arc::new(FakePriceSource::krw(dec!(2850000))),
        Arc::new(FakeRateSource::failing()),
        notifier.clone(),
    ));
    let clock = Arc::new(ManualClock::new(kst_nine_on(1)));
    let trigger = ScriptedTrigger::new(
        vec![kst_nine_on(1), kst_nine_on(2), kst_nine_on(3)],
        clock.clone(),
        Duration::seconds(5),
    );

    let mut scheduler = Scheduler::new(pipeline, trigger, clock, chrono_tz::Asia::Seoul);
    scheduler.start().await;

    assert_eq!(international.calls.load(Ordering::SeqCst), 3);
    assert_eq!(notifier.count(), 0);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[tokio::test]
async fn test_manual_trigger_twice_same_day_is_skipped() {
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Arc::new(standard_pipeline(notifier.clone()));
    let clock = Arc::new(ManualClock::new(kst_nine_on(1)));
    let trigger = ScriptedTrigger::new(Vec::new(), clock.clone(), Duration::zero());
    let mut scheduler = Scheduler::new(pipeline, trigger, clock.clone(), chrono_tz::Asia::Seoul);

    assert!(matches!(
        scheduler.trigger().await,
        TriggerOutcome::Completed(_)
    ));

    clock.set(kst_nine_on(1) + Duration::hours(3));
    match scheduler.trigger().await {
        TriggerOutcome::Skipped(SkipReason::AlreadyRanToday { date }) => {
            assert_eq!(date.to_string(), "2024-05-01");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    clock.set(kst_nine_on(2));
    assert!(matches!(
        scheduler.trigger().await,
        TriggerOutcome::Completed(_)
    ));
    assert_eq!(notifier.count(), 2);
}

#[tokio::test]
async fn test_stop_before_start_runs_nothing() {
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Arc::new(standard_pipeline(notifier.clone()));
    let clock = Arc::new(ManualClock::new(kst_nine_on(1)));
    let trigger = ScriptedTrigger::new(vec![kst_nine_on(1)], clock.clone(), Duration::zero());

    let mut scheduler = Scheduler::new(pipeline, trigger, clock, chrono_tz::Asia::Seoul);
    scheduler.stop();
    scheduler.start().await;

    assert_eq!(notifier.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_handle_interrupts_waiting_daily_trigger() {
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Arc::new(standard_pipeline(notifier.clone()));
    // 08:00 KST, 다음 트리거까지 한 시간
    let clock = Arc::new(ManualClock::new(kst_nine_on(1) - Duration::hours(1)));
    let trigger = DailyTrigger::new(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        chrono_tz::Asia::Seoul,
        clock.clone(),
    );

    let mut scheduler = Scheduler::new(pipeline, trigger, clock, chrono_tz::Asia::Seoul);
    let stop = scheduler.stop_handle();
    let handle = tokio::spawn(async move {
        scheduler.start().await;
    });

    tokio::time::sleep(std::time::Duration::from_secs(600)).await;
    stop.cancel();
    handle.await.unwrap();

    assert_eq!(notifier.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_daily_trigger_fires_pipeline() {
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Arc::new(standard_pipeline(notifier.clone()));
    let clock = Arc::new(ManualClock::new(kst_nine_on(1) - Duration::hours(1)));
    let trigger = DailyTrigger::new(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        chrono_tz::Asia::Seoul,
        clock.clone(),
    );

    let mut scheduler = Scheduler::new(pipeline, trigger, clock, chrono_tz::Asia::Seoul);
    let stop = scheduler.stop_handle();
    let handle = tokio::spawn(async move {
        scheduler.start().await;
    });

    // 첫 트리거 이후 다음 대기 중에 중지
    tokio::time::sleep(std::time::Duration::from_secs(3600 + 1)).await;
    stop.cancel();
    handle.await.unwrap();

    assert_eq!(notifier.count(), 1);
}
