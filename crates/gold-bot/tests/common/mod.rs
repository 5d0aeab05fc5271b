//! 파이프라인/스케줄러 테스트용 가짜 구현.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gold_bot::{Clock, PremiumPipeline, TriggerSource};
use gold_core::{
    CommentaryText, ExchangeRate, GoldError, GoldResult, GoldUnit, PremiumResult, PriceQuote,
};
use gold_data::{PriceSource, RateSource};
use gold_notification::{DeliveryAck, Notifier, TrendCommentator};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn observed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
}

pub struct FakePriceSource {
    name: &'static str,
    result: Box<dyn Fn() -> GoldResult<PriceQuote> + Send + Sync>,
    pub calls: AtomicUsize,
}

impl FakePriceSource {
    pub fn usd(amount: Decimal) -> Self {
        Self {
            name: "fake-usd",
            result: Box::new(move || {
                Ok(PriceQuote::usd(amount, GoldUnit::TroyOunce, observed_at()))
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn krw(amount: Decimal) -> Self {
        Self {
            name: "fake-krw",
            result: Box::new(move || {
                Ok(PriceQuote::krw(amount, GoldUnit::TroyOunce, observed_at()))
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str, make: fn() -> GoldError) -> Self {
        Self {
            name,
            result: Box::new(move || Err(make())),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PriceSource for FakePriceSource {
    async fn fetch_price(&self) -> GoldResult<PriceQuote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.result)()
    }

    fn name(&self) -> &str {
        self.name
    }
}

pub struct FakeRateSource {
    rate: Option<Decimal>,
}

impl FakeRateSource {
    pub fn new(rate: Decimal) -> Self {
        Self { rate: Some(rate) }
    }

    pub fn failing() -> Self {
        Self { rate: None }
    }
}

#[async_trait]
impl RateSource for FakeRateSource {
    async fn fetch_rate(&self) -> GoldResult<ExchangeRate> {
        match self.rate {
            Some(rate) => Ok(ExchangeRate::new(rate, observed_at())),
            None => Err(GoldError::upstream("fake-rate", "연결 거부")),
        }
    }

    fn name(&self) -> &str {
        "fake-rate"
    }
}

pub struct FakeCommentator {
    text: Option<&'static str>,
    pub history_lens: Mutex<Vec<usize>>,
}

impl FakeCommentator {
    pub fn ready(text: &'static str) -> Self {
        Self {
            text: Some(text),
            history_lens: Mutex::new(Vec::new()),
        }
    }

    pub fn quota_exceeded() -> Self {
        Self {
            text: None,
            history_lens: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TrendCommentator for FakeCommentator {
    async fn summarize(&self, history: &[PremiumResult]) -> GoldResult<CommentaryText> {
        self.history_lens.lock().unwrap().push(history.len());
        match self.text {
            Some(text) => Ok(CommentaryText::new(text).unwrap()),
            None => Err(GoldError::QuotaExceeded("fake: insufficient_quota".to_string())),
        }
    }

    fn name(&self) -> &str {
        "fake-commentator"
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(PremiumResult, Option<CommentaryText>)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        result: &PremiumResult,
        commentary: Option<&CommentaryText>,
    ) -> GoldResult<DeliveryAck> {
        if self.fail {
            return Err(GoldError::DeliveryFailure("chat not found".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((result.clone(), commentary.cloned()));
        Ok(DeliveryAck::new(Some(sent.len() as i64)))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// 2000 USD/oz, 2,850,000 KRW/oz, 1350 KRW/USD 기본 파이프라인.
pub fn standard_pipeline(notifier: Arc<RecordingNotifier>) -> PremiumPipeline {
    PremiumPipeline::new(
        Arc::new(FakePriceSource::usd(dec!(2000))),
        Arc::new(FakePriceSource::krw(dec!(2850000))),
        Arc::new(FakeRateSource::new(dec!(1350))),
        notifier,
    )
    .with_unit(GoldUnit::TroyOunce)
}

/// 수동으로 움직이는 시계.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Mutex::new(at))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.lock().unwrap() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// 미리 정한 시각을 차례로 내보내는 트리거.
pub struct ScriptedTrigger {
    times: std::vec::IntoIter<DateTime<Utc>>,
    clock: Arc<ManualClock>,
    run_length: chrono::Duration,
}

impl ScriptedTrigger {
    /// 각 트리거 시각으로 시계를 맞추고, 실행이 `run_length`만큼 걸린 것처럼
    /// 종료 시각을 미리 설정합니다.
    pub fn new(
        times: Vec<DateTime<Utc>>,
        clock: Arc<ManualClock>,
        run_length: chrono::Duration,
    ) -> Self {
        Self {
            times: times.into_iter(),
            clock,
            run_length,
        }
    }
}

#[async_trait]
impl TriggerSource for ScriptedTrigger {
    async fn next_trigger(&mut self) -> Option<DateTime<Utc>> {
        let at = self.times.next()?;
        let finished = at + self.run_length;
        // 시계가 뒤로 가지 않게 유지
        if finished > self.clock.now() {
            self.clock.set(finished);
        }
        Some(at)
    }
}
