//! 프리미엄 알림 파이프라인.
//!
//! 한 번의 실행은 다음 순서로 진행됩니다:
//! 1. 국제 시세, 국내 시세, 환율을 동시에 조회
//! 2. 프리미엄 계산
//! 3. (설정된 경우) AI 코멘트 생성
//! 4. 알림 전송
//!
//! 1~2단계가 실패하면 알림 없이 실행을 중단합니다.
//! 3단계 실패는 코멘트만 빠진 채로 계속 진행합니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use chrono_tz::Tz;
use gold_core::{
    CommentaryOutcome, GoldResult, GoldUnit, PremiumCalculator, PremiumResult,
};
use gold_data::{
    InvestingGoldSource, KoreaGoldSource, NaverRateSource, PriceSource, RateSource,
    UpstreamClient, YahooChartClient, YahooGoldSource, YahooRateSource,
};
use gold_notification::{
    DeliveryAck, Notifier, OpenAiCommentator, OpenAiConfig, TelegramConfig, TelegramNotifier,
    TrendCommentator,
};
use secrecy::ExposeSecret;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{BotConfig, DomesticProvider, InternationalProvider, RateProvider};

/// 성공한 실행의 결과.
#[derive(Debug)]
pub struct RunReport {
    /// 실행 ID
    pub run_id: Uuid,
    /// 계산 결과
    pub result: PremiumResult,
    /// 코멘트 단계 결과
    pub commentary: CommentaryOutcome,
    /// 전송 확인
    pub ack: DeliveryAck,
    /// 소요 시간
    pub elapsed: Duration,
}

impl RunReport {
    /// 실행 요약 로그 출력
    pub fn log_summary(&self) {
        info!(
            run_id = %self.run_id,
            unit = %self.result.unit,
            domestic_krw = %self.result.domestic_price_krw,
            international_krw = %self.result.international_price_krw,
            krw_per_usd = %self.result.rate.krw_per_usd,
            premium_percent = %self.result.premium_percent,
            commentary = self.commentary.label(),
            message_id = ?self.ack.message_id,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "프리미엄 알림 실행 완료"
        );
    }
}

/// 조회 → 계산 → 코멘트 → 전송을 한 번 수행하는 파이프라인.
///
/// 실행 사이에 공유되는 상태는 없습니다.
pub struct PremiumPipeline {
    international: Arc<dyn PriceSource>,
    domestic: Arc<dyn PriceSource>,
    rate: Arc<dyn RateSource>,
    commentator: Option<Arc<dyn TrendCommentator>>,
    notifier: Arc<dyn Notifier>,
    unit: GoldUnit,
    timezone: Tz,
}

impl PremiumPipeline {
    pub fn new(
        international: Arc<dyn PriceSource>,
        domestic: Arc<dyn PriceSource>,
        rate: Arc<dyn RateSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            international,
            domestic,
            rate,
            commentator: None,
            notifier,
            unit: GoldUnit::default(),
            timezone: chrono_tz::Asia::Seoul,
        }
    }

    pub fn with_commentator(mut self, commentator: Arc<dyn TrendCommentator>) -> Self {
        self.commentator = Some(commentator);
        self
    }

    /// 비교 기준 중량 단위를 지정합니다.
    pub fn with_unit(mut self, unit: GoldUnit) -> Self {
        self.unit = unit;
        self
    }

    /// 실행 날짜 표기용 시간대를 지정합니다.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// 설정에 따라 실제 제공자와 전송기를 조립합니다.
    pub fn from_config(config: &BotConfig) -> GoldResult<Self> {
        let http = UpstreamClient::new(&config.http)?;
        let unit = config.unit;

        let international: Arc<dyn PriceSource> = match config.sources.international {
            InternationalProvider::Yahoo => Arc::new(YahooGoldSource::new(
                YahooChartClient::new(http.clone()),
                unit,
            )),
            InternationalProvider::Investing => {
                Arc::new(InvestingGoldSource::new(http.clone(), unit))
            }
        };

        let domestic: Arc<dyn PriceSource> = match config.sources.domestic {
            DomesticProvider::KoreaGold => Arc::new(KoreaGoldSource::new(http.clone(), unit)),
        };

        let rate: Arc<dyn RateSource> = match config.sources.rate {
            RateProvider::Yahoo => {
                Arc::new(YahooRateSource::new(YahooChartClient::new(http.clone())))
            }
            RateProvider::Naver => Arc::new(NaverRateSource::new(http)),
        };

        let telegram = TelegramConfig::new(
            config.telegram.bot_token.expose_secret(),
            config.telegram.chat_id.clone(),
        )
        .with_enabled(config.telegram.enabled)
        .with_api_base(config.telegram.api_base.clone())
        .with_timeout(config.http.timeout);
        let notifier = TelegramNotifier::new(telegram)?.with_timezone(config.schedule.timezone);

        let mut pipeline = Self::new(international, domestic, rate, Arc::new(notifier))
            .with_unit(unit)
            .with_timezone(config.schedule.timezone);

        if let Some(openai) = &config.openai {
            let openai_config = OpenAiConfig::new(openai.api_key.expose_secret())
                .with_model(openai.model.clone())
                .with_temperature(openai.temperature)
                .with_api_base(openai.api_base.clone())
                .with_timeout(openai.timeout);
            let commentator =
                OpenAiCommentator::new(openai_config)?.with_timezone(config.schedule.timezone);
            pipeline = pipeline.with_commentator(Arc::new(commentator));
        } else {
            info!("OpenAI API 키가 없어 AI 코멘트를 생략합니다");
        }

        Ok(pipeline)
    }

    /// 파이프라인을 한 번 실행합니다.
    pub async fn run_once(&self) -> GoldResult<RunReport> {
        let run_id = Uuid::new_v4();
        let run_date = Utc::now().with_timezone(&self.timezone).date_naive();
        let span = info_span!("premium_run", %run_id, %run_date);

        self.execute(run_id).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid) -> GoldResult<RunReport> {
        let started = Instant::now();
        info!(
            international = self.international.name(),
            domestic = self.domestic.name(),
            rate = self.rate.name(),
            "시세 조회 시작"
        );

        let (intl, dom, rate) = tokio::join!(
            self.international.fetch_price(),
            self.domestic.fetch_price(),
            self.rate.fetch_rate(),
        );

        for (provider, err) in [
            (self.international.name(), intl.as_ref().err()),
            (self.domestic.name(), dom.as_ref().err()),
            (self.rate.name(), rate.as_ref().err()),
        ] {
            if let Some(err) = err {
                error!(provider, kind = err.kind(), error = %err, "조회 실패");
            }
        }
        if intl.is_err() || dom.is_err() || rate.is_err() {
            warn!("필수 조회 실패로 알림 없이 실행 중단");
        }
        // 국제 → 국내 → 환율 순으로 첫 에러를 반환
        let (intl, dom, rate) = (intl?, dom?, rate?);

        let result = PremiumCalculator::compute(
            &intl.normalize_to(self.unit),
            &dom.normalize_to(self.unit),
            &rate,
        )
        .map_err(|e| {
            error!(kind = e.kind(), error = %e, "프리미엄 계산 실패");
            e
        })?;

        info!(premium_percent = %result.premium_percent, "프리미엄 계산 완료");

        let commentary = self.comment(&result).await;

        let ack = self
            .notifier
            .send(&result, commentary.text())
            .await
            .map_err(|e| {
                error!(notifier = self.notifier.name(), kind = e.kind(), error = %e, "알림 전송 실패");
                e
            })?;

        Ok(RunReport {
            run_id,
            result,
            commentary,
            ack,
            elapsed: started.elapsed(),
        })
    }

    async fn comment(&self, result: &PremiumResult) -> CommentaryOutcome {
        let Some(commentator) = &self.commentator else {
            return CommentaryOutcome::Disabled;
        };

        match commentator.summarize(std::slice::from_ref(result)).await {
            Ok(text) => CommentaryOutcome::Ready(text),
            Err(e) => {
                warn!(
                    commentator = commentator.name(),
                    kind = e.kind(),
                    error = %e,
                    "AI 코멘트 생성 실패, 코멘트 없이 전송"
                );
                CommentaryOutcome::Unavailable(e)
            }
        }
    }
}
