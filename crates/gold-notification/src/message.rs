//! 프리미엄 알림 메시지 템플릿.

use chrono_tz::Tz;
use gold_core::{CommentaryText, DecimalExt, GoldUnit, PremiumResult};

/// 텔레그램 HTML 파싱 모드용 이스케이프.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 가격/환율/프리미엄 본문 (서식 없음).
///
/// 텔레그램 메시지와 AI 프롬프트가 함께 사용합니다.
pub fn price_lines(result: &PremiumResult) -> Vec<String> {
    let unit = result.unit.label();
    let intl_per_oz = result.international.normalize_to(GoldUnit::TroyOunce).amount;

    vec![
        format!(
            "국내 금시세 ({}): {}원",
            unit,
            result.domestic_price_krw.to_grouped_string(0)
        ),
        format!("국제 금시세 (oz): ${}", intl_per_oz.to_grouped_string(2)),
        format!(
            "국제 금시세 환산 ({}): {}원",
            unit,
            result.international_price_krw.to_grouped_string(0)
        ),
        format!("환율: {}원/$", result.rate.krw_per_usd.to_grouped_string(2)),
    ]
}

/// 텔레그램용 HTML 알림 메시지를 생성합니다.
pub fn format_premium_message(
    result: &PremiumResult,
    commentary: Option<&CommentaryText>,
    tz: Tz,
) -> String {
    let date = result.computed_at.with_timezone(&tz).format("%Y-%m-%d");
    let observed = result
        .domestic
        .observed_at
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S %Z");

    let mut message = format!(
        "📅 <b>{date} 금 프리미엄 알림</b>\n\
         기준 일시: {observed}\n\n"
    );
    for line in price_lines(result) {
        message.push_str(&escape_html(&line));
        message.push('\n');
    }
    message.push_str(&format!(
        "👉 금 프리미엄: <b>{}%</b>",
        result.premium_percent.to_signed_string(2)
    ));

    if let Some(text) = commentary {
        message.push_str("\n\n🤖 AI 요약:\n");
        message.push_str(&escape_html(text.as_str()));
    }

    message
}
