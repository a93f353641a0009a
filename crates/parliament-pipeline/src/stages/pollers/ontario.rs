//! Ontario Legislature (OLA) poller.
//!
//! Grounded in `sources/ontario.py`'s `OntarioPoller`: scrape the house
//! calendar for recent sitting days, then probe Hansard/video archive pages
//! for links that mention the date. A sitting with neither a Hansard nor a
//! video link is dropped — there is nothing to process yet.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use parliament_core::{DebateStatus, SessionKind, SourceUrl, SourceUrlKind};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::{CandidateSitting, Poller};
use crate::error::StageError;

const OLA_CALENDAR_URL: &str = "https://www.ola.org/en/legislative-business/house-calendar";
const OLA_HANSARD_BASE: &str = "https://www.ola.org/en/legislative-business/house-documents";
const OLA_VIDEO_BASE: &str = "https://www.ola.org/en/legislative-business/video";

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap()
});

struct SittingDay {
    date: NaiveDate,
    session_kind: SessionKind,
    title_hint: String,
}

pub struct OntarioPoller;

#[async_trait]
impl Poller for OntarioPoller {
    fn legislature_code(&self) -> &'static str {
        "ON"
    }

    async fn detect_new_debates(&self, http: &reqwest::Client) -> Result<Vec<CandidateSitting>, StageError> {
        let sitting_days = get_recent_sitting_days(http).await;
        let mut sittings = Vec::new();
        for day in sitting_days {
            if let Some(sitting) = build_debate_info(http, &day).await {
                sittings.push(sitting);
            }
        }
        Ok(sittings)
    }
}

async fn get_recent_sitting_days(http: &reqwest::Client) -> Vec<SittingDay> {
    match fetch_sitting_days(http).await {
        Ok(days) if !days.is_empty() => days,
        Ok(_) => fallback_recent_days(),
        Err(err) => {
            tracing::warn!(error = %err, "OLA calendar scrape failed, using fallback");
            fallback_recent_days()
        }
    }
}

async fn fetch_sitting_days(http: &reqwest::Client) -> Result<Vec<SittingDay>, StageError> {
    let response = http.get(OLA_CALENDAR_URL).send().await?;
    let html = response.text().await?;
    let document = Html::parse_document(&html);

    let Ok(row_selector) = Selector::parse("table tr, .calendar-event, .sitting-day") else {
        return Ok(Vec::new());
    };
    let Ok(cell_selector) = Selector::parse("td, .date, time") else {
        return Ok(Vec::new());
    };

    let today = Utc::now().date_naive();
    let lookback = today - Duration::days(7);
    let mut days = Vec::new();

    for row in document.select(&row_selector) {
        let mut date_text = None;
        for cell in row.select(&cell_selector) {
            if let Some(attr) = cell.value().attr("datetime") {
                date_text = Some(attr.chars().take(10).collect::<String>());
                break;
            }
            let text = cell.text().collect::<String>();
            if let Some(m) = ISO_DATE_RE.find(&text) {
                date_text = Some(m.as_str().to_string());
                break;
            }
        }

        let Some(date_text) = date_text else { continue };
        let Ok(sitting_date) = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d") else { continue };
        if sitting_date < lookback || sitting_date > today {
            continue;
        }

        let row_text = row.text().collect::<String>().to_lowercase();
        let session_kind = if row_text.contains("question period") {
            SessionKind::QuestionPeriod
        } else if row_text.contains("committee") {
            SessionKind::Committee
        } else {
            SessionKind::House
        };

        days.push(SittingDay {
            date: sitting_date,
            session_kind,
            title_hint: row.text().collect::<String>().chars().take(200).collect(),
        });
    }

    Ok(days)
}

fn fallback_recent_days() -> Vec<SittingDay> {
    let today = Utc::now().date_naive();
    (1..8)
        .map(|i| today - Duration::days(i))
        .filter(|d| d.format("%u").to_string().parse::<u32>().unwrap_or(7) < 6)
        .map(|date| SittingDay { date, session_kind: SessionKind::House, title_hint: String::new() })
        .collect()
}

async fn build_debate_info(http: &reqwest::Client, day: &SittingDay) -> Option<CandidateSitting> {
    let hansard_url = find_link(http, &format!("{OLA_HANSARD_BASE}?date={}", day.date), "hansard", day.date).await;
    let video_url = find_link(http, &format!("{OLA_VIDEO_BASE}?date={}", day.date), "video", day.date).await;

    if hansard_url.is_none() && video_url.is_none() {
        return None;
    }

    let session_label = match day.session_kind {
        SessionKind::QuestionPeriod => "question_period",
        SessionKind::Committee => "committee",
        _ => "house",
    };
    let external_id = format!("on-{session_label}-{}", day.date);

    let mut source_urls = Vec::new();
    if let Some(url) = &video_url {
        source_urls.push(SourceUrl { kind: SourceUrlKind::Video, url: url.clone(), label: Some("OLA Video".to_string()) });
    }
    if let Some(url) = &hansard_url {
        source_urls.push(SourceUrl { kind: SourceUrlKind::Hansard, url: url.clone(), label: Some("OLA Hansard".to_string()) });
    }

    let title = if day.title_hint.to_lowercase().contains("question period") {
        format!("Ontario Question Period - {}", day.date)
    } else {
        format!("Ontario Legislature - {}", day.date)
    };

    Some(CandidateSitting {
        external_id,
        title,
        title_fr: None,
        sitting_date: day.date,
        session_kind: day.session_kind,
        status_hint: DebateStatus::Detected,
        video_url,
        hansard_url,
        source_urls,
        metadata: serde_json::json!({ "source": "ola.org", "province": "ON" }),
    })
}

async fn find_link(http: &reqwest::Client, url: &str, href_filter: &str, sitting_date: NaiveDate) -> Option<String> {
    let response = http.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let html = response.text().await.ok()?;
    let document = Html::parse_document(&html);
    let selector = Selector::parse(&format!("a[href*='{href_filter}']")).ok()?;

    let date_str = sitting_date.format("%Y-%m-%d").to_string();
    let date_compact = date_str.replace('-', "");

    for link in document.select(&selector) {
        let href = link.value().attr("href")?;
        if href.contains(&date_str) || href.contains(&date_compact) {
            return Some(if let Some(rest) = href.strip_prefix('/') {
                format!("https://www.ola.org/{rest}")
            } else {
                href.to_string()
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_skips_weekends() {
        let days = fallback_recent_days();
        assert!(days.len() <= 7);
    }
}
