//! Quebec National Assembly poller.
//!
//! Grounded in `sources/quebec.py`'s `QuebecPoller`: scrape the
//! parliamentary calendar (with a French month-name fallback regex for
//! dates the site renders as prose rather than ISO), then probe the
//! Journal des débats and video archive pages for links mentioning the
//! date.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use parliament_core::{DebateStatus, SessionKind, SourceUrl, SourceUrlKind};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::{CandidateSitting, Poller};
use crate::error::StageError;

const ASSNAT_CALENDAR_URL: &str = "https://www.assnat.qc.ca/en/travaux-parlementaires/calendrier-parlementaire.html";
const ASSNAT_VIDEO_URL: &str = "https://www.assnat.qc.ca/en/video-audio/index.html";
const ASSNAT_JOURNAL_URL: &str = "https://www.assnat.qc.ca/en/travaux-parlementaires/journaux-debats.html";

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap()
});

static FR_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(
        r"(?i)(\d{1,2})\s*(?:er)?\s+(janvier|f[ée]vrier|mars|avril|mai|juin|juillet|ao[ûu]t|septembre|octobre|novembre|d[ée]cembre)\s+(\d{4})",
    )
    .unwrap()
});

fn french_month(name: &str) -> Option<u32> {
    let normalized = name.to_lowercase();
    Some(match normalized.as_str() {
        "janvier" => 1,
        "février" | "fevrier" => 2,
        "mars" => 3,
        "avril" => 4,
        "mai" => 5,
        "juin" => 6,
        "juillet" => 7,
        "août" | "aout" => 8,
        "septembre" => 9,
        "octobre" => 10,
        "novembre" => 11,
        "décembre" | "decembre" => 12,
        _ => return None,
    })
}

struct SittingDay {
    date: NaiveDate,
    session_kind: SessionKind,
}

pub struct QuebecPoller;

#[async_trait]
impl Poller for QuebecPoller {
    fn legislature_code(&self) -> &'static str {
        "QC"
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
            tracing::warn!(error = %err, "assnat calendar scrape failed, using fallback");
            fallback_recent_days()
        }
    }
}

async fn fetch_sitting_days(http: &reqwest::Client) -> Result<Vec<SittingDay>, StageError> {
    let response = http.get(ASSNAT_CALENDAR_URL).send().await?;
    let html = response.text().await?;
    let document = Html::parse_document(&html);

    let Ok(selector) = Selector::parse(".jour-seance, .calendar-day, td[class*='seance'], .event-item") else {
        return Ok(Vec::new());
    };

    let today = Utc::now().date_naive();
    let lookback = today - Duration::days(7);
    let mut days = Vec::new();

    for element in document.select(&selector) {
        let mut date_text = None;
        for attr in ["data-date", "datetime", "data-jour"] {
            if let Some(val) = element.value().attr(attr) {
                date_text = Some(val.chars().take(10).collect::<String>());
                break;
            }
        }

        let text = element.text().collect::<String>();
        if date_text.is_none() {
            if let Some(m) = ISO_DATE_RE.find(&text) {
                date_text = Some(m.as_str().to_string());
            } else if let Some(caps) = FR_DATE_RE.captures(&text) {
                if let (Ok(day), Some(month), Ok(year)) =
                    (caps[1].parse::<u32>(), french_month(&caps[2]), caps[3].parse::<i32>())
                {
                    date_text = Some(format!("{year}-{month:02}-{day:02}"));
                }
            }
        }

        let Some(date_text) = date_text else { continue };
        let Ok(sitting_date) = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d") else { continue };
        if sitting_date < lookback || sitting_date > today {
            continue;
        }

        let lower = text.to_lowercase();
        let session_kind = if lower.contains("commission") || lower.contains("committee") {
            SessionKind::Committee
        } else if lower.contains("question") {
            SessionKind::QuestionPeriod
        } else {
            SessionKind::House
        };

        days.push(SittingDay { date: sitting_date, session_kind });
    }

    Ok(days)
}

fn fallback_recent_days() -> Vec<SittingDay> {
    let today = Utc::now().date_naive();
    (1..8)
        .map(|i| today - Duration::days(i))
        .filter(|d| d.format("%u").to_string().parse::<u32>().unwrap_or(7) < 6)
        .map(|date| SittingDay { date, session_kind: SessionKind::House })
        .collect()
}

async fn build_debate_info(http: &reqwest::Client, day: &SittingDay) -> Option<CandidateSitting> {
    let hansard_url = find_link(http, ASSNAT_JOURNAL_URL, "a", day.date).await;
    let video_url = find_link(http, ASSNAT_VIDEO_URL, "a[href*='video'], a[href*='webdiffusion']", day.date).await;

    if hansard_url.is_none() && video_url.is_none() {
        return None;
    }

    let session_label = match day.session_kind {
        SessionKind::Committee => "committee",
        SessionKind::QuestionPeriod => "question_period",
        _ => "house",
    };
    let external_id = format!("qc-{session_label}-{}", day.date);

    let mut source_urls = Vec::new();
    if let Some(url) = &video_url {
        source_urls.push(SourceUrl { kind: SourceUrlKind::Video, url: url.clone(), label: Some("Assemblée nationale vidéo".to_string()) });
    }
    if let Some(url) = &hansard_url {
        source_urls.push(SourceUrl { kind: SourceUrlKind::Hansard, url: url.clone(), label: Some("Journal des débats".to_string()) });
    }

    Some(CandidateSitting {
        external_id,
        title: format!("National Assembly of Quebec - {}", day.date),
        title_fr: Some(format!("Assemblée nationale du Québec - {}", day.date)),
        sitting_date: day.date,
        session_kind: day.session_kind,
        status_hint: DebateStatus::Detected,
        video_url,
        hansard_url,
        source_urls,
        metadata: serde_json::json!({ "source": "assnat.qc.ca", "province": "QC", "primary_language": "fr" }),
    })
}

async fn find_link(http: &reqwest::Client, url: &str, selector_str: &str, sitting_date: NaiveDate) -> Option<String> {
    let response = http.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let html = response.text().await.ok()?;
    let document = Html::parse_document(&html);
    let selector = Selector::parse(selector_str).ok()?;

    let date_str = sitting_date.format("%Y-%m-%d").to_string();
    let date_compact = date_str.replace('-', "");

    for link in document.select(&selector) {
        let href = link.value().attr("href")?;
        if href.contains(&date_str) || href.contains(&date_compact) {
            return Some(if let Some(rest) = href.strip_prefix('/') {
                format!("https://www.assnat.qc.ca/{rest}")
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
    fn parses_french_prose_date() {
        let caps = FR_DATE_RE.captures("Le 1er janvier 2026").expect("matches");
        assert_eq!(&caps[1], "1");
        assert_eq!(french_month(&caps[2]), Some(1));
        assert_eq!(&caps[3], "2026");
    }

    #[test]
    fn fallback_stays_within_a_week() {
        assert!(fallback_recent_days().len() <= 7);
    }
}
