//! House of Commons poller (Hansard-first).
//!
//! Grounded in `sources/federal.py`'s `FederalPoller`: scrape the daily
//! parliamentary-business page for the current sitting and the last few
//! days, pull the Hansard link out of the "In the House" widget, and
//! separately scrape today's committee-meeting panels.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use parliament_core::{DebateStatus, SessionKind, SourceUrl, SourceUrlKind};
use scraper::{Html, Selector};

use super::{CandidateSitting, Poller};
use crate::error::StageError;

const PARLIAMENTARY_BUSINESS_URL: &str = "https://www.ourcommons.ca/en/parliamentary-business";

fn daily_url(for_date: NaiveDate) -> String {
    format!(
        "{PARLIAMENTARY_BUSINESS_URL}/{}%20-05%3a00",
        for_date.format("%Y-%m-%d")
    )
}

pub struct FederalPoller;

#[async_trait]
impl Poller for FederalPoller {
    fn legislature_code(&self) -> &'static str {
        "CA"
    }

    async fn detect_new_debates(&self, http: &reqwest::Client) -> Result<Vec<CandidateSitting>, StageError> {
        let today = Utc::now().date_naive();
        let mut sittings = Vec::new();

        for offset in 0..4 {
            let check_date = today - Duration::days(offset);
            match fetch_and_scrape(http, check_date).await {
                Ok(mut day_sittings) => sittings.append(&mut day_sittings),
                Err(err) => {
                    tracing::warn!(date = %check_date, error = %err, "failed to scrape federal daily page");
                }
            }
        }

        match fetch_and_scrape_committees(http, today).await {
            Ok(mut committees) => sittings.append(&mut committees),
            Err(err) => {
                tracing::warn!(error = %err, "failed to scrape federal committee meetings");
            }
        }

        Ok(sittings)
    }
}

async fn fetch_and_scrape(http: &reqwest::Client, for_date: NaiveDate) -> Result<Vec<CandidateSitting>, StageError> {
    let url = daily_url(for_date);
    let response = http.get(&url).send().await?;
    if !response.status().is_success() {
        return Ok(Vec::new());
    }
    let html = response.text().await?;
    Ok(scrape_daily_page(&html, for_date))
}

fn scrape_daily_page(html: &str, for_date: NaiveDate) -> Vec<CandidateSitting> {
    let document = Html::parse_document(html);
    let Ok(house_selector) = Selector::parse("section.block-in-the-chamber") else {
        return Vec::new();
    };
    let Some(house_section) = document.select(&house_selector).next() else {
        return Vec::new();
    };

    let parlvu_url = extract_parlvu_link(&document);
    let chamber_status = extract_chamber_status(&house_section);
    let agenda_items = extract_agenda_item_count(&house_section);

    let mut sittings = Vec::new();

    let Ok(strong_selector) = Selector::parse(".strong-text") else {
        return sittings;
    };
    let Ok(date_selector) = Selector::parse(".strong-text-date") else {
        return sittings;
    };
    let Ok(link_selector) = Selector::parse("ul li a") else {
        return sittings;
    };

    for strong_el in house_section.select(&strong_selector) {
        let label = strong_el.text().collect::<String>().to_lowercase();
        let is_current = label.contains("current");
        let is_previous = label.contains("previous");
        if !is_current && !is_previous {
            continue;
        }

        let sitting_date = house_section
            .select(&date_selector)
            .next()
            .and_then(|el| parse_sitting_date(&el.text().collect::<String>()))
            .unwrap_or(for_date);

        let mut hansard_url = None;
        for link in house_section.select(&link_selector) {
            let text = link.text().collect::<String>().to_lowercase();
            if text.contains("debates") || text.contains("hansard") {
                if let Some(href) = link.value().attr("href") {
                    hansard_url = Some(resolve_href(href, "https://www.ourcommons.ca"));
                }
                break;
            }
        }

        let today = Utc::now().date_naive();
        let status_hint = match (&hansard_url, sitting_date.cmp(&today)) {
            (Some(_), _) => DebateStatus::Detected,
            (None, std::cmp::Ordering::Greater | std::cmp::Ordering::Equal) => DebateStatus::Scheduled,
            (None, std::cmp::Ordering::Less) => continue,
        };

        let external_id = format!("ca-house-{}", sitting_date.format("%Y-%m-%d"));
        let mut source_urls = vec![SourceUrl {
            kind: SourceUrlKind::Calendar,
            url: daily_url(sitting_date),
            label: Some("Parliament Calendar".to_string()),
        }];
        if let Some(url) = &hansard_url {
            source_urls.push(SourceUrl { kind: SourceUrlKind::Hansard, url: url.clone(), label: Some("Official Hansard".to_string()) });
        }
        if let Some(url) = &parlvu_url {
            source_urls.push(SourceUrl { kind: SourceUrlKind::Video, url: url.clone(), label: Some("ParlVU Recording".to_string()) });
        }

        sittings.push(CandidateSitting {
            external_id,
            title: format!("House of Commons Debate — {}", sitting_date.format("%Y-%m-%d")),
            title_fr: Some(format!("Débat de la Chambre des communes — {}", sitting_date.format("%Y-%m-%d"))),
            sitting_date,
            session_kind: SessionKind::House,
            status_hint,
            video_url: parlvu_url.clone(),
            hansard_url,
            source_urls,
            metadata: serde_json::json!({
                "source": "ourcommons.ca",
                "scrape_method": "hansard-first",
                "chamber_status": chamber_status,
                "agenda_item_count": if is_current { agenda_items } else { 0 },
            }),
        });
    }

    sittings
}

async fn fetch_and_scrape_committees(http: &reqwest::Client, for_date: NaiveDate) -> Result<Vec<CandidateSitting>, StageError> {
    let url = daily_url(for_date);
    let response = http.get(&url).send().await?;
    if !response.status().is_success() {
        return Ok(Vec::new());
    }
    let html = response.text().await?;
    Ok(scrape_committee_meetings(&html, for_date))
}

fn scrape_committee_meetings(html: &str, for_date: NaiveDate) -> Vec<CandidateSitting> {
    let document = Html::parse_document(html);
    let Ok(section_selector) = Selector::parse("section.block-committees") else {
        return Vec::new();
    };
    let Some(section) = document.select(&section_selector).next() else {
        return Vec::new();
    };

    let Ok(panel_selector) = Selector::parse(".panel-accordion, .accordion-item") else {
        return Vec::new();
    };
    let Ok(acronym_selector) = Selector::parse(".meeting-card-committee-acronym, .meeting-acronym") else {
        return Vec::new();
    };
    let Ok(name_selector) = Selector::parse(".meeting-card-committee-details-name a") else {
        return Vec::new();
    };

    let mut meetings = Vec::new();
    for panel in section.select(&panel_selector) {
        let Some(acronym_el) = panel.select(&acronym_selector).next() else {
            continue;
        };
        let acronym = acronym_el.text().collect::<String>().trim().to_string();
        if acronym.is_empty() {
            continue;
        }
        let full_name = panel
            .select(&name_selector)
            .next()
            .map_or_else(|| acronym.clone(), |el| el.text().collect::<String>().trim().to_string());

        let external_id = format!("ca-committee-{acronym}-{}", for_date.format("%Y-%m-%d"));
        meetings.push(CandidateSitting {
            external_id,
            title: format!("Committee: {full_name}"),
            title_fr: None,
            sitting_date: for_date,
            session_kind: SessionKind::Committee,
            status_hint: DebateStatus::Scheduled,
            video_url: None,
            hansard_url: None,
            source_urls: Vec::new(),
            metadata: serde_json::json!({
                "source": "ourcommons.ca",
                "scrape_method": "hansard-first",
                "committee_code": acronym,
            }),
        });
    }

    meetings
}

fn extract_parlvu_link(document: &Html) -> Option<String> {
    let selector = Selector::parse(".watch-previous a, a[href*='parlvu'], a[href*='ParlVU']").ok()?;
    let el = document.select(&selector).next()?;
    let href = el.value().attr("href")?;
    Some(resolve_href(href, "https://parlvu.parl.gc.ca"))
}

fn extract_chamber_status(section: &scraper::ElementRef<'_>) -> String {
    Selector::parse(".chamber-status")
        .ok()
        .and_then(|selector| section.select(&selector).next())
        .map_or_else(|| "unknown".to_string(), |el| el.text().collect::<String>().trim().to_string())
}

fn extract_agenda_item_count(section: &scraper::ElementRef<'_>) -> usize {
    Selector::parse(".agenda-items .row")
        .map(|selector| section.select(&selector).count())
        .unwrap_or(0)
}

fn resolve_href(href: &str, base: &str) -> String {
    if let Some(rest) = href.strip_prefix("//") {
        format!("https:{rest}")
    } else if let Some(rest) = href.strip_prefix('/') {
        format!("{base}/{rest}")
    } else {
        href.to_string()
    }
}

fn parse_sitting_date(text: &str) -> Option<NaiveDate> {
    let cleaned = text.trim().trim_start_matches('(').trim_end_matches(')');
    for fmt in ["%A, %B %d, %Y", "%B %d, %Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_daily_url_with_encoded_timezone() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 9).expect("valid date");
        assert_eq!(
            daily_url(date),
            "https://www.ourcommons.ca/en/parliamentary-business/2026-02-09%20-05%3a00"
        );
    }

    #[test]
    fn resolves_protocol_relative_href() {
        assert_eq!(resolve_href("//parlvu.parl.gc.ca/x", "https://parlvu.parl.gc.ca"), "https://parlvu.parl.gc.ca/x");
    }

    #[test]
    fn parses_long_form_sitting_date() {
        let parsed = parse_sitting_date("(Monday, February 9, 2026)");
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2026, 2, 9));
    }
}
