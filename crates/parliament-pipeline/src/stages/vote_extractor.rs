//! Vote extractor (spec §4.6 / C6).
//!
//! Dispatched by legislature code, same registry pattern as
//! [`super::pollers`]. Federal pulls from the open-parliament JSON API and a
//! per-vote detail fetch; provincial sources parse division blocks out of
//! the Hansard HTML with language-appropriate tally regexes. A missing or
//! unreachable source is never fatal — it returns an empty list and logs a
//! warning (spec: "not fatal... returns an empty list").

use std::sync::LazyLock;

use async_trait::async_trait;
use parliament_core::{Debate, Legislature, Vote, VoteResult};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use crate::orchestrator::PipelineContext;

static BILL_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(C-\d+|S-\d+)").unwrap()
});

static BILL_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(?i)(?:Bill|Projet de loi)\s+(C-\d+|S-\d+|\d+)").unwrap()
});

static YEA_EN_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(?i)(?:ayes|yeas?|in favour)[:\s]*(\d+)").unwrap()
});
static NAY_EN_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(?i)(?:nays?|against|opposed)[:\s]*(\d+)").unwrap()
});
static YEA_FR_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(?i)(?:pour|en faveur)[:\s]*(\d+)").unwrap()
});
static NAY_FR_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(?i)(?:contre|oppos[ée]s?)[:\s]*(\d+)").unwrap()
});
static ABSTAIN_FR_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(?i)abstentions?[:\s]*(\d+)").unwrap()
});

#[async_trait]
trait VoteExtractorImpl: Send + Sync {
    async fn extract(&self, ctx: &PipelineContext, debate: &Debate) -> Vec<Vote>;
}

fn extractor_for(code: &str) -> Option<Box<dyn VoteExtractorImpl>> {
    match code {
        "CA" => Some(Box::new(FederalVoteExtractor)),
        "ON" => Some(Box::new(ProvincialVoteExtractor { french: false })),
        "QC" => Some(Box::new(ProvincialVoteExtractor { french: true })),
        _ => None,
    }
}

/// Extract votes for a debate; soft-fails to an empty list for unrecognised
/// legislatures, missing sources, or any extraction error.
pub async fn extract_votes(ctx: &PipelineContext, debate: &Debate, legislature: &Legislature) -> Vec<Vote> {
    let Some(extractor) = extractor_for(&legislature.code) else {
        return Vec::new();
    };
    extractor.extract(ctx, debate).await
}

struct FederalVoteExtractor;

#[derive(Debug, Deserialize)]
struct VoteListResponse {
    objects: Vec<VoteListItem>,
}

#[derive(Debug, Deserialize)]
struct VoteListItem {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VoteDescription {
    en: String,
    fr: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoteDetail {
    description: VoteDescription,
    yea_total: i32,
    nay_total: i32,
    #[serde(default)]
    paired_count: i32,
    result: String,
    bill_url: Option<String>,
}

#[async_trait]
impl VoteExtractorImpl for FederalVoteExtractor {
    async fn extract(&self, ctx: &PipelineContext, debate: &Debate) -> Vec<Vote> {
        let date = debate.sitting_date.format("%Y-%m-%d").to_string();
        let list_url = format!("https://api.openparliament.ca/votes/?date={date}&format=json");

        let list: VoteListResponse = match ctx.http.get(&list_url).send().await {
            Ok(response) => match response.json().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(%debate.id, error = %err, "federal vote list parse failed");
                    return Vec::new();
                }
            },
            Err(err) => {
                tracing::warn!(%debate.id, error = %err, "federal vote list fetch failed");
                return Vec::new();
            }
        };

        let mut votes = Vec::new();
        for item in list.objects {
            let detail_url = format!("https://api.openparliament.ca{}?format=json", item.url);
            let Ok(response) = ctx.http.get(&detail_url).send().await else { continue };
            let Ok(detail) = response.json::<VoteDetail>().await else { continue };

            let result = if detail.result.eq_ignore_ascii_case("Agreed To") { VoteResult::Passed } else { VoteResult::Defeated };
            let bill_number = detail.bill_url.as_deref().and_then(|url| BILL_NUMBER_RE.find(url)).map(|m| m.as_str().to_string());

            let mut vote = Vote::new(debate.id, detail.description.en.clone(), item.url.clone(), detail.yea_total, detail.nay_total, detail.paired_count, 0, result);
            vote.motion_text_secondary = detail.description.fr;
            vote.bill_number = bill_number;
            votes.push(vote);
        }
        votes
    }
}

/// The motion text for a division block is its previous sibling element's
/// text (spec §4.6), not anything inside the block itself — division blocks
/// typically open straight into the tally. Grounded on the Python original's
/// `_extract_preceding_motion`: walk to the nearest preceding element
/// sibling, and use its text only if it's long enough to be real prose
/// rather than a stray label.
fn preceding_motion_text(block: ElementRef<'_>) -> Option<String> {
    let prev = block.prev_siblings().find_map(ElementRef::wrap)?;
    let text: String = prev.text().collect::<String>().trim().to_string();
    (text.chars().count() > 10).then(|| text.chars().take(500).collect())
}

struct ProvincialVoteExtractor {
    french: bool,
}

#[async_trait]
impl VoteExtractorImpl for ProvincialVoteExtractor {
    async fn extract(&self, ctx: &PipelineContext, debate: &Debate) -> Vec<Vote> {
        let Some(hansard_url) = &debate.hansard_url else {
            return Vec::new();
        };

        let html = match ctx.http.get(hansard_url).send().await {
            Ok(response) => match response.text().await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(%debate.id, error = %err, "provincial vote page read failed");
                    return Vec::new();
                }
            },
            Err(err) => {
                tracing::warn!(%debate.id, error = %err, "provincial vote page fetch failed");
                return Vec::new();
            }
        };

        let document = Html::parse_document(&html);
        let Ok(selector) = Selector::parse(".division, .vote-result, [class*='division'], [class*='vote']") else {
            return Vec::new();
        };

        let (yea_re, nay_re): (&Regex, &Regex) = if self.french { (&YEA_FR_RE, &NAY_FR_RE) } else { (&YEA_EN_RE, &NAY_EN_RE) };

        let mut votes = Vec::new();
        for (index, block) in document.select(&selector).enumerate() {
            let text = block.text().collect::<String>();

            let Some(yea_caps) = yea_re.captures(&text) else { continue };
            let Some(nay_caps) = nay_re.captures(&text) else { continue };
            let Ok(yea) = yea_caps[1].parse::<i32>() else { continue };
            let Ok(nay) = nay_caps[1].parse::<i32>() else { continue };
            let abstain = if self.french { ABSTAIN_FR_RE.captures(&text).and_then(|c| c[1].parse::<i32>().ok()).unwrap_or(0) } else { 0 };

            let motion_text = preceding_motion_text(block).unwrap_or_else(|| format!("Division #{}", index + 1));

            let bill_number = BILL_LABEL_RE.captures(&text).map(|c| c[1].to_string());
            let result = if yea > nay { VoteResult::Passed } else { VoteResult::Defeated };

            let mut vote = Vote::new(debate.id, motion_text, format!("{hansard_url}#division-{index}"), yea, nay, 0, abstain, result);
            vote.bill_number = bill_number;
            votes.push(vote);
        }
        votes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bill_number_from_url() {
        let caps = BILL_NUMBER_RE.find("https://parl.ca/bills/C-56").expect("matches");
        assert_eq!(caps.as_str(), "C-56");
    }

    #[test]
    fn matches_french_tallies() {
        assert_eq!(&YEA_FR_RE.captures("Pour: 62").expect("matches")[1], "62");
        assert_eq!(&NAY_FR_RE.captures("Contre: 48").expect("matches")[1], "48");
        assert_eq!(&ABSTAIN_FR_RE.captures("Abstentions: 3").expect("matches")[1], "3");
    }

    #[test]
    fn matches_english_tallies() {
        assert_eq!(&YEA_EN_RE.captures("Yeas: 170").expect("matches")[1], "170");
        assert_eq!(&NAY_EN_RE.captures("Nays: 140").expect("matches")[1], "140");
    }

    #[test]
    fn motion_text_comes_from_previous_sibling() {
        let html = Html::parse_fragment(
            "<div><p>The House shall proceed to the vote on the main motion.</p><div class=\"division\">Yeas: 5 Nays: 2</div></div>",
        );
        let selector = Selector::parse(".division").expect("valid selector");
        let block = html.select(&selector).next().expect("division found");
        let motion = preceding_motion_text(block);
        assert_eq!(motion.as_deref(), Some("The House shall proceed to the vote on the main motion."));
    }

    #[test]
    fn motion_text_is_none_when_previous_sibling_too_short() {
        let html = Html::parse_fragment("<div><p>Hi</p><div class=\"division\">Yeas: 5 Nays: 2</div></div>");
        let selector = Selector::parse(".division").expect("valid selector");
        let block = html.select(&selector).next().expect("division found");
        assert_eq!(preceding_motion_text(block), None);
    }
}
