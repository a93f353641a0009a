//! Federal Hansard transcript scraper (spec §4.3 / C3).
//!
//! Acquisition order mirrors `hansard_scraper.py`: the Publication Search
//! XML feed returns speech-per-item data with speaker attribution already
//! resolved (preferred, deterministic); if that yields nothing, fall back to
//! scraping the HTML publication search one Order-of-Business section at a
//! time, and finally a broad unfiltered scrape.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use parliament_core::{Contribution, Speaker, TopicSection, section_priority};
use parliament_util::normalize_speaker_name;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use reqwest::RequestBuilder;
use scraper::{ElementRef, Html, Selector};
use uuid::Uuid;

use crate::error::StageError;
use crate::orchestrator::{PipelineContext, Stage};

const PUB_SEARCH_BASE: &str = "https://www.ourcommons.ca/PublicationSearch/en/";
const PUB_SEARCH_XML: &str = "https://www.ourcommons.ca/Parliamentarians/en/PublicationSearch";
const PARL_SESSION: &str = "45-1";

const ORDER_OF_BUSINESS: &[(&str, &str)] = &[
    ("GovernmentOrders", "Government Orders"),
    ("OralQuestionPeriod", "Oral Question Period"),
    ("RoutineProceedings", "Routine Proceedings"),
    ("StatementsbyMembers", "Statements by Members"),
    ("PrivateMembersBusiness", "Private Members' Business"),
    ("AdjournmentProceedings", "Adjournment Proceedings"),
];

static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(\d{4}-\d{2}-\d{2})\s+(\d{1,2}:\d{2})").unwrap()
});

static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"\[p\.(\d+)\]").unwrap()
});

static PARTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"^(Lib\.|CPC|NDP|BQ|Green|Ind\.?)\s*\(([A-Z]{2})\)$").unwrap()
});

static SPEAKER_RIDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"^(.+?)\s*\(([^)]+)\)\s*$").unwrap()
});

static MEMBER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"/members/en/(\d+)").unwrap()
});

static TOPIC_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| {
        #[expect(clippy::unwrap_used)]
        Regex::new(r"Topic=(\d+)").unwrap()
    });

#[derive(Debug, Clone)]
struct TopicTag {
    title: String,
    id: String,
    url: String,
}

#[derive(Debug, Clone)]
struct Speech {
    speaker_name: String,
    riding: String,
    member_id: Option<String>,
    member_url: String,
    party: String,
    province: String,
    date: String,
    time: String,
    page_ref: String,
    text: String,
    topics: Vec<TopicTag>,
    section: String,
}

pub struct HansardScraperStage;

#[async_trait]
impl Stage for HansardScraperStage {
    fn name(&self) -> &'static str {
        "hansard_scraper"
    }

    async fn run(&self, ctx: &PipelineContext, debate_id: Uuid) -> Result<(), StageError> {
        let debate = ctx.db.debates().get_by_id(debate_id).await?;
        let sitting_date = debate.sitting_date;
        let target_date = sitting_date.format("%Y-%m-%d").to_string();

        let mut speeches = scrape_from_xml(&ctx.http, &target_date).await.unwrap_or_else(|err| {
            tracing::warn!(%debate_id, error = %err, "XML Hansard scrape failed, falling back to HTML");
            Vec::new()
        });

        if speeches.is_empty() {
            if let Err(err) = warm_up(&ctx.http).await {
                tracing::warn!(%debate_id, error = %err, "Hansard warm-up request failed");
            }

            for &(oob_key, oob_label) in ORDER_OF_BUSINESS {
                match scrape_section(&ctx.http, &target_date, oob_key, oob_label).await {
                    Ok(mut section_speeches) => speeches.append(&mut section_speeches),
                    Err(err) => tracing::warn!(%debate_id, section = oob_label, error = %err, "section scrape failed"),
                }
            }

            if speeches.is_empty() {
                speeches = scrape_broad(&ctx.http, &target_date).await.unwrap_or_default();
            }
        }

        if speeches.is_empty() {
            return Err(StageError::DataMissing(format!("no Hansard content published yet for {target_date}")));
        }

        speeches.sort_by(|a, b| (a.date.as_str(), a.time.as_str()).cmp(&(b.date.as_str(), b.time.as_str())));

        let sections = group_by_topic(&speeches);

        let mut speaker_ids = std::collections::HashMap::new();
        for speech in &speeches {
            let normalised = normalize_speaker_name(&speech.speaker_name);
            if speaker_ids.contains_key(&normalised) {
                continue;
            }
            let mut speaker = Speaker::new(debate_id, speech.speaker_name.clone(), normalised.clone());
            if !speech.party.is_empty() {
                speaker = speaker.with_party(speech.party.clone());
            }
            if !speech.riding.is_empty() {
                speaker = speaker.with_riding(speech.riding.clone());
            }
            if let Some(member_id) = &speech.member_id {
                speaker = speaker.with_external_id(member_id.clone());
            }
            speaker.metadata = serde_json::json!({
                "province": speech.province,
                "profile_url": speech.member_url,
                "source": "hansard_scrape",
            });
            let saved = ctx.db.speakers().upsert(&speaker).await?;
            speaker_ids.insert(normalised, saved.id);
        }

        let contributions: Vec<Contribution> = speeches
            .iter()
            .enumerate()
            .map(|(index, speech)| {
                let normalised = normalize_speaker_name(&speech.speaker_name);
                #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let mut contribution = Contribution::new(debate_id, speech.text.clone(), index as i32)
                    .with_raw_speaker_label(speech.speaker_name.clone());
                if let Some(&speaker_id) = speaker_ids.get(&normalised) {
                    contribution = contribution.with_speaker(speaker_id);
                }
                contribution.metadata = serde_json::json!({
                    "party": speech.party,
                    "riding": speech.riding,
                    "section": speech.section,
                    "time": speech.time,
                    "page_ref": speech.page_ref,
                    "topics": speech.topics.iter().map(|t| t.title.clone()).collect::<Vec<_>>(),
                });
                contribution
            })
            .collect();

        ctx.db.contributions().replace_for_debate(debate_id, &contributions).await?;
        ctx.db.topic_sections().replace_for_debate(debate_id, &sections).await?;

        tracing::info!(
            %debate_id,
            speeches = speeches.len(),
            sections = sections.len(),
            speakers = speaker_ids.len(),
            "Hansard scrape complete"
        );

        Ok(())
    }
}

fn apply_browser_headers(builder: RequestBuilder) -> RequestBuilder {
    builder
        .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36")
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
        .header("Accept-Language", "en-CA,en;q=0.9")
        .header("Cache-Control", "no-cache")
        .header("Pragma", "no-cache")
        .header("DNT", "1")
        .header("Referer", PUB_SEARCH_BASE)
}

async fn warm_up(http: &reqwest::Client) -> Result<(), StageError> {
    let builder = apply_browser_headers(http.get(PUB_SEARCH_BASE).query(&[("PubType", "37")]));
    builder.send().await?;
    Ok(())
}

async fn scrape_from_xml(http: &reqwest::Client, target_date: &str) -> Result<Vec<Speech>, StageError> {
    let params = [
        ("PubType", "37"),
        ("View", "L"),
        ("xml", "1"),
        ("RPP", "1000"),
        ("Page", "1"),
        ("ParlSes", PARL_SESSION),
        ("order", "chron"),
    ];
    let response = apply_browser_headers(http.get(PUB_SEARCH_XML).query(&params)).send().await?;
    if !response.status().is_success() {
        return Ok(Vec::new());
    }
    let xml = response.text().await?;
    Ok(parse_publication_search_xml(&xml, target_date))
}

fn attr(start: &BytesStart<'_>, name: &str) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(std::borrow::Cow::into_owned))
}

#[expect(clippy::too_many_lines)]
fn parse_publication_search_xml(xml: &str, target_date: &str) -> Vec<Speech> {
    let mut reader = Reader::from_str(xml);

    let mut speeches = Vec::new();
    let mut pub_date = String::new();

    let mut item_date = String::new();
    let mut hour: Option<i64> = None;
    let mut minute: Option<i64> = None;
    let mut page_ref = String::new();

    let mut in_person = false;
    let mut person_id: Option<String> = None;
    let mut profile_url = String::new();
    let mut first_name = String::new();
    let mut last_name = String::new();
    let mut riding = String::new();
    let mut party = String::new();
    let mut province = String::new();

    let mut section_label = String::new();
    let mut subject = String::new();

    let mut in_xml_content = false;
    let mut para_texts: Vec<String> = Vec::new();
    let mut current_tag: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "Publication" => pub_date = attr(&e, "Date").unwrap_or_default(),
                    "PublicationItem" => {
                        item_date = attr(&e, "Date").unwrap_or_else(|| pub_date.clone());
                        hour = attr(&e, "Hour").and_then(|s| s.parse().ok());
                        minute = attr(&e, "Minute").and_then(|s| s.parse().ok());
                        page_ref = attr(&e, "Page").unwrap_or_default();
                        person_id = None;
                        profile_url.clear();
                        first_name.clear();
                        last_name.clear();
                        riding.clear();
                        party.clear();
                        province.clear();
                        section_label.clear();
                        subject.clear();
                        para_texts.clear();
                    }
                    "Person" => {
                        in_person = true;
                        person_id = attr(&e, "Id");
                    }
                    "Caucus" if in_person => party = attr(&e, "Abbr").unwrap_or_default(),
                    "Province" if in_person => province = attr(&e, "Code").unwrap_or_default(),
                    "XmlContent" => in_xml_content = true,
                    _ => {}
                }
                current_tag = Some(name);
            }
            Ok(Event::Text(t)) => {
                let Ok(raw) = t.unescape() else { continue };
                let text = raw.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                match current_tag.as_deref() {
                    Some("ProfileUrl") if in_person => profile_url = text,
                    Some("FirstName") if in_person => first_name = text,
                    Some("LastName") if in_person => last_name = text,
                    Some("Constituency") if in_person => riding = text,
                    Some("OrderOfBusiness") => section_label = text,
                    Some("SubjectOfBusiness") => subject = text,
                    Some("ParaText") if in_xml_content => para_texts.push(text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "Person" => in_person = false,
                    "XmlContent" => in_xml_content = false,
                    "PublicationItem" if item_date == target_date => {
                        let speaker_name = format!("{first_name} {last_name}").trim().to_string();
                        let speech_text = para_texts.join("\n");
                        if !speaker_name.is_empty() && !speech_text.is_empty() {
                            let resolved_profile = if let Some(rest) = profile_url.strip_prefix("//") {
                                format!("https:{rest}")
                            } else if let Some(rest) = profile_url.strip_prefix('/') {
                                format!("https://www.ourcommons.ca{rest}")
                            } else {
                                profile_url.clone()
                            };
                            let time_str = match (hour, minute) {
                                (Some(h), Some(m)) => format!("{h:02}:{m:02}"),
                                _ => String::new(),
                            };
                            let topics = if subject.is_empty() {
                                Vec::new()
                            } else {
                                vec![TopicTag { title: subject.clone(), id: String::new(), url: String::new() }]
                            };
                            speeches.push(Speech {
                                speaker_name,
                                riding: riding.clone(),
                                member_id: person_id.clone(),
                                member_url: resolved_profile,
                                party: party.clone(),
                                province: province.clone(),
                                date: item_date.clone(),
                                time: time_str,
                                page_ref: page_ref.clone(),
                                text: speech_text,
                                topics,
                                section: if section_label.is_empty() { "General".to_string() } else { section_label.clone() },
                            });
                        }
                    }
                    _ => {}
                }
                current_tag = None;
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    speeches
}

async fn scrape_section(http: &reqwest::Client, target_date: &str, oob_key: &str, oob_label: &str) -> Result<Vec<Speech>, StageError> {
    let mut speeches = Vec::new();
    let mut page = 1u32;

    loop {
        let page_str = page.to_string();
        let params = [
            ("View", "D"),
            ("ParlSes", PARL_SESSION),
            ("oob", oob_key),
            ("RPP", "100"),
            ("Page", page_str.as_str()),
            ("PubType", "37"),
            ("order", "chron"),
        ];
        let response = apply_browser_headers(http.get(PUB_SEARCH_BASE).query(&params)).send().await?;
        if !response.status().is_success() {
            break;
        }
        let html = response.text().await?;
        let page_speeches = parse_speech_cards(&html, oob_label);

        let date_speeches: Vec<Speech> = page_speeches.iter().filter(|s| s.date == target_date).cloned().collect();
        let got_any = !page_speeches.is_empty();
        let got_target = !date_speeches.is_empty();
        speeches.extend(date_speeches);

        if got_any && !got_target {
            let all_earlier = page_speeches.iter().all(|s| s.date.as_str() < target_date);
            if all_earlier {
                break;
            }
        }
        if !got_any || page >= 20 {
            break;
        }
        page += 1;
    }

    Ok(speeches)
}

async fn scrape_broad(http: &reqwest::Client, target_date: &str) -> Result<Vec<Speech>, StageError> {
    let mut speeches = Vec::new();
    let mut page = 1u32;

    loop {
        let page_str = page.to_string();
        let params = [
            ("View", "D"),
            ("ParlSes", PARL_SESSION),
            ("RPP", "100"),
            ("Page", page_str.as_str()),
            ("PubType", "37"),
            ("order", "chron"),
        ];
        let response = apply_browser_headers(http.get(PUB_SEARCH_BASE).query(&params)).send().await?;
        if !response.status().is_success() {
            break;
        }
        let html = response.text().await?;
        let page_speeches = parse_speech_cards(&html, "General");

        let date_speeches: Vec<Speech> = page_speeches.iter().filter(|s| s.date == target_date).cloned().collect();
        let got_any = !page_speeches.is_empty();
        let got_target = !date_speeches.is_empty();
        speeches.extend(date_speeches);

        if got_any && !got_target && page_speeches.iter().all(|s| s.date.as_str() < target_date) {
            break;
        }
        if page >= 30 {
            break;
        }
        page += 1;
    }

    Ok(speeches)
}

fn parse_speech_cards(html: &str, section_label: &str) -> Vec<Speech> {
    let document = Html::parse_document(html);
    let mut speeches = Vec::new();

    if let Ok(selector) = Selector::parse(
        ".publication-search-result, .search-result, .result-card, .hansard-result, [class*='result-item'], [class*='search-item']",
    ) {
        for card in document.select(&selector) {
            if let Some(speech) = parse_single_card(&card, section_label) {
                speeches.push(speech);
            }
        }
    }

    if speeches.is_empty() {
        speeches = parse_detail_view(&document, section_label);
    }

    speeches
}

fn parse_single_card(card: &ElementRef<'_>, section_label: &str) -> Option<Speech> {
    let member_selector = Selector::parse("a[href*='/members/en/']").ok()?;
    let speaker_link = card.select(&member_selector).next()?;

    let speaker_text = speaker_link.text().collect::<String>().trim().to_string();
    let member_href = speaker_link.value().attr("href").unwrap_or_default();
    let member_url = resolve_member_url(member_href);
    let (name, riding) = parse_speaker_riding(&speaker_text);
    if name.is_empty() {
        return None;
    }
    let member_id = MEMBER_ID_RE.captures(&member_url).map(|c| c[1].to_string());

    let full_text = card.text().collect::<Vec<_>>().join(" ");
    let date_caps = DATETIME_RE.captures(&full_text)?;
    let date = date_caps[1].to_string();
    let time = date_caps[2].to_string();
    let page_ref = PAGE_RE.captures(&full_text).map_or_else(String::new, |c| c[1].to_string());

    let mut party = String::new();
    let mut province = String::new();
    if let Ok(party_selector) = Selector::parse(".party, .caucus, [class*='party'], [class*='caucus']") {
        if let Some(el) = card.select(&party_selector).next() {
            party = el.text().collect::<String>().trim().to_string();
        }
    }
    if party.is_empty() {
        for node in card.text() {
            let trimmed = node.trim();
            if let Some(caps) = PARTY_RE.captures(trimmed) {
                party = caps[1].to_string();
                province = caps[2].to_string();
                break;
            }
        }
    }

    let mut speech_text = String::new();
    if let Ok(text_selector) = Selector::parse("p, .speech-text, .content-text, [class*='speech'], [class*='content']") {
        for el in card.select(&text_selector) {
            if el.select(&member_selector).next().is_some() {
                continue;
            }
            let text = el.text().collect::<String>().trim().to_string();
            if text.len() > 20 {
                speech_text.push_str(&text);
                speech_text.push('\n');
            }
        }
    }

    let topics = extract_topics(card);

    Some(Speech {
        speaker_name: name,
        riding,
        member_id,
        member_url,
        party,
        province,
        date,
        time,
        page_ref,
        text: speech_text.trim().to_string(),
        topics,
        section: section_label.to_string(),
    })
}

fn parse_detail_view(document: &Html, section_label: &str) -> Vec<Speech> {
    let mut speeches = Vec::new();
    let Ok(block_selector) = Selector::parse("div[class*='result'], div[class*='item'], article") else {
        return speeches;
    };
    let Ok(member_selector) = Selector::parse("a[href*='/members/en/']") else {
        return speeches;
    };

    for block in document.select(&block_selector) {
        let Some(member_link) = block.select(&member_selector).next() else { continue };
        let speaker_text = member_link.text().collect::<String>().trim().to_string();
        let (name, riding) = parse_speaker_riding(&speaker_text);
        if name.is_empty() {
            continue;
        }

        let member_href = member_link.value().attr("href").unwrap_or_default();
        let member_url = resolve_member_url(member_href);
        let member_id = MEMBER_ID_RE.captures(&member_url).map(|c| c[1].to_string());

        let all_text = block.text().collect::<Vec<_>>().join(" ");
        let Some(date_caps) = DATETIME_RE.captures(&all_text) else { continue };
        let date = date_caps[1].to_string();
        let time = date_caps[2].to_string();
        let page_ref = PAGE_RE.captures(&all_text).map_or_else(String::new, |c| c[1].to_string());

        let mut party = String::new();
        let mut province = String::new();
        if let Some(caps) = PARTY_RE.captures(&all_text) {
            party = caps[1].to_string();
            province = caps[2].to_string();
        }

        let mut speech_text = String::new();
        if let Ok(p_selector) = Selector::parse("p") {
            for p in block.select(&p_selector) {
                let text = p.text().collect::<String>().trim().to_string();
                if text.len() > 30 && !DATETIME_RE.is_match(&text[..text.len().min(10)]) {
                    speech_text.push_str(&text);
                    speech_text.push('\n');
                }
            }
        }

        let topics = extract_topics(&block);

        speeches.push(Speech {
            speaker_name: name,
            riding,
            member_id,
            member_url,
            party,
            province,
            date,
            time,
            page_ref,
            text: speech_text.trim().to_string(),
            topics,
            section: section_label.to_string(),
        });
    }

    speeches
}

fn extract_topics(scope: &ElementRef<'_>) -> Vec<TopicTag> {
    let mut topics = Vec::new();
    let Ok(selector) = Selector::parse("a[href*='Topic=']") else {
        return topics;
    };
    for link in scope.select(&selector) {
        let title = link.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }
        let href = link.value().attr("href").unwrap_or_default();
        let id = TOPIC_ID_RE.captures(href).map_or_else(String::new, |c| c[1].to_string());
        let url = if href.starts_with("http") { href.to_string() } else { format!("https://www.ourcommons.ca{href}") };
        topics.push(TopicTag { title, id, url });
    }
    topics
}

fn resolve_member_url(href: &str) -> String {
    if href.starts_with('/') {
        format!("https://www.ourcommons.ca{href}")
    } else {
        href.to_string()
    }
}

fn parse_speaker_riding(text: &str) -> (String, String) {
    SPEAKER_RIDING_RE.captures(text.trim()).map_or_else(
        || (text.trim().to_string(), String::new()),
        |caps| (caps[1].trim().to_string(), caps[2].trim().to_string()),
    )
}

fn group_by_topic(speeches: &[Speech]) -> Vec<TopicSection> {
    struct Group {
        title: String,
        external_topic_id: Option<String>,
        section_label: String,
        speech_count: i32,
        speakers: std::collections::HashSet<String>,
        parties: std::collections::BTreeSet<String>,
    }

    let mut groups: indexmap::IndexMap<String, Group> = indexmap::IndexMap::new();

    for speech in speeches {
        let keys: Vec<String> = if speech.topics.is_empty() {
            vec![format!("__section__{}", speech.section)]
        } else {
            speech.topics.iter().map(|t| if t.id.is_empty() { t.title.clone() } else { t.id.clone() }).collect()
        };

        for key in keys {
            let entry = groups.entry(key.clone()).or_insert_with(|| {
                let (title, external_topic_id) = speech
                    .topics
                    .iter()
                    .find(|t| (if t.id.is_empty() { &t.title } else { &t.id }) == &key)
                    .map_or_else(
                        || (speech.section.clone(), None),
                        |t| (t.title.clone(), if t.id.is_empty() { None } else { Some(t.id.clone()) }),
                    );
                Group {
                    title,
                    external_topic_id,
                    section_label: speech.section.clone(),
                    speech_count: 0,
                    speakers: std::collections::HashSet::new(),
                    parties: std::collections::BTreeSet::new(),
                }
            });
            entry.speech_count += 1;
            entry.speakers.insert(speech.speaker_name.clone());
            if !speech.party.is_empty() {
                entry.parties.insert(speech.party.clone());
            }
        }
    }

    let mut sections: Vec<TopicSection> = groups
        .into_values()
        .map(|group| {
            let mut section = TopicSection::new(Uuid::nil(), group.title, group.section_label, 0);
            if let Some(external_id) = group.external_topic_id {
                section = section.with_external_topic_id(external_id);
            }
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            {
                section.speech_count = group.speech_count;
                section.speaker_count = group.speakers.len() as i32;
            }
            section.parties = group.parties.into_iter().collect();
            section
        })
        .collect();

    sections.sort_by_key(|s| (section_priority(&s.section_label), std::cmp::Reverse(s.speech_count)));
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    for (index, section) in sections.iter_mut().enumerate() {
        section.sequence_order = index as i32;
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_speaker_riding_pair() {
        assert_eq!(parse_speaker_riding("Doug Eyolfson (Winnipeg West)"), ("Doug Eyolfson".to_string(), "Winnipeg West".to_string()));
    }

    #[test]
    fn parses_speaker_without_riding() {
        assert_eq!(parse_speaker_riding("The Speaker"), ("The Speaker".to_string(), String::new()));
    }

    #[test]
    fn party_regex_matches_abbreviation_and_province() {
        let caps = PARTY_RE.captures("Lib. (MB)").expect("matches");
        assert_eq!(&caps[1], "Lib.");
        assert_eq!(&caps[2], "MB");
    }

    #[test]
    fn xml_feed_extracts_matching_date_only() {
        let xml = r#"<Publications>
            <Publication Date="2026-02-09" Title="Number 082">
                <PublicationItem Date="2026-02-09" Hour="11" Minute="3" Page="5563">
                    <Person Id="12345">
                        <ProfileUrl>/members/en/12345</ProfileUrl>
                        <FirstName>Doug</FirstName>
                        <LastName>Eyolfson</LastName>
                        <Constituency>Winnipeg West</Constituency>
                        <Caucus Abbr="Lib."/>
                        <Province Code="MB"/>
                    </Person>
                    <OrderOfBusiness>Government Orders</OrderOfBusiness>
                    <SubjectOfBusiness>Bill C-230</SubjectOfBusiness>
                    <XmlContent><ParaText>I rise today in support of this bill.</ParaText></XmlContent>
                </PublicationItem>
                <PublicationItem Date="2026-02-08" Hour="10" Minute="0" Page="5000">
                    <Person Id="999">
                        <FirstName>Other</FirstName>
                        <LastName>Member</LastName>
                    </Person>
                    <XmlContent><ParaText>Unrelated earlier speech.</ParaText></XmlContent>
                </PublicationItem>
            </Publication>
        </Publications>"#;

        let speeches = parse_publication_search_xml(xml, "2026-02-09");
        assert_eq!(speeches.len(), 1);
        assert_eq!(speeches[0].speaker_name, "Doug Eyolfson");
        assert_eq!(speeches[0].party, "Lib.");
        assert_eq!(speeches[0].time, "11:03");
        assert_eq!(speeches[0].topics[0].title, "Bill C-230");
    }
}
