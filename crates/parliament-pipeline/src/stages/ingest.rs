//! Audio acquisition stage (spec §4.4 / C4, audio-first chain only).
//!
//! Grounded in `downloader.py`'s `download_media`: try each candidate URL in
//! turn (direct file, HLS manifest, or a video-sharing URL handled by a
//! generic external downloader), extract 16 kHz mono WAV via `ffmpeg`, probe
//! the duration via `ffprobe`, and record one `media_assets` row. All
//! candidates failing is `NoMediaSource` — surfaced as [`StageError::DataMissing`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use futures::StreamExt;
use parliament_core::MediaAsset;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::StageError;
use crate::orchestrator::{PipelineContext, Stage};

const DIRECT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);
const HLS_TIMEOUT: Duration = Duration::from_secs(3600);
const YOUTUBE_TIMEOUT: Duration = Duration::from_secs(3600);

enum CandidateKind {
    Direct,
    Hls,
    Youtube,
}

fn classify(url: &str) -> CandidateKind {
    if url.contains("youtube.com") || url.contains("youtu.be") {
        CandidateKind::Youtube
    } else if url.contains(".m3u8") || url.contains("manifest") {
        CandidateKind::Hls
    } else {
        CandidateKind::Direct
    }
}

impl CandidateKind {
    const fn label(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Hls => "hls",
            Self::Youtube => "youtube",
        }
    }
}

/// Maps a legislature code to the recogniser language(s) to expect
/// (grounded in `downloader.py`'s `_infer_language`).
fn infer_language(legislature_code: &str) -> &'static str {
    match legislature_code {
        "CA" => "en+fr",
        "ON" => "en",
        "QC" => "fr",
        _ => "en",
    }
}

pub struct IngestStage;

#[async_trait]
impl Stage for IngestStage {
    fn name(&self) -> &'static str {
        "ingest"
    }

    async fn run(&self, ctx: &PipelineContext, debate_id: Uuid) -> Result<(), StageError> {
        let debate = ctx.db.debates().get_by_id(debate_id).await?;
        let legislature = ctx
            .db
            .legislatures()
            .get_by_id(debate.legislature_id)
            .await?
            .ok_or_else(|| StageError::Fatal(format!("legislature {} not found", debate.legislature_id)))?;

        let mut candidates: Vec<String> = Vec::new();
        if let Some(url) = &debate.video_url {
            candidates.push(url.clone());
        }
        for source in &debate.source_urls {
            if source.kind == parliament_core::SourceUrlKind::Video && !candidates.contains(&source.url) {
                candidates.push(source.url.clone());
            }
        }

        if candidates.is_empty() {
            return Err(StageError::DataMissing(format!("no media source available for debate {debate_id}")));
        }

        let debate_dir = ctx.config.media_storage_path().join(debate_id.to_string());
        tokio::fs::create_dir_all(&debate_dir)
            .await
            .map_err(|err| StageError::Transient(format!("creating media directory: {err}")))?;
        let audio_path = debate_dir.join("audio.wav");

        let mut last_error = String::new();
        for url in &candidates {
            let kind = classify(url);
            let outcome = match kind {
                CandidateKind::Direct => download_direct(&ctx.http, url, &debate_dir, &audio_path).await,
                CandidateKind::Hls => extract_hls(url, &audio_path).await,
                CandidateKind::Youtube => extract_youtube(url, &audio_path).await,
            };

            match outcome {
                Ok(()) => {
                    let duration_seconds = probe_duration(&audio_path).await;
                    let file_size_bytes = tokio::fs::metadata(&audio_path).await.ok().map(|m| m.len() as i64);

                    let mut asset = MediaAsset::new(debate_id, kind.label(), url.clone(), infer_language(&legislature.code));
                    asset.local_path = Some(audio_path.display().to_string());
                    asset.file_size_bytes = file_size_bytes;
                    asset.duration_seconds = duration_seconds;

                    ctx.db.media_assets().create(&asset).await?;
                    tracing::info!(%debate_id, source = kind.label(), duration_seconds, "media ingested");
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(%debate_id, url, source = kind.label(), error = %err, "candidate media source failed");
                    last_error = err;
                }
            }
        }

        let failed = MediaAsset::failed(debate_id, "none", candidates.first().cloned().unwrap_or_default(), &last_error);
        ctx.db.media_assets().create(&failed).await?;
        Err(StageError::DataMissing(format!("no media source available for debate {debate_id}: {last_error}")))
    }
}

/// Streaming GET with a bounded number of retries (the direct-download leg
/// only — HLS and the video-sharing fallback are single attempts per spec).
async fn download_direct(http: &reqwest::Client, url: &str, work_dir: &Path, audio_path: &Path) -> Result<(), String> {
    let tmp_path = work_dir.join("download.tmp");

    let attempt = || async { do_direct_download(http, url, &tmp_path).await };
    attempt
        .retry(ExponentialBuilder::default().with_max_times(3).with_min_delay(Duration::from_secs(2)).with_max_delay(Duration::from_secs(30)))
        .when(|err: &String| err.contains("timeout") || err.contains("connection") || err.contains("HTTP 5"))
        .notify(|err, dur| tracing::warn!("direct download failed, retrying in {dur:?}: {err}"))
        .await?;

    extract_audio(&tmp_path, audio_path, DIRECT_DOWNLOAD_TIMEOUT).await?;
    let _ = tokio::fs::remove_file(&tmp_path).await;
    Ok(())
}

async fn do_direct_download(http: &reqwest::Client, url: &str, tmp_path: &Path) -> Result<(), String> {
    let response = http.get(url).timeout(DIRECT_DOWNLOAD_TIMEOUT).send().await.map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}: {url}", response.status()));
    }

    let mut file = tokio::fs::File::create(tmp_path).await.map_err(|err| err.to_string())?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| err.to_string())?;
        file.write_all(&chunk).await.map_err(|err| err.to_string())?;
    }
    Ok(())
}

/// Audio extraction via an external audio/video tool, same output format on
/// every path: `pcm_s16le`, 16 kHz, mono.
async fn extract_audio(input_path: &Path, output_path: &Path, timeout: Duration) -> Result<(), String> {
    run_with_timeout(
        Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(input_path)
            .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
            .arg(output_path),
        timeout,
    )
    .await
}

async fn extract_hls(manifest_url: &str, output_path: &Path) -> Result<(), String> {
    run_with_timeout(
        Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(manifest_url)
            .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
            .arg(output_path),
        HLS_TIMEOUT,
    )
    .await
}

async fn extract_youtube(url: &str, output_path: &Path) -> Result<(), String> {
    let output_template = output_path.with_extension("");
    run_with_timeout(
        Command::new("yt-dlp")
            .args(["--extract-audio", "--audio-format", "wav", "--audio-quality", "0"])
            .args(["--postprocessor-args", "ffmpeg:-ar 16000 -ac 1"])
            .arg("-o")
            .arg(output_template.with_extension("%(ext)s"))
            .arg(url),
        YOUTUBE_TIMEOUT,
    )
    .await
}

async fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<(), String> {
    let output = tokio::time::timeout(timeout, command.output()).await.map_err(|_| "external tool timed out".to_string())?.map_err(|err| err.to_string())?;

    if output.status.success() {
        Ok(())
    } else {
        Err(format!("external tool exited with {}: {}", output.status, String::from_utf8_lossy(&output.stderr)))
    }
}

async fn probe_duration(audio_path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(audio_path)
        .output()
        .await
        .ok()?;
    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_language_by_legislature() {
        assert_eq!(infer_language("CA"), "en+fr");
        assert_eq!(infer_language("ON"), "en");
        assert_eq!(infer_language("QC"), "fr");
        assert_eq!(infer_language("BC"), "en");
    }

    #[test]
    fn classifies_candidate_kinds() {
        assert_eq!(classify("https://cpac.ca/episode.mp4").label(), "direct");
        assert_eq!(classify("https://cdn.example.com/stream/manifest.m3u8").label(), "hls");
        assert_eq!(classify("https://www.youtube.com/watch?v=abc123").label(), "youtube");
    }
}
