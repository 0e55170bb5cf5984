//! Backend response normalization
//!
//! Turns the untyped `/upload` response into an [`AnalysisResult`]. This is a
//! pure transformation: no I/O, deterministic, and either it produces a full
//! result or it fails with [`MalformedPayload`]. Nothing partial escapes.
//!
//! The anomaly flag is recomputed for every frame instead of trusting the
//! backend's pre-filtered list. Frames the backend lists that do not satisfy
//! the rule are kept (with `is_anomaly == false`) and reported as warnings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analysis::{AnalysisResult, FrameScore, PercentField, Summary, ValidationWarning};

/// Slack allowed when comparing the two percentages against 100
const PERCENT_SUM_TOLERANCE: f64 = 0.5;

/// Slack allowed when comparing the same frame's scores across lists
const SCORE_TOLERANCE: f64 = 1e-9;

/// One entry of `frames_with_anomalies`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_url: Option<String>,
}

/// The `final_scores` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFinalScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_percentage: Option<f64>,
    /// Sent instead of the numbers when no frame could be scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The `/upload` response body as received.
///
/// Every field is optional here so a missing one is reported by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAnalysisPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_with_anomalies: Option<Vec<RawFrame>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_scores: Option<RawFinalScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_indices: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_scores: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_scores: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_video_url: Option<String>,
}

/// A response that cannot be turned into an [`AnalysisResult`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedPayload {
    #[error("response is not a valid analysis payload: {0}")]
    Json(String),

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("backend reported: {0}")]
    Backend(String),

    #[error("duplicate frame index {index} in `{list}`")]
    DuplicateIndex { index: u64, list: &'static str },

    #[error(
        "score series lengths differ: {indices} indices, {real} real scores, {fake} fake scores"
    )]
    SeriesLengthMismatch {
        indices: usize,
        real: usize,
        fake: usize,
    },
}

/// Parse a response body and normalize it
pub fn normalize_json(body: &str) -> Result<AnalysisResult, MalformedPayload> {
    let raw: RawAnalysisPayload =
        serde_json::from_str(body).map_err(|e| MalformedPayload::Json(e.to_string()))?;
    normalize(&raw)
}

/// Normalize a parsed response
pub fn normalize(raw: &RawAnalysisPayload) -> Result<AnalysisResult, MalformedPayload> {
    let mut warnings = Vec::new();

    let summary = normalize_summary(raw.final_scores.as_ref(), &mut warnings)?;

    let entries = raw
        .frames_with_anomalies
        .as_ref()
        .ok_or_else(|| MalformedPayload::MissingField("frames_with_anomalies".to_string()))?;
    let mut frames = entries
        .iter()
        .enumerate()
        .map(|(pos, entry)| normalize_frame(pos, entry))
        .collect::<Result<Vec<_>, _>>()?;
    sort_unique(&mut frames, "frames_with_anomalies")?;

    let sampled = normalize_sampled(raw)?;

    check_frames(&frames, &sampled, &mut warnings);

    for warning in &warnings {
        tracing::warn!("payload validation: {}", warning);
    }

    Ok(AnalysisResult {
        frames,
        sampled,
        summary,
        output_video_url: raw.output_video_url.clone(),
        warnings,
    })
}

fn normalize_summary(
    scores: Option<&RawFinalScores>,
    warnings: &mut Vec<ValidationWarning>,
) -> Result<Summary, MalformedPayload> {
    let scores = scores.ok_or_else(|| MalformedPayload::MissingField("final_scores".to_string()))?;

    if let Some(message) = &scores.error {
        return Err(MalformedPayload::Backend(message.clone()));
    }

    fn required<T: Copy>(value: Option<T>, name: &str) -> Result<T, MalformedPayload> {
        value.ok_or_else(|| MalformedPayload::MissingField(format!("final_scores.{}", name)))
    }

    let summary = Summary {
        total_frames: required(scores.total_frames, "total_frames")?,
        real_count: required(scores.real_count, "real_count")?,
        fake_count: required(scores.fake_count, "fake_count")?,
        real_pct: required(scores.real_percentage, "real_percentage")?,
        fake_pct: required(scores.fake_percentage, "fake_percentage")?,
    };

    if summary.real_count.saturating_add(summary.fake_count) != summary.total_frames {
        warnings.push(ValidationWarning::CountsDoNotSum {
            real_count: summary.real_count,
            fake_count: summary.fake_count,
            total_frames: summary.total_frames,
        });
    }

    for (field, value) in [
        (PercentField::Real, summary.real_pct),
        (PercentField::Fake, summary.fake_pct),
    ] {
        if !(0.0..=100.0).contains(&value) {
            warnings.push(ValidationWarning::PercentageOutOfRange { field, value });
        }
    }

    let sum = summary.real_pct + summary.fake_pct;
    if summary.total_frames > 0 && (sum - 100.0).abs() > PERCENT_SUM_TOLERANCE {
        warnings.push(ValidationWarning::PercentagesDoNotSum { sum });
    }

    Ok(summary)
}

fn normalize_frame(pos: usize, entry: &RawFrame) -> Result<FrameScore, MalformedPayload> {
    let missing =
        |name: &str| MalformedPayload::MissingField(format!("frames_with_anomalies[{}].{}", pos, name));

    let index = entry.frame_index.ok_or_else(|| missing("frame_index"))?;
    let real_score = entry.real_score.ok_or_else(|| missing("real_score"))?;
    let fake_score = entry.fake_score.ok_or_else(|| missing("fake_score"))?;
    let preview_url = entry.frame_url.clone().unwrap_or_default();

    Ok(FrameScore::new(index, real_score, fake_score, preview_url))
}

fn normalize_sampled(raw: &RawAnalysisPayload) -> Result<Vec<FrameScore>, MalformedPayload> {
    let indices = raw.frame_indices.as_deref().unwrap_or(&[]);
    let real = raw.real_scores.as_deref().unwrap_or(&[]);
    let fake = raw.fake_scores.as_deref().unwrap_or(&[]);

    if indices.len() != real.len() || indices.len() != fake.len() {
        return Err(MalformedPayload::SeriesLengthMismatch {
            indices: indices.len(),
            real: real.len(),
            fake: fake.len(),
        });
    }

    let mut sampled: Vec<FrameScore> = indices
        .iter()
        .zip(real)
        .zip(fake)
        .map(|((&index, &real), &fake)| FrameScore::new(index, real, fake, String::new()))
        .collect();
    sort_unique(&mut sampled, "frame_indices")?;
    Ok(sampled)
}

/// Stable sort by index, rejecting duplicates
fn sort_unique(frames: &mut [FrameScore], list: &'static str) -> Result<(), MalformedPayload> {
    frames.sort_by_key(|f| f.index);
    if let Some(pair) = frames.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(MalformedPayload::DuplicateIndex {
            index: pair[0].index,
            list,
        });
    }
    Ok(())
}

fn check_frames(
    frames: &[FrameScore],
    sampled: &[FrameScore],
    warnings: &mut Vec<ValidationWarning>,
) {
    let unit = 0.0..=1.0;
    for frame in frames.iter().chain(sampled) {
        if !unit.contains(&frame.real_score) || !unit.contains(&frame.fake_score) {
            warnings.push(ValidationWarning::ScoreOutOfRange {
                index: frame.index,
                real_score: frame.real_score,
                fake_score: frame.fake_score,
            });
        }
    }

    let by_index: HashMap<u64, &FrameScore> = sampled.iter().map(|f| (f.index, f)).collect();
    for frame in frames {
        if !frame.is_anomaly {
            warnings.push(ValidationWarning::AnomalyNotConfirmed { index: frame.index });
        }
        if let Some(series) = by_index.get(&frame.index) {
            if (series.real_score - frame.real_score).abs() > SCORE_TOLERANCE
                || (series.fake_score - frame.fake_score).abs() > SCORE_TOLERANCE
            {
                warnings.push(ValidationWarning::SeriesDisagrees { index: frame.index });
            }
        }
    }
}
