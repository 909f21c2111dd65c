use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Date, OffsetDateTime};

pub const PERMALINK_BASE: &str = "https://www.youtube.com/watch?v=";
pub const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Shown in place of a relative age when the publish timestamp cannot be parsed.
pub const TIME_PLACEHOLDER: &str = "-";
pub const NO_SUMMARY_PLACEHOLDER: &str = "No AI summary available.";
pub const SUMMARY_FAILURE_PREFIX: &str = "AI analysis failed";

pub const DEFAULT_TOP_TAGS: usize = 6;
pub const DEFAULT_CHART_SIZE: usize = 10;

/// Generation models tried in order before falling back to the model family.
pub const PREFERRED_MODELS: [&str; 3] = ["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];
pub const MODEL_FAMILY_PREFIX: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const SUMMARY_LANGUAGE: &str = "Korean";

const SECONDS_PER_HOUR: f64 = 3600.0;
const HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum ElapsedError {
    #[error("unparsable publish timestamp: {0:?}")]
    Unparsable(String),
}

/// One ingested catalog item, exactly as it is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct VideoRecord {
    pub title: String,
    pub channel: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub publish_date: String,
    pub tags: String,
    pub thumbnail_url: String,
    pub video_url: String,
    pub scrapped_date: String,
    #[serde(default)]
    pub ai_summary: Option<String>,
}

impl VideoRecord {
    #[must_use]
    pub fn video_id(&self) -> Option<String> {
        video_id_from_url(&self.video_url)
    }

    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        split_tags(&self.tags)
    }

    /// The stored summary when it carries any text.
    #[must_use]
    pub fn summary_text(&self) -> Option<&str> {
        self.ai_summary.as_deref().filter(|summary| !summary.trim().is_empty())
    }
}

/// A record plus the metrics recomputed on every read.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct RankedVideo {
    #[serde(flatten)]
    pub record: VideoRecord,
    pub firepower: u64,
    pub time_txt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct FirepowerEntry {
    pub title: String,
    pub firepower: u64,
}

#[must_use]
pub fn permalink(video_id: &str) -> String {
    format!("{PERMALINK_BASE}{video_id}")
}

#[must_use]
pub fn embed_url(video_id: &str) -> String {
    format!("{EMBED_BASE}{video_id}")
}

/// Recover the platform id from a watch, short, embed, or `youtu.be` URL.
#[must_use]
pub fn video_id_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    let host = parsed.host_str()?;

    if host == "youtu.be" {
        return parsed
            .path()
            .strip_prefix('/')
            .and_then(|rest| rest.split('/').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
    }

    if host != "youtube.com" && !host.ends_with(".youtube.com") {
        return None;
    }

    if parsed.path() == "/watch" {
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty());
    }

    for prefix in ["/embed/", "/shorts/", "/v/"] {
        if let Some(rest) = parsed.path().strip_prefix(prefix) {
            return rest.split('/').next().filter(|id| !id.is_empty()).map(str::to_string);
        }
    }

    None
}

#[must_use]
pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

/// Split a comma-joined tag column, skipping empty fragments.
pub fn split_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(',').filter(|tag| !tag.is_empty())
}

/// Calendar date a run is stamped with: the host's local date, or the UTC date when the
/// local offset cannot be determined.
#[must_use]
pub fn run_date<E>(local: Result<OffsetDateTime, E>, utc: OffsetDateTime) -> Date {
    local.unwrap_or(utc).date()
}

#[must_use]
pub fn scrapped_date_string(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Parse a platform timestamp, accepting RFC 3339 and the wider ISO 8601 forms.
///
/// # Errors
/// Returns [`ElapsedError::Unparsable`] when neither format matches or no offset is present.
pub fn parse_publish_date(raw: &str) -> Result<OffsetDateTime, ElapsedError> {
    let trimmed = raw.trim();
    OffsetDateTime::parse(trimmed, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(trimmed, &Iso8601::DEFAULT))
        .map_err(|_| ElapsedError::Unparsable(raw.to_string()))
}

/// Hours between publication and `now`; negative for future-dated rows.
///
/// # Errors
/// Returns [`ElapsedError::Unparsable`] when the publish timestamp cannot be parsed.
pub fn elapsed_hours(publish_date: &str, now: OffsetDateTime) -> Result<f64, ElapsedError> {
    let published = parse_publish_date(publish_date)?;
    Ok((now - published).as_seconds_f64() / SECONDS_PER_HOUR)
}

/// Views accrued per hour since publication, truncated toward zero.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn firepower(view_count: u64, publish_date: &str, now: OffsetDateTime) -> u64 {
    match elapsed_hours(publish_date, now) {
        Ok(hours) if hours > 0.0 => (view_count as f64 / hours).floor() as u64,
        Ok(_) | Err(ElapsedError::Unparsable(_)) => 0,
    }
}

/// Two-tier relative age: hours below one day, whole days after.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn time_txt(publish_date: &str, now: OffsetDateTime) -> String {
    match elapsed_hours(publish_date, now) {
        Ok(hours) if hours < HOURS_PER_DAY => {
            format!("{} hours ago", hours.max(0.0).floor() as u64)
        }
        Ok(hours) => format!("{} days ago", (hours / HOURS_PER_DAY).floor() as u64),
        Err(ElapsedError::Unparsable(_)) => TIME_PLACEHOLDER.to_string(),
    }
}

#[must_use]
pub fn derive_metrics(records: Vec<VideoRecord>, now: OffsetDateTime) -> Vec<RankedVideo> {
    records
        .into_iter()
        .map(|record| {
            let firepower = firepower(record.view_count, &record.publish_date, now);
            let time_txt = time_txt(&record.publish_date, now);
            RankedVideo { record, firepower, time_txt }
        })
        .collect()
}

#[must_use]
pub fn matches_search(record: &VideoRecord, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record.title.to_lowercase().contains(&needle) || record.channel.to_lowercase().contains(&needle)
}

/// Keep rows whose title or channel contains `term`, ignoring case.
#[must_use]
pub fn filter_by_search(mut videos: Vec<RankedVideo>, term: &str) -> Vec<RankedVideo> {
    if term.trim().is_empty() {
        return videos;
    }
    videos.retain(|video| matches_search(&video.record, term));
    videos
}

/// Most frequent tags across `videos`; ties keep first-encountered order.
#[must_use]
pub fn top_tags(videos: &[RankedVideo], limit: usize) -> Vec<TagCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();

    for tag in videos.iter().flat_map(|video| video.record.tag_list()) {
        if let Some(position) = positions.get(tag) {
            counts[*position].count += 1;
        } else {
            positions.insert(tag, counts.len());
            counts.push(TagCount { tag: tag.to_string(), count: 1 });
        }
    }

    counts.sort_by(|left, right| right.count.cmp(&left.count));
    counts.truncate(limit);
    counts
}

#[must_use]
pub fn top_by_firepower(videos: &[RankedVideo], limit: usize) -> Vec<FirepowerEntry> {
    let mut ranked = videos.iter().collect::<Vec<_>>();
    ranked.sort_by(|left, right| right.firepower.cmp(&left.firepower));
    ranked
        .into_iter()
        .take(limit)
        .map(|video| FirepowerEntry {
            title: video.record.title.clone(),
            firepower: video.firepower,
        })
        .collect()
}

/// Render an integer with `,` thousands separators.
#[must_use]
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[must_use]
pub fn normalize_model_name(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

/// Choose a generation model from the names the provider reports.
///
/// Preference order: the first `preferred` name that is available, then the first
/// available name in the known model family, then [`DEFAULT_MODEL`].
#[must_use]
pub fn select_model(available: &[String], preferred: &[&str]) -> String {
    let names = available.iter().map(|name| normalize_model_name(name)).collect::<Vec<_>>();

    if let Some(hit) = preferred.iter().find(|candidate| names.contains(*candidate)) {
        return (*hit).to_string();
    }

    if let Some(family) = names.iter().find(|name| name.starts_with(MODEL_FAMILY_PREFIX)) {
        return (*family).to_string();
    }

    DEFAULT_MODEL.to_string()
}

#[must_use]
pub fn build_summary_prompt(record: &VideoRecord) -> String {
    let tags = if record.tags.is_empty() { "(none)" } else { record.tags.as_str() };
    format!(
        "You are a data analyst who specializes in golf and sports video trends on YouTube.\n\
         Explain why the following video is popular right now.\n\n\
         Title: {title}\n\
         Channel: {channel}\n\
         Views: {views}\n\
         Likes: {likes}\n\
         Comments: {comments}\n\
         Tags: {tags}\n\n\
         Answer in {language} with exactly three bullet points using these labels:\n\
         - Hook: what makes people click\n\
         - Audience: who is watching and why\n\
         - Momentum: whether the popularity is likely to continue\n\
         Keep each bullet to one sentence.",
        title = record.title,
        channel = record.channel,
        views = format_grouped(record.view_count),
        likes = format_grouped(record.like_count),
        comments = format_grouped(record.comment_count),
        language = SUMMARY_LANGUAGE,
    )
}

/// The text stored in place of a summary when generation fails for one item.
#[must_use]
pub fn summary_failure_text(err: &impl Display) -> String {
    format!("{SUMMARY_FAILURE_PREFIX}: {err}")
}
