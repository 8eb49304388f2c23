//! Engagement metrics derived from a [`RawProfile`].
//!
//! Pure computation: no I/O, deterministic for a given record.

use serde::Serialize;

use crate::error::ScraperError;
use crate::types::{MediaNode, RawProfile};

/// Number of most-recent posts that feed the averages.
pub const MAX_POSTS_ANALYZED: usize = 12;

const POST_URL_BASE: &str = "https://www.instagram.com/p/";

/// One recent post as written to the result sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSample {
    pub url: String,
    pub likes: u64,
    pub comments: u64,
    /// Only set for video posts.
    pub video_views: Option<u64>,
    pub caption: String,
    #[serde(rename = "thumbnail_src")]
    pub thumbnail_url: Option<String>,
}

/// Derived metrics for one profile. Serialized as one sink record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMetrics {
    pub username: String,
    pub followers: u64,
    pub following: u64,
    #[serde(rename = "profile_pic_url_hd")]
    pub profile_pic_url: Option<String>,
    pub biography: Option<String>,
    pub external_url: Option<String>,
    pub business_email: Option<String>,
    #[serde(rename = "business_phone_number")]
    pub business_phone: Option<String>,
    pub category_name: Option<String>,
    pub posts_analyzed: u64,
    pub avg_likes: u64,
    pub avg_comments: u64,
    pub avg_video_views: u64,
    pub engagement_rate_pct: f64,
    pub recent_posts: Vec<PostSample>,
    /// Always `None` on a computed record; records with an error never reach the sink.
    pub error: Option<String>,
}

/// Computes [`ProfileMetrics`] from the first [`MAX_POSTS_ANALYZED`] posts.
///
/// Averages are floored. `avg_video_views` divides by the number of video
/// posts, while the engagement rate divides the combined like, comment and
/// view total by every analyzed post. With zero posts the divisor is 1; with
/// zero followers the rate is 0.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedProfile`] if the record has no user object.
pub fn compute_metrics(raw: &RawProfile) -> Result<ProfileMetrics, ScraperError> {
    let user = raw
        .user
        .as_ref()
        .ok_or_else(|| ScraperError::MalformedProfile {
            username: raw.username.clone(),
        })?;

    let followers = user.edge_followed_by.value();
    let following = user.edge_follow.value();

    let mut total_likes: u64 = 0;
    let mut total_comments: u64 = 0;
    let mut total_video_views: u64 = 0;
    let mut video_post_count: u64 = 0;
    let mut recent_posts = Vec::new();

    for edge in user
        .edge_owner_to_timeline_media
        .edges
        .iter()
        .take(MAX_POSTS_ANALYZED)
    {
        let post = post_sample(&edge.node);
        total_likes = total_likes.saturating_add(post.likes);
        total_comments = total_comments.saturating_add(post.comments);
        if let Some(views) = post.video_views {
            total_video_views = total_video_views.saturating_add(views);
            video_post_count += 1;
        }
        recent_posts.push(post);
    }

    let n_posts = (recent_posts.len() as u64).max(1);
    let avg_video_views = if video_post_count > 0 {
        total_video_views / video_post_count
    } else {
        0
    };

    let engagement_total = total_likes
        .saturating_add(total_comments)
        .saturating_add(total_video_views);

    Ok(ProfileMetrics {
        username: raw.username.clone(),
        followers,
        following,
        profile_pic_url: user.profile_pic_url_hd.clone(),
        biography: user.biography.clone(),
        external_url: user.external_url.clone(),
        business_email: user.business_email.clone(),
        business_phone: user.business_phone_number.clone(),
        category_name: user.category_name.clone(),
        posts_analyzed: n_posts,
        avg_likes: total_likes / n_posts,
        avg_comments: total_comments / n_posts,
        avg_video_views,
        engagement_rate_pct: engagement_rate_pct(engagement_total, n_posts, followers),
        recent_posts,
        error: None,
    })
}

#[allow(clippy::cast_precision_loss)]
fn engagement_rate_pct(engagement_total: u64, n_posts: u64, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    let avg_engagement = engagement_total as f64 / n_posts as f64;
    round_2dp(avg_engagement / followers as f64 * 100.0)
}

/// Two decimals, exact halves to even.
fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn post_sample(node: &MediaNode) -> PostSample {
    let video_views = node
        .is_video
        .then(|| node.video_view_count.unwrap_or(0));
    PostSample {
        url: format!(
            "{POST_URL_BASE}{}/",
            node.shortcode.as_deref().unwrap_or_default()
        ),
        likes: node.edge_liked_by.value(),
        comments: node.edge_media_to_comment.value(),
        video_views,
        caption: node.caption().to_owned(),
        thumbnail_url: node.thumbnail_src.clone(),
    }
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
