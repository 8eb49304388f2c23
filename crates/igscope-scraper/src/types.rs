//! Response types for the public `web_profile_info` endpoint.
//!
//! ## Observed shape
//!
//! ```text
//! { "data": { "user": {
//!     "edge_followed_by": { "count": 1234 },
//!     "edge_follow": { "count": 56 },
//!     "profile_pic_url_hd": "...", "biography": "...", ...,
//!     "edge_owner_to_timeline_media": { "edges": [ { "node": { ... } } ] }
//! } }, "status": "ok" }
//! ```
//!
//! ### Missing profiles
//! Nonexistent and private profiles still answer 200. `data.user` is then
//! `null`, absent, or occasionally an empty object; all three mean the
//! profile is unavailable.
//!
//! ### Counts
//! `count` fields are normally integers but have been seen as `null` on
//! restricted accounts. They are modelled as `Option<u64>` and read as 0.
//!
//! ### Video views
//! `video_view_count` is only meaningful when `is_video` is `true`. Image
//! posts may carry the field anyway; it is ignored for them.

use serde::Deserialize;

use crate::error::ScraperError;

/// Top-level envelope from `GET /api/v1/users/web_profile_info/`.
#[derive(Debug, Deserialize)]
pub struct WebProfileResponse {
    #[serde(default)]
    pub data: Option<WebProfileData>,
}

#[derive(Debug, Deserialize)]
pub struct WebProfileData {
    /// Kept untyped so `null` and `{}` can both be recognised as "no user".
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

impl WebProfileResponse {
    /// Extracts the user object for `username`.
    ///
    /// Returns `Ok(None)` when the profile is missing or private.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Deserialize`] if a user object is present but
    /// does not match [`ProfileUser`].
    pub fn into_user(self, username: &str) -> Result<Option<ProfileUser>, ScraperError> {
        let Some(value) = self.data.and_then(|d| d.user) else {
            return Ok(None);
        };
        let is_empty = match &value {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ScraperError::Deserialize {
                context: format!("web_profile_info user for {username}"),
                source: e,
            })
    }
}

/// `{ "count": N }` wrapper used for follower, like and comment counters.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct EdgeCount {
    #[serde(default)]
    pub count: Option<u64>,
}

impl EdgeCount {
    #[must_use]
    pub fn value(self) -> u64 {
        self.count.unwrap_or(0)
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfileUser {
    #[serde(default)]
    pub edge_followed_by: EdgeCount,
    #[serde(default)]
    pub edge_follow: EdgeCount,
    #[serde(default)]
    pub profile_pic_url_hd: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub business_email: Option<String>,
    #[serde(default)]
    pub business_phone_number: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub edge_owner_to_timeline_media: TimelineMedia,
}

/// Timeline posts, most recent first.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TimelineMedia {
    #[serde(default)]
    pub edges: Vec<MediaEdge>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MediaEdge {
    #[serde(default)]
    pub node: MediaNode,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MediaNode {
    #[serde(default)]
    pub shortcode: Option<String>,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub video_view_count: Option<u64>,
    #[serde(default)]
    pub edge_liked_by: EdgeCount,
    #[serde(default)]
    pub edge_media_to_comment: EdgeCount,
    #[serde(default)]
    pub edge_media_to_caption: CaptionEdges,
    #[serde(default)]
    pub thumbnail_src: Option<String>,
}

impl MediaNode {
    /// Text of the first caption edge, or `""` when the post has no caption.
    #[must_use]
    pub fn caption(&self) -> &str {
        self.edge_media_to_caption
            .edges
            .first()
            .map_or("", |edge| edge.node.text.as_str())
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CaptionEdges {
    #[serde(default)]
    pub edges: Vec<CaptionEdge>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CaptionEdge {
    #[serde(default)]
    pub node: CaptionNode,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CaptionNode {
    #[serde(default)]
    pub text: String,
}

/// One username's profile record as returned by the endpoint.
///
/// `user` is `None` only when built by hand; the fetcher reports a missing
/// user as [`ScraperError::ProfileUnavailable`] instead of returning one.
#[derive(Debug, Clone)]
pub struct RawProfile {
    pub username: String,
    pub user: Option<ProfileUser>,
}
