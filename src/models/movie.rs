use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// 海报图片基础地址
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// 无海报时的占位图
pub const POSTER_PLACEHOLDER: &str = "/No-Movie.png";

/// 图片尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W200,
    W500,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W200 => "w200",
            ImageSize::W500 => "w500",
            ImageSize::Original => "original",
        }
    }
}

/// 构建图片 URL
pub fn image_url(path: &str, size: ImageSize) -> String {
    format!("{}/{}/{}", IMAGE_BASE_URL, size.as_str(), path.trim_start_matches('/'))
}

/// 电影摘要（搜索、发现、榜单接口的结果项）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// 接口在未知日期时返回空字符串，统一视为 None
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

/// 评分档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTier {
    Excellent,
    Good,
    Mixed,
    Poor,
}

impl RatingTier {
    pub fn from_rating(rating: f32) -> Self {
        if rating >= 8.0 {
            RatingTier::Excellent
        } else if rating >= 6.0 {
            RatingTier::Good
        } else if rating >= 4.0 {
            RatingTier::Mixed
        } else {
            RatingTier::Poor
        }
    }
}

impl MovieSummary {
    /// 上映年份
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// 海报地址，无海报时返回占位图
    pub fn poster_url(&self, size: ImageSize) -> String {
        self.poster_path
            .as_deref()
            .map(|path| image_url(path, size))
            .unwrap_or_else(|| POSTER_PLACEHOLDER.to_string())
    }

    /// 评分展示文本，0 分视为暂无评分
    pub fn rating_display(&self) -> String {
        if self.vote_average > 0.0 {
            format!("{:.1}", self.vote_average)
        } else {
            "N/A".to_string()
        }
    }

    pub fn rating_tier(&self) -> RatingTier {
        RatingTier::from_rating(self.vote_average)
    }

    /// 上映日期展示文本，例如 "Mar 4, 2022"
    pub fn release_date_display(&self) -> String {
        self.release_date
            .map(|date| date.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// 列表类接口的响应体，`results` 缺失时为 None
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub results: Option<Vec<MovieSummary>>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u32>,
}

impl MoviePage {
    pub fn with_results(results: Vec<MovieSummary>) -> Self {
        Self {
            results: Some(results),
            ..Self::default()
        }
    }

    /// 结果列表，缺失视为空
    pub fn into_results(self) -> Vec<MovieSummary> {
        self.results.unwrap_or_default()
    }
}

pub(crate) fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()))
}
