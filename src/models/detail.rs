use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::movie::deserialize_optional_date;
use super::{MoviePage, MovieSummary, VideoList};

/// 详情页展示的演员数量
pub const TOP_CAST_LIMIT: usize = 6;

/// 电影详情（附带演职人员、视频与相似电影）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<DetailGenre>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<VideoList>,
    #[serde(default)]
    pub similar: Option<MoviePage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailGenre {
    pub id: u32,
    pub name: String,
}

/// 演职人员
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

impl MovieDetails {
    /// 时长展示，例如 "2h 5m"
    pub fn runtime_display(&self) -> String {
        format_runtime(self.runtime)
    }

    pub fn budget_display(&self) -> String {
        format_budget(self.budget)
    }

    /// 排名靠前的演员
    pub fn top_cast(&self) -> &[CastMember] {
        match &self.credits {
            Some(credits) => &credits.cast[..credits.cast.len().min(TOP_CAST_LIMIT)],
            None => &[],
        }
    }

    pub fn directors(&self) -> Vec<&str> {
        self.credits
            .iter()
            .flat_map(|credits| credits.crew.iter())
            .filter(|member| member.job == "Director")
            .map(|member| member.name.as_str())
            .collect()
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|genre| genre.name.as_str()).collect()
    }

    pub fn similar_movies(&self) -> &[MovieSummary] {
        self.similar
            .as_ref()
            .and_then(|page| page.results.as_deref())
            .unwrap_or(&[])
    }
}

pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(minutes) if minutes > 0 => format!("{}h {}m", minutes / 60, minutes % 60),
        _ => "N/A".to_string(),
    }
}

/// 紧凑的美元金额，例如 "$150M"
pub fn format_budget(budget: u64) -> String {
    if budget == 0 {
        return "N/A".to_string();
    }
    let value = budget as f64;
    let (scaled, suffix) = if value >= 1e12 {
        (value / 1e12, "T")
    } else if value >= 1e9 {
        (value / 1e9, "B")
    } else if value >= 1e6 {
        (value / 1e6, "M")
    } else if value >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    format!("${}{}", scaled.round() as u64, suffix)
}
