use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 电影类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: &'static str,
}

/// 固定的类型目录（与元数据 API 的类型 ID 一致）
pub const GENRES: [Genre; 19] = [
    Genre { id: 28, name: "Action" },
    Genre { id: 12, name: "Adventure" },
    Genre { id: 16, name: "Animation" },
    Genre { id: 35, name: "Comedy" },
    Genre { id: 80, name: "Crime" },
    Genre { id: 99, name: "Documentary" },
    Genre { id: 18, name: "Drama" },
    Genre { id: 10751, name: "Family" },
    Genre { id: 14, name: "Fantasy" },
    Genre { id: 36, name: "History" },
    Genre { id: 27, name: "Horror" },
    Genre { id: 10402, name: "Music" },
    Genre { id: 9648, name: "Mystery" },
    Genre { id: 10749, name: "Romance" },
    Genre { id: 878, name: "Science Fiction" },
    Genre { id: 10770, name: "TV Movie" },
    Genre { id: 53, name: "Thriller" },
    Genre { id: 10752, name: "War" },
    Genre { id: 37, name: "Western" },
];

/// 按 ID 查找类型
pub fn genre_by_id(id: u32) -> Option<&'static Genre> {
    GENRES.iter().find(|genre| genre.id == id)
}

/// 排序选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    PopularityDesc,
    RatingDesc,
    ReleaseDesc,
    ReleaseAsc,
    TitleAsc,
    TitleDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::PopularityDesc,
        SortKey::RatingDesc,
        SortKey::ReleaseDesc,
        SortKey::ReleaseAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
    ];

    /// 发现接口的 `sort_by` 参数值
    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity.desc",
            SortKey::RatingDesc => "vote_average.desc",
            SortKey::ReleaseDesc => "release_date.desc",
            SortKey::ReleaseAsc => "release_date.asc",
            SortKey::TitleAsc => "title.asc",
            SortKey::TitleDesc => "title.desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "Most Popular",
            SortKey::RatingDesc => "Highest Rated",
            SortKey::ReleaseDesc => "Newest First",
            SortKey::ReleaseAsc => "Oldest First",
            SortKey::TitleAsc => "A-Z",
            SortKey::TitleDesc => "Z-A",
        }
    }

    fn as_name(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity_desc",
            SortKey::RatingDesc => "rating_desc",
            SortKey::ReleaseDesc => "release_desc",
            SortKey::ReleaseAsc => "release_asc",
            SortKey::TitleAsc => "title_asc",
            SortKey::TitleDesc => "title_desc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// 同时接受枚举名（`rating_desc`）和接口参数（`vote_average.desc`）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        SortKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_name() == needle || key.as_param() == needle)
            .ok_or_else(|| format!("unknown sort key '{}'", s.trim()))
    }
}

/// 展示模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode '{}'", other)),
        }
    }
}

/// 筛选状态，仅由用户操作修改
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub search_text: String,
    /// 按选择顺序排列，不含重复
    pub selected_genre_ids: Vec<u32>,
    pub sort_key: SortKey,
    pub view_mode: ViewMode,
}

impl FilterState {
    /// 切换类型选择：已选则移除，否则追加到末尾
    pub fn toggle_genre(&mut self, genre_id: u32) {
        if let Some(pos) = self.selected_genre_ids.iter().position(|id| *id == genre_id) {
            self.selected_genre_ids.remove(pos);
        } else {
            self.selected_genre_ids.push(genre_id);
        }
    }

    pub fn is_genre_selected(&self, genre_id: u32) -> bool {
        self.selected_genre_ids.contains(&genre_id)
    }

    /// 逗号拼接的类型列表，未选择时为 None
    pub fn genre_csv(&self) -> Option<String> {
        if self.selected_genre_ids.is_empty() {
            return None;
        }
        Some(
            self.selected_genre_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// 重置为默认值
    pub fn clear(&mut self) {
        *self = FilterState::default();
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_text.is_empty() || !self.selected_genre_ids.is_empty() || self.sort_key != SortKey::default()
    }
}
