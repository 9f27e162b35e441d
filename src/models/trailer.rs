use serde::{Deserialize, Serialize};

/// 预告片目标平台
pub const TRAILER_SITE: &str = "YouTube";
/// 预告片类型标签
pub const TRAILER_TYPE: &str = "Trailer";

/// 预告片来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailerSource {
    /// 元数据目录自带的视频列表
    PrimaryCatalog,
    /// 视频搜索接口
    VideoSearch,
}

/// 预告片候选项，仅在一次查看会话内有效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailerCandidate {
    /// 外部视频 ID
    pub id: String,
    pub title: String,
    pub source: TrailerSource,
    pub thumbnail_url: String,
}

impl TrailerCandidate {
    /// 内嵌播放地址
    pub fn embed_url(&self) -> String {
        format!(
            "https://www.youtube.com/embed/{}?autoplay=1&rel=0&modestbranding=1",
            self.id
        )
    }
}

/// 由视频 ID 推导的缩略图地址
pub fn thumbnail_for(video_key: &str) -> String {
    format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_key)
}

/// 目录视频列表中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogVideo {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(default, rename = "type")]
    pub video_type: String,
}

impl CatalogVideo {
    /// 是否为目标平台上的正式预告片
    pub fn is_trailer(&self) -> bool {
        self.site == TRAILER_SITE && self.video_type == TRAILER_TYPE
    }

    pub fn to_candidate(&self) -> TrailerCandidate {
        TrailerCandidate {
            id: self.key.clone(),
            title: self.name.clone(),
            source: TrailerSource::PrimaryCatalog,
            thumbnail_url: thumbnail_for(&self.key),
        }
    }
}

/// 视频列表响应体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<CatalogVideo>,
}
