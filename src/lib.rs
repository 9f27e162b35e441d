// 电影发现库
//
// 本库提供电影发现界面的核心功能，包括：
// - 防抖的查询管道（搜索、类型、排序）
// - 榜单、详情与预告片查找
// - 本地模拟登录与会话存储
// - 搜索统计

pub mod analytics;
pub mod app;
pub mod config;
pub mod console;
pub mod database;
pub mod error;
pub mod external;
pub mod models;
pub mod pipeline;
pub mod session;

pub use error::{DiscoveryError, Result};
