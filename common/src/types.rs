use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::filename;

/// 摄像头位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPosition {
    Front,
    Back,
    LeftRepeater,
    RightRepeater,
}

impl CameraPosition {
    /// 完整片段应包含的全部摄像头
    pub const ALL: [CameraPosition; 4] = [
        CameraPosition::Front,
        CameraPosition::Back,
        CameraPosition::LeftRepeater,
        CameraPosition::RightRepeater,
    ];

    /// 文件名中的后缀
    pub fn label(&self) -> &'static str {
        match self {
            CameraPosition::Front => "front",
            CameraPosition::Back => "back",
            CameraPosition::LeftRepeater => "left_repeater",
            CameraPosition::RightRepeater => "right_repeater",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "front" => Some(CameraPosition::Front),
            "back" => Some(CameraPosition::Back),
            "left_repeater" => Some(CameraPosition::LeftRepeater),
            "right_repeater" => Some(CameraPosition::RightRepeater),
            _ => None,
        }
    }

    /// 界面显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            CameraPosition::Front => "FRONT",
            CameraPosition::Back => "REAR",
            CameraPosition::LeftRepeater => "LEFT",
            CameraPosition::RightRepeater => "RIGHT",
        }
    }

    /// 布局中的排列顺序（从1开始）
    pub fn layout_order(&self) -> u8 {
        match self {
            CameraPosition::Front => 1,
            CameraPosition::Back => 2,
            CameraPosition::LeftRepeater => 3,
            CameraPosition::RightRepeater => 4,
        }
    }
}

impl fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 原始媒体文件
///
/// 由外部采集/探测组件生成，创建后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMediaFile {
    pub name: String,
    /// 文件名中的时间戳原文，无法解析时为 None
    pub timestamp_key: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    /// 摄像头后缀原文
    pub camera_label: Option<String>,
    /// 已识别的摄像头位置
    pub camera: Option<CameraPosition>,
    pub size_bytes: u64,
    /// 探测到的媒体时长（秒）
    pub duration: f64,
    /// 可播放句柄（本地路径或URL）
    pub source: PathBuf,
}

impl RawMediaFile {
    pub fn new(
        name: impl Into<String>,
        size_bytes: u64,
        duration: f64,
        source: impl Into<PathBuf>,
    ) -> Self {
        let name = name.into();
        let parsed = filename::parse(&name).ok();
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };

        Self {
            timestamp_key: parsed.as_ref().map(|p| p.timestamp_key.clone()),
            timestamp: parsed.as_ref().map(|p| p.timestamp),
            camera_label: parsed.as_ref().and_then(|p| p.camera_label.clone()),
            camera: parsed.as_ref().and_then(|p| p.camera),
            name,
            size_bytes,
            duration,
            source: source.into(),
        }
    }

    /// 是否为行车记录仪视频文件
    pub fn is_video(&self) -> bool {
        filename::is_dashcam_video(&self.name)
    }

    /// 是否为 event.json
    pub fn is_event_file(&self) -> bool {
        self.name.eq_ignore_ascii_case("event.json")
    }

    /// 是否为缩略图 thumb.png
    pub fn is_thumbnail(&self) -> bool {
        self.name.eq_ignore_ascii_case("thumb.png")
    }
}

/// 片段事件元数据（event.json，可选）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipEvent {
    /// ISO 格式: "2025-09-27T23:10:29"
    pub timestamp: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub est_lat: String,
    #[serde(default)]
    pub est_lon: String,
    /// 例如 "user_interaction_dashcam_multifunction_selected"
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub camera: String,
}

impl ClipEvent {
    /// 解析事件时间
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
    }

    /// 事件原因的可读文本
    pub fn reason_text(&self) -> String {
        self.reason.replace('_', " ")
    }
}

/// 片段库分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipCategory {
    Recent,
    Saved,
    Sentry,
}

impl ClipCategory {
    pub const ALL: [ClipCategory; 3] = [ClipCategory::Recent, ClipCategory::Saved, ClipCategory::Sentry];

    /// U盘根目录下的目录名
    pub fn directory_name(&self) -> &'static str {
        match self {
            ClipCategory::Recent => "RecentClips",
            ClipCategory::Saved => "SavedClips",
            ClipCategory::Sentry => "SentryClips",
        }
    }

    /// RecentClips 下直接存放文件，其余分类每个子目录为一个片段
    pub fn is_folder_based(&self) -> bool {
        !matches!(self, ClipCategory::Recent)
    }
}

impl fmt::Display for ClipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClipCategory::Recent => "recent",
            ClipCategory::Saved => "saved",
            ClipCategory::Sentry => "sentry",
        };
        f.write_str(name)
    }
}
