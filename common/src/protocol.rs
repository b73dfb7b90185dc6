use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 播放控制命令（由界面转发给同步器）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlaybackCommand {
    Play,
    Pause,
    TogglePlay,
    /// 定位到全局时间（秒）
    Seek { position: f64 },
    /// 相对定位，正数快进、负数快退
    SeekRelative { delta: f64 },
    /// 开始拖动进度条
    BeginScrub,
    /// 结束拖动进度条
    EndScrub,
    SetRate { rate: f64 },
    JumpToEvent,
    JumpToFootageEnd,
    NextFootage,
    PreviousFootage,
}

/// 传输状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// 未加载时间轴
    Idle,
    /// 已加载，等待摄像头就绪
    Loading,
    /// 就绪，已暂停
    Paused,
    /// 就绪，播放中
    Playing,
    /// 拖动定位中
    Seeking,
    /// 已播放到片段末尾
    EndOfClip,
}

/// 加载令牌
///
/// 每次切换片段源时递增，摄像头回调必须带回加载时的令牌，
/// 过期令牌的回调会被忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct LoadToken(pub u64);

impl LoadToken {
    pub fn next(self) -> Self {
        LoadToken(self.0.wrapping_add(1))
    }
}

/// 摄像头回调事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraEvent {
    pub camera: CameraPosition,
    pub token: LoadToken,
    pub kind: CameraEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraEventKind {
    /// 媒体可以播放
    CanPlay,
    /// 播放进度更新，position 为本地时间（秒）
    TimeUpdate { position: f64 },
    /// 定位完成
    Seeked { position: f64, ended: bool },
    /// 播放到媒体末尾
    Ended,
}

impl CameraEvent {
    pub fn new(camera: CameraPosition, token: LoadToken, kind: CameraEventKind) -> Self {
        Self { camera, token, kind }
    }
}

/// 播放状态快照（供界面渲染进度条和按钮）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: TransportState,
    pub current_footage_index: usize,
    pub global_time: f64,
    pub total_duration: f64,
    pub playback_rate: f64,
    pub is_playing: bool,
    pub is_seeking: bool,
    pub is_at_end_of_clip: bool,
    pub ended_cameras: BTreeSet<CameraPosition>,
    pub ready_cameras: BTreeSet<CameraPosition>,
}

impl PlaybackSnapshot {
    /// 进度百分比（0-100）
    pub fn progress_percent(&self) -> f64 {
        if self.total_duration > 0.0 {
            (self.global_time / self.total_duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

/// 片段导航状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootageNavigation {
    pub can_go_previous: bool,
    pub can_go_next: bool,
    /// 从1开始
    pub current_footage: usize,
    pub total_footages: usize,
    /// 当前片段进度（0-1）
    pub footage_progress: f64,
    /// 整体进度（0-1）
    pub clip_progress: f64,
}
