// 行车记录仪文件名约定
//
// 文件名格式: YYYY-MM-DD_HH-MM-SS-<camera>.<ext>
// 例如: 2024-06-19_16-43-35-front.mp4
//
// 文件夹名（SavedClips/SentryClips 下的片段目录）只包含时间戳部分。

use chrono::NaiveDateTime;

use crate::error::FilenameError;
use crate::types::CameraPosition;

/// 时间戳前缀长度（YYYY-MM-DD_HH-MM-SS）
pub const TIMESTAMP_KEY_LEN: usize = 19;

/// chrono 格式串
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// 解析后的文件名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    /// 时间戳原文，例如 2024-06-19_16-43-35
    pub timestamp_key: String,
    /// 解析后的本地时间
    pub timestamp: NaiveDateTime,
    /// 摄像头后缀原文（不含扩展名）
    pub camera_label: Option<String>,
    /// 已知摄像头位置
    pub camera: Option<CameraPosition>,
    /// 扩展名（小写）
    pub extension: Option<String>,
}

/// 解析完整文件名
pub fn parse(name: &str) -> Result<ParsedFilename, FilenameError> {
    let (timestamp_key, timestamp) = parse_timestamp_prefix(name)?;

    let rest = &name[TIMESTAMP_KEY_LEN..];
    let (camera_label, extension) = match rest.strip_prefix('-') {
        Some(tail) => match tail.rsplit_once('.') {
            Some((stem, ext)) => (Some(stem.to_string()), Some(ext.to_lowercase())),
            None => (Some(tail.to_string()), None),
        },
        None => (None, rest.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())),
    };
    // 后缀大小写不敏感，与 is_dashcam_video 一致
    let camera = camera_label
        .as_deref()
        .and_then(|label| CameraPosition::from_label(&label.to_lowercase()));

    Ok(ParsedFilename {
        timestamp_key: timestamp_key.to_string(),
        timestamp,
        camera_label: camera_label.filter(|label| !label.is_empty()),
        camera,
        extension,
    })
}

/// 解析文件名开头的时间戳
pub fn parse_timestamp_prefix(name: &str) -> Result<(&str, NaiveDateTime), FilenameError> {
    let prefix = name
        .get(..TIMESTAMP_KEY_LEN)
        .filter(|prefix| has_timestamp_shape(prefix))
        .ok_or_else(|| FilenameError::MissingTimestamp {
            name: name.to_string(),
        })?;

    let timestamp = NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT).map_err(|_| {
        FilenameError::InvalidDate {
            name: name.to_string(),
        }
    })?;

    Ok((prefix, timestamp))
}

/// 解析片段文件夹名，必须完全等于时间戳
pub fn parse_folder_timestamp(folder_name: &str) -> Option<NaiveDateTime> {
    if folder_name.len() != TIMESTAMP_KEY_LEN {
        return None;
    }
    parse_timestamp_prefix(folder_name).ok().map(|(_, ts)| ts)
}

/// 宽松匹配: 以时间戳开头、紧跟 '-'、扩展名为 mp4
pub fn is_dashcam_video(name: &str) -> bool {
    let lower = name.to_lowercase();
    if !lower.ends_with(".mp4") {
        return false;
    }
    lower
        .get(..TIMESTAMP_KEY_LEN)
        .map(has_timestamp_shape)
        .unwrap_or(false)
        && lower.as_bytes().get(TIMESTAMP_KEY_LEN) == Some(&b'-')
}

/// 严格匹配: 已知摄像头后缀且扩展名为 mp4
pub fn is_strict_dashcam_video(name: &str) -> bool {
    match parse(name) {
        Ok(parsed) => parsed.camera.is_some() && parsed.extension.as_deref() == Some("mp4"),
        Err(_) => false,
    }
}

fn has_timestamp_shape(prefix: &str) -> bool {
    let bytes = prefix.as_bytes();
    if bytes.len() != TIMESTAMP_KEY_LEN {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 | 13 | 16 => *b == b'-',
        10 => *b == b'_',
        _ => b.is_ascii_digit(),
    })
}
