//! 検査写真の受付
//!
//! 写真の存在・形式・ヘッダーのみ確認する。ピクセルは読まない。

mod exif;

use crate::error::{Result, SkinAiError};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// 撮影日時（EXIF）
    pub date: Option<String>,
}

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub fn is_photo_extension(ext: &str) -> bool {
    PHOTO_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

pub fn inspect_photo(path: &Path) -> Result<PhotoInfo> {
    if !path.is_file() {
        return Err(SkinAiError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    if !is_photo_extension(&ext) {
        return Err(SkinAiError::UnsupportedPhoto(path.display().to_string()));
    }

    let (width, height) = image::image_dimensions(path)
        .map_err(|e| SkinAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let date = exif::extract_date(path);
    tracing::debug!(file = %file_name, width, height, date = ?date, "photo accepted");

    Ok(PhotoInfo {
        path: path.to_path_buf(),
        file_name,
        width,
        height,
        date,
    })
}
