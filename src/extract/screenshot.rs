use crate::config::ScreenshotConfig;
use crate::error::ScrapeError;
use crate::page::PageHandle;
use crate::results::ScreenshotResult;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Capture the viewport, crop and scale it, and encode it as base64 PNG
pub async fn capture<P: PageHandle + ?Sized>(
    page: &P,
    config: &ScreenshotConfig,
) -> Result<ScreenshotResult, ScrapeError> {
    let raw = page.screenshot_png().await?;
    let processed = process_png(&raw, config)?;
    ::log::debug!(
        "Screenshot captured: {} bytes raw, {} bytes processed",
        raw.len(),
        processed.len()
    );

    Ok(ScreenshotResult::png(STANDARD.encode(processed)))
}

/// Apply the configured crop and downscale to PNG bytes
pub fn process_png(png: &[u8], config: &ScreenshotConfig) -> Result<Vec<u8>, ScrapeError> {
    let mut img = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| ScrapeError::Screenshot(format!("failed to decode capture: {}", e)))?;

    if let Some(clip) = config.clip {
        let (width, height) = img.dimensions();
        let x = clip.x.min(width);
        let y = clip.y.min(height);
        let clip_width = clip.width.min(width - x);
        let clip_height = clip.height.min(height - y);
        if clip_width == 0 || clip_height == 0 {
            return Err(ScrapeError::Screenshot(format!(
                "crop region lies outside the {}x{} capture",
                width, height
            )));
        }
        img = img.crop_imm(x, y, clip_width, clip_height);
    }

    if config.scale < 1.0 {
        img = downscale(&img, config.scale);
    }

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| ScrapeError::Screenshot(format!("failed to encode capture: {}", e)))?;
    Ok(out)
}

fn downscale(img: &DynamicImage, scale: f32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let scaled = |dim: u32| ((dim as f32 * scale).round() as u32).max(1);
    img.resize_exact(scaled(width), scaled(height), FilterType::Triangle)
}
