use std::{
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::{
    assets::decode::encode_data_uri,
    foundation::error::{CarouselError, CarouselResult},
    render::cpu::{CpuRenderer, FrameRGBA},
    slide::model::SlideRecord,
};

/// Encode a straight-alpha frame as PNG.
pub fn encode_png(frame: &FrameRGBA) -> CarouselResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(CarouselError::render(format!(
            "frame byte len mismatch: expected {expected}, got {}",
            frame.data.len()
        )));
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| CarouselError::render("frame does not fit an RGBA image"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// `data:image/png;base64,...` URI for encoded PNG bytes.
pub fn png_data_uri(png: &[u8]) -> String {
    encode_data_uri("image/png", png)
}

/// File name of the slide at zero-based `index` inside exports.
pub fn slide_file_name(index: usize) -> String {
    format!("slide-{:02}.png", index + 1)
}

/// Render one slide to PNG bytes.
pub fn export_slide(renderer: &mut CpuRenderer, slide: &SlideRecord) -> CarouselResult<Vec<u8>> {
    let frame = renderer.render_slide(slide)?;
    encode_png(&frame)
}

/// Render every slide in order to PNG bytes.
///
/// The first slide that fails to render aborts the batch.
#[tracing::instrument(skip_all, fields(slides = slides.len()))]
pub fn render_pngs(
    renderer: &mut CpuRenderer,
    slides: &[SlideRecord],
) -> CarouselResult<Vec<Vec<u8>>> {
    slides
        .iter()
        .enumerate()
        .map(|(i, slide)| {
            export_slide(renderer, slide).inspect_err(|e| {
                tracing::warn!(index = i, slide = %slide.id, error = %e, "slide export failed");
            })
        })
        .collect()
}

/// Bundle already encoded PNGs into a ZIP archive named `slide-01.png, ...` in order.
pub fn zip_pngs(pngs: &[Vec<u8>]) -> CarouselResult<Vec<u8>> {
    if pngs.is_empty() {
        return Err(CarouselError::validation("no slides to export"));
    }
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (i, png) in pngs.iter().enumerate() {
        let name = slide_file_name(i);
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("start zip entry '{name}'"))?;
        zip.write_all(png)
            .with_context(|| format!("write zip entry '{name}'"))?;
    }

    let bytes = zip.finish().context("finish zip archive")?.into_inner();
    tracing::info!(entries = pngs.len(), bytes = bytes.len(), "exported carousel archive");
    Ok(bytes)
}

/// Render every slide in order and bundle the PNGs into a ZIP archive.
///
/// The first slide that fails to render aborts the export.
pub fn export_zip(renderer: &mut CpuRenderer, slides: &[SlideRecord]) -> CarouselResult<Vec<u8>> {
    if slides.is_empty() {
        return Err(CarouselError::validation("no slides to export"));
    }
    zip_pngs(&render_pngs(renderer, slides)?)
}

/// Write encoded PNGs as `slide-NN.png` files into `dir`, creating it if needed.
#[tracing::instrument(skip_all, fields(dir = %dir.display(), count = pngs.len()))]
pub fn save_pngs(pngs: &[Vec<u8>], dir: &Path) -> CarouselResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    let mut written = Vec::with_capacity(pngs.len());
    for (i, png) in pngs.iter().enumerate() {
        let path = dir.join(slide_file_name(i));
        std::fs::write(&path, png).with_context(|| format!("write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote slide png");
        written.push(path);
    }
    tracing::info!(count = written.len(), "wrote slide pngs");
    Ok(written)
}

/// Render every slide and write `slide-NN.png` files into `dir`.
pub fn write_pngs(
    renderer: &mut CpuRenderer,
    slides: &[SlideRecord],
    dir: &Path,
) -> CarouselResult<Vec<PathBuf>> {
    save_pngs(&render_pngs(renderer, slides)?, dir)
}
