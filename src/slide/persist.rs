use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::error::CarouselResult,
    slide::{
        model::{BackgroundType, SlideRecord},
        store::SlideStore,
    },
};

/// Size limits applied when writing a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PersistLimits {
    /// Slides kept when the snapshot is over budget.
    pub max_slides: usize,
    /// Serialized size budget in bytes.
    pub max_bytes: usize,
}

impl Default for PersistLimits {
    fn default() -> Self {
        Self {
            max_slides: 20,
            max_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Persisted editor state: the slide list (heavy fields elided) and the selected slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub slides: Vec<SlideRecord>,
    #[serde(default)]
    pub current_index: usize,
}

impl Snapshot {
    /// Capture `store`, dropping inline images and template-default gradients, then trimming to
    /// the newest slides if the result is larger than `limits.max_bytes`.
    pub fn capture(store: &SlideStore, limits: PersistLimits) -> CarouselResult<Self> {
        let mut snap = Self {
            slides: store.slides().iter().map(elide_heavy_fields).collect(),
            current_index: store.current_index(),
        };

        let size = serde_json::to_vec(&snap)?.len();
        if size > limits.max_bytes && snap.slides.len() > limits.max_slides {
            let dropped = snap.slides.len() - limits.max_slides;
            snap.slides.drain(..dropped);
            snap.current_index = snap
                .current_index
                .saturating_sub(dropped)
                .min(snap.slides.len().saturating_sub(1));
            tracing::warn!(
                size,
                budget = limits.max_bytes,
                dropped,
                "snapshot over budget, keeping newest slides only"
            );
        }
        Ok(snap)
    }

    /// Rebuild a store, restoring template-default gradients that were elided on save.
    pub fn restore(self) -> SlideStore {
        let slides = self
            .slides
            .into_iter()
            .map(|mut s| {
                if s.background_type == Some(BackgroundType::Gradient) && s.gradient.is_none() {
                    s.gradient = Some(s.template.default_gradient().to_string());
                }
                s
            })
            .collect();
        let mut store = SlideStore::from_slides(slides);
        store.set_current(self.current_index);
        store
    }
}

fn elide_heavy_fields(slide: &SlideRecord) -> SlideRecord {
    let mut s = slide.clone();
    // Pin the discriminator so inference does not change after fields go missing.
    s.background_type = Some(slide.background_type());

    if s
        .background_image
        .as_deref()
        .is_some_and(|v| v.trim_start().starts_with("data:"))
    {
        s.background_image = None;
    }
    if s.gradient.as_deref() == Some(s.template.default_gradient()) {
        s.gradient = None;
    }
    s
}

/// Write `store` to `path` as a JSON snapshot.
pub fn save_snapshot(path: &Path, store: &SlideStore, limits: PersistLimits) -> CarouselResult<()> {
    let snap = Snapshot::capture(store, limits)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create snapshot dir '{}'", parent.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(&snap)?;
    std::fs::write(path, bytes).with_context(|| format!("write snapshot '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), slides = snap.slides.len(), "saved snapshot");
    Ok(())
}

/// Load a snapshot from `path`. A missing file yields `Ok(None)`.
pub fn load_snapshot(path: &Path) -> CarouselResult<Option<SlideStore>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("read snapshot '{}'", path.display()))
                .into());
        }
    };
    let snap: Snapshot = serde_json::from_slice(&bytes)?;
    Ok(Some(snap.restore()))
}
