use std::collections::HashSet;

use crate::slide::model::{SlidePatch, SlideRecord};

/// Ordered, in-memory list of slides with single-writer CRUD.
///
/// Every mutating operation returns the full updated list. Operations that would be invalid
/// (unknown id, deleting the last slide) are silent no-ops.
#[derive(Clone, Debug)]
pub struct SlideStore {
    slides: Vec<SlideRecord>,
    current_index: usize,
    next_id: u64,
}

impl Default for SlideStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideStore {
    /// Store holding a single blank slide.
    pub fn new() -> Self {
        let mut store = Self {
            slides: Vec::new(),
            current_index: 0,
            next_id: 1,
        };
        store.add_blank();
        store
    }

    /// Store holding `slides`; an empty input yields one blank slide.
    pub fn from_slides(slides: Vec<SlideRecord>) -> Self {
        let mut store = Self {
            slides: Vec::new(),
            current_index: 0,
            next_id: 1,
        };
        store.replace_all(slides);
        store
    }

    /// All slides in order.
    pub fn slides(&self) -> &[SlideRecord] {
        &self.slides
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always `false`; the store never drops below one slide.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Look up a slide by id.
    pub fn get(&self, id: &str) -> Option<&SlideRecord> {
        self.slides.iter().find(|s| s.id == id)
    }

    /// Index of the slide being edited.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Slide being edited.
    pub fn current(&self) -> Option<&SlideRecord> {
        self.slides.get(self.current_index)
    }

    /// Select the slide being edited, clamped into range.
    pub fn set_current(&mut self, index: usize) -> usize {
        self.current_index = index.min(self.slides.len().saturating_sub(1));
        self.current_index
    }

    /// Append a slide, assigning a fresh id when its id is empty or already taken.
    pub fn add(&mut self, mut slide: SlideRecord) -> &[SlideRecord] {
        if slide.id.trim().is_empty() || self.get(&slide.id).is_some() {
            slide.id = self.fresh_id();
        }
        self.slides.push(slide);
        &self.slides
    }

    /// Append a default slide.
    pub fn add_blank(&mut self) -> &[SlideRecord] {
        let n = self.slides.len() + 1;
        self.add(SlideRecord {
            title: format!("Slide {n}"),
            ..SlideRecord::default()
        })
    }

    /// Remove the slide with `id` unless it is the only one.
    pub fn delete(&mut self, id: &str) -> &[SlideRecord] {
        if self.slides.len() <= 1 {
            return &self.slides;
        }
        if let Some(pos) = self.position(id) {
            self.slides.remove(pos);
            if self.current_index > pos {
                self.current_index -= 1;
            }
            self.clamp_current();
        }
        &self.slides
    }

    /// Clone the slide with `id` right after itself, with a new id and `" (Copy)"` appended.
    pub fn duplicate(&mut self, id: &str) -> &[SlideRecord] {
        if let Some(pos) = self.position(id) {
            let mut copy = self.slides[pos].clone();
            copy.id = self.fresh_id();
            copy.title.push_str(" (Copy)");
            self.slides.insert(pos + 1, copy);
            if self.current_index > pos {
                self.current_index += 1;
            }
        }
        &self.slides
    }

    /// Merge `patch` into the slide with `id`.
    pub fn update(&mut self, id: &str, patch: SlidePatch) -> &[SlideRecord] {
        if let Some(pos) = self.position(id) {
            patch.apply_to(&mut self.slides[pos]);
        }
        &self.slides
    }

    /// Move the slide at `from` to index `to` (clamped). Out-of-range `from` is a no-op.
    pub fn move_slide(&mut self, from: usize, to: usize) -> &[SlideRecord] {
        if from >= self.slides.len() {
            return &self.slides;
        }
        let to = to.min(self.slides.len() - 1);
        let current_id = self.current().map(|s| s.id.clone());
        let slide = self.slides.remove(from);
        self.slides.insert(to, slide);
        if let Some(pos) = current_id.and_then(|id| self.position(&id)) {
            self.current_index = pos;
        }
        &self.slides
    }

    /// Replace the whole carousel. Ids are kept where unique and reassigned otherwise.
    pub fn replace_all(&mut self, slides: Vec<SlideRecord>) -> &[SlideRecord] {
        self.slides.clear();
        self.current_index = 0;

        let mut seen = HashSet::new();
        let mut pending = Vec::with_capacity(slides.len());
        for slide in slides {
            let keep = !slide.id.trim().is_empty() && seen.insert(slide.id.clone());
            pending.push((keep, slide));
        }
        for (_, slide) in pending.iter().filter(|(keep, _)| *keep) {
            self.bump_next_id(&slide.id);
        }
        for (keep, mut slide) in pending {
            if !keep {
                slide.id = self.fresh_id();
            }
            self.slides.push(slide);
        }

        if self.slides.is_empty() {
            self.add_blank();
        }
        &self.slides
    }

    /// Consume the store, returning its slides.
    pub fn into_slides(self) -> Vec<SlideRecord> {
        self.slides
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }

    fn clamp_current(&mut self) {
        self.current_index = self
            .current_index
            .min(self.slides.len().saturating_sub(1));
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = format!("slide-{}", self.next_id);
            self.next_id += 1;
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Keep generated ids ahead of ids that follow the `slide-N` pattern.
    fn bump_next_id(&mut self, id: &str) {
        if let Some(n) = id.strip_prefix("slide-").and_then(|n| n.parse::<u64>().ok()) {
            self.next_id = self.next_id.max(n.saturating_add(1));
        }
    }
}
