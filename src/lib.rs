//! carousel-forge builds square Instagram carousels.
//!
//! The crate is organized around a [`SlideRecord`] list:
//!
//! - draft slides from a topic with a [`CarouselGenerator`]
//! - edit them through a [`SlideStore`] and persist a [`Snapshot`]
//! - compile each slide into a [`RenderPlan`] and rasterize it with [`CpuRenderer`]
//! - export PNGs or a ZIP bundle, from code, the `carousel` CLI or the HTTP [`router`]
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod generate;
pub(crate) mod render;
pub(crate) mod server;
pub(crate) mod slide;

pub use crate::foundation::core::{
    Affine, Canvas, MAX_RENDER_SCALE, Point, Rect, Rgba8, SLIDE_SIZE,
};
pub use crate::foundation::error::{CarouselError, CarouselResult};

pub use crate::assets::color::parse_css_color;
pub use crate::assets::decode::{
    PreparedImage, decode_data_uri, decode_image, decode_image_data_uri, encode_data_uri,
};
pub use crate::assets::text::{FontBook, FontSpec, TextLayoutEngine, TextMeasure};

pub use crate::config::{Config, GenerationConfig, PersistenceConfig, RenderConfig, ServerConfig};
pub use crate::export::{
    encode_png, export_slide, export_zip, png_data_uri, render_pngs, save_pngs, slide_file_name,
    write_pngs, zip_pngs,
};
pub use crate::generate::client::{HttpCompletionClient, TextCompletion};
pub use crate::generate::generator::CarouselGenerator;
pub use crate::generate::parse::parse_slides;
pub use crate::generate::prompt::build_prompt;
pub use crate::generate::request::{CarouselMode, CarouselRequest, MAX_SLIDE_COUNT};
pub use crate::render::cpu::{CpuRenderer, FrameRGBA};
pub use crate::render::filter::{FilterPreset, apply_filter_rgba8};
pub use crate::render::fit::{FitMode, Placement, place_image};
pub use crate::render::gradient::{
    GradientStop, LinearGradientSpec, gradient_line, parse_linear_gradient,
};
pub use crate::render::plan::{DrawOp, Paint, RenderPlan, TextLayer, compile_slide};
pub use crate::render::wrap::{SplitContent, split_hashtags, wrap_text};
pub use crate::server::{AppState, router, serve};
pub use crate::slide::model::{
    BackgroundType, Position, ResolvedBackground, SlidePatch, SlideRecord, TextAlign, TextStyle,
};
pub use crate::slide::persist::{PersistLimits, Snapshot, load_snapshot, save_snapshot};
pub use crate::slide::store::SlideStore;
pub use crate::slide::template::TemplateTag;
