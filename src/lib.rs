//! Slideshot
//!
//! Splits an HTML presentation into one PNG per slide. Slides are found with
//! a heuristic scan of the document, rendered through a headless browser and
//! finally letterboxed onto a common canvas so every image has the same size.
//!
//! # Features
//!
//! - **CDP Backend** (default): renders through headless Chrome
//! - **Detector**: class names, data attributes and semantic tags, ranked by
//!   confidence
//! - **Normalizer**: aspect-preserving scale, centered on a solid background
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # fn main() -> slideshot::Result<()> {
//! use slideshot::{ConvertConfig, Converter, Renderer, Selection};
//!
//! let converter = Converter::new(ConvertConfig::default());
//! let prepared = converter.prepare("deck.html".as_ref(), Selection::AcceptAll)?;
//!
//! let viewport = prepared.viewport(&converter.config);
//! let mut renderer = slideshot::cdp::CdpRenderer::launch(&converter.config, viewport)?;
//! let conversion = converter.render(&prepared, &mut renderer)?;
//! renderer.close()?;
//!
//! for file in &conversion.files {
//!     println!("{}", file.display());
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "cdp"))]
//! # fn main() {}
//! ```

use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod confirm;
pub mod convert;
pub mod detect;
pub mod normalize;
pub mod staging;

#[cfg(feature = "cdp")]
pub mod cdp;

pub use confirm::{parse_choice, prompt_for_selectors, Choice};
pub use convert::{output_filename, resolve_input, Conversion, Converter, Prepared, RenderPlan, Selection};
pub use detect::{BreakCandidate, BreakDetector, Confidence, ElementHandle};
pub use normalize::{normalize, Background};

/// Configuration for a conversion run
///
/// The defaults match a 1080p slide deck rendered on a dark background.
///
/// # Examples
///
/// ```
/// let cfg = slideshot::ConvertConfig::default();
/// assert_eq!(cfg.viewport.width, 1920);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Window size used when rendering individual sections
    pub viewport: Viewport,
    /// Window size used when the whole document is rendered as one image
    pub document_viewport: Viewport,
    /// Navigation timeout in milliseconds
    pub timeout_ms: u64,
    /// Wait after navigation for fonts and images, in milliseconds
    pub settle_ms: u64,
    /// Wait after the reveal script for CSS transitions, in milliseconds
    pub transition_ms: u64,
    /// Padding color for normalized images
    pub background: Background,
    /// Where `<name>_NN.png` files are written
    pub output_dir: PathBuf,
    /// Directory searched first for relative input paths
    pub source_dir: PathBuf,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            document_viewport: Viewport {
                width: 2560,
                height: 1440,
            },
            timeout_ms: 30000,
            settle_ms: 1000,
            transition_ms: 500,
            background: Background::default(),
            output_dir: PathBuf::from("files").join("output"),
            source_dir: PathBuf::from("files").join("source"),
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Backend that turns HTML into PNG files
///
/// Implementations own whatever browser resources they need and must release
/// them in [`Renderer::close`] or on drop, even after a failed render.
pub trait Renderer {
    /// Render the whole document at `source` as one full-page image
    fn render_document(&mut self, source: &Path, output: &Path) -> Result<()>;

    /// Render a staged single-section page as one full-page image
    fn render_section(&mut self, staged_html: &str, output: &Path) -> Result<()>;

    /// Release the backend
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
