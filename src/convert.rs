//! Conversion pipeline: input resolution, break selection, rendering loop
//! and normalization.

use crate::confirm::prompt_for_selectors;
use crate::detect::BreakDetector;
use crate::normalize::{image_dimensions, normalize};
use crate::staging::stage_section;
use crate::{ConvertConfig, Error, Renderer, Result, Viewport};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// How break selectors are obtained for a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Use these selectors as given; an empty list means a single image
    Explicit(Vec<String>),
    /// Detect breaks and ask the user to confirm them
    Interactive,
    /// Detect breaks and use all of them
    AcceptAll,
    /// Render the whole document as one image
    NoBreaks,
}

/// What the renderer has to produce, in output order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPlan {
    /// One full-page image of the source document
    FullDocument,
    /// One staged page per section
    Sections(Vec<String>),
}

impl RenderPlan {
    pub fn len(&self) -> usize {
        match self {
            RenderPlan::FullDocument => 1,
            RenderPlan::Sections(pages) => pages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A document ready to be rendered
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Absolute path of the source document
    pub input: PathBuf,
    /// File stem used to name outputs
    pub base_name: String,
    pub output_dir: PathBuf,
    pub plan: RenderPlan,
}

impl Prepared {
    /// Window size the renderer should be launched with for this plan
    pub fn viewport(&self, config: &ConvertConfig) -> Viewport {
        match self.plan {
            RenderPlan::FullDocument => config.document_viewport,
            RenderPlan::Sections(_) => config.viewport,
        }
    }
}

/// Outcome of a conversion run
#[derive(Debug, Clone)]
pub struct Conversion {
    pub output_dir: PathBuf,
    /// Written images, in render order
    pub files: Vec<PathBuf>,
    /// Common canvas size, when the batch was normalized
    pub canvas: Option<(u32, u32)>,
}

/// `<base>_<NN>.png`, 1-based and zero-padded to two digits
pub fn output_filename(base_name: &str, index: usize) -> String {
    format!("{}_{:02}.png", base_name, index)
}

/// Locate the input document.
///
/// Relative paths are looked up in `source_dir` first, then as given.
pub fn resolve_input(path: &Path, source_dir: &Path) -> Result<PathBuf> {
    if path.is_relative() {
        let candidate = source_dir.join(path);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    Err(Error::NotFound(path.to_path_buf()))
}

/// Create the output directory (and parents) if needed
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

/// Drives one HTML document through detection, rendering and normalization
pub struct Converter {
    pub config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// Prepare a conversion, prompting on stdin/stdout when `selection` is
    /// [`Selection::Interactive`].
    pub fn prepare(&self, input: &Path, selection: Selection) -> Result<Prepared> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.prepare_with(input, selection, &mut stdin.lock(), &mut stdout)
    }

    /// Prepare a conversion, using `prompt_in`/`prompt_out` for confirmation
    pub fn prepare_with<R: BufRead, W: Write>(
        &self,
        input: &Path,
        selection: Selection,
        prompt_in: &mut R,
        prompt_out: &mut W,
    ) -> Result<Prepared> {
        let input = fs::canonicalize(resolve_input(input, &self.config.source_dir)?)?;
        let html = fs::read_to_string(&input)?;
        let detector = BreakDetector::new(&html);
        if let Some(title) = detector.title() {
            debug!("Loaded '{}' from {}", title, input.display());
        }

        let selectors = match selection {
            Selection::Explicit(selectors) => selectors,
            Selection::NoBreaks => Vec::new(),
            Selection::AcceptAll => detector.detect().into_iter().map(|c| c.selector).collect(),
            Selection::Interactive => {
                let candidates = detector.detect();
                prompt_for_selectors(&detector, &candidates, prompt_in, prompt_out)?
            }
        };

        let plan = self.plan(&input, &detector, &selectors);
        let base_name = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        Ok(Prepared {
            input,
            base_name,
            output_dir: ensure_output_dir(&self.config.output_dir)?,
            plan,
        })
    }

    fn plan(&self, input: &Path, detector: &BreakDetector, selectors: &[String]) -> RenderPlan {
        if selectors.is_empty() {
            info!("No break points selected, rendering entire document as a single image");
            return RenderPlan::FullDocument;
        }

        let elements = detector.select(selectors);
        if elements.is_empty() {
            warn!("No elements found with selectors: {:?}", selectors);
            return RenderPlan::FullDocument;
        }

        let base_href = input
            .parent()
            .and_then(|dir| url::Url::from_directory_path(dir).ok())
            .map(|u| u.to_string());

        let pages = elements
            .into_iter()
            .filter_map(|handle| detector.outer_html(handle))
            .map(|section| stage_section(detector.document(), &section, base_href.as_deref()))
            .collect();
        RenderPlan::Sections(pages)
    }

    /// Render every entry of the plan, then normalize multi-image batches
    pub fn render<R: Renderer>(&self, prepared: &Prepared, renderer: &mut R) -> Result<Conversion> {
        let output_path = |index: usize| prepared.output_dir.join(output_filename(&prepared.base_name, index));
        let mut files = Vec::with_capacity(prepared.plan.len());

        match &prepared.plan {
            RenderPlan::FullDocument => {
                let output = output_path(1);
                renderer.render_document(&prepared.input, &output)?;
                files.push(output);
            }
            RenderPlan::Sections(pages) => {
                info!("Rendering {} section(s)", pages.len());
                for (i, page) in pages.iter().enumerate() {
                    debug!("Processing section {}/{}", i + 1, pages.len());
                    let output = output_path(i + 1);
                    renderer.render_section(page, &output)?;
                    files.push(output);
                }
            }
        }

        let canvas = if files.len() > 1 {
            info!("Standardizing image sizes");
            normalize(&files, self.config.background)
        } else {
            None
        };

        info!("Created {} image(s) in {}", files.len(), prepared.output_dir.display());
        for file in &files {
            match image_dimensions(file) {
                Some((w, h)) => info!("  - {} ({}x{})", display_name(file), w, h),
                None => info!("  - {}", display_name(file)),
            }
        }

        Ok(Conversion {
            output_dir: prepared.output_dir.clone(),
            files,
            canvas,
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
