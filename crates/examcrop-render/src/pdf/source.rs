// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF source: reads page geometry with the `lopdf` crate and renders clipped
// page areas with poppler's `pdftoppm`.

use std::cell::Cell;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use examcrop_core::PageSize;
use examcrop_core::config::POINTS_PER_INCH;
use examcrop_core::error::{ExamCropError, Result};
use lopdf::{Document, Object, ObjectId};
use tempfile::TempDir;
use tracing::{debug, info, instrument};

use super::rasterizer::PageRasterizer;
use crate::crop::clip::ClipRect;

/// Default renderer binary, resolved through `PATH`.
const PDFTOPPM: &str = "pdftoppm";

/// Upper bound on `/Parent` hops when resolving inherited page attributes.
const MAX_TREE_DEPTH: usize = 32;

/// An opened exam PDF.
///
/// Page geometry is read once at open time. The handle owns a scratch
/// directory for renderer output that is removed when the handle is dropped,
/// on success and error paths alike. A handle is not `Sync`: render calls on
/// one handle are sequential.
pub struct PdfSource {
    /// Document handed to the renderer.
    path: PathBuf,
    /// Displayed size of every page, 0-indexed.
    pages: Vec<PageSize>,
    /// Renderer output lands here; removed on drop.
    scratch: TempDir,
    renderer: PathBuf,
    renders: Cell<u64>,
}

impl PdfSource {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            ExamCropError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;
        let pages = page_sizes(&document)?;
        debug!(pages = pages.len(), "PDF loaded");

        Ok(Self {
            path: path_ref.to_path_buf(),
            pages,
            scratch: TempDir::new()?,
            renderer: PathBuf::from(PDFTOPPM),
            renders: Cell::new(0),
        })
    }

    /// Open a PDF held in memory. The bytes are spilled into the scratch
    /// directory so the renderer can read them.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            ExamCropError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;
        let pages = page_sizes(&document)?;

        let scratch = TempDir::new()?;
        let path = scratch.path().join("source.pdf");
        std::fs::write(&path, data)?;
        debug!(pages = pages.len(), "PDF loaded from bytes");

        Ok(Self {
            path,
            pages,
            scratch,
            renderer: PathBuf::from(PDFTOPPM),
            renders: Cell::new(0),
        })
    }

    /// Use a specific `pdftoppm` binary instead of the one on `PATH`.
    pub fn with_renderer(mut self, program: impl Into<PathBuf>) -> Self {
        self.renderer = program.into();
        self
    }

    // -- Inspection -----------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renderer arguments for one clip. Offsets are measured from the
    /// CropBox origin, the same box [`PageRasterizer::page_size`] reports.
    /// `-singlefile` writes `<prefix>.png` without a page-number suffix.
    fn render_args(
        &self,
        page: usize,
        zoom: f32,
        (x, y, width, height): (u32, u32, u32, u32),
        prefix: &Path,
    ) -> Vec<OsString> {
        let page_number = (page + 1).to_string();
        [
            "-png".to_string(),
            "-singlefile".to_string(),
            "-cropbox".to_string(),
            "-r".to_string(),
            format!("{:.3}", zoom * POINTS_PER_INCH),
            "-f".to_string(),
            page_number.clone(),
            "-l".to_string(),
            page_number,
            "-x".to_string(),
            x.to_string(),
            "-y".to_string(),
            y.to_string(),
            "-W".to_string(),
            width.to_string(),
            "-H".to_string(),
            height.to_string(),
        ]
        .into_iter()
        .map(OsString::from)
        .chain([self.path.clone().into_os_string(), prefix.as_os_str().to_owned()])
        .collect()
    }

    fn check_page(&self, page: usize) -> Result<PageSize> {
        self.pages
            .get(page)
            .copied()
            .ok_or(ExamCropError::PageOutOfRange {
                page,
                page_count: self.pages.len(),
            })
    }
}

impl PageRasterizer for PdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        self.check_page(page)
    }

    #[instrument(skip(self, clip), fields(page))]
    fn render_clip(&self, page: usize, clip: &ClipRect, zoom: f32) -> Result<Vec<u8>> {
        self.check_page(page)?;
        let (x, y, width, height) = clip
            .pixel_rect(zoom)
            .ok_or(ExamCropError::DegenerateClip { page })?;

        let serial = self.renders.get();
        self.renders.set(serial + 1);
        let prefix = self.scratch.path().join(format!("clip_{serial:04}"));

        let output = Command::new(&self.renderer)
            .args(self.render_args(page, zoom, (x, y, width, height), &prefix))
            .output()
            .map_err(|err| {
                ExamCropError::RenderError(format!(
                    "failed to invoke {}: {}; is poppler-utils installed?",
                    self.renderer.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            return Err(ExamCropError::RenderError(format!(
                "{} exited with {}: {}",
                self.renderer.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let image_path = prefix.with_extension("png");
        let bytes = std::fs::read(&image_path).map_err(|err| {
            ExamCropError::RenderError(format!(
                "expected rendered image not found at {}: {}",
                image_path.display(),
                err
            ))
        })?;
        // Scratch space is reclaimed on drop; removing early keeps it small.
        discard_clip(&image_path);

        debug!(page, width, height, bytes = bytes.len(), "Clip rendered");
        Ok(bytes)
    }
}

/// Remove a rendered clip from the scratch directory. Failure is logged, not
/// returned: the directory goes away with the handle anyway.
fn discard_clip(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(err) => {
            debug!(path = %path.display(), %err, "Could not remove rendered clip");
            false
        }
    }
}

// -- Page geometry -------------------------------------------------------------

/// Displayed size of every page in page-tree order.
fn page_sizes(document: &Document) -> Result<Vec<PageSize>> {
    document
        .get_pages()
        .into_values()
        .map(|page_id| page_size(document, page_id))
        .collect()
}

/// Size of one page: the CropBox (falling back to the MediaBox), with width
/// and height swapped for quarter-turn `/Rotate` values.
fn page_size(document: &Document, page_id: ObjectId) -> Result<PageSize> {
    let rect = inherited(document, page_id, b"CropBox")
        .and_then(rectangle)
        .or_else(|| inherited(document, page_id, b"MediaBox").and_then(rectangle))
        .ok_or_else(|| {
            ExamCropError::PdfError(format!("page {:?} has no usable MediaBox", page_id))
        })?;

    let width = (rect[2] - rect[0]).abs();
    let height = (rect[3] - rect[1]).abs();

    let rotation = inherited(document, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0)
        .rem_euclid(360);

    Ok(if rotation == 90 || rotation == 270 {
        PageSize {
            width: height,
            height: width,
        }
    } else {
        PageSize { width, height }
    })
}

/// Look up a page attribute, following `/Parent` links for inheritable keys.
fn inherited<'a>(document: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = document.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return document.dereference(value).ok().map(|(_, object)| object);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn rectangle(object: &Object) -> Option<[f32; 4]> {
    let items = object.as_array().ok()?;
    let [a, b, c, d] = items.as_slice() else {
        return None;
    };
    Some([
        a.as_float().ok()?,
        b.as_float().ok()?,
        c.as_float().ok()?,
        d.as_float().ok()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    struct PageSpec {
        media_box: Option<[f32; 4]>,
        crop_box: Option<[f32; 4]>,
        rotate: Option<i64>,
    }

    /// Build a PDF whose page tree carries an inheritable A3-landscape MediaBox.
    fn build_pdf(specs: &[PageSpec]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for spec in specs {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            };
            if let Some(media_box) = spec.media_box {
                let values: Vec<Object> = media_box.iter().map(|v| Object::Real(*v)).collect();
                page.set("MediaBox", values);
            }
            if let Some(crop_box) = spec.crop_box {
                let values: Vec<Object> = crop_box.iter().map(|v| Object::Real(*v)).collect();
                page.set("CropBox", values);
            }
            if let Some(rotate) = spec.rotate {
                page.set("Rotate", Object::Integer(rotate));
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1191),
                Object::Integer(842),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut output = Vec::new();
        doc.save_to(&mut output).expect("serialise test PDF");
        output
    }

    fn approx(size: PageSize, width: f32, height: f32) -> bool {
        (size.width - width).abs() < 0.01 && (size.height - height).abs() < 0.01
    }

    #[test]
    fn reads_page_count_and_sizes() {
        let data = build_pdf(&[
            PageSpec {
                media_box: Some([0.0, 0.0, 595.0, 842.0]),
                crop_box: None,
                rotate: None,
            },
            PageSpec {
                media_box: None,
                crop_box: None,
                rotate: None,
            },
        ]);
        let source = PdfSource::from_bytes(&data).unwrap();

        assert_eq!(source.page_count(), 2);
        assert!(approx(source.page_size(0).unwrap(), 595.0, 842.0));
        // Second page inherits the page tree's MediaBox.
        assert!(approx(source.page_size(1).unwrap(), 1191.0, 842.0));
        assert!(source.path().exists());
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let data = build_pdf(&[PageSpec {
            media_box: Some([0.0, 0.0, 595.0, 842.0]),
            crop_box: None,
            rotate: Some(90),
        }]);
        let source = PdfSource::from_bytes(&data).unwrap();
        assert!(approx(source.page_size(0).unwrap(), 842.0, 595.0));
    }

    #[test]
    fn crop_box_takes_precedence_over_media_box() {
        let data = build_pdf(&[PageSpec {
            media_box: Some([0.0, 0.0, 842.0, 1191.0]),
            crop_box: Some([30.0, 30.0, 812.0, 1161.0]),
            rotate: None,
        }]);
        let source = PdfSource::from_bytes(&data).unwrap();
        assert!(approx(source.page_size(0).unwrap(), 782.0, 1131.0));
    }

    #[test]
    fn renderer_crops_to_crop_box_at_requested_page() {
        let data = build_pdf(&[PageSpec {
            media_box: None,
            crop_box: None,
            rotate: None,
        }]);
        let source = PdfSource::from_bytes(&data).unwrap();
        let prefix = source.scratch.path().join("clip_0000");
        let args = source.render_args(0, 300.0 / 72.0, (416, 416, 200, 100), &prefix);

        let args: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let flag = |name: &str| {
            let at = args.iter().position(|a| a == name).unwrap();
            args[at + 1].clone()
        };
        assert!(args.contains(&"-cropbox".to_string()));
        assert!(args.contains(&"-singlefile".to_string()));
        assert_eq!(flag("-r"), "300.000");
        assert_eq!((flag("-f"), flag("-l")), ("1".to_string(), "1".to_string()));
        assert_eq!((flag("-x"), flag("-y")), ("416".to_string(), "416".to_string()));
        assert_eq!((flag("-W"), flag("-H")), ("200".to_string(), "100".to_string()));
        // Input then output prefix close the argument list.
        assert_eq!(
            &args[args.len() - 2..],
            &[
                source.path().to_string_lossy().into_owned(),
                prefix.to_string_lossy().into_owned()
            ]
        );
    }

    #[test]
    fn discarding_a_clip_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip_0000.png");
        std::fs::write(&clip, b"png").unwrap();

        assert!(discard_clip(&clip));
        assert!(!clip.exists());
        assert!(!discard_clip(&clip));
    }

    #[test]
    fn out_of_range_page_is_reported() {
        let data = build_pdf(&[PageSpec {
            media_box: None,
            crop_box: None,
            rotate: None,
        }]);
        let source = PdfSource::from_bytes(&data).unwrap();
        let clip = ClipRect::new(0.0, 0.0, 10.0, 10.0);

        assert!(matches!(
            source.page_size(3),
            Err(ExamCropError::PageOutOfRange {
                page: 3,
                page_count: 1
            })
        ));
        assert!(matches!(
            source.render_clip(1, &clip, 1.0),
            Err(ExamCropError::PageOutOfRange { .. })
        ));
    }

    #[test]
    fn open_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.pdf");
        std::fs::write(
            &path,
            build_pdf(&[PageSpec {
                media_box: Some([0.0, 0.0, 842.0, 1191.0]),
                crop_box: None,
                rotate: None,
            }]),
        )
        .unwrap();

        let source = PdfSource::open(&path).unwrap();
        assert_eq!(source.page_count(), 1);
        assert_eq!(source.path(), path.as_path());
    }

    #[test]
    fn missing_file_is_pdf_error() {
        let err = PdfSource::open("/nonexistent/exam.pdf").err().unwrap();
        assert!(matches!(err, ExamCropError::PdfError(_)));
    }

    #[test]
    fn scratch_directory_removed_on_drop() {
        let data = build_pdf(&[PageSpec {
            media_box: None,
            crop_box: None,
            rotate: None,
        }]);
        let source = PdfSource::from_bytes(&data).unwrap();
        let scratch = source.scratch.path().to_path_buf();
        assert!(scratch.exists());
        drop(source);
        assert!(!scratch.exists());
    }

    #[test]
    fn missing_renderer_is_render_error() {
        let data = build_pdf(&[PageSpec {
            media_box: None,
            crop_box: None,
            rotate: None,
        }]);
        let source = PdfSource::from_bytes(&data)
            .unwrap()
            .with_renderer("/nonexistent/pdftoppm");
        let clip = ClipRect::new(0.0, 0.0, 100.0, 100.0);

        assert!(matches!(
            source.render_clip(0, &clip, 1.0),
            Err(ExamCropError::RenderError(_))
        ));
    }
}
