use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use rand::Rng;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::keyword::extract_keyword;

pub mod background;
pub mod canvas;
pub mod text;
pub mod wrap;

pub use background::{BackgroundSource, RemoteBackground};
pub use text::FontBook;

pub const POSTER_SIZE: u32 = 1080;
pub const JPEG_QUALITY: u8 = 95;

const TEXT_X: f32 = 80.0;
const TITLE_TOP: f32 = 330.0;
const TITLE_LINE_HEIGHT: f32 = 70.0;
const TITLE_SIZE: f32 = 50.0;
const MAX_TITLE_LINES: usize = 6;
const FOOTER_TOP: f32 = 950.0;
const FOOTER_SIZE: f32 = 30.0;
pub const FOOTER_LABEL: &str = "🌍 WORLD NEWS";

#[derive(Debug, Error)]
pub enum PosterError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("background server returned {0}")]
    Status(StatusCode),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("text overlay error: {0}")]
    Svg(#[from] usvg::Error),
    #[error("cannot allocate {0}x{1} overlay")]
    Pixmap(u32, u32),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PosterSource {
    Remote,
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PosterOutcome {
    pub path: PathBuf,
    pub seed: String,
    pub source: PosterSource,
}

/// Renders square JPEG posters: a darkened remote photo behind the wrapped
/// title, or a flat palette color when the photo cannot be had.
pub struct PosterRenderer {
    output_dir: PathBuf,
    background: Box<dyn BackgroundSource>,
    fonts: FontBook,
}

impl PosterRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, background: Box<dyn BackgroundSource>, fonts: FontBook) -> Self {
        Self { output_dir: output_dir.into(), background, fonts }
    }

    pub fn poster_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("news_image_{index}.jpg"))
    }

    /// Any failure on the remote path falls through to the local poster.
    /// Only a failure to write the local poster is returned.
    pub async fn render<R: Rng + ?Sized>(
        &self,
        title: &str,
        index: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<PosterOutcome, PosterError> {
        let seed = background::image_seed(extract_keyword(title), index, now, rng);
        let path = self.poster_path(index);

        match self.render_remote(title, &seed, &path).await {
            Ok(()) => Ok(PosterOutcome { path, seed, source: PosterSource::Remote }),
            Err(e) => {
                tracing::warn!(error = %e, seed = %seed, "⚠️ image download failed, using local poster");
                self.render_local(title, canvas::pick_color(rng), &path)?;
                Ok(PosterOutcome { path, seed, source: PosterSource::Local })
            }
        }
    }

    async fn render_remote(&self, title: &str, seed: &str, path: &Path) -> Result<(), PosterError> {
        let mut img = self.background.fetch(seed, POSTER_SIZE, POSTER_SIZE).await?;
        canvas::darken(&mut img, canvas::DARKEN_ALPHA);
        self.draw_text(&mut img, title)?;
        save_jpeg(&img, path)
    }

    pub fn render_local(&self, title: &str, color: Rgb<u8>, path: &Path) -> Result<(), PosterError> {
        let mut img = canvas::solid_canvas(POSTER_SIZE, POSTER_SIZE, color);
        if let Err(e) = self.draw_text(&mut img, title) {
            tracing::warn!(error = %e, "text overlay failed, saving poster without text");
        }
        save_jpeg(&img, path)
    }

    fn draw_text(&self, img: &mut RgbImage, title: &str) -> Result<(), PosterError> {
        let svg = text::overlay_svg(&layout(title), self.fonts.family(), img.width(), img.height());
        let overlay = text::rasterize(&svg, &self.fonts)?;
        canvas::composite_over(img, &overlay);
        Ok(())
    }
}

/// Title lines (at most six, the rest dropped) followed by the footer label.
pub fn layout(title: &str) -> Vec<text::TextRun> {
    let mut runs: Vec<text::TextRun> = wrap::wrap_title(title, wrap::WRAP_WIDTH)
        .into_iter()
        .take(MAX_TITLE_LINES)
        .enumerate()
        .map(|(i, line)| text::TextRun {
            x: TEXT_X,
            top: TITLE_TOP + TITLE_LINE_HEIGHT * i as f32,
            size: TITLE_SIZE,
            text: line,
        })
        .collect();
    runs.push(text::TextRun { x: TEXT_X, top: FOOTER_TOP, size: FOOTER_SIZE, text: FOOTER_LABEL.to_string() });
    runs
}

fn save_jpeg(img: &RgbImage, path: &Path) -> Result<(), PosterError> {
    let mut out = BufWriter::new(File::create(path)?);
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::background::mock::MockBackground;
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use usvg::fontdb::Database;

    fn renderer(dir: &Path, bg: MockBackground) -> PosterRenderer {
        PosterRenderer::new(dir, Box::new(bg), FontBook::from_database(Database::new(), "Arial"))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn layout_caps_title_at_six_lines_plus_footer() {
        let title = vec!["headline"; 60].join(" ");
        let runs = layout(&title);
        assert_eq!(runs.len(), MAX_TITLE_LINES + 1);
        assert_eq!(runs[0].top, 330.0);
        assert_eq!(runs[5].top, 330.0 + 5.0 * 70.0);
        assert_eq!(runs[6].text, FOOTER_LABEL);
        assert_eq!(runs[6].top, 950.0);
    }

    #[tokio::test]
    async fn remote_path_writes_square_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let r = renderer(dir.path(), MockBackground::solid(Rgb([200, 200, 200])));
        let mut rng = StdRng::seed_from_u64(3);

        let out = r.render("Election results announced", 1, now(), &mut rng).await.unwrap();
        assert_eq!(out.source, PosterSource::Remote);
        assert_eq!(out.path, dir.path().join("news_image_1.jpg"));
        assert!(out.seed.starts_with("election-1-"));

        let img = image::open(&out.path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (POSTER_SIZE, POSTER_SIZE));
        // darkened toward 130, jpeg may drift a little
        let px = img.get_pixel(1000, 50);
        assert!((px.0[0] as i32 - 130).abs() <= 4, "unexpected pixel {px:?}");
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_palette_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let r = renderer(dir.path(), MockBackground::failing());
        let mut rng = StdRng::seed_from_u64(9);

        let out = r.render("Quiet day", 2, now(), &mut rng).await.unwrap();
        assert_eq!(out.source, PosterSource::Local);

        let img = image::open(&out.path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (POSTER_SIZE, POSTER_SIZE));
        let px = img.get_pixel(1000, 50);
        let near = |c: &Rgb<u8>| (0..3).all(|i| (c.0[i] as i32 - px.0[i] as i32).abs() <= 4);
        assert!(canvas::PALETTE.iter().any(near), "not a palette color: {px:?}");
    }

    fn bright_pixels(img: &RgbImage, rows: std::ops::Range<u32>) -> usize {
        rows.flat_map(|y| (TEXT_X as u32..1000).map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0[0] > 200)
            .count()
    }

    fn render_to_image(title: &str) -> RgbImage {
        let dir = tempfile::tempdir().unwrap();
        let r = renderer(dir.path(), MockBackground::failing());
        let path = dir.path().join("poster.jpg");
        r.render_local(title, canvas::PALETTE[0], &path).unwrap();
        image::open(&path).unwrap().to_rgb8()
    }

    #[test]
    fn title_and_footer_are_drawn() {
        let img = render_to_image("Election results announced in capital");
        assert!(bright_pixels(&img, 330..400) > 200, "no title ink on the first line");
        assert!(bright_pixels(&img, 400..750) == 0, "short title spilled past one line");
        assert!(bright_pixels(&img, 950..990) > 100, "no footer ink");
    }

    #[test]
    fn long_title_stops_after_six_lines() {
        let title = vec!["headline"; 60].join(" ");
        let img = render_to_image(&title);
        assert!(bright_pixels(&img, 680..750) > 200, "sixth line missing");
        assert_eq!(bright_pixels(&img, 760..940), 0, "text drawn below the sixth line");
    }

    #[tokio::test]
    async fn unwritable_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let r = renderer(&missing, MockBackground::failing());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(r.render("x", 1, now(), &mut rng).await.is_err());
    }
}
