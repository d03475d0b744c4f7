use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use resvg::tiny_skia::{Pixmap, Transform};
use usvg::fontdb::Database;

use super::PosterError;

/// Always present so titles render on hosts without system fonts.
pub const BUNDLED_FAMILY: &str = "Tuffy";
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/Tuffy.ttf");

/// Tried in order when the configured family is missing.
const SANS_FAMILIES: &[&str] = &[
    "Arial", "Helvetica", "Liberation Sans", "DejaVu Sans", "Noto Sans", "FreeSans", "Open Sans", "Roboto",
];

/// Fonts available for the overlay, resolved once per run.
#[derive(Clone)]
pub struct FontBook {
    db: Arc<Database>,
    family: String,
}

impl FontBook {
    /// System fonts plus anything in `font_dir`.
    pub fn load(preferred: &str, font_dir: Option<&Path>) -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        if let Some(dir) = font_dir {
            db.load_fonts_dir(dir);
        }
        Self::from_database(db, preferred)
    }

    /// Picks `preferred` when installed, then an installed sans-serif, then
    /// the bundled font. The bundled font is always loaded so glyphs missing
    /// from the chosen family still have somewhere to come from.
    pub fn from_database(mut db: Database, preferred: &str) -> Self {
        let installed: BTreeSet<String> = db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        let names: Vec<&str> = installed.iter().map(String::as_str).collect();
        let family = match pick_family(&names, preferred) {
            Some(f) => f.to_string(),
            None => BUNDLED_FAMILY.to_string(),
        };
        if !family.eq_ignore_ascii_case(preferred) {
            tracing::warn!(preferred, using = %family, "font not installed, using fallback family");
        }

        db.load_font_data(BUNDLED_FONT.to_vec());
        db.set_sans_serif_family(family.clone());
        Self { db: Arc::new(db), family }
    }

    pub fn family(&self) -> &str { &self.family }

    pub fn face_count(&self) -> usize { self.db.len() }
}

fn pick_family<'a>(installed: &[&'a str], preferred: &str) -> Option<&'a str> {
    let find = |want: &str| installed.iter().copied().find(|f| f.eq_ignore_ascii_case(want));
    find(preferred)
        .or_else(|| SANS_FAMILIES.iter().find_map(|want| find(*want)))
        .or_else(|| installed.iter().copied().find(|f| is_plain_sans(f)))
}

// "Sans" in the name, minus the monospace, math and symbol variants
fn is_plain_sans(family: &str) -> bool {
    let f = family.to_ascii_lowercase();
    f.contains("sans") && !["mono", "math", "symbol", "emoji"].iter().any(|x| f.contains(x))
}

/// A run of text with its top-left corner, as a drawing library would place it.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub top: f32,
    pub size: f32,
    pub text: String,
}

// baseline sits roughly one ascent below the requested top edge
const ASCENT: f32 = 0.9;

pub fn overlay_svg(runs: &[TextRun], family: &str, width: u32, height: u32) -> String {
    let family = if family == BUNDLED_FAMILY {
        format!("'{BUNDLED_FAMILY}'")
    } else {
        format!("'{}', '{BUNDLED_FAMILY}'", escape_xml(family))
    };
    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><g fill="#ffffff" font-family="{family}">"##
    );
    for run in runs {
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="{}" xml:space="preserve">{}</text>"#,
            run.x,
            run.top + run.size * ASCENT,
            run.size,
            escape_xml(&run.text)
        ));
    }
    svg.push_str("</g></svg>");
    svg
}

pub fn rasterize(svg: &str, fonts: &FontBook) -> Result<Pixmap, PosterError> {
    let opts = usvg::Options { fontdb: fonts.db.clone(), ..Default::default() };
    let tree = usvg::Tree::from_str(svg, &opts)?;
    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or(PosterError::Pixmap(size.width(), size.height()))?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    Ok(pixmap)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled_only() -> FontBook {
        FontBook::from_database(Database::new(), "Arial")
    }

    #[test]
    fn empty_database_falls_back_to_bundled_font() {
        let fonts = bundled_only();
        assert_eq!(fonts.family(), BUNDLED_FAMILY);
        assert_eq!(fonts.face_count(), 1);
    }

    #[test]
    fn preferred_family_wins_when_installed() {
        let installed = ["DejaVu Sans", "arial", "Liberation Sans"];
        assert_eq!(pick_family(&installed, "Arial"), Some("arial"));
    }

    #[test]
    fn sans_family_beats_math_and_mono_faces() {
        let installed = ["DejaVu Math TeX Gyre", "DejaVu Sans Mono", "DejaVu Serif", "DejaVu Sans"];
        assert_eq!(pick_family(&installed, "Arial"), Some("DejaVu Sans"));

        let unknown_sans = ["DejaVu Math TeX Gyre", "Acme Sans Mono", "Acme Sans"];
        assert_eq!(pick_family(&unknown_sans, "Arial"), Some("Acme Sans"));
    }

    #[test]
    fn no_usable_sans_means_bundled() {
        let installed = ["DejaVu Math TeX Gyre", "DejaVu Serif"];
        assert_eq!(pick_family(&installed, "Arial"), None);
    }

    #[test]
    fn markup_is_escaped() {
        let runs = vec![TextRun { x: 80.0, top: 330.0, size: 50.0, text: "Q&A: <\"AI\"> rules".into() }];
        let svg = overlay_svg(&runs, "Arial", 1080, 1080);
        assert!(svg.contains("Q&amp;A: &lt;&quot;AI&quot;&gt; rules"));
        assert!(svg.contains("font-family=\"'Arial', 'Tuffy'\""));
        assert!(svg.contains("y=\"375\""));
    }

    #[test]
    fn bundled_font_draws_glyphs() {
        let runs = vec![TextRun { x: 80.0, top: 950.0, size: 30.0, text: "🌍 WORLD NEWS".into() }];
        let fonts = bundled_only();
        let svg = overlay_svg(&runs, fonts.family(), 1080, 1080);
        let pixmap = rasterize(&svg, &fonts).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (1080, 1080));

        let inked = pixmap.data().chunks_exact(4).filter(|px| px[3] > 128).count();
        assert!(inked > 100, "only {inked} opaque pixels");
    }
}
