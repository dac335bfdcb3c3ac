// Acceptance certificate rendering.
// genpdf needs real font files for metrics, so a font directory is probed.
use genpdf::Element as _;
use std::path::{Path, PathBuf};

const FONT_DIRS: [&str; 5] = [
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/TTF",
    "/System/Library/Fonts/Supplemental",
    "/Library/Fonts",
];

const FONT_NAMES: [&str; 3] = ["LiberationSans", "DejaVuSans", "Arial"];

fn load_fonts(
    configured: Option<&Path>,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, String> {
    let candidates: Vec<PathBuf> = match configured {
        Some(dir) => vec![dir.to_path_buf()],
        None => FONT_DIRS.iter().map(PathBuf::from).collect(),
    };

    candidates
        .iter()
        .filter(|dir| dir.exists())
        .find_map(|dir| {
            FONT_NAMES
                .iter()
                .find_map(|name| genpdf::fonts::from_files(dir, name, None).ok())
        })
        .ok_or_else(|| "No suitable fonts found. Install: apt install fonts-liberation".to_string())
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Renders the certificate of acceptance for a paper and returns the PDF bytes.
pub fn render_certificate(
    conference_name: &str,
    paper_title: &str,
    font_dir: Option<&Path>,
) -> Result<Vec<u8>, String> {
    let font_family = load_fonts(font_dir)?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title("Certificate of Acceptance");

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    let title_style = genpdf::style::Style::new().with_font_size(24);
    doc.push(genpdf::elements::Paragraph::new("Certificate of Acceptance").styled(title_style));
    doc.push(genpdf::elements::Break::new(1.0));

    doc.push(genpdf::elements::Paragraph::new(shorten(paper_title, 80)));
    doc.push(genpdf::elements::Break::new(0.5));
    doc.push(genpdf::elements::Paragraph::new(format!(
        "has been accepted for presentation at {}",
        shorten(conference_name, 80)
    )));
    doc.push(genpdf::elements::Break::new(0.5));

    let date = chrono::Utc::now().format("%B %d, %Y").to_string();
    doc.push(genpdf::elements::Paragraph::new(format!("Date: {}", date)));

    let mut bytes = Vec::new();
    doc.render(&mut bytes).map_err(|e| e.to_string())?;
    Ok(bytes)
}
