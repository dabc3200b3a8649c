use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::info;

use crate::chart::{render_chart, RenderContext};
use crate::config::ChartConfig;
use crate::error::{ChartError, Result};
use crate::layout::{ApproxTextMeasure, Point, TextMeasure};
use crate::legend::LegendState;
use crate::scene::{Mark, Scene, TextAnchor};
use crate::theme::{Color, Theme};

const ARC_SEGMENTS: usize = 128;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn fill_opacity(color: Color, opacity: f32) -> f32 {
    opacity.clamp(0.0, 1.0) * color.alpha() as f32 / 255.0
}

fn polygon_path(points: &[Point]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{:.2} {:.2} ", p.x, p.y);
    }
    d.push('Z');
    d
}

pub fn to_svg(scene: &Scene) -> String {
    let (w, h) = (scene.size.width, scene.size.height);
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{}">"#,
        escape(&scene.font_family)
    );
    let _ = writeln!(
        svg,
        r#"  <rect width="{w}" height="{h}" fill="{}"/>"#,
        scene.background
    );

    for mark in &scene.marks {
        match mark {
            Mark::Rect(r) => {
                let _ = writeln!(
                    svg,
                    r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{}" fill="{}" fill-opacity="{:.2}"/>"#,
                    r.rect.x,
                    r.rect.y,
                    r.rect.w,
                    r.rect.h,
                    r.corner_radius,
                    r.fill,
                    fill_opacity(r.fill, r.opacity)
                );
            }
            Mark::Arc(a) => {
                let _ = writeln!(
                    svg,
                    r#"  <path d="{}" fill="{}" fill-opacity="{:.2}"/>"#,
                    polygon_path(&a.outline(ARC_SEGMENTS)),
                    a.fill,
                    fill_opacity(a.fill, a.opacity)
                );
            }
            Mark::Text(t) => {
                let anchor = match t.anchor {
                    TextAnchor::Start => "start",
                    TextAnchor::Middle => "middle",
                    TextAnchor::End => "end",
                };
                let weight = if t.bold { r#" font-weight="bold""# } else { "" };
                let _ = writeln!(
                    svg,
                    r#"  <text x="{:.2}" y="{:.2}" font-size="{}" fill="{}" text-anchor="{anchor}" dominant-baseline="middle"{weight}>{}</text>"#,
                    t.pos.x,
                    t.pos.y,
                    t.size,
                    t.color,
                    escape(&t.text)
                );
            }
            Mark::Rule(l) => {
                let _ = writeln!(
                    svg,
                    r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
                    l.from.x, l.from.y, l.to.x, l.to.y, l.stroke, l.width
                );
            }
        }
    }
    svg.push_str("</svg>\n");
    svg
}

pub fn write_svg(scene: &Scene, path: &Path) -> Result<()> {
    std::fs::write(path, to_svg(scene))?;
    Ok(())
}

pub fn to_json(scene: &Scene) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(scene)?)
}

/// One row per data mark: what it shows and where it was drawn.
pub fn to_csv(scene: &Scene, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record(["kind", "label", "series", "value", "x", "y", "width", "height"])?;
    for mark in scene.data_marks() {
        let Some(datum) = mark.datum() else { continue };
        let (kind, x, y, width, height) = match mark {
            Mark::Rect(r) => ("rect", r.rect.x, r.rect.y, r.rect.w, r.rect.h),
            Mark::Arc(a) => {
                let c = a.centroid();
                ("arc", c.x, c.y, 0.0, 0.0)
            }
            Mark::Text(_) | Mark::Rule(_) => continue,
        };
        writer.write_record([
            kind.to_string(),
            datum.label.clone(),
            datum.series.clone().unwrap_or_default(),
            datum.value.to_string(),
            format!("{x:.2}"),
            format!("{y:.2}"),
            format!("{width:.2}"),
            format!("{height:.2}"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

const MM_PER_PX: f32 = 25.4 / 96.0;
const PT_PER_PX: f32 = 0.75;

/// Single-page PDF of the scene's filled shapes, rules and text.
pub fn to_pdf(scene: &Scene, title: &str, out: &Path) -> Result<()> {
    use printpdf::path::{PaintMode, WindingOrder};
    use printpdf::{BuiltinFont, Color as PdfColor, Mm, PdfDocument, Point as PdfPoint, Polygon, Rgb};

    let pdf_err = |e: printpdf::Error| ChartError::Pdf(e.to_string());
    let page_w = scene.size.width * MM_PER_PX;
    let page_h = scene.size.height * MM_PER_PX;
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(page_w), Mm(page_h), "Chart");
    let layer = doc.get_page(page1).get_layer(layer1);
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;

    let to_pdf_point = |p: Point| PdfPoint::new(Mm(p.x * MM_PER_PX), Mm(page_h - p.y * MM_PER_PX));
    let set_fill = |c: Color| {
        let (r, g, b, _) = c.components();
        layer.set_fill_color(PdfColor::Rgb(Rgb::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            None,
        )));
    };
    // PDF has no per-shape opacity without extra graphics states; blend against the background instead.
    let flatten = |c: Color, opacity: f32| c.mix(scene.background, 1.0 - fill_opacity(c, opacity));
    let fill_polygon = |points: Vec<Point>| {
        layer.add_polygon(Polygon {
            rings: vec![points.into_iter().map(|p| (to_pdf_point(p), false)).collect()],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    };
    let rect_points = |x: f32, y: f32, w: f32, h: f32| {
        vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]
    };

    set_fill(scene.background);
    fill_polygon(rect_points(0.0, 0.0, scene.size.width, scene.size.height));

    let measure = ApproxTextMeasure;
    for mark in &scene.marks {
        match mark {
            Mark::Rect(r) => {
                set_fill(flatten(r.fill, r.opacity));
                fill_polygon(rect_points(r.rect.x, r.rect.y, r.rect.w, r.rect.h));
            }
            Mark::Arc(a) => {
                set_fill(flatten(a.fill, a.opacity));
                fill_polygon(a.outline(ARC_SEGMENTS));
            }
            Mark::Rule(l) => {
                // Rules are drawn as thin filled quads.
                let dx = l.to.x - l.from.x;
                let dy = l.to.y - l.from.y;
                let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
                let (nx, ny) = (-dy / len * l.width / 2.0, dx / len * l.width / 2.0);
                set_fill(l.stroke);
                fill_polygon(vec![
                    Point::new(l.from.x + nx, l.from.y + ny),
                    Point::new(l.to.x + nx, l.to.y + ny),
                    Point::new(l.to.x - nx, l.to.y - ny),
                    Point::new(l.from.x - nx, l.from.y - ny),
                ]);
            }
            Mark::Text(t) => {
                let width = measure.text_width(&t.text, t.size);
                let x = match t.anchor {
                    TextAnchor::Start => t.pos.x,
                    TextAnchor::Middle => t.pos.x - width / 2.0,
                    TextAnchor::End => t.pos.x - width,
                };
                // baseline sits roughly a third of the size below the middle
                let baseline = t.pos.y + t.size * 0.35;
                set_fill(t.color);
                let font = if t.bold { &bold } else { &regular };
                layer.use_text(
                    t.text.as_str(),
                    t.size * PT_PER_PX,
                    Mm(x * MM_PER_PX),
                    Mm(page_h - baseline * MM_PER_PX),
                    font,
                );
            }
        }
    }

    let file = std::fs::File::create(out)?;
    let mut buf = std::io::BufWriter::new(file);
    doc.save(&mut buf).map_err(pdf_err)?;
    Ok(())
}

/// File-name-safe version of a chart title.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("chart");
    }
    out
}

/// Renders every chart to `<dir>/<slug>.svg` in parallel, with all series visible.
pub fn export_all(
    charts: &[(String, ChartConfig)],
    dir: &Path,
    theme: &Theme,
) -> Vec<(String, Result<PathBuf>)> {
    charts
        .par_iter()
        .map(|(title, config)| {
            let legend = LegendState::new();
            let ctx = RenderContext {
                theme,
                legend: &legend,
                measure: &ApproxTextMeasure,
            };
            let scene = render_chart(config, &ctx).into_scene(config.size, theme);
            let path = dir.join(format!("{}.svg", slug(title)));
            let result = write_svg(&scene, &path).map(|_| path);
            if let Ok(p) = &result {
                info!(title = %title, path = %p.display(), "exported chart");
            }
            (title.clone(), result)
        })
        .collect()
}
