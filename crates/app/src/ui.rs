use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use chartdeck_core::chart::{render_chart, RenderContext, RenderOutcome};
use chartdeck_core::export::export_all;
use chartdeck_core::layout::{Point, Size, TextMeasure};
use chartdeck_core::reorder::CardId;
use chartdeck_core::scene::{ArcMark, Mark, Scene, TextAnchor};
use chartdeck_core::search::filter_titles;
use chartdeck_core::theme::{Color, Theme, ThemeMode};
use chartdeck_core::tooltip::layout_tooltip;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rounding, Sense, Stroke, Ui};
use tracing::{debug, warn};

use crate::state::{AppState, Card};

const CARD_MIN_WIDTH: f32 = 380.0;
const CHART_HEIGHT: f32 = 300.0;
const ARC_STEPS_PER_TURN: f32 = 96.0;

/// Measures text with egui's own font system so legend and tooltip boxes fit what is painted.
struct EguiMeasure<'a> {
    ctx: &'a egui::Context,
}

impl TextMeasure for EguiMeasure<'_> {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self.ctx.fonts(|f| {
            f.layout_no_wrap(text.to_string(), FontId::proportional(font_size), Color32::WHITE)
                .size()
                .x
        })
    }
}

pub fn visuals_for(mode: ThemeMode) -> egui::Visuals {
    match mode {
        ThemeMode::Light => egui::Visuals::light(),
        ThemeMode::Dark => egui::Visuals::dark(),
    }
}

pub fn draw(app: &mut AppState, ctx: &egui::Context) {
    if app.poll_loads() {
        ctx.request_repaint_after(Duration::from_millis(50));
    }

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        top_bar(ui, app);
    });

    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.label(app.status.as_deref().unwrap_or("Ready"));
    });

    egui::CentralPanel::default()
        .frame(egui::Frame::central_panel(&ctx.style()).fill(color32(app.theme.colors.surface, 1.0)))
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| cards(ui, app));
        });
}

fn top_bar(ui: &mut Ui, app: &mut AppState) {
    ui.horizontal(|ui| {
        for i in 0..app.boards.len() {
            let title = app.boards[i].dashboard.title();
            if ui.selectable_label(app.active == i, title).clicked() && app.active != i {
                app.active = i;
                debug!(dashboard = title, "dashboard selected");
            }
        }
        ui.separator();
        let label = match app.theme.mode {
            ThemeMode::Light => "🌙 Dark",
            ThemeMode::Dark => "☀ Light",
        };
        if ui.button(label).clicked() {
            app.toggle_theme();
            ui.ctx().set_visuals(visuals_for(app.theme.mode));
        }
        if ui.button("Reload").clicked() {
            app.reload_active();
        }
        if ui.button("Export SVG…").clicked() {
            match export_board(app) {
                Ok(Some(dir)) => {
                    if let Err(err) = open::that(&dir) {
                        warn!(%err, dir = %dir.display(), "could not open export folder");
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "export failed");
                    app.status = Some(format!("Export failed: {err:#}"));
                }
            }
        }
        ui.separator();
        ui.label("Search:");
        ui.text_edit_singleline(&mut app.search);
    });
}

fn export_board(app: &mut AppState) -> anyhow::Result<Option<PathBuf>> {
    let Some(dir) = rfd::FileDialog::new().pick_folder() else {
        return Ok(None);
    };
    let board = app.board().context("no dashboard selected")?;
    let charts = board.loaded();
    let results = export_all(&charts, &dir, &app.theme);
    let mut written = 0;
    for (title, result) in results {
        result.with_context(|| format!("exporting {title}"))?;
        written += 1;
    }
    app.status = Some(format!("Exported {written} charts to {}", dir.display()));
    Ok(Some(dir))
}

fn cards(ui: &mut Ui, app: &mut AppState) {
    let theme = app.theme.clone();
    let search = app.search.clone();
    let Some(board) = app.board_mut() else { return };

    // Released outside every card: the drag just ends.
    if board.order.is_dragging() && !egui::DragAndDrop::has_any_payload(ui.ctx()) {
        board.order.cancel_drag();
    }

    let order: Vec<CardId> = board.order.order().to_vec();
    let titles: Vec<&str> = order
        .iter()
        .filter_map(|id| board.card(*id).map(|c| c.title.as_str()))
        .collect();
    let visible = filter_titles(&search, titles.iter().copied());
    if visible.is_empty() {
        ui.label("No cards match the search");
        return;
    }
    let mut visible_positions: Vec<usize> = visible;
    // search only filters; display order stays the drag order
    visible_positions.sort_unstable();

    let spacing = ui.spacing().item_spacing.x;
    let available = ui.available_width();
    let columns = ((available + spacing) / (CARD_MIN_WIDTH + spacing)).floor().max(1.0);
    let card_width = ((available + spacing) / columns - spacing).max(1.0);

    let mut dropped: Option<(CardId, usize)> = None;
    ui.horizontal_wrapped(|ui| {
        for position in visible_positions {
            let Some(&id) = order.get(position) else { continue };
            let Some(card) = board.cards.get_mut(id.0) else { continue };
            let frame = egui::Frame::group(ui.style())
                .fill(color32(theme.colors.background, 1.0))
                .stroke(Stroke::new(1.0, color32(theme.colors.border, 1.0)))
                .rounding(Rounding::same(6.0));
            let (_, payload) = ui.dnd_drop_zone::<CardId, _>(frame, |ui| {
                ui.set_width(card_width);
                card_ui(ui, card, &theme, card_width)
            });
            if let Some(id) = payload {
                dropped = Some((*id, position));
            }
            if ui.ctx().is_being_dragged(handle_id(id)) && !board.order.is_dragging() {
                board.order.begin_drag(position);
            }
        }
    });

    if let Some((id, target)) = dropped {
        if !board.order.is_dragging() {
            if let Some(from) = board.order.position_of(id) {
                board.order.begin_drag(from);
            }
        }
        board.order.drop_at(target);
    }
}

fn handle_id(id: CardId) -> egui::Id {
    egui::Id::new(("card-handle", id.0))
}

fn card_ui(ui: &mut Ui, card: &mut Card, theme: &Theme, width: f32) {
    ui.horizontal(|ui| {
        ui.dnd_drag_source(handle_id(card.id), card.id, |ui| {
            ui.label(egui::RichText::new("⠿").size(16.0));
        })
        .response
        .on_hover_text("Drag to reorder");
        ui.label(
            egui::RichText::new(&card.title)
                .strong()
                .color(color32(theme.colors.text, 1.0)),
        );
        if card.is_loading() {
            ui.spinner();
        }
        if !card.legend.hidden().is_empty() && ui.small_button("Show all").clicked() {
            card.legend.show_all();
            debug!(card = %card.title, "all series shown");
        }
    });

    let egui_ctx = ui.ctx().clone();
    let measure = EguiMeasure { ctx: &egui_ctx };
    let size = Size::new(width, CHART_HEIGHT);
    let outcome = match &card.config {
        Some(config) if !card.is_loading() => {
            let mut config = config.clone();
            config.size = size;
            // the card header already shows it
            config.title = None;
            let ctx = RenderContext {
                theme,
                legend: &card.legend,
                measure: &measure,
            };
            render_chart(&config, &ctx)
        }
        _ => RenderOutcome::Loading,
    };
    let scene = outcome.into_scene(size, theme);

    let (rect, response) = ui.allocate_exact_size(egui::vec2(width, CHART_HEIGHT), Sense::click());
    let painter = ui.painter_at(rect);
    paint_scene(&painter, rect.min, &scene);

    let pointer = response
        .hover_pos()
        .map(|p| Point::new(p.x - rect.min.x, p.y - rect.min.y));
    let legend_hit = pointer.and_then(|p| scene.legend_hit(p)).cloned();
    let hovered = legend_hit.as_ref().map(|h| h.key.as_str());
    if card.legend.hovered() != hovered {
        card.legend.hover(hovered);
        ui.ctx().request_repaint();
    }
    if let (true, Some(hit)) = (response.clicked(), &legend_hit) {
        let len = scene.legend.len();
        card.legend.toggle(hit.index, len);
        debug!(card = %card.title, series = %hit.key, "legend toggled");
    }

    let Some(config) = &card.config else { return };
    if legend_hit.is_some() || !config.tooltip.show {
        card.tooltip.clear();
        return;
    }
    card.tooltip.update(&scene, pointer);
    if let (Some(datum), Some(anchor)) = (card.tooltip.datum(), card.tooltip.anchor()) {
        let tip = layout_tooltip(
            datum,
            anchor,
            scene.size,
            theme.typography.tooltip_size,
            config.tooltip.format,
            &measure,
        );
        let min = rect.min + egui::vec2(tip.origin.x, tip.origin.y);
        let tip_rect = egui::Rect::from_min_size(min, egui::vec2(tip.size.width, tip.size.height));
        painter.rect_filled(tip_rect, Rounding::same(4.0), color32(theme.colors.tooltip_background, 1.0));
        for (i, line) in tip.lines.iter().enumerate() {
            let y = tip.padding + tip.line_height * (i as f32 + 0.5);
            painter.text(
                min + egui::vec2(tip.padding, y),
                Align2::LEFT_CENTER,
                line,
                FontId::proportional(theme.typography.tooltip_size),
                color32(theme.colors.tooltip_text, 1.0),
            );
        }
    }
}

fn color32(c: Color, opacity: f32) -> Color32 {
    let (r, g, b, a) = c.components();
    let a = (a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn paint_scene(painter: &egui::Painter, origin: Pos2, scene: &Scene) {
    let at = |p: Point| Pos2::new(origin.x + p.x, origin.y + p.y);
    painter.rect_filled(
        egui::Rect::from_min_size(origin, egui::vec2(scene.size.width, scene.size.height)),
        Rounding::ZERO,
        color32(scene.background, 1.0),
    );
    for mark in &scene.marks {
        match mark {
            Mark::Rect(r) => {
                let rect = egui::Rect::from_min_size(
                    at(Point::new(r.rect.x, r.rect.y)),
                    egui::vec2(r.rect.w, r.rect.h),
                );
                painter.rect_filled(rect, Rounding::same(r.corner_radius), color32(r.fill, r.opacity));
            }
            Mark::Arc(a) => paint_arc(painter, &at, a),
            Mark::Text(t) => {
                let align = match t.anchor {
                    TextAnchor::Start => Align2::LEFT_CENTER,
                    TextAnchor::Middle => Align2::CENTER_CENTER,
                    TextAnchor::End => Align2::RIGHT_CENTER,
                };
                painter.text(at(t.pos), align, &t.text, FontId::proportional(t.size), color32(t.color, 1.0));
            }
            Mark::Rule(l) => {
                painter.line_segment([at(l.from), at(l.to)], Stroke::new(l.width, color32(l.stroke, 1.0)));
            }
        }
    }
}

/// Ring segments are not convex, so they are filled as a strip of small quads.
fn paint_arc(painter: &egui::Painter, at: &impl Fn(Point) -> Pos2, arc: &ArcMark) {
    let span = arc.end_angle - arc.start_angle;
    if span <= 0.0 {
        return;
    }
    let steps = ((span / std::f32::consts::TAU) * ARC_STEPS_PER_TURN).ceil().max(1.0) as usize;
    let fill = color32(arc.fill, arc.opacity);
    for i in 0..steps {
        let a0 = arc.start_angle + span * i as f32 / steps as f32;
        let a1 = arc.start_angle + span * (i + 1) as f32 / steps as f32;
        let quad = vec![
            at(arc.point_at(a0, arc.inner_radius)),
            at(arc.point_at(a0, arc.outer_radius)),
            at(arc.point_at(a1, arc.outer_radius)),
            at(arc.point_at(a1, arc.inner_radius)),
        ];
        painter.add(egui::Shape::convex_polygon(quad, fill, Stroke::NONE));
    }
}
