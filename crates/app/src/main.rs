mod state;
mod ui;

use chartdeck_core::logging::init_logging;
use eframe::egui;
use state::AppState;

struct ChartdeckApp {
    state: AppState,
}

impl ChartdeckApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let state = AppState::new();
        cc.egui_ctx.set_visuals(ui::visuals_for(state.theme.mode));
        Self { state }
    }
}

impl eframe::App for ChartdeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::draw(&mut self.state, ctx);
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(false);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Chartdeck",
        options,
        Box::new(|cc| Ok(Box::new(ChartdeckApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the window: {e}"))
}
