use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use chartdeck_core::chart::{render_chart, RenderContext};
use chartdeck_core::demo::Dashboard;
use chartdeck_core::export::{self, export_all};
use chartdeck_core::layout::ApproxTextMeasure;
use chartdeck_core::legend::LegendState;
use chartdeck_core::logging::init_logging;
use chartdeck_core::mock::{LoadMsg, MockSource};
use chartdeck_core::theme::{Theme, ThemeMode};
use chartdeck_core::ChartConfig;
use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "chartdeck-cli", about = "Render chart configurations to SVG, JSON, CSV or PDF")]
struct Args {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one JSON chart configuration
    Render {
        config: PathBuf,
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Scene geometry as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// One row per drawn data mark
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        pdf: Option<PathBuf>,
        #[arg(long, default_value = "light")]
        theme: ThemeMode,
        #[arg(long)]
        width: Option<f32>,
        #[arg(long)]
        height: Option<f32>,
        /// Legend indices to toggle off before rendering
        #[arg(long, value_delimiter = ',')]
        hide: Vec<usize>,
    },
    /// Write every demo dashboard card as SVG
    Demo {
        #[arg(long, default_value = "chartdeck-demo")]
        out_dir: PathBuf,
        #[arg(long, default_value = "light")]
        theme: ThemeMode,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    match args.command {
        Command::Render {
            config,
            svg,
            json,
            csv,
            pdf,
            theme,
            width,
            height,
            hide,
        } => {
            let mut chart = ChartConfig::from_path(&config)
                .with_context(|| format!("reading {}", config.display()))?;
            if let Some(w) = width {
                chart.size.width = w;
            }
            if let Some(h) = height {
                chart.size.height = h;
            }
            let outputs = Outputs { svg, json, csv, pdf };
            render(&chart, Theme::for_mode(theme), &hide, &outputs)
        }
        Command::Demo { out_dir, theme } => demo(&out_dir, Theme::for_mode(theme)),
    }
}

struct Outputs {
    svg: Option<PathBuf>,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
    pdf: Option<PathBuf>,
}

fn render(config: &ChartConfig, theme: Theme, hide: &[usize], out: &Outputs) -> anyhow::Result<()> {
    let keys = config.chart.legend_keys();
    let mut legend = LegendState::new();
    for &index in hide {
        if !legend.toggle(index, keys.len()) {
            warn!(index, series = keys.len(), "no legend entry to hide");
        }
    }
    let ctx = RenderContext {
        theme: &theme,
        legend: &legend,
        measure: &ApproxTextMeasure,
    };
    let outcome = render_chart(config, &ctx);
    if let Some(message) = outcome.message() {
        warn!(placeholder = message, "chart rendered as a placeholder");
    }
    let scene = outcome.into_scene(config.size, &theme);
    let title = config.title.clone().unwrap_or_else(|| "Chart".to_string());

    if out.svg.is_none() && out.json.is_none() && out.csv.is_none() && out.pdf.is_none() {
        print!("{}", export::to_svg(&scene));
        return Ok(());
    }
    if let Some(path) = &out.svg {
        export::write_svg(&scene, path).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote svg");
    }
    if let Some(path) = &out.json {
        let json = export::to_json(&scene)?;
        std::fs::write(path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote json");
    }
    if let Some(path) = &out.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        export::to_csv(&scene, file).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote csv");
    }
    if let Some(path) = &out.pdf {
        export::to_pdf(&scene, &title, path).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote pdf");
    }
    Ok(())
}

fn demo(out_dir: &Path, theme: Theme) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let source = MockSource::new(Duration::ZERO);
    let mut failed = 0;
    for dashboard in Dashboard::ALL {
        let dir = out_dir.join(dashboard.title().to_lowercase());
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        // Same path the app takes: one fetch per card, collected as they arrive.
        let pending: Vec<(String, Receiver<LoadMsg>)> = dashboard
            .cards(today)
            .into_iter()
            .map(|(title, config)| {
                let rx = source.fetch(&title, move || config);
                (title, rx)
            })
            .collect();
        let mut charts = Vec::with_capacity(pending.len());
        for (title, rx) in pending {
            let LoadMsg::Loaded(config) = rx
                .recv()
                .with_context(|| format!("fetching {title}"))?;
            charts.push((title, *config));
        }

        for (title, result) in export_all(&charts, &dir, &theme) {
            match result {
                Ok(path) => println!("{}", path.display()),
                Err(err) => {
                    warn!(%err, %title, "export failed");
                    failed += 1;
                }
            }
        }
    }
    if failed > 0 {
        bail!("{failed} charts failed to export");
    }
    Ok(())
}
