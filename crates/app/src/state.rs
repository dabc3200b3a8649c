use chartdeck_core::config::ChartConfig;
use chartdeck_core::demo::Dashboard;
use chartdeck_core::legend::LegendState;
use chartdeck_core::mock::{self, LoadMsg, LoadState, MockSource};
use chartdeck_core::reorder::{CardId, ReorderList};
use chartdeck_core::theme::{Theme, ThemeMode};
use chartdeck_core::tooltip::TooltipState;
use chrono::{Local, NaiveDate};
use crossbeam_channel::Receiver;
use tracing::{debug, info};

pub struct Card {
    pub id: CardId,
    pub title: String,
    /// Latest delivered config; `None` until the first fetch lands.
    pub config: Option<ChartConfig>,
    pub rx: Option<Receiver<LoadMsg>>,
    pub load: LoadState,
    pub legend: LegendState,
    pub tooltip: TooltipState,
}

impl Card {
    fn new(id: CardId, title: String) -> Self {
        Self {
            id,
            title,
            config: None,
            rx: None,
            load: LoadState::Idle,
            legend: LegendState::new(),
            tooltip: TooltipState::default(),
        }
    }

    /// Replaces any pending fetch; dropping the old receiver abandons it.
    fn start_load(&mut self, source: &MockSource, config: ChartConfig) {
        self.rx = Some(source.fetch(&self.title, move || config));
        self.load = LoadState::Loading;
        self.tooltip.clear();
    }

    /// Picks up a finished fetch. Returns true when something changed.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.rx else { return false };
        let Some(config) = mock::poll(rx) else { return false };
        self.legend.reconcile(config.chart.legend_keys().len());
        self.config = Some(config);
        self.rx = None;
        self.load = LoadState::Ready;
        debug!(card = %self.title, "card loaded");
        true
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadState::Loading
    }
}

pub struct Board {
    pub dashboard: Dashboard,
    pub cards: Vec<Card>,
    pub order: ReorderList,
}

impl Board {
    fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            cards: Vec::new(),
            order: ReorderList::new(0),
        }
    }

    /// Fetches every card again. New titles get fresh cards; the card order is
    /// rebuilt only if the number of cards changed.
    fn load(&mut self, source: &MockSource, today: NaiveDate) {
        let fresh = self.dashboard.cards(today);
        if fresh.len() != self.cards.len() {
            self.cards = fresh
                .iter()
                .enumerate()
                .map(|(i, (title, _))| Card::new(CardId(i), title.clone()))
                .collect();
        }
        self.order.sync_len(self.cards.len());
        for (card, (title, config)) in self.cards.iter_mut().zip(fresh) {
            card.title = title;
            card.start_load(source, config);
        }
        info!(dashboard = self.dashboard.title(), cards = self.cards.len(), "loading dashboard");
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.0)
    }

    /// `(title, config)` of every loaded card, in display order.
    pub fn loaded(&self) -> Vec<(String, ChartConfig)> {
        self.order
            .order()
            .iter()
            .filter_map(|id| self.card(*id))
            .filter_map(|c| c.config.clone().map(|cfg| (c.title.clone(), cfg)))
            .collect()
    }
}

pub struct AppState {
    pub theme: Theme,
    pub active: usize,
    pub boards: Vec<Board>,
    pub search: String,
    pub source: MockSource,
    pub status: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        let mut state = Self {
            theme: Theme::for_mode(ThemeMode::Light),
            active: 0,
            boards: Dashboard::ALL.into_iter().map(Board::new).collect(),
            search: String::new(),
            source: MockSource::default(),
            status: None,
        };
        state.reload_all();
        state
    }

    pub fn board(&self) -> Option<&Board> {
        self.boards.get(self.active)
    }

    pub fn board_mut(&mut self) -> Option<&mut Board> {
        self.boards.get_mut(self.active)
    }

    pub fn reload_active(&mut self) {
        let today = Local::now().date_naive();
        let source = self.source.clone();
        if let Some(board) = self.board_mut() {
            board.load(&source, today);
        }
    }

    pub fn reload_all(&mut self) {
        let today = Local::now().date_naive();
        for board in &mut self.boards {
            board.load(&self.source, today);
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = Theme::for_mode(self.theme.mode.toggled());
        info!(mode = ?self.theme.mode, "theme switched");
    }

    /// Polls every pending fetch. Returns whether any card is still loading.
    pub fn poll_loads(&mut self) -> bool {
        let mut pending = false;
        for card in self.boards.iter_mut().flat_map(|b| b.cards.iter_mut()) {
            card.poll();
            pending |= card.is_loading();
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_until_loaded(state: &mut AppState) {
        for _ in 0..500 {
            if !state.poll_loads() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("cards never finished loading");
    }

    fn state() -> AppState {
        let mut state = AppState {
            theme: Theme::light(),
            active: 0,
            boards: Dashboard::ALL.into_iter().map(Board::new).collect(),
            search: String::new(),
            source: MockSource::new(Duration::ZERO),
            status: None,
        };
        state.reload_all();
        state
    }

    #[test]
    fn cards_load_independently_and_keep_order_on_reload() {
        let mut state = state();
        wait_until_loaded(&mut state);
        let board = state.board_mut().unwrap();
        assert!(board.cards.iter().all(|c| c.config.is_some()));

        board.order.begin_drag(0);
        board.order.drop_at(2);
        let before = board.order.order().to_vec();
        state.reload_active();
        assert!(state.board().unwrap().cards.iter().all(|c| c.is_loading()));
        assert_eq!(state.board().unwrap().order.order(), before.as_slice());
        wait_until_loaded(&mut state);
        assert_eq!(state.board().unwrap().loaded().len(), before.len());
    }

    #[test]
    fn theme_toggles() {
        let mut state = state();
        state.toggle_theme();
        assert_eq!(state.theme.mode, ThemeMode::Dark);
        state.toggle_theme();
        assert_eq!(state.theme, Theme::light());
    }
}
