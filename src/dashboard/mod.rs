// Dashboard view model: report store, lookback ranking, chart projection and time-range
// controls behind one state struct updated by discrete actions.
//
// Fetching is left to the caller: actions that need fresh data return a FetchRequest, and the
// result comes back as Action::FetchCompleted carrying the request's ticket.

mod projection;
mod selection;
mod store;
mod time_range;
mod window_stats;

pub use projection::{
    ChartPoint, SeriesKind, SeriesSpec, committed_key, project, reserved_key, series,
};
pub use selection::{ColorMap, FALLBACK_COLOR, PALETTE, Selection};
pub use store::{Applied, FetchTicket, ReportStore};
pub use time_range::{
    DEFAULT_RANGE_SECS, QuickRange, TimeParseError, TimeRange, from_datetime_local,
    to_datetime_local,
};
pub use window_stats::{
    CategoryDelta, INTERVAL_TOLERANCE_SECS, IntervalOption, LookbackInterval, RankStatus, Ranking,
    SortCriteria, SortParseError, SortType, Window, format_value, interval_options,
    is_sufficient, lookback_window, nearest_report, rank_categories, window_deltas,
};

use crate::client::FetchError;
use crate::models::Report;

#[derive(Debug)]
pub enum Action {
    /// Sets the window to the last N seconds ending at `now` and fetches immediately.
    QuickRange { range: QuickRange, now: i64 },
    /// Edits the window start only; takes effect on the next `Reload`.
    SetStart(i64),
    /// Edits the window end only; takes effect on the next `Reload`.
    SetEnd(i64),
    Reload,
    ToggleCategory(String),
    SetShowReserved(bool),
    SetSortCriteria(SortCriteria),
    SetSortType(SortType),
    FetchCompleted {
        ticket: FetchTicket,
        result: Result<Vec<Report>, FetchError>,
    },
}

/// A fetch the caller must perform, for `range`, answering with `ticket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub range: TimeRange,
}

#[derive(Debug)]
pub struct DashboardState {
    store: ReportStore,
    colors: ColorMap,
    selection: Selection,
    show_reserved: bool,
    sort_criteria: SortCriteria,
    sort_type: SortType,
    range: TimeRange,
}

impl DashboardState {
    /// Opens on the last hour ending at `now`, with `Total` selected and no sorting.
    pub fn new(now: i64) -> Self {
        Self {
            store: ReportStore::new(),
            colors: ColorMap::default(),
            selection: Selection::default(),
            show_reserved: false,
            sort_criteria: SortCriteria::None,
            sort_type: SortType::Delta,
            range: TimeRange::default_at(now),
        }
    }

    /// The fetch for the initial window.
    pub fn initial_fetch(&mut self) -> FetchRequest {
        self.request_fetch()
    }

    /// Applies `action`; returns the fetch to perform when the action needs fresh data.
    pub fn dispatch(&mut self, action: Action) -> Option<FetchRequest> {
        match action {
            Action::QuickRange { range, now } => {
                self.range = range.range_at(now);
                Some(self.request_fetch())
            }
            Action::SetStart(start) => {
                self.range.start = start;
                None
            }
            Action::SetEnd(end) => {
                self.range.end = end;
                None
            }
            Action::Reload => Some(self.request_fetch()),
            Action::ToggleCategory(name) => {
                self.selection.toggle(&name);
                None
            }
            Action::SetShowReserved(show) => {
                self.show_reserved = show;
                None
            }
            Action::SetSortCriteria(criteria) => {
                self.sort_criteria = criteria;
                None
            }
            Action::SetSortType(sort_type) => {
                self.sort_type = sort_type;
                None
            }
            Action::FetchCompleted { ticket, result } => {
                self.apply_fetch(ticket, result);
                None
            }
        }
    }

    /// Stores a fetch result if `ticket` is still the latest, then refreshes colors and selection.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Report>, FetchError>,
    ) -> Applied {
        let applied = self.store.apply(ticket, result);
        if applied != Applied::Stale {
            self.colors = ColorMap::new(self.store.categories());
            self.selection.reconcile(self.store.categories());
        }
        applied
    }

    fn request_fetch(&mut self) -> FetchRequest {
        FetchRequest {
            ticket: self.store.begin_fetch(),
            range: self.range,
        }
    }

    pub fn reports(&self) -> &[Report] {
        self.store.reports()
    }

    pub fn categories(&self) -> &[String] {
        self.store.categories()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn show_reserved(&self) -> bool {
        self.show_reserved
    }

    pub fn sort_criteria(&self) -> SortCriteria {
        self.sort_criteria
    }

    pub fn sort_type(&self) -> SortType {
        self.sort_type
    }

    pub fn ranking(&self) -> Ranking {
        rank_categories(
            self.store.reports(),
            self.store.categories(),
            self.sort_criteria,
            self.sort_type,
        )
    }

    pub fn chart_data(&self) -> Vec<ChartPoint> {
        project(self.store.reports(), self.store.categories())
    }

    pub fn series(&self) -> Vec<SeriesSpec> {
        series(&self.selection, &self.colors, self.show_reserved)
    }

    pub fn interval_options(&self) -> Vec<IntervalOption> {
        interval_options(self.store.reports(), self.sort_type)
    }

    pub fn status_message(&self) -> Option<String> {
        self.ranking().status_message(self.sort_type)
    }

    /// Text of the reload button.
    pub fn load_label(&self) -> String {
        format!("Load Data ({} points currently)", self.store.reports().len())
    }
}
