// Latest snapshots fetched from the backend plus the user's device filter

use chrono::{DateTime, Local};
use tracing::debug;

use crate::models::{
    ConnectionEvent, DashboardStatus, Device, FilterState, Statistics, StatusFilter,
};

/// Monotonic id stamped on every read request when it is issued.
pub type CycleId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Status,
    Statistics,
    Devices,
    Events,
}

impl Dataset {
    fn index(self) -> usize {
        match self {
            Dataset::Status => 0,
            Dataset::Statistics => 1,
            Dataset::Devices => 2,
            Dataset::Events => 3,
        }
    }
}

/// Every successful fetch replaces its snapshot wholesale. By default the
/// last response to *complete* wins, even if it was issued earlier than the
/// one already applied. With `drop_stale` set, a completion whose cycle id
/// is older than the newest one applied for that dataset is discarded.
#[derive(Debug, Default)]
pub struct DashboardStore {
    status: Option<DashboardStatus>,
    statistics: Option<Statistics>,
    devices: Vec<Device>,
    devices_loaded: bool,
    events: Vec<ConnectionEvent>,
    events_loaded: bool,
    filter: FilterState,
    last_update: Option<DateTime<Local>>,
    drop_stale: bool,
    applied: [CycleId; 4],
}

impl DashboardStore {
    pub fn new(drop_stale: bool) -> Self {
        Self {
            drop_stale,
            ..Self::default()
        }
    }

    fn accept(&mut self, dataset: Dataset, cycle: CycleId) -> bool {
        let latest = &mut self.applied[dataset.index()];
        if self.drop_stale && cycle < *latest {
            debug!("Dropping stale {:?} response from cycle {} (have {})", dataset, cycle, latest);
            return false;
        }
        *latest = (*latest).max(cycle);
        true
    }

    pub fn apply_status(
        &mut self,
        cycle: CycleId,
        status: DashboardStatus,
        now: DateTime<Local>,
    ) -> bool {
        if !self.accept(Dataset::Status, cycle) {
            return false;
        }
        self.status = Some(status);
        self.last_update = Some(now);
        true
    }

    pub fn apply_statistics(&mut self, cycle: CycleId, statistics: Statistics) -> bool {
        if !self.accept(Dataset::Statistics, cycle) {
            return false;
        }
        self.statistics = Some(statistics);
        true
    }

    pub fn apply_devices(&mut self, cycle: CycleId, devices: Vec<Device>) -> bool {
        if !self.accept(Dataset::Devices, cycle) {
            return false;
        }
        self.devices = devices;
        self.devices_loaded = true;
        true
    }

    pub fn apply_events(&mut self, cycle: CycleId, events: Vec<ConnectionEvent>) -> bool {
        if !self.accept(Dataset::Events, cycle) {
            return false;
        }
        self.events = events;
        self.events_loaded = true;
        true
    }

    pub fn status(&self) -> Option<&DashboardStatus> {
        self.status.as_ref()
    }

    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn devices_loaded(&self) -> bool {
        self.devices_loaded
    }

    /// Backend order, never re-sorted.
    pub fn events(&self) -> &[ConnectionEvent] {
        &self.events
    }

    pub fn events_loaded(&self) -> bool {
        self.events_loaded
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_status_filter(&mut self, status_filter: StatusFilter) {
        self.filter.status_filter = status_filter;
    }

    pub fn set_search_text(&mut self, search_text: impl Into<String>) {
        self.filter.search_text = search_text.into();
    }

    /// Recomputed on every call from the current snapshot and filter.
    pub fn visible_devices(&self) -> Vec<&Device> {
        filter_devices(&self.devices, &self.filter)
    }
}

/// Devices passing both the status and the search predicate, in snapshot order.
pub fn filter_devices<'a>(devices: &'a [Device], filter: &FilterState) -> Vec<&'a Device> {
    if filter.is_identity() {
        return devices.iter().collect();
    }
    devices.iter().filter(|device| filter.matches(device)).collect()
}
