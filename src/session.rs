use crate::detail::{self, DetailViewModel};
use crate::encode::{self, ColorEncoding};
use crate::label;
use crate::types::{Fips, Theme, ViewMode, WageDataset, WageLevel};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// The color and label products for one map render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEncoding {
    pub colors: ColorEncoding,
    pub labels: BTreeMap<Fips, String>,
}

/// One fully derived render: bulk encodings plus the detail view for the
/// active selection, all computed from a single input snapshot.
#[derive(Debug, Clone)]
pub struct Frame {
    pub encoding: Arc<MapEncoding>,
    pub detail: Option<DetailViewModel>,
}

/// Handle for one dataset load. Installing with a ticket that has been
/// superseded by a newer `begin_load` is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameKey {
    dataset_version: u64,
    mode: ViewMode,
    theme: Theme,
}

#[derive(Default)]
struct Inner {
    dataset: Option<Arc<WageDataset>>,
    level: WageLevel,
    personal_salary: Option<u32>,
    theme: Theme,
    selection: Option<Fips>,
    epoch: u64,
    memo: Option<(FrameKey, Arc<MapEncoding>)>,
}

/// Holds the inputs the engine is a pure function of, and re-derives frames
/// on demand. The UI host calls a setter whenever the user changes
/// something, then `frame()` for the next render; the bulk encodings are
/// memoized on (dataset version, mode, theme) so an unrelated change (e.g.
/// re-selecting a county) does not recompute the whole map.
pub struct ViewSession {
    inner: Mutex<Inner>,
}

impl ViewSession {
    pub fn new() -> Self {
        ViewSession {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Start a dataset load. Any ticket issued earlier is invalidated, so a
    /// slow response that arrives after a newer request is simply dropped.
    pub fn begin_load(&self) -> LoadTicket {
        let mut inner = self.inner.lock().unwrap();
        inner.epoch += 1;
        LoadTicket(inner.epoch)
    }

    /// Install a loaded dataset. Returns false (and changes nothing) when
    /// the ticket is stale. A selection the new dataset does not contain is
    /// dropped rather than left pointing at vanished data.
    pub fn install(&self, ticket: LoadTicket, dataset: WageDataset) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if ticket.0 != inner.epoch {
            return false;
        }
        let stale = inner
            .selection
            .as_deref()
            .map_or(false, |sel| !dataset.contains(sel));
        if stale {
            inner.selection = None;
        }
        inner.dataset = Some(Arc::new(dataset));
        true
    }

    /// Drop the dataset (no occupation selected). Selection lifetime is
    /// bounded by dataset lifetime, and any in-flight load is invalidated.
    pub fn clear_dataset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.dataset = None;
        inner.selection = None;
        inner.epoch += 1;
    }

    pub fn set_level(&self, level: WageLevel) {
        self.inner.lock().unwrap().level = level;
    }

    /// Non-positive salaries are stored as "no salary"; comparison mode is
    /// a consequence of a positive value, not a separate toggle.
    pub fn set_personal_salary(&self, salary: Option<u32>) {
        self.inner.lock().unwrap().personal_salary = salary.filter(|s| *s > 0);
    }

    pub fn set_theme(&self, theme: Theme) {
        self.inner.lock().unwrap().theme = theme;
    }

    /// Select a county. A FIPS the current dataset does not contain clears
    /// the selection instead of keeping a dangling one.
    pub fn select(&self, fips: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        let next = match (fips, inner.dataset.as_ref()) {
            (Some(fips), Some(dataset)) if dataset.contains(fips) => Some(fips.to_string()),
            _ => None,
        };
        inner.selection = next;
    }

    pub fn selection(&self) -> Option<Fips> {
        self.inner.lock().unwrap().selection.clone()
    }

    /// Derive the next render from the current inputs, captured atomically.
    /// Returns None while no dataset is installed.
    pub fn frame(&self) -> Option<Frame> {
        let mut inner = self.inner.lock().unwrap();
        let dataset = Arc::clone(inner.dataset.as_ref()?);
        let mode = ViewMode::resolve(inner.level, inner.personal_salary);
        let key = FrameKey {
            dataset_version: dataset.version,
            mode,
            theme: inner.theme,
        };

        let cached = match &inner.memo {
            Some((cached_key, cached)) if *cached_key == key => Some(Arc::clone(cached)),
            _ => None,
        };
        let encoding = match cached {
            Some(encoding) => encoding,
            None => {
                let computed = Arc::new(MapEncoding {
                    colors: encode::encode(&dataset, mode, inner.theme),
                    labels: label::label(&dataset, mode),
                });
                inner.memo = Some((key, Arc::clone(&computed)));
                computed
            }
        };

        let detail = inner.selection.as_ref().map(|fips| {
            detail::format(&dataset, fips, None, inner.level, inner.personal_salary)
        });

        Some(Frame { encoding, detail })
    }
}

impl Default for ViewSession {
    fn default() -> Self {
        Self::new()
    }
}
