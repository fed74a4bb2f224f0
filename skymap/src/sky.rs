//! The visibility scheduler: owns the catalog and keeps the visible /
//! pending-rise partition current as the simulated clock runs.

use crate::Star;
use almanac::Observer;
use std::collections::{BinaryHeap, HashMap};
use std::f64::consts::TAU;

/// Heap entry for a below-horizon star, ordered so the star nearest to
/// rising pops first.
///
/// `rise_key` is the star's `angle_to_rise` at insertion plus the sky's
/// sidereal offset at that moment. Every pending star's distance to rising
/// shrinks at the same sidereal rate, so adding the shared offset makes keys
/// minted at different times directly comparable: subtracting the current
/// offset from any key yields that star's present distance to rising.
#[derive(Debug, Clone, Copy)]
struct PendingRise {
    rise_key: f64,
    index: usize,
}

impl PartialEq for PendingRise {
    fn eq(&self, other: &Self) -> bool {
        self.rise_key.total_cmp(&other.rise_key).is_eq()
    }
}

impl Eq for PendingRise {}

impl PartialOrd for PendingRise {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingRise {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap; reverse for smallest-key-first
        other.rise_key.total_cmp(&self.rise_key)
    }
}

/// The full catalog partitioned into visible and not-yet-risen stars.
///
/// Stars whose upper transit stays below the horizon are parked in neither
/// set; a latitude change rebuilds the partition wholesale. Between location
/// changes, [`Sky::each_visible`] maintains membership incrementally in
/// amortized O(visible + newly risen) per tick instead of O(catalog).
///
/// All mutation happens through the owner's per-tick calls; renderers only
/// read.
#[derive(Debug)]
pub struct Sky {
    stars: Vec<Star>,
    by_hr: HashMap<u32, usize>,
    visible: Vec<usize>,
    pending: BinaryHeap<PendingRise>,
    brightest: f64,
    dimmest: f64,
    built: bool,
    /// Sidereal time of the last partition maintenance pass.
    last_lst: f64,
    /// Total sidereal advance since the last rebuild; the key epoch for
    /// [`PendingRise`] entries.
    sidereal_offset: f64,
}

impl Sky {
    /// Take ownership of the catalog. The partition is empty until the first
    /// [`Sky::rebuild`] or [`Sky::each_visible`] call.
    pub fn new(stars: Vec<Star>) -> Self {
        let by_hr = stars
            .iter()
            .enumerate()
            .map(|(idx, star)| (star.hr, idx))
            .collect();
        let (mut brightest, mut dimmest) = (f64::INFINITY, f64::NEG_INFINITY);
        for star in &stars {
            brightest = brightest.min(star.mag);
            dimmest = dimmest.max(star.mag);
        }
        Self {
            stars,
            by_hr,
            visible: Vec::new(),
            pending: BinaryHeap::new(),
            brightest,
            dimmest,
            built: false,
            last_lst: 0.0,
            sidereal_offset: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// All stars, in catalog order.
    pub fn stars(&self) -> impl Iterator<Item = &Star> {
        self.stars.iter()
    }

    /// Look up a star by its Harvard reference number.
    pub fn star(&self, hr: u32) -> Option<&Star> {
        self.by_hr.get(&hr).map(|&idx| &self.stars[idx])
    }

    /// Stars matching a predicate.
    pub fn filter<F>(&self, predicate: F) -> Vec<&Star>
    where
        F: Fn(&Star) -> bool,
    {
        self.stars.iter().filter(|star| predicate(star)).collect()
    }

    /// Magnitude of the brightest catalog entry (lowest value).
    pub fn brightest_mag(&self) -> f64 {
        self.brightest
    }

    /// Magnitude of the dimmest catalog entry (highest value).
    pub fn dimmest_mag(&self) -> f64 {
        self.dimmest
    }

    /// Snapshot of the currently visible stars, unordered.
    pub fn visible(&self) -> impl Iterator<Item = &Star> {
        self.visible.iter().map(|&idx| &self.stars[idx])
    }

    /// Groups of catalog entries sharing an exact RA/Dec position — binary
    /// (or multiple) star systems listed once per component.
    pub fn binary_systems(&self) -> Vec<Vec<&Star>> {
        let mut groups: HashMap<(u64, u64), Vec<&Star>> = HashMap::new();
        for star in &self.stars {
            groups
                .entry((star.ra.to_bits(), star.dec.to_bits()))
                .or_default()
                .push(star);
        }
        groups.into_values().filter(|g| g.len() > 1).collect()
    }

    /// Visit every star while rebuilding the partition from scratch.
    ///
    /// O(catalog); used after location changes and date jumps, where the
    /// never-rises exclusion and the pending ordering are both invalid.
    pub fn each_star(&mut self, observer: &Observer, mut callback: impl FnMut(&Star)) {
        self.visible.clear();
        self.pending.clear();
        self.built = true;
        self.last_lst = observer.lst();
        self.sidereal_offset = 0.0;
        for (index, star) in self.stars.iter().enumerate() {
            star.update(observer);
            callback(star);
            if star.high_transit(observer) < 0.0 {
                continue;
            }
            if star.altitude(observer) > 0.0 {
                self.visible.push(index);
            } else {
                self.pending.push(PendingRise {
                    rise_key: star.angle_to_rise(observer),
                    index,
                });
            }
        }
    }

    /// Rebuild the visible / pending-rise partition wholesale.
    pub fn rebuild(&mut self, observer: &Observer) {
        self.each_star(observer, |_| {});
        log::debug!(
            "sky rebuilt: {} visible, {} pending, {} never rise",
            self.visible.len(),
            self.pending.len(),
            self.stars.len() - self.visible.len() - self.pending.len()
        );
    }

    /// Visit each currently visible star, migrating stars across the horizon
    /// as a side effect.
    ///
    /// Stars that set are demoted to the pending-rise heap; the heap is then
    /// drained from the nearest-to-rising end until the first star still
    /// below the horizon, which by the heap ordering bounds everything
    /// behind it. The callback sees each visible star exactly once per call,
    /// with position fields fully refreshed.
    pub fn each_visible(&mut self, observer: &Observer, mut callback: impl FnMut(&Star)) {
        if !self.built {
            self.rebuild(observer);
        }

        // keys already in the heap were minted at earlier sidereal times;
        // advancing the shared offset keeps fresh keys comparable with them
        let lst = observer.lst();
        self.sidereal_offset += (lst - self.last_lst).rem_euclid(TAU);
        self.last_lst = lst;

        let previously = std::mem::take(&mut self.visible);
        let mut still = Vec::with_capacity(previously.len());
        for index in previously {
            let star = &self.stars[index];
            star.update(observer);
            if star.altitude(observer) > 0.0 {
                callback(star);
                still.push(index);
            } else if star.high_transit(observer) >= 0.0 {
                self.pending.push(PendingRise {
                    rise_key: star.angle_to_rise(observer) + self.sidereal_offset,
                    index,
                });
            }
        }

        while let Some(&PendingRise { index, .. }) = self.pending.peek() {
            let star = &self.stars[index];
            star.update(observer);
            if star.altitude(observer) <= 0.0 {
                break;
            }
            callback(star);
            still.push(index);
            self.pending.pop();
        }

        self.visible = still;
    }
}
