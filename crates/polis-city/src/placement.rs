use std::fmt;

/// Why a candidate position was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reject {
    OutOfDomain,
    OutsideRing,
    Core,
    Harbor,
    Pier,
    Plaza,
    Water,
    Road,
    Lot,
    Zoning,
    Separation,
    SeaLevel,
    Slope,
}

impl Reject {
    pub const ALL: [Reject; 13] = [
        Reject::OutOfDomain,
        Reject::OutsideRing,
        Reject::Core,
        Reject::Harbor,
        Reject::Pier,
        Reject::Plaza,
        Reject::Water,
        Reject::Road,
        Reject::Lot,
        Reject::Zoning,
        Reject::Separation,
        Reject::SeaLevel,
        Reject::Slope,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Reject::OutOfDomain => "out_of_domain",
            Reject::OutsideRing => "outside_ring",
            Reject::Core => "core",
            Reject::Harbor => "harbor",
            Reject::Pier => "pier",
            Reject::Plaza => "plaza",
            Reject::Water => "water",
            Reject::Road => "road",
            Reject::Lot => "lot",
            Reject::Zoning => "zoning",
            Reject::Separation => "separation",
            Reject::SeaLevel => "sea_level",
            Reject::Slope => "slope",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RejectionStats {
    counts: [usize; Reject::ALL.len()],
}

impl RejectionStats {
    pub fn record(&mut self, reason: Reject) {
        self.counts[reason.index()] += 1;
    }

    pub fn get(&self, reason: Reject) -> usize {
        self.counts[reason.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Non-zero counters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Reject, usize)> + '_ {
        Reject::ALL
            .iter()
            .map(|&r| (r, self.get(r)))
            .filter(|&(_, n)| n > 0)
    }
}

impl fmt::Display for RejectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (r, n) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", r.label(), n)?;
            first = false;
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// Outcome of a bounded rejection-sampling pass. Falling short of `requested`
/// is a normal result, not an error.
#[derive(Clone, Debug)]
pub struct Placement<T> {
    pub items: Vec<T>,
    pub requested: usize,
    pub attempts: usize,
    pub rejections: RejectionStats,
}

impl<T> Placement<T> {
    pub fn empty(requested: usize) -> Self {
        Self {
            items: Vec::new(),
            requested,
            attempts: 0,
            rejections: RejectionStats::default(),
        }
    }

    pub fn achieved(&self) -> usize {
        self.items.len()
    }

    pub fn is_partial(&self) -> bool {
        self.items.len() < self.requested
    }

    pub fn log_summary(&self, what: &str) {
        if self.is_partial() {
            log::warn!(
                "{what}: placed {}/{} after {} attempts (rejected: {})",
                self.achieved(),
                self.requested,
                self.attempts,
                self.rejections
            );
        } else {
            log::info!(
                "{what}: placed {} after {} attempts",
                self.achieved(),
                self.attempts
            );
        }
    }
}
