use std::fmt;

/// Status label shown next to the playback controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ready,
    Playing,
    Paused,
    PausedManualScroll,
    AutoResumed,
    Finished,
    NotScrollable,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::PausedManualScroll => "Paused — manual scroll",
            Self::AutoResumed => "Auto-resumed",
            Self::Finished => "Finished",
            Self::NotScrollable => "PDF is not scrollable",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
