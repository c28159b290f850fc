use serde::Serialize;

/// Summary statistics reduced from a `ProbeResult`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStatistics {
    /// Max channel-one peak (None if the channel had no samples)
    pub channel_one_peak_max: Option<f64>,

    /// Max channel-two peak (None for mono files)
    pub channel_two_peak_max: Option<f64>,

    /// Max overall peak
    pub overall_peak_max: Option<f64>,

    /// Overall peak samples strictly above the high-volume threshold
    pub over_threshold_frame_count: usize,

    /// Mean of the phase samples (0.0 when there are none)
    pub mean_phase_deviation: f64,

    pub markers: CodingHistoryMarkers,
}

/// Keyword counts found in the BEXT coding history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CodingHistoryMarkers {
    pub mono: usize,
    pub stereo: usize,
    pub dual: usize,
    /// Number of `A=` entries, one per processing stage
    pub signal_chain: usize,
}
