use metrics::{describe_gauge, gauge};

pub fn component_info_metric(name: &'static str) {
    static NAME: &str = "burst_search_component_info";

    describe_gauge!(NAME, "Basic information about the component");

    let git_rev = option_env!("GIT_VERSION").unwrap_or("unknown");
    gauge!(NAME, "component" => name, "git_version" => git_rev).set(1);
}

pub mod metric_names {
    use const_format::concatcp;

    pub const METRIC_NAME_PREFIX: &str = "burst_search_";

    pub const FAILURES: &str = concatcp!(METRIC_NAME_PREFIX, "failures");
    pub const PHOTONS_PROCESSED: &str = concatcp!(METRIC_NAME_PREFIX, "photons_processed");
    pub const BURSTS_DETECTED: &str = concatcp!(METRIC_NAME_PREFIX, "bursts_detected");
    pub const CHANNELS_PROCESSED: &str = concatcp!(METRIC_NAME_PREFIX, "channels_processed");
    pub const LAST_FRAME_NUMBER: &str = concatcp!(METRIC_NAME_PREFIX, "last_frame_number");
}

pub mod bursts_detected {
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    pub enum SearchKind {
        AllPhotons,
        FirstSelection,
        SecondSelection,
        Intersection,
    }

    // Label building function
    pub fn get_label(search_kind: SearchKind) -> (&'static str, &'static str) {
        (
            "search_kind",
            match search_kind {
                SearchKind::AllPhotons => "all_photons",
                SearchKind::FirstSelection => "first_selection",
                SearchKind::SecondSelection => "second_selection",
                SearchKind::Intersection => "intersection",
            },
        )
    }
}

pub mod failures {
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    pub enum FailureKind {
        InvalidParameter,
        DimensionMismatch,
        InvalidInput,
        SimulationFailed,
    }

    // Label building function
    pub fn get_label(failure_kind: FailureKind) -> (&'static str, &'static str) {
        (
            "failure_kind",
            match failure_kind {
                FailureKind::InvalidParameter => "invalid_parameter",
                FailureKind::DimensionMismatch => "dimension_mismatch",
                FailureKind::InvalidInput => "invalid_input",
                FailureKind::SimulationFailed => "simulation_failed",
            },
        )
    }
}
