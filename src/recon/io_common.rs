use url::Url;

// Inputs, in the data directory.
pub const INFO_FILE: &str = "info_constituency.json";
pub const STATS_FILE: &str = "stats_cons.json";

// Reports, written as `<name>.json` and `<name>.xlsx` in the data directory.
pub const RELATION_NAME: &str = "relation_constituency";
pub const INTEREST_NAME: &str = "interest_constituency";
pub const UNINTEREST_NAME: &str = "uninterest_constituency";
pub const SHEET_NAME: &str = "Constituencies";

// Charts
pub const MP_PARTY_DIFF_HISTOGRAM: &str = "mp_party_diff_histogram.svg";
pub const ERROR_PER_STATION_HISTOGRAM: &str = "mp_party_error_per_station_histogram.svg";
pub const INTEREST_BAR_CHART: &str = "interest_constituency_mp_party_diff.svg";

/// The name under which a downloaded document is saved.
///
/// It is the last segment of the URL path when it names a JSON file, and
/// `data_{index}.json` otherwise. `index` starts at 1.
pub fn output_file_name(url: &str, index: usize) -> String {
    let from_path = Url::parse(url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| s.ends_with(".json"))
            .map(|s| s.to_string())
    });
    from_path.unwrap_or_else(|| format!("data_{}.json", index))
}
