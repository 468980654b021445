// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use serde::Serialize;

/// An identifier as it appears in the source documents.
///
/// The published datasets mix integer and text identifiers. Both are kept
/// as-is: an integer never matches a text, even if the text spells the
/// same number.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum ConsKey {
    Int(i64),
    Text(String),
}

impl Display for ConsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsKey::Int(i) => write!(f, "{}", i),
            ConsKey::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One entry of the constituency metadata document.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ConstituencyInfo {
    pub cons_id: Option<ConsKey>,
    pub cons_no: Option<ConsKey>,
    pub prov_id: Option<ConsKey>,
    pub total_vote_stations: Option<i64>,
    pub registered_vote: Option<i64>,
}

/// A candidate entry. An absent count reads as 0; `None` means the count is
/// present but unreadable.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct CandidateResult {
    pub mp_app_vote: Option<i64>,
}

/// A party-list entry, read like [CandidateResult].
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct PartyResult {
    pub party_list_vote: Option<i64>,
}

/// The tallies of one constituency, for both ballots.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ConstituencyStats {
    pub cons_id: Option<ConsKey>,
    // Constituency-seat ballot
    pub turn_out: Option<i64>,
    pub valid_votes: Option<i64>,
    pub invalid_votes: Option<i64>,
    pub blank_votes: Option<i64>,
    // Party-list ballot
    pub party_list_turn_out: Option<i64>,
    pub party_list_valid_votes: Option<i64>,
    pub party_list_invalid_votes: Option<i64>,
    pub party_list_blank_votes: Option<i64>,
    pub candidates: Vec<CandidateResult>,
    pub result_party: Vec<PartyResult>,
}

#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ProvinceStats {
    pub constituencies: Vec<ConstituencyStats>,
}

/// The statistics document: provinces, each holding a list of constituencies.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct StatsDocument {
    pub result_province: Vec<ProvinceStats>,
}

// ******** Output data structures *********

/// One row of the relation: metadata, raw tallies, vote sums and the
/// derived consistency metrics.
///
/// Every field is optional. `None` means the value could not be computed
/// because an operand was missing; it is never folded into zero.
/// The field order is the column order of every report.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct RelationRow {
    pub cons_id: Option<ConsKey>,
    pub cons_no: Option<ConsKey>,
    pub prov_id: Option<ConsKey>,
    pub total_vote_stations: Option<i64>,
    pub registered_vote: Option<i64>,
    pub turn_out: Option<i64>,
    pub valid_votes: Option<i64>,
    pub invalid_votes: Option<i64>,
    pub blank_votes: Option<i64>,
    pub party_list_turn_out: Option<i64>,
    pub party_list_valid_votes: Option<i64>,
    pub party_list_invalid_votes: Option<i64>,
    pub party_list_blank_votes: Option<i64>,
    pub total_mp_app_votes: Option<i64>,
    pub total_party_list_votes: Option<i64>,
    pub total_mp_app_votes_diff: Option<i64>,
    pub total_party_list_votes_diff: Option<i64>,
    pub total_mp_turnout_diff: Option<i64>,
    pub total_party_turnout_diff: Option<i64>,
    pub mp_party_diff: Option<i64>,
    pub registered_per_station: Option<f64>,
    pub registered_mp_turnout_ratio: Option<f64>,
    pub registered_party_turnout_ratio: Option<f64>,
    pub mp_party_error_per_station: Option<f64>,
}

/// A typed cell of a relation row, used by the tabular writers.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl RelationRow {
    /// The column names, in report order.
    pub const COLUMNS: [&'static str; 24] = [
        "cons_id",
        "cons_no",
        "prov_id",
        "total_vote_stations",
        "registered_vote",
        "turn_out",
        "valid_votes",
        "invalid_votes",
        "blank_votes",
        "party_list_turn_out",
        "party_list_valid_votes",
        "party_list_invalid_votes",
        "party_list_blank_votes",
        "total_mp_app_votes",
        "total_party_list_votes",
        "total_mp_app_votes_diff",
        "total_party_list_votes_diff",
        "total_mp_turnout_diff",
        "total_party_turnout_diff",
        "mp_party_diff",
        "registered_per_station",
        "registered_mp_turnout_ratio",
        "registered_party_turnout_ratio",
        "mp_party_error_per_station",
    ];

    /// The values of the row, aligned with [RelationRow::COLUMNS].
    pub fn cells(&self) -> Vec<Cell> {
        fn key(k: &Option<ConsKey>) -> Cell {
            match k {
                Some(ConsKey::Int(i)) => Cell::Int(*i),
                Some(ConsKey::Text(s)) => Cell::Text(s.clone()),
                None => Cell::Missing,
            }
        }
        fn int(x: Option<i64>) -> Cell {
            x.map(Cell::Int).unwrap_or(Cell::Missing)
        }
        fn float(x: Option<f64>) -> Cell {
            match x {
                Some(f) if f.is_finite() => Cell::Float(f),
                _ => Cell::Missing,
            }
        }
        vec![
            key(&self.cons_id),
            key(&self.cons_no),
            key(&self.prov_id),
            int(self.total_vote_stations),
            int(self.registered_vote),
            int(self.turn_out),
            int(self.valid_votes),
            int(self.invalid_votes),
            int(self.blank_votes),
            int(self.party_list_turn_out),
            int(self.party_list_valid_votes),
            int(self.party_list_invalid_votes),
            int(self.party_list_blank_votes),
            int(self.total_mp_app_votes),
            int(self.total_party_list_votes),
            int(self.total_mp_app_votes_diff),
            int(self.total_party_list_votes_diff),
            int(self.total_mp_turnout_diff),
            int(self.total_party_turnout_diff),
            int(self.mp_party_diff),
            float(self.registered_per_station),
            float(self.registered_mp_turnout_ratio),
            float(self.registered_party_turnout_ratio),
            float(self.mp_party_error_per_station),
        ]
    }
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct RelationTable {
    pub rows: Vec<RelationRow>,
}

/// The outcome of the classification step.
///
/// Rows whose error per station is missing are in neither set, only counted.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Partition {
    pub interest: Vec<RelationRow>,
    pub uninterest: Vec<RelationRow>,
    pub indeterminate: usize,
}

/// Errors that prevent the relation from being built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RelationErrors {
    /// The metadata document is not a list of records.
    InfoNotAList,
    /// The entry at this position of the metadata document is not a record.
    InfoEntryNotARecord(usize),
    /// The statistics document is not a record.
    StatsNotARecord,
}

impl Error for RelationErrors {}

impl Display for RelationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationErrors::InfoNotAList => {
                write!(f, "constituency metadata is not a list of records")
            }
            RelationErrors::InfoEntryNotARecord(idx) => {
                write!(f, "constituency metadata entry {} is not a record", idx)
            }
            RelationErrors::StatsNotARecord => {
                write!(f, "constituency statistics document is not a record")
            }
        }
    }
}

// ********* Configuration **********

/// Constituencies whose absolute error per station exceeds this value are
/// flagged for manual review.
pub const INTEREST_THRESHOLD: f64 = 3.0;

/// Bin layout of a histogram: `count` bins of width `width` starting at `start`.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct BinLayout {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

impl BinLayout {
    /// Edges -12000, -11800, ..., 12800.
    pub const MP_PARTY_DIFF: BinLayout = BinLayout {
        start: -12000.0,
        width: 200.0,
        count: 124,
    };

    /// Edges -30, -29, ..., 49.
    pub const ERROR_PER_STATION: BinLayout = BinLayout {
        start: -30.0,
        width: 1.0,
        count: 79,
    };

    pub fn edges(&self) -> Vec<f64> {
        (0..=self.count)
            .map(|i| self.start + self.width * i as f64)
            .collect()
    }
}
