mod config;
pub mod manual;
pub mod reader;
pub mod summary;

use log::{debug, info, warn};
use serde_json::Value as JSValue;

use std::{
    cmp::Ordering,
    collections::HashMap,
    ops::{Add, Sub},
};

pub use crate::config::*;

// **** Private structures ****

/// A vote count that may be missing.
///
/// Arithmetic on a missing operand gives a missing result. Overflow also
/// gives a missing result.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct Tally(Option<i64>);

impl Tally {
    const MISSING: Tally = Tally(None);

    /// Floating-point division. A zero denominator follows IEEE rules.
    fn ratio(self, denominator: Tally) -> Option<f64> {
        Some(self.0? as f64 / denominator.0? as f64)
    }
}

impl Add for Tally {
    type Output = Tally;
    fn add(self, rhs: Tally) -> Tally {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => {
                let res = a.checked_add(b);
                if res.is_none() {
                    warn!("vote count overflow: {} + {}", a, b);
                }
                Tally(res)
            }
            _ => Tally::MISSING,
        }
    }
}

impl Sub for Tally {
    type Output = Tally;
    fn sub(self, rhs: Tally) -> Tally {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => {
                let res = a.checked_sub(b);
                if res.is_none() {
                    warn!("vote count overflow: {} - {}", a, b);
                }
                Tally(res)
            }
            _ => Tally::MISSING,
        }
    }
}

/// Lookup of the statistics by constituency identifier.
///
/// Built once per run by flattening the provinces. If an identifier occurs
/// more than once, the first occurrence wins.
pub struct StatsIndex<'a> {
    by_id: HashMap<&'a ConsKey, &'a ConstituencyStats>,
}

impl<'a> StatsIndex<'a> {
    pub fn new(doc: &'a StatsDocument) -> StatsIndex<'a> {
        let mut by_id: HashMap<&'a ConsKey, &'a ConstituencyStats> = HashMap::new();
        let mut duplicates: usize = 0;
        for cons in doc
            .result_province
            .iter()
            .flat_map(|p| p.constituencies.iter())
        {
            if let Some(cid) = cons.cons_id.as_ref() {
                if by_id.contains_key(cid) {
                    duplicates += 1;
                    debug!("StatsIndex: duplicate cons_id {}, keeping the first", cid);
                } else {
                    by_id.insert(cid, cons);
                }
            }
        }
        if duplicates > 0 {
            warn!("{} duplicate constituency ids in the statistics", duplicates);
        }
        StatsIndex { by_id }
    }

    pub fn get(&self, cons_id: &ConsKey) -> Option<&'a ConstituencyStats> {
        self.by_id.get(cons_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Builds the relation from the two raw JSON documents.
///
/// Fails only when a document does not have the expected top-level shape.
pub fn build_relation_from_json(
    info_doc: &JSValue,
    stats_doc: &JSValue,
) -> Result<RelationTable, RelationErrors> {
    let infos = reader::read_info(info_doc)?;
    let stats = reader::read_stats(stats_doc)?;
    Ok(build_relation(&infos, &stats))
}

/// Joins the metadata with the statistics and computes the derived metrics.
///
/// This is a left join: there is exactly one row per metadata entry. The
/// rows are sorted by province, then constituency number.
pub fn build_relation(infos: &[ConstituencyInfo], stats: &StatsDocument) -> RelationTable {
    let index = StatsIndex::new(stats);
    info!(
        "Processing {} constituencies against {} constituency statistics",
        infos.len(),
        index.len()
    );

    let mut unmatched: usize = 0;
    let mut rows: Vec<RelationRow> = infos
        .iter()
        .map(|ci| {
            let found = ci.cons_id.as_ref().and_then(|cid| index.get(cid));
            if found.is_none() {
                unmatched += 1;
                debug!("build_relation: no statistics for cons_id {:?}", ci.cons_id);
            }
            let mut row = join_row(ci, found);
            derive_metrics(&mut row);
            row
        })
        .collect();
    if unmatched > 0 {
        info!("{} constituencies without statistics", unmatched);
    }

    // Stable, so that entries with equal keys keep their document order.
    rows.sort_by(|a, b| {
        cmp_missing_last(&a.prov_id, &b.prov_id)
            .then_with(|| cmp_missing_last(&a.cons_no, &b.cons_no))
    });
    RelationTable { rows }
}

fn join_row(ci: &ConstituencyInfo, stats: Option<&ConstituencyStats>) -> RelationRow {
    let mut row = RelationRow {
        cons_id: ci.cons_id.clone(),
        cons_no: ci.cons_no.clone(),
        prov_id: ci.prov_id.clone(),
        total_vote_stations: ci.total_vote_stations,
        registered_vote: ci.registered_vote,
        ..RelationRow::default()
    };
    if let Some(cs) = stats {
        row.turn_out = cs.turn_out;
        row.valid_votes = cs.valid_votes;
        row.invalid_votes = cs.invalid_votes;
        row.blank_votes = cs.blank_votes;
        row.party_list_turn_out = cs.party_list_turn_out;
        row.party_list_valid_votes = cs.party_list_valid_votes;
        row.party_list_invalid_votes = cs.party_list_invalid_votes;
        row.party_list_blank_votes = cs.party_list_blank_votes;
        row.total_mp_app_votes = sum_votes(cs.candidates.iter().map(|c| c.mp_app_vote));
        row.total_party_list_votes =
            sum_votes(cs.result_party.iter().map(|p| p.party_list_vote));
    }
    row
}

// An empty list sums to zero. An unreadable entry or an overflow makes the
// sum missing.
fn sum_votes(votes: impl Iterator<Item = Option<i64>>) -> Option<i64> {
    let mut total: i64 = 0;
    for vote in votes {
        let v = match vote {
            Some(v) => v,
            None => {
                warn!("unreadable vote count, the vote sum is missing");
                return None;
            }
        };
        match total.checked_add(v) {
            Some(t) => total = t,
            None => {
                warn!("vote count overflow while summing a vote list");
                return None;
            }
        }
    }
    Some(total)
}

fn derive_metrics(row: &mut RelationRow) {
    let stations = Tally(row.total_vote_stations);
    let registered = Tally(row.registered_vote);
    let mp_votes = Tally(row.total_mp_app_votes);
    let party_votes = Tally(row.total_party_list_votes);

    // Ballots accounted for by each count: votes plus invalid plus blank.
    let mp_counted = mp_votes + Tally(row.invalid_votes) + Tally(row.blank_votes);
    let party_counted = party_votes
        + Tally(row.party_list_invalid_votes)
        + Tally(row.party_list_blank_votes);
    let mp_party_diff = mp_counted - party_counted;

    row.total_mp_app_votes_diff = (mp_votes - Tally(row.valid_votes)).0;
    row.total_party_list_votes_diff = (party_votes - Tally(row.party_list_valid_votes)).0;
    row.total_mp_turnout_diff = (Tally(row.turn_out) - mp_counted).0;
    row.total_party_turnout_diff = (Tally(row.party_list_turn_out) - party_counted).0;
    row.mp_party_diff = mp_party_diff.0;
    row.registered_per_station = registered.ratio(stations);
    row.registered_mp_turnout_ratio = mp_counted.ratio(registered);
    row.registered_party_turnout_ratio = party_counted.ratio(registered);
    row.mp_party_error_per_station = mp_party_diff.ratio(stations);
}

fn cmp_missing_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Splits the relation on the absolute error per station, using
/// [INTEREST_THRESHOLD].
pub fn partition(table: &RelationTable) -> Partition {
    partition_with_threshold(table, INTEREST_THRESHOLD)
}

/// Splits the relation on the absolute error per station.
///
/// Above the threshold: of interest. At or below: not of interest. Rows
/// without a value (missing, or NaN from a 0/0 division) go to neither set.
/// Both sets keep the order of the relation.
pub fn partition_with_threshold(table: &RelationTable, threshold: f64) -> Partition {
    let mut res = Partition::default();
    for row in table.rows.iter() {
        match row.mp_party_error_per_station {
            Some(e) if e.is_nan() => res.indeterminate += 1,
            Some(e) if e.abs() > threshold => res.interest.push(row.clone()),
            Some(_) => res.uninterest.push(row.clone()),
            None => res.indeterminate += 1,
        }
    }
    info!(
        "Partition: {} of interest, {} not of interest, {} indeterminate (threshold {})",
        res.interest.len(),
        res.uninterest.len(),
        res.indeterminate,
        threshold
    );
    res
}

/// A copy of the rows sorted by `mp_party_diff`, largest first.
/// Rows without a difference come last.
pub fn sorted_by_mp_party_diff(rows: &[RelationRow]) -> Vec<RelationRow> {
    let mut res = rows.to_vec();
    res.sort_by(|a, b| match (a.mp_party_diff, b.mp_party_diff) {
        (Some(x), Some(y)) => y.cmp(&x),
        (x, y) => cmp_missing_last(&x, &y),
    });
    res
}
