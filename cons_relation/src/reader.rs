//! Decoding of the two source documents.
//!
//! Field access is lenient: an absent key, a `null`, or a value of the wrong
//! type is read as a missing value instead of failing the whole document.
//! Only the top-level shape of a document is checked.

use log::{debug, warn};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::config::*;

/// Decodes the metadata document: a list of constituency records.
pub fn read_info(doc: &JSValue) -> Result<Vec<ConstituencyInfo>, RelationErrors> {
    let entries = doc.as_array().ok_or(RelationErrors::InfoNotAList)?;
    let mut res: Vec<ConstituencyInfo> = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let obj = entry
            .as_object()
            .ok_or(RelationErrors::InfoEntryNotARecord(idx))?;
        res.push(ConstituencyInfo {
            cons_id: read_js_key(obj.get("cons_id")),
            cons_no: read_js_key(obj.get("cons_no")),
            prov_id: read_js_key(obj.get("prov_id")),
            total_vote_stations: read_js_count(obj.get("total_vote_stations")),
            registered_vote: read_js_count(obj.get("registered_vote")),
        });
    }
    debug!("read_info: {} constituencies", res.len());
    Ok(res)
}

/// Decodes the statistics document: `result_province[].constituencies[]`.
///
/// Provinces or constituencies that are not records are skipped.
pub fn read_stats(doc: &JSValue) -> Result<StatsDocument, RelationErrors> {
    let obj = doc.as_object().ok_or(RelationErrors::StatsNotARecord)?;
    let result_province = js_list(obj, "result_province")
        .iter()
        .filter_map(|p| p.as_object())
        .map(|p| ProvinceStats {
            constituencies: js_list(p, "constituencies")
                .iter()
                .filter_map(|c| c.as_object())
                .map(read_constituency_stats)
                .collect(),
        })
        .collect::<Vec<_>>();
    debug!("read_stats: {} provinces", result_province.len());
    Ok(StatsDocument { result_province })
}

fn read_constituency_stats(obj: &JSMap<String, JSValue>) -> ConstituencyStats {
    ConstituencyStats {
        cons_id: read_js_key(obj.get("cons_id")),
        turn_out: read_js_count(obj.get("turn_out")),
        valid_votes: read_js_count(obj.get("valid_votes")),
        invalid_votes: read_js_count(obj.get("invalid_votes")),
        blank_votes: read_js_count(obj.get("blank_votes")),
        party_list_turn_out: read_js_count(obj.get("party_list_turn_out")),
        party_list_valid_votes: read_js_count(obj.get("party_list_valid_votes")),
        party_list_invalid_votes: read_js_count(obj.get("party_list_invalid_votes")),
        party_list_blank_votes: read_js_count(obj.get("party_list_blank_votes")),
        candidates: js_list(obj, "candidates")
            .iter()
            .map(|c| CandidateResult {
                mp_app_vote: read_js_vote(c, "mp_app_vote"),
            })
            .collect(),
        result_party: js_list(obj, "result_party")
            .iter()
            .map(|p| PartyResult {
                party_list_vote: read_js_vote(p, "party_list_vote"),
            })
            .collect(),
    }
}

// A missing or non-list entry reads as an empty list.
fn js_list<'a>(obj: &'a JSMap<String, JSValue>, key: &str) -> &'a [JSValue] {
    match obj.get(key) {
        Some(JSValue::Array(l)) => l.as_slice(),
        _ => &[],
    }
}

/// Reads a vote count. Integral floats and numeric strings are accepted.
pub fn read_js_count(x: Option<&JSValue>) -> Option<i64> {
    match x {
        Some(JSValue::Number(n)) => n.as_i64().or_else(|| match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
            _ => {
                debug!("read_js_count: not an integral count: {}", n);
                None
            }
        }),
        Some(JSValue::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Reads the count of a candidate or party entry.
///
/// An absent key counts as 0. A key that is present but cannot be read as a
/// count, or an entry that is not a record, gives `None`.
pub fn read_js_vote(entry: &JSValue, key: &str) -> Option<i64> {
    match entry.as_object().map(|obj| obj.get(key)) {
        Some(None) => Some(0),
        Some(Some(x)) => {
            let res = read_js_count(Some(x));
            if res.is_none() {
                warn!("unreadable vote count {}: {}", key, x);
            }
            res
        }
        None => {
            warn!("vote entry is not a record: {}", entry);
            None
        }
    }
}

/// Reads an identifier: an integer or a non-empty text.
pub fn read_js_key(x: Option<&JSValue>) -> Option<ConsKey> {
    match x {
        Some(JSValue::Number(n)) => n.as_i64().map(ConsKey::Int),
        Some(JSValue::String(s)) if !s.is_empty() => Some(ConsKey::Text(s.clone())),
        _ => None,
    }
}
