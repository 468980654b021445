/*!

This is the long-form manual for `cons_relation` and the `retrieve` / `reconcile` programs.

## Input documents

Two JSON documents are read from the data directory:

* `info_constituency.json` a list of records, one per constituency:
  `cons_id`, `cons_no`, `prov_id`, `total_vote_stations`, `registered_vote`.
* `stats_cons.json` a record holding `result_province`, a list of provinces, each
  holding `constituencies`, a list of tallies. A tally has the constituency-seat
  figures (`turn_out`, `valid_votes`, `invalid_votes`, `blank_votes`), the
  party-list figures (`party_list_turn_out`, `party_list_valid_votes`,
  `party_list_invalid_votes`, `party_list_blank_votes`), the per-candidate votes
  `candidates[].mp_app_vote` and the per-party votes `result_party[].party_list_vote`.

Fields are read leniently. A missing key, a `null` or a value that is not a number
is a missing value. Identifiers may be integers or texts, and `1` does not match `"1"`.

## The relation

Every metadata entry gives exactly one row, whether or not the statistics have
an entry for it. Without statistics, all the tally fields of the row are missing.
A metadata entry without `cons_id` never matches any statistics, not even a
statistics entry that also lacks `cons_id`.

The derived columns are:

| column | formula |
|--------|---------|
| `total_mp_app_votes` | sum of `candidates[].mp_app_vote` |
| `total_party_list_votes` | sum of `result_party[].party_list_vote` |
| `total_mp_app_votes_diff` | `total_mp_app_votes - valid_votes` |
| `total_party_list_votes_diff` | `total_party_list_votes - party_list_valid_votes` |
| `total_mp_turnout_diff` | `turn_out - (total_mp_app_votes + invalid_votes + blank_votes)` |
| `total_party_turnout_diff` | `party_list_turn_out - (total_party_list_votes + party_list_invalid_votes + party_list_blank_votes)` |
| `mp_party_diff` | `(total_mp_app_votes + invalid_votes + blank_votes) - (total_party_list_votes + party_list_invalid_votes + party_list_blank_votes)` |
| `registered_per_station` | `registered_vote / total_vote_stations` |
| `registered_mp_turnout_ratio` | `(total_mp_app_votes + invalid_votes + blank_votes) / registered_vote` |
| `registered_party_turnout_ratio` | `(total_party_list_votes + party_list_invalid_votes + party_list_blank_votes) / registered_vote` |
| `mp_party_error_per_station` | `mp_party_diff / total_vote_stations` |

Any missing operand makes the result missing. The two sums are the exception: a
candidate or party entry without the count key adds zero, and an empty list sums
to zero. A count that is present but unreadable (`null`, `2.5`, `"n/a"`) makes
the sum missing, as does an overflow.
Ratios are floating point; dividing by zero stations gives an infinite value, or
NaN when the numerator is zero as well.

Rows are ordered by `prov_id`, then `cons_no`.

## Classification

A constituency is *of interest* when `|mp_party_error_per_station| > 3`, i.e. when
the two ballots disagree by more than three ballots per vote station on average.
It is *not of interest* otherwise. Rows where the value is missing or NaN are in
neither set; `reconcile` reports how many there are.

## Outputs

`reconcile` writes in the data directory:

* `relation_constituency`, `interest_constituency` and `uninterest_constituency`,
  each as `.json` (list of records) and `.xlsx` (sheet `Constituencies`)
* `mp_party_diff_histogram.svg`, `mp_party_error_per_station_histogram.svg`
* `interest_constituency_mp_party_diff.svg`, when there is at least one
  constituency of interest

*/
