mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

pub use crate::config::*;

// **** Private structures ****

type RoundId = u32;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct BallotId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum CandidateStatus {
    InRace,
    Won,
    Lost,
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct CandidateInternal {
    name: String,
    status: CandidateStatus,
    // The still-in-race candidates this candidate would beat in a 1v1 match.
    // Populated once by the match engine, only shrunk afterwards.
    defeats: HashSet<CandidateId>,
    // The ballots currently backing this candidate in the runoff simulation.
    supporters: Vec<BallotId>,
    support_delta: i64,
    // Only meaningful while a tie-break is being computed.
    borda_count: Option<u64>,
}

impl CandidateInternal {
    fn new(name: &str) -> CandidateInternal {
        CandidateInternal {
            name: name.to_string(),
            status: CandidateStatus::InRace,
            defeats: HashSet::new(),
            supporters: Vec::new(),
            support_delta: 0,
            borda_count: None,
        }
    }
}

/// One voter's reconciled ranking store.
///
/// Every raw assignment is recorded in an audit trail, keyed both by ranking
/// and by candidate. The valid mappings form a partial bijection at all
/// times: a ranking holds at most one candidate and a candidate holds at most
/// one ranking.
#[derive(Eq, PartialEq, Debug, Clone)]
struct BallotInternal {
    voter: String,
    // The number of distinct rankings a voter may use, which caps the Borda
    // count of a single ballot.
    distinct_rankings: u32,
    audit_by_ranking: HashMap<u32, Vec<CandidateId>>,
    audit_by_candidate: HashMap<CandidateId, Vec<u32>>,
    valid_by_ranking: BTreeMap<u32, CandidateId>,
    valid_by_candidate: HashMap<CandidateId, u32>,
    // Favorite-first traversal state. The traversal is one-shot: once a
    // candidate has been consumed it is never revisited.
    traversal: Vec<CandidateId>,
    traversal_pos: usize,
    last_moved_round: RoundId,
}

impl BallotInternal {
    fn new(voter: &str, distinct_rankings: u32) -> BallotInternal {
        BallotInternal {
            voter: voter.to_string(),
            distinct_rankings,
            audit_by_ranking: HashMap::new(),
            audit_by_candidate: HashMap::new(),
            valid_by_ranking: BTreeMap::new(),
            valid_by_candidate: HashMap::new(),
            traversal: Vec::new(),
            traversal_pos: 0,
            last_moved_round: 0,
        }
    }

    /// Records a raw assignment and reconciles it against the previous ones.
    ///
    /// Rule A (ranking exclusivity): a ranking that was already the target of
    /// any prior assignment rejects the new one and loses its valid candidate
    /// if it had one. A contested ranking never becomes valid again.
    ///
    /// Rule B (candidate exclusivity): a candidate keeps the smaller of two
    /// rankings assigned to it.
    fn assign(&mut self, candidate: CandidateId, ranking: u32) {
        let contested = self.audit_by_ranking.contains_key(&ranking);
        self.audit_by_ranking
            .entry(ranking)
            .or_default()
            .push(candidate);
        self.audit_by_candidate
            .entry(candidate)
            .or_default()
            .push(ranking);

        if contested {
            if let Some(prev) = self.valid_by_ranking.remove(&ranking) {
                debug!(
                    "assign: voter {:?}: ranking {} contested, invalidating {:?}",
                    self.voter, ranking, prev
                );
                self.valid_by_candidate.remove(&prev);
            }
            return;
        }

        if let Some(&prev_ranking) = self.valid_by_candidate.get(&candidate) {
            debug!(
                "assign: voter {:?}: {:?} ranked again (all rankings so far: {:?})",
                self.voter,
                candidate,
                self.audit_by_candidate.get(&candidate)
            );
            if ranking > prev_ranking {
                // The candidate already holds a better ranking.
                return;
            }
            self.valid_by_ranking.remove(&prev_ranking);
            self.valid_by_candidate.remove(&candidate);
        }

        self.valid_by_ranking.insert(ranking, candidate);
        self.valid_by_candidate.insert(candidate, ranking);
    }

    fn cast_valid_vote(&self) -> bool {
        !self.valid_by_ranking.is_empty()
    }

    fn ranking_of(&self, candidate: CandidateId) -> Option<u32> {
        self.valid_by_candidate.get(&candidate).copied()
    }

    /// Initializes the favorite-first traversal from the current valid
    /// rankings. Restarting the traversal discards any previous position.
    fn start_traversal(&mut self) {
        self.traversal = self.valid_by_ranking.values().copied().collect();
        self.traversal_pos = 0;
    }

    /// Advances the traversal to the next candidate that is still in the
    /// race, or returns None once the ballot is exhausted.
    fn next_favorite(&mut self, in_race: &HashSet<CandidateId>) -> Option<CandidateId> {
        while self.traversal_pos < self.traversal.len() {
            let cid = self.traversal[self.traversal_pos];
            self.traversal_pos += 1;
            if in_race.contains(&cid) {
                return Some(cid);
            }
        }
        None
    }

    /// The Borda count this ballot gives to a candidate over the full slate
    /// of rankings: `1 + distinct_rankings - ranking`, or 0 when the
    /// candidate holds no valid ranking.
    fn borda_count(&self, candidate: CandidateId) -> u64 {
        match self.ranking_of(candidate) {
            Some(r) => (1 + self.distinct_rankings as u64).saturating_sub(r as u64),
            None => 0,
        }
    }

    /// The Borda counts this ballot gives in a hypothetical sub-election
    /// restricted to `subset`.
    ///
    /// Members with no valid ranking tie at 0. Ranked members receive
    /// strictly increasing scores, worst to best, starting at the number of
    /// unranked members, so the best-ranked member of the subset gets the
    /// highest score.
    fn borda_counts_within(&self, subset: &[CandidateId]) -> Vec<(CandidateId, u64)> {
        let mut ranked: Vec<(u32, CandidateId)> = subset
            .iter()
            .filter_map(|&cid| self.ranking_of(cid).map(|r| (r, cid)))
            .collect();
        ranked.sort_by_key(|&(r, _)| Reverse(r));
        let num_unranked = (subset.len() - ranked.len()) as u64;

        let mut res: Vec<(CandidateId, u64)> = subset
            .iter()
            .filter(|&&cid| self.ranking_of(cid).is_none())
            .map(|&cid| (cid, 0))
            .collect();
        for (idx, &(_, cid)) in ranked.iter().enumerate() {
            res.push((cid, num_unranked + idx as u64));
        }
        res
    }
}

// **** Contest resolution ****

struct ContestState {
    candidates: Vec<CandidateInternal>,
    ballots: Vec<BallotInternal>,
    num_winners: usize,
    // Kept in candidate declaration order, which makes every tie-breaking
    // sort deterministic.
    in_race: Vec<CandidateId>,
    // Ballots whose runoff support must be recomputed during the next
    // reallocation.
    pending_reallocation: Vec<BallotId>,
    valid_voters: Vec<BallotId>,
    unused_voters: Vec<BallotId>,
    exhausted_voters: Vec<BallotId>,
    exhausted_this_round: u64,
    round: RoundId,
    productive_round: bool,
}

impl ContestState {
    fn cand(&self, cid: CandidateId) -> &CandidateInternal {
        &self.candidates[cid.0 as usize]
    }

    fn cand_mut(&mut self, cid: CandidateId) -> &mut CandidateInternal {
        &mut self.candidates[cid.0 as usize]
    }

    fn name(&self, cid: CandidateId) -> String {
        self.cand(cid).name.clone()
    }

    fn ballot(&self, bid: BallotId) -> &BallotInternal {
        &self.ballots[bid.0 as usize]
    }

    /// Simulates a 1v1 match between every pair of candidates, using all the
    /// ballots. Runs exactly once, over the original candidate set:
    /// eliminations later prune defeat relations but never change match
    /// outcomes.
    fn compute_all_matches(&mut self) -> Vec<MatchupStats> {
        let n = self.candidates.len();
        let mut matchups: Vec<MatchupStats> = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let left = CandidateId(i as u32);
                let right = CandidateId(j as u32);
                let mut left_votes: u64 = 0;
                let mut right_votes: u64 = 0;
                for ballot in self.ballots.iter() {
                    // A missing ranking compares as worst-possible.
                    match (ballot.ranking_of(left), ballot.ranking_of(right)) {
                        (Some(a), Some(b)) if a < b => left_votes += 1,
                        (Some(a), Some(b)) if b < a => right_votes += 1,
                        (Some(_), None) => left_votes += 1,
                        (None, Some(_)) => right_votes += 1,
                        _ => {}
                    }
                }
                let winner = if left_votes > right_votes {
                    self.candidates[i].defeats.insert(right);
                    Some(self.candidates[i].name.clone())
                } else if right_votes > left_votes {
                    self.candidates[j].defeats.insert(left);
                    Some(self.candidates[j].name.clone())
                } else {
                    // An exact tie produces no relation in either direction.
                    None
                };
                matchups.push(MatchupStats {
                    left: self.candidates[i].name.clone(),
                    right: self.candidates[j].name.clone(),
                    left_votes,
                    right_votes,
                    winner,
                });
            }
        }
        debug!("compute_all_matches: {:?} matchups", matchups.len());
        matchups
    }

    /// Partitions the ballots into those that cast at least one valid vote
    /// and those that did not, and queues the former for the first
    /// reallocation.
    fn prepare_runoff(&mut self) {
        for (idx, ballot) in self.ballots.iter_mut().enumerate() {
            let bid = BallotId(idx as u32);
            if ballot.cast_valid_vote() {
                ballot.start_traversal();
                self.valid_voters.push(bid);
                self.pending_reallocation.push(bid);
            } else {
                self.unused_voters.push(bid);
            }
        }
        info!(
            "prepare_runoff: {:?} voters with valid votes, {:?} without",
            self.valid_voters.len(),
            self.unused_voters.len()
        );
    }

    fn eliminate(&mut self, cid: CandidateId) {
        info!("round {}: eliminating {:?}", self.round, self.cand(cid).name);
        debug_assert_eq!(self.cand(cid).status, CandidateStatus::InRace);
        self.cand_mut(cid).status = CandidateStatus::Lost;
        self.in_race.retain(|&c| c != cid);
        for other in self.candidates.iter_mut() {
            other.defeats.remove(&cid);
        }
        // The candidate's supporters move to their next favorite during the
        // next reallocation.
        let freed = std::mem::take(&mut self.cand_mut(cid).supporters);
        self.pending_reallocation.extend(freed);
        self.productive_round = true;
    }

    fn sorted_in_race_by_wins(&self) -> Vec<CandidateId> {
        let mut sorted = self.in_race.clone();
        // The stable sort keeps candidate declaration order among ties.
        sorted.sort_by_key(|&cid| Reverse(self.cand(cid).defeats.len()));
        sorted
    }

    fn set_is_dominating(&self, inside: &[CandidateId], outside: &[CandidateId]) -> bool {
        if inside.is_empty() {
            return false;
        }
        inside.iter().all(|&i| {
            outside
                .iter()
                .all(|o| self.cand(i).defeats.contains(o))
        })
    }

    /// Finds the smallest dominating set of size at least `num_winners` among
    /// the still-in-race candidates and eliminates everyone outside it.
    ///
    /// The set is grown from the most-wins end of the standings: every
    /// dominating set admits a win-count threshold separating it from the
    /// outside, and growing one candidate at a time terminates because the
    /// full remaining field is vacuously dominating.
    fn eliminate_outside_dominating_set(&mut self) -> (Vec<String>, Vec<String>) {
        let sorted = self.sorted_in_race_by_wins();
        let mut split = self.num_winners.min(sorted.len());
        while !self.set_is_dominating(&sorted[..split], &sorted[split..]) {
            split += 1;
        }
        let dominating: Vec<String> = sorted[..split].iter().map(|&c| self.name(c)).collect();
        let outside: Vec<CandidateId> = sorted[split..].to_vec();
        debug!(
            "round {}: dominating set {:?}, eliminating {:?} outside",
            self.round,
            dominating,
            outside.len()
        );
        let mut eliminated: Vec<String> = Vec::new();
        for cid in outside {
            eliminated.push(self.name(cid));
            self.eliminate(cid);
        }
        (dominating, eliminated)
    }

    /// Moves every pending ballot to its next favorite still-in-race
    /// candidate, or retires it as exhausted.
    fn reallocate_voters(&mut self) {
        let in_race_set: HashSet<CandidateId> = self.in_race.iter().copied().collect();
        let pending = std::mem::take(&mut self.pending_reallocation);
        let round = self.round;
        for bid in pending {
            let next = self.ballots[bid.0 as usize].next_favorite(&in_race_set);
            match next {
                Some(cid) => {
                    let cand = self.cand_mut(cid);
                    cand.supporters.push(bid);
                    cand.support_delta += 1;
                }
                None => {
                    self.exhausted_voters.push(bid);
                    self.exhausted_this_round += 1;
                }
            }
            self.ballots[bid.0 as usize].last_moved_round = round;
        }
    }

    /// Recomputes the Borda counts for a tie-break among `last_place`: every
    /// other candidate's count is cleared, and each last-place candidate sums
    /// the within-set scores of every ballot that cast a valid vote.
    fn update_borda_counts(&mut self, last_place: &[CandidateId]) {
        for &cid in self.in_race.clone().iter() {
            self.cand_mut(cid).borda_count = None;
        }
        for &cid in last_place {
            self.cand_mut(cid).borda_count = Some(0);
        }
        let valid = self.valid_voters.clone();
        for bid in valid {
            let scores = self.ballots[bid.0 as usize].borda_counts_within(last_place);
            for (cid, score) in scores {
                if let Some(count) = self.candidates[cid.0 as usize].borda_count.as_mut() {
                    *count += score;
                }
            }
        }
    }

    fn runoff_tally(&self) -> Vec<CandidateRunoffStats> {
        self.in_race
            .iter()
            .map(|&cid| {
                let cand = self.cand(cid);
                let supporters = cand
                    .supporters
                    .iter()
                    .map(|&bid| {
                        let ballot = self.ballot(bid);
                        SupporterStats {
                            voter: ballot.voter.clone(),
                            // The supporter relation implies a valid ranking.
                            ranking: ballot.ranking_of(cid).unwrap_or(0),
                            borda_count: ballot.borda_count(cid),
                            moved_round: ballot.last_moved_round,
                        }
                    })
                    .collect();
                CandidateRunoffStats {
                    name: cand.name.clone(),
                    supporters,
                    support_delta: cand.support_delta,
                    borda_count: cand.borda_count,
                }
            })
            .collect()
    }

    /// Simulates one instant-runoff pass: reallocates pending ballots,
    /// identifies the last-place candidates, and eliminates them in ascending
    /// Borda-count groups for as long as enough candidates remain.
    fn run_runoff_pass(&mut self) -> RunoffStats {
        for cand in self.candidates.iter_mut() {
            cand.support_delta = 0;
        }
        self.exhausted_this_round = 0;
        self.reallocate_voters();

        // The minimum exists: the runoff pass only runs while more
        // candidates remain than winners are requested.
        let min_support = self
            .in_race
            .iter()
            .map(|&cid| self.cand(cid).supporters.len())
            .min()
            .unwrap_or(0);
        let last_place: Vec<CandidateId> = self
            .in_race
            .iter()
            .copied()
            .filter(|&cid| self.cand(cid).supporters.len() == min_support)
            .collect();
        info!(
            "round {}: {:?} last-place candidates at {:?} votes",
            self.round,
            last_place.len(),
            min_support
        );

        self.update_borda_counts(&last_place);

        let mut groups: HashMap<u64, Vec<CandidateId>> = HashMap::new();
        for &cid in last_place.iter() {
            let count = self.cand(cid).borda_count.unwrap_or(0);
            groups.entry(count).or_default().push(cid);
        }
        let mut min_heap: BinaryHeap<Reverse<(u64, Vec<CandidateId>)>> = BinaryHeap::new();
        for (count, group) in groups {
            min_heap.push(Reverse((count, group)));
        }

        let tally = self.runoff_tally();

        let mut eliminated: Vec<String> = Vec::new();
        while !min_heap.is_empty() && self.in_race.len() > self.num_winners {
            let Reverse((count, group)) = min_heap.pop().unwrap();
            if self.in_race.len() - group.len() < self.num_winners {
                // Eliminating the whole tied group would leave too few
                // candidates: the tie cannot be broken this round.
                debug!(
                    "round {}: leaving {:?} candidates with Borda count {:?} in place",
                    self.round,
                    group.len(),
                    count
                );
                break;
            }
            for cid in group {
                eliminated.push(self.name(cid));
                self.eliminate(cid);
            }
        }

        RunoffStats {
            tally,
            eliminated,
            unused_voters: self
                .unused_voters
                .iter()
                .map(|&bid| self.ballot(bid).voter.clone())
                .collect(),
            exhausted_voters: self
                .exhausted_voters
                .iter()
                .map(|&bid| self.ballot(bid).voter.clone())
                .collect(),
            exhausted_this_round: self.exhausted_this_round,
        }
    }

    fn defeat_records(&self) -> Vec<DefeatRecord> {
        self.in_race
            .iter()
            .map(|&cid| DefeatRecord {
                name: self.name(cid),
                defeats: self
                    .in_race
                    .iter()
                    .filter(|&&other| self.cand(cid).defeats.contains(&other))
                    .map(|&other| self.name(other))
                    .collect(),
            })
            .collect()
    }

    fn reconciled_ballots(&self) -> Vec<ReconciledBallot> {
        self.ballots
            .iter()
            .map(|ballot| ReconciledBallot {
                voter: ballot.voter.clone(),
                rankings: ballot
                    .valid_by_ranking
                    .iter()
                    .map(|(&r, &cid)| (self.name(cid), r))
                    .collect(),
            })
            .collect()
    }

    fn run(mut self) -> Result<ContestResult, ContestErrors> {
        let matchups = self.compute_all_matches();
        self.prepare_runoff();
        let reconciled = self.reconciled_ballots();

        let mut round_stats: Vec<RoundStats> = Vec::new();
        while self.in_race.len() > self.num_winners && self.productive_round {
            self.round += 1;
            self.productive_round = false;
            info!(
                "round {}: {:?} candidates in race",
                self.round,
                self.in_race.len()
            );

            let matches = self.defeat_records();
            let (dominating_set, eliminated_outside) = self.eliminate_outside_dominating_set();
            let runoff = if self.in_race.len() > self.num_winners {
                Some(self.run_runoff_pass())
            } else {
                None
            };

            round_stats.push(RoundStats {
                round: self.round,
                matches,
                dominating_set,
                eliminated_outside,
                runoff,
            });
        }

        let end_reason = if self.in_race.len() == self.num_winners {
            EndReason::TargetReached
        } else {
            // A full round eliminated nobody: the contest ends with more
            // winners than requested.
            EndReason::UnbreakableTie
        };
        let winners: Vec<String> = self
            .in_race
            .clone()
            .iter()
            .map(|&cid| {
                self.cand_mut(cid).status = CandidateStatus::Won;
                self.name(cid)
            })
            .collect();
        info!("contest over: winners {:?} ({:?})", winners, end_reason);

        Ok(ContestResult {
            winners,
            end_reason,
            matchups,
            reconciled,
            round_stats,
        })
    }
}

/// Resolves a multi-winner contest with Tideman's alternative method.
///
/// Arguments:
/// * `candidates` the declared candidate names. Their order fixes the
///   conflict-resolution and tie-ordering conventions.
/// * `ballots` the voters' raw ranking assignments, in source order.
/// * `rules` the rules that govern this contest.
///
/// The contest ends when exactly `num_winners` candidates remain, or with
/// more than `num_winners` winners when a full round cannot eliminate anyone.
pub fn run_contest(
    candidates: &[String],
    ballots: &[Ballot],
    rules: &ContestRules,
) -> Result<ContestResult, ContestErrors> {
    info!(
        "run_contest: {:?} candidates, {:?} ballots, rules: {:?}",
        candidates.len(),
        ballots.len(),
        rules
    );
    if candidates.is_empty() {
        return Err(ContestErrors::EmptyContest);
    }
    if rules.num_winners == 0 {
        return Err(ContestErrors::InvalidWinnerCount);
    }
    if rules.num_winners as usize >= candidates.len() {
        return Err(ContestErrors::TooFewCandidates {
            num_winners: rules.num_winners,
            num_candidates: candidates.len(),
        });
    }

    let mut ids: HashMap<String, CandidateId> = HashMap::new();
    let mut arena: Vec<CandidateInternal> = Vec::new();
    for name in candidates {
        if ids
            .insert(name.clone(), CandidateId(arena.len() as u32))
            .is_some()
        {
            return Err(ContestErrors::DuplicateCandidate(name.clone()));
        }
        arena.push(CandidateInternal::new(name));
    }

    let mut internal_ballots: Vec<BallotInternal> = Vec::new();
    for ballot in ballots {
        let mut internal = BallotInternal::new(&ballot.voter, candidates.len() as u32);
        let mut assignments = ballot.assignments.clone();
        if rules.assignment_order == AssignmentOrder::AscendingRanking {
            assignments.sort_by_key(|a| a.ranking);
        }
        for assignment in assignments {
            let cid = *ids.get(&assignment.candidate).ok_or_else(|| {
                ContestErrors::UnknownCandidate {
                    voter: ballot.voter.clone(),
                    candidate: assignment.candidate.clone(),
                }
            })?;
            internal.assign(cid, assignment.ranking);
        }
        internal_ballots.push(internal);
    }

    let in_race: Vec<CandidateId> = (0..arena.len() as u32).map(CandidateId).collect();
    let state = ContestState {
        candidates: arena,
        ballots: internal_ballots,
        num_winners: rules.num_winners as usize,
        in_race,
        pending_reallocation: Vec::new(),
        valid_voters: Vec::new(),
        unused_voters: Vec::new(),
        exhausted_voters: Vec::new(),
        exhausted_this_round: 0,
        round: 0,
        productive_round: true,
    };
    state.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot_with(assignments: &[(u32, u32)]) -> BallotInternal {
        let mut ballot = BallotInternal::new("v", 5);
        for &(cid, r) in assignments {
            ballot.assign(CandidateId(cid), r);
        }
        ballot
    }

    fn assert_partial_bijection(ballot: &BallotInternal) {
        for (&r, &cid) in ballot.valid_by_ranking.iter() {
            assert_eq!(ballot.valid_by_candidate.get(&cid), Some(&r));
        }
        for (&cid, &r) in ballot.valid_by_candidate.iter() {
            assert_eq!(ballot.valid_by_ranking.get(&r), Some(&cid));
        }
    }

    #[test]
    fn duplicate_ranking_invalidates_both() {
        let ballot = ballot_with(&[(0, 1), (1, 1)]);
        assert!(ballot.valid_by_ranking.is_empty());
        assert!(!ballot.cast_valid_vote());
        assert_partial_bijection(&ballot);
    }

    #[test]
    fn contested_ranking_never_recovers() {
        let ballot = ballot_with(&[(0, 1), (1, 1), (2, 1)]);
        assert!(ballot.valid_by_ranking.is_empty());
        assert_partial_bijection(&ballot);
    }

    #[test]
    fn reranked_candidate_keeps_better_ranking() {
        let ballot = ballot_with(&[(0, 3), (0, 1)]);
        assert_eq!(ballot.ranking_of(CandidateId(0)), Some(1));
        assert!(!ballot.valid_by_ranking.contains_key(&3));
        assert_partial_bijection(&ballot);
    }

    #[test]
    fn reranked_candidate_rejects_worse_ranking() {
        let ballot = ballot_with(&[(0, 1), (0, 3)]);
        assert_eq!(ballot.ranking_of(CandidateId(0)), Some(1));
        assert_partial_bijection(&ballot);
    }

    #[test]
    fn identical_assignment_twice_contests_the_ranking() {
        let ballot = ballot_with(&[(0, 1), (0, 1)]);
        assert_eq!(ballot.ranking_of(CandidateId(0)), None);
        assert_partial_bijection(&ballot);
    }

    #[test]
    fn bijection_holds_under_conflict_storm() {
        let ballot = ballot_with(&[(0, 2), (1, 2), (0, 1), (2, 3), (2, 1), (3, 4), (3, 2)]);
        assert_partial_bijection(&ballot);
    }

    #[test]
    fn borda_count_full_slate() {
        let ballot = ballot_with(&[(0, 1), (1, 2)]);
        // 5 distinct rankings: 1 + 5 - r.
        assert_eq!(ballot.borda_count(CandidateId(0)), 5);
        assert_eq!(ballot.borda_count(CandidateId(1)), 4);
        assert_eq!(ballot.borda_count(CandidateId(2)), 0);
    }

    #[test]
    fn borda_counts_within_subset() {
        let ballot = ballot_with(&[(0, 1), (1, 5)]);
        let subset = [CandidateId(0), CandidateId(1), CandidateId(2)];
        let mut scores = ballot.borda_counts_within(&subset);
        scores.sort();
        // One unranked member: the worst ranked member starts at 1.
        assert_eq!(
            scores,
            vec![
                (CandidateId(0), 2),
                (CandidateId(1), 1),
                (CandidateId(2), 0)
            ]
        );
    }

    #[test]
    fn borda_counts_within_is_idempotent() {
        let ballot = ballot_with(&[(0, 2), (1, 1), (2, 4)]);
        let subset = [CandidateId(0), CandidateId(1), CandidateId(2)];
        let mut first = ballot.borda_counts_within(&subset);
        let mut second = ballot.borda_counts_within(&subset);
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }

    #[test]
    fn traversal_skips_eliminated_and_is_one_shot() {
        let mut ballot = ballot_with(&[(0, 1), (1, 2), (2, 3)]);
        ballot.start_traversal();
        let in_race: HashSet<CandidateId> =
            [CandidateId(1), CandidateId(2)].iter().copied().collect();
        assert_eq!(ballot.next_favorite(&in_race), Some(CandidateId(1)));
        assert_eq!(ballot.next_favorite(&in_race), Some(CandidateId(2)));
        assert_eq!(ballot.next_favorite(&in_race), None);
        // Exhausted for good until the traversal is restarted.
        assert_eq!(ballot.next_favorite(&in_race), None);
        ballot.start_traversal();
        assert_eq!(ballot.next_favorite(&in_race), Some(CandidateId(1)));
    }

    #[test]
    fn traversal_ignores_invalidated_rankings() {
        // Ranking 2 is contested between candidates 1 and 3.
        let mut ballot = ballot_with(&[(0, 1), (1, 2), (3, 2), (2, 3)]);
        ballot.start_traversal();
        let in_race: HashSet<CandidateId> = (0..4).map(CandidateId).collect();
        assert_eq!(ballot.next_favorite(&in_race), Some(CandidateId(0)));
        assert_eq!(ballot.next_favorite(&in_race), Some(CandidateId(2)));
        assert_eq!(ballot.next_favorite(&in_race), None);
    }
}
