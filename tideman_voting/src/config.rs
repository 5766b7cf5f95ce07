// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A single raw assignment made by a voter: this candidate gets this ranking.
///
/// Raw assignments may conflict with each other (the same ranking given to two
/// candidates, or two rankings given to the same candidate). Conflicts are not
/// errors: they are resolved deterministically when the ballot is reconciled.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RankingAssignment {
    pub candidate: String,
    /// The preference ranking, 1 being the most preferred.
    pub ranking: u32,
}

/// One voter's ballot: the raw assignments exactly in the order they appear in
/// the source data.
///
/// The order of the assignments matters when conflicts occur. See
/// [AssignmentOrder] for details.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    pub voter: String,
    pub assignments: Vec<RankingAssignment>,
}

/// The order in which the raw assignments of a ballot are submitted to the
/// reconciliation procedure.
///
/// The historical behavior is to submit assignments in the order the
/// candidates appear in the source data (usually the column order of a
/// spreadsheet), not in ranking order. The two orders can resolve conflicting
/// assignments differently, so the choice is an explicit parameter.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AssignmentOrder {
    /// Submit the assignments exactly as they appear in the ballot.
    SourceOrder,
    /// Sort the assignments by ascending ranking first (stable).
    AscendingRanking,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContestRules {
    /// The number of winners the contest should produce. The contest may end
    /// with more winners when a tie cannot be broken.
    pub num_winners: u32,
    pub assignment_order: AssignmentOrder,
}

impl ContestRules {
    pub const DEFAULT_RULES: ContestRules = ContestRules {
        num_winners: 1,
        assignment_order: AssignmentOrder::SourceOrder,
    };
}

// ******** Output data structures *********

/// The outcome of one 1v1 match, tallied over all the ballots.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MatchupStats {
    pub left: String,
    pub right: String,
    pub left_votes: u64,
    pub right_votes: u64,
    /// None when the match is an exact tie.
    pub winner: Option<String>,
}

/// A voter's reconciled ballot: the valid rankings only, in ascending ranking
/// order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReconciledBallot {
    pub voter: String,
    pub rankings: Vec<(String, u32)>,
}

/// The remaining 1v1 wins of one candidate at the start of a round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DefeatRecord {
    pub name: String,
    /// The names of the still-in-race candidates this candidate defeats.
    pub defeats: Vec<String>,
}

/// One voter currently backing a candidate in the runoff simulation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SupporterStats {
    pub voter: String,
    /// The valid ranking the voter assigned to the candidate.
    pub ranking: u32,
    /// The Borda count this single ballot contributes to the candidate.
    pub borda_count: u64,
    /// The round in which the voter last moved to a new candidate.
    pub moved_round: u32,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateRunoffStats {
    pub name: String,
    pub supporters: Vec<SupporterStats>,
    /// Net supporters gained during this round.
    pub support_delta: i64,
    /// Only set for last-place candidates during the tie-break computation.
    pub borda_count: Option<u64>,
}

/// Statistics for the instant-runoff pass of one round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunoffStats {
    /// Per-candidate supporter data, taken after reallocation and Borda
    /// scoring but before the eliminations of this pass.
    pub tally: Vec<CandidateRunoffStats>,
    /// Candidates eliminated by this pass, in elimination order.
    pub eliminated: Vec<String>,
    /// Voters who did not cast any valid vote.
    pub unused_voters: Vec<String>,
    /// Voters whose valid preferences have all been eliminated.
    pub exhausted_voters: Vec<String>,
    pub exhausted_this_round: u64,
}

/// Statistics for one full round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// The 1v1 wins of every still-in-race candidate at the start of the
    /// round.
    pub matches: Vec<DefeatRecord>,
    /// The smallest dominating set found this round.
    pub dominating_set: Vec<String>,
    /// Candidates eliminated for falling outside the dominating set.
    pub eliminated_outside: Vec<String>,
    /// Only present when the dominating set was still larger than the target
    /// winner count.
    pub runoff: Option<RunoffStats>,
}

/// The reason a contest terminated.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum EndReason {
    /// Exactly the requested number of winners remains.
    TargetReached,
    /// A full round eliminated nobody: the survivors are tied in a way the
    /// rules cannot break, and all of them are winners.
    UnbreakableTie,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContestResult {
    /// The winners, in the order the candidates were declared.
    pub winners: Vec<String>,
    pub end_reason: EndReason,
    /// Every 1v1 match outcome, computed once before the first round.
    pub matchups: Vec<MatchupStats>,
    /// Every voter's reconciled rankings.
    pub reconciled: Vec<ReconciledBallot>,
    pub round_stats: Vec<RoundStats>,
}

/// Errors that prevent the contest from being resolved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ContestErrors {
    /// No candidates were declared.
    EmptyContest,
    /// The requested number of winners is zero.
    InvalidWinnerCount,
    /// The requested number of winners is not smaller than the number of
    /// candidates.
    TooFewCandidates {
        num_winners: u32,
        num_candidates: usize,
    },
    DuplicateCandidate(String),
    /// A ballot refers to a candidate that was never declared.
    UnknownCandidate { voter: String, candidate: String },
}

impl Error for ContestErrors {}

impl Display for ContestErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContestErrors::EmptyContest => write!(f, "the contest has no candidates"),
            ContestErrors::InvalidWinnerCount => {
                write!(f, "the contest must seek at least one winner")
            }
            ContestErrors::TooFewCandidates {
                num_winners,
                num_candidates,
            } => write!(
                f,
                "a contest must have fewer winners than candidates: {} winners requested but only {} candidates",
                num_winners, num_candidates
            ),
            ContestErrors::DuplicateCandidate(name) => {
                write!(f, "candidate {:?} is declared more than once", name)
            }
            ContestErrors::UnknownCandidate { voter, candidate } => write!(
                f,
                "voter {:?} ranked unknown candidate {:?}",
                voter, candidate
            ),
        }
    }
}
