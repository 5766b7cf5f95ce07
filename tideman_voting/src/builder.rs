pub use crate::config::*;

use crate::run_contest;

/// A builder for declaring candidates and adding ballots.
///
/// ```
/// pub use tideman_voting::builder::Builder;
/// pub use tideman_voting::ContestRules;
/// # use tideman_voting::ContestErrors;
///
/// let mut builder = Builder::new(&ContestRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_ballot("voter 1", &[("Anna".to_string(), 1), ("Bob".to_string(), 2)])?;
/// builder.add_ballot("voter 2", &[("Bob".to_string(), 1), ("Anna".to_string(), 2)])?;
/// builder.add_ballot("voter 3", &[("Anna".to_string(), 1)])?;
///
/// let result = builder.run()?;
/// assert_eq!(result.winners, vec!["Anna".to_string()]);
/// # Ok::<(), ContestErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ContestRules,
    pub(crate) _candidates: Option<Vec<String>>,
    pub(crate) _ballots: Vec<Ballot>,
}

impl Builder {
    pub fn new(rules: &ContestRules) -> Result<Builder, ContestErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _candidates: None,
            _ballots: Vec::new(),
        })
    }

    /// Declares the candidates. Their order is significant: it is the order
    /// used to resolve ranking conflicts and to break sorting ties.
    pub fn candidates(self, names: &[String]) -> Result<Builder, ContestErrors> {
        Ok(Builder {
            _rules: self._rules,
            _candidates: Some(names.to_vec()),
            _ballots: Vec::new(),
        })
    }

    /// Adds a ballot as a sequence of (candidate, ranking) assignments in
    /// source order. Conflicting assignments are acceptable; they are
    /// reconciled when the contest runs.
    pub fn add_ballot(
        &mut self,
        voter: &str,
        assignments: &[(String, u32)],
    ) -> Result<(), ContestErrors> {
        let ballot = Ballot {
            voter: voter.to_string(),
            assignments: assignments
                .iter()
                .map(|(candidate, ranking)| RankingAssignment {
                    candidate: candidate.clone(),
                    ranking: *ranking,
                })
                .collect(),
        };
        self.add_ballot_2(&ballot)
    }

    pub fn add_ballot_2(&mut self, ballot: &Ballot) -> Result<(), ContestErrors> {
        self._ballots.push(ballot.clone());
        Ok(())
    }

    /// Resolves the contest with the accumulated ballots.
    pub fn run(&self) -> Result<ContestResult, ContestErrors> {
        let candidates = self
            ._candidates
            .as_deref()
            .ok_or(ContestErrors::EmptyContest)?;
        run_contest(candidates, &self._ballots, &self._rules)
    }
}
