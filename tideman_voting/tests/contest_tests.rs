use tideman_voting::builder::Builder;
use tideman_voting::{
    AssignmentOrder, ContestErrors, ContestResult, ContestRules, EndReason, run_contest,
};

fn rules(num_winners: u32) -> ContestRules {
    ContestRules {
        num_winners,
        ..ContestRules::DEFAULT_RULES
    }
}

fn resolve(
    candidates: &[&str],
    ballots: &[(&str, &[(&str, u32)])],
    num_winners: u32,
) -> ContestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut builder = Builder::new(&rules(num_winners))
        .unwrap()
        .candidates(
            &candidates
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<String>>(),
        )
        .unwrap();
    for (voter, assignments) in ballots {
        let owned: Vec<(String, u32)> = assignments
            .iter()
            .map(|(name, r)| (name.to_string(), *r))
            .collect();
        builder.add_ballot(voter, &owned).unwrap();
    }
    builder.run().unwrap()
}

#[test]
fn condorcet_winner_without_runoff() {
    // A beats B 2-1, A beats C 3-0, B beats C 3-0: {A} dominates alone.
    let result = resolve(
        &["A", "B", "C"],
        &[
            ("v1", &[("A", 1), ("B", 2), ("C", 3)]),
            ("v2", &[("A", 1), ("B", 2), ("C", 3)]),
            ("v3", &[("B", 1), ("A", 2), ("C", 3)]),
        ],
        1,
    );

    assert_eq!(result.winners, vec!["A".to_string()]);
    assert_eq!(result.end_reason, EndReason::TargetReached);
    assert_eq!(result.round_stats.len(), 1);
    let round = &result.round_stats[0];
    assert_eq!(round.dominating_set, vec!["A".to_string()]);
    assert_eq!(
        round.eliminated_outside,
        vec!["B".to_string(), "C".to_string()]
    );
    assert!(round.runoff.is_none());

    let ab = result
        .matchups
        .iter()
        .find(|m| m.left == "A" && m.right == "B")
        .unwrap();
    assert_eq!((ab.left_votes, ab.right_votes), (2, 1));
    assert_eq!(ab.winner, Some("A".to_string()));
    let ac = result
        .matchups
        .iter()
        .find(|m| m.left == "A" && m.right == "C")
        .unwrap();
    assert_eq!((ac.left_votes, ac.right_votes), (3, 0));
}

#[test]
fn runoff_breaks_three_way_last_place_by_borda() {
    // No candidate dominates: A beats B, B beats C and A-C is an exact tie,
    // so the dominating set grows to the full field and the runoff decides.
    let result = resolve(
        &["A", "B", "C"],
        &[
            ("v1", &[("A", 1), ("B", 2), ("C", 3)]),
            ("v2", &[("A", 1), ("B", 2), ("C", 3)]),
            ("v3", &[("C", 1), ("A", 2), ("B", 3)]),
            ("v4", &[("C", 1), ("A", 2), ("B", 3)]),
            ("v5", &[("B", 1), ("A", 2), ("C", 3)]),
            ("v6", &[("B", 1), ("C", 2), ("A", 3)]),
        ],
        1,
    );

    let ac = result
        .matchups
        .iter()
        .find(|m| m.left == "A" && m.right == "C")
        .unwrap();
    assert_eq!((ac.left_votes, ac.right_votes), (3, 3));
    assert_eq!(ac.winner, None);

    assert_eq!(result.round_stats.len(), 1);
    let round = &result.round_stats[0];
    // The dominating set had to grow until it covered everyone.
    assert_eq!(round.dominating_set.len(), 3);
    assert!(round.eliminated_outside.is_empty());

    let runoff = round.runoff.as_ref().unwrap();
    // All three tie at 2 supporters; Borda counts are A=7, B=6, C=5.
    let borda = |name: &str| {
        runoff
            .tally
            .iter()
            .find(|t| t.name == name)
            .unwrap()
            .borda_count
    };
    assert_eq!(borda("A"), Some(7));
    assert_eq!(borda("B"), Some(6));
    assert_eq!(borda("C"), Some(5));
    assert_eq!(
        runoff.eliminated,
        vec!["C".to_string(), "B".to_string()]
    );

    assert_eq!(result.winners, vec!["A".to_string()]);
    assert_eq!(result.end_reason, EndReason::TargetReached);
}

#[test]
fn unbreakable_tie_reports_extra_winners() {
    // Exact head-to-head tie and equal Borda counts: nobody can go.
    let result = resolve(
        &["A", "B"],
        &[
            ("v1", &[("A", 1), ("B", 2)]),
            ("v2", &[("B", 1), ("A", 2)]),
        ],
        1,
    );

    assert_eq!(result.end_reason, EndReason::UnbreakableTie);
    assert_eq!(result.winners, vec!["A".to_string(), "B".to_string()]);
    let runoff = result.round_stats[0].runoff.as_ref().unwrap();
    assert!(runoff.eliminated.is_empty());
}

#[test]
fn cycle_with_unused_and_exhausted_voters() {
    // A, B and C form a pairwise cycle and everybody beats D. Voter v4 only
    // ranked D and exhausts once D goes; v5 cast no valid vote at all.
    let result = resolve(
        &["A", "B", "C", "D"],
        &[
            ("v1", &[("A", 1), ("B", 2), ("C", 3)]),
            ("v2", &[("B", 1), ("C", 2), ("A", 3)]),
            ("v3", &[("C", 1), ("A", 2), ("B", 3)]),
            ("v4", &[("D", 1)]),
            ("v5", &[("A", 1), ("B", 1)]),
        ],
        1,
    );

    assert_eq!(result.round_stats.len(), 2);
    let round1 = &result.round_stats[0];
    assert_eq!(round1.eliminated_outside, vec!["D".to_string()]);
    let runoff1 = round1.runoff.as_ref().unwrap();
    assert_eq!(runoff1.unused_voters, vec!["v5".to_string()]);
    assert_eq!(runoff1.exhausted_voters, vec!["v4".to_string()]);
    assert_eq!(runoff1.exhausted_this_round, 1);
    // The three-way Borda tie cannot be broken without dropping below the
    // target, so nobody is eliminated.
    assert!(runoff1.eliminated.is_empty());

    assert_eq!(result.end_reason, EndReason::UnbreakableTie);
    assert_eq!(
        result.winners,
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    );

    // The in-race field never grows from one round to the next.
    let mut prev = usize::MAX;
    for round in result.round_stats.iter() {
        assert!(round.matches.len() <= prev);
        prev = round.matches.len();
    }
}

#[test]
fn reconciled_ballot_is_a_partial_bijection() {
    let result = resolve(
        &["A", "B", "C", "D"],
        &[(
            "v1",
            &[("A", 2), ("B", 2), ("A", 1), ("C", 3), ("C", 1), ("D", 4)],
        )],
        1,
    );
    let reconciled = &result.reconciled[0];
    let mut rankings_seen = std::collections::HashSet::new();
    let mut candidates_seen = std::collections::HashSet::new();
    for (name, r) in reconciled.rankings.iter() {
        assert!(rankings_seen.insert(*r), "ranking {} bound twice", r);
        assert!(candidates_seen.insert(name.clone()));
    }
}

#[test]
fn assignment_order_is_an_explicit_parameter() {
    let candidates = vec!["C".to_string(), "D".to_string()];
    let ballots = vec![tideman_voting::Ballot {
        voter: "v1".to_string(),
        assignments: vec![
            tideman_voting::RankingAssignment {
                candidate: "C".to_string(),
                ranking: 2,
            },
            tideman_voting::RankingAssignment {
                candidate: "C".to_string(),
                ranking: 1,
            },
            tideman_voting::RankingAssignment {
                candidate: "D".to_string(),
                ranking: 1,
            },
        ],
    }];

    // In source order, C is rebound to ranking 1 before D contests it: the
    // contested ranking drags C down with it and the ballot ends empty.
    let source = run_contest(&candidates, &ballots, &rules(1)).unwrap();
    assert!(source.reconciled[0].rankings.is_empty());

    // In ascending ranking order, ranking 1 is contested before C ever
    // claims it, so C's ranking 2 survives.
    let sorted_rules = ContestRules {
        num_winners: 1,
        assignment_order: AssignmentOrder::AscendingRanking,
    };
    let sorted = run_contest(&candidates, &ballots, &sorted_rules).unwrap();
    assert_eq!(sorted.reconciled[0].rankings, vec![("C".to_string(), 2)]);
}

#[test]
fn configuration_errors() {
    let candidates = vec!["A".to_string(), "B".to_string()];
    let no_ballots: Vec<tideman_voting::Ballot> = Vec::new();

    assert_eq!(
        run_contest(&candidates, &no_ballots, &rules(2)),
        Err(ContestErrors::TooFewCandidates {
            num_winners: 2,
            num_candidates: 2
        })
    );
    assert_eq!(
        run_contest(&candidates, &no_ballots, &rules(0)),
        Err(ContestErrors::InvalidWinnerCount)
    );
    assert_eq!(
        run_contest(&[], &no_ballots, &rules(1)),
        Err(ContestErrors::EmptyContest)
    );
    assert_eq!(
        run_contest(
            &["A".to_string(), "A".to_string(), "B".to_string()],
            &no_ballots,
            &rules(1)
        ),
        Err(ContestErrors::DuplicateCandidate("A".to_string()))
    );

    let mut builder = Builder::new(&rules(1)).unwrap().candidates(&candidates).unwrap();
    builder
        .add_ballot("v1", &[("Nobody".to_string(), 1)])
        .unwrap();
    assert_eq!(
        builder.run(),
        Err(ContestErrors::UnknownCandidate {
            voter: "v1".to_string(),
            candidate: "Nobody".to_string()
        })
    );
}

#[test]
fn multi_winner_target_is_respected() {
    // With two winners requested, only the weakest candidate must go.
    let result = resolve(
        &["A", "B", "C"],
        &[
            ("v1", &[("A", 1), ("B", 2), ("C", 3)]),
            ("v2", &[("A", 1), ("B", 2), ("C", 3)]),
            ("v3", &[("B", 1), ("A", 2), ("C", 3)]),
        ],
        2,
    );
    assert_eq!(result.winners, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(result.end_reason, EndReason::TargetReached);
    assert_eq!(
        result.round_stats[0].eliminated_outside,
        vec!["C".to_string()]
    );
}
