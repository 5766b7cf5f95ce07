use log::{debug, info, warn};

use tideman_voting::*;

use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;

use calamine::{open_workbook, Reader, Xlsx};

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

// How wide in characters the vote bars of the instant-runoff chart are when
// the bar represents 100%.
const NUM_CHARS_IN_FULL_VOTE_BAR: usize = 100;
const NUM_CHARS_IN_DIVIDER: usize = 100;

// Column titles shared between the spreadsheets and the console output.
const INVALID_VOTER_COLUMN_NAME: &str = "voters who didn't cast any valid votes";
const ELIMINATED_VOTER_COLUMN_NAME: &str = "voters whose valid preferences have all been eliminated";
const MATCH_VOTES_VOTER_COLUMN_NAME: &str = "voter";
const MATCH_SUMMARY_NUM_WINS_COLUMN_NAME: &str = "number of wins";

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading row {lineno}"))]
    CsvLine { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing spreadsheet {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no sheets"))]
    EmptyExcel { path: String },
    #[snafu(display("The spreadsheet has no header row"))]
    MissingHeader {},
    #[snafu(display(
        "Row {lineno}: the ranking {value:?} for candidate {candidate:?} is not a number"
    ))]
    BadRanking {
        lineno: usize,
        candidate: String,
        value: String,
    },
    #[snafu(display("Error reading the reference summary"))]
    OpeningJson { source: std::io::Error },
    #[snafu(display("Error processing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The contest could not be resolved"))]
    Resolution { source: ContestErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type CliResult<T> = Result<T, CliError>;

// ******** Input readers *********

/// Reads a CSV ranking matrix: header names the candidates (first cell is the
/// voter column), every following row is one voter's rankings in column
/// order.
fn read_csv_matrix(path: &str) -> CliResult<(Vec<String>, Vec<Ballot>)> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path.to_string(),
        })?;
    let mut records = rdr.into_records();
    let header = records
        .next()
        .context(MissingHeaderSnafu {})?
        .context(CsvLineSnafu { lineno: 1usize })?;
    let candidates: Vec<String> = header
        .iter()
        .skip(1)
        .map(|s| s.trim().to_string())
        .collect();
    debug!("read_csv_matrix: candidates: {:?}", candidates);

    let mut ballots: Vec<Ballot> = Vec::new();
    for (idx, record) in records.enumerate() {
        let lineno = idx + 2;
        let line = record.context(CsvLineSnafu { lineno })?;
        let voter = match line.get(0) {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => format!("ballot-{:08}", lineno),
        };
        if line.len() > candidates.len() + 1 {
            warn!(
                "read_csv_matrix: row {} has {} cells for {} candidates, ignoring the extras",
                lineno,
                line.len() - 1,
                candidates.len()
            );
        }
        let mut assignments: Vec<RankingAssignment> = Vec::new();
        for (cell, candidate) in line.iter().skip(1).zip(candidates.iter()) {
            let content = cell.trim();
            if content.is_empty() {
                continue;
            }
            let ranking = content.parse::<u32>().ok().context(BadRankingSnafu {
                lineno,
                candidate: candidate.clone(),
                value: content.to_string(),
            })?;
            assignments.push(RankingAssignment {
                candidate: candidate.clone(),
                ranking,
            });
        }
        debug!(
            "read_csv_matrix: row {:?} voter {:?}: {:?} assignments",
            lineno,
            voter,
            assignments.len()
        );
        ballots.push(Ballot { voter, assignments });
    }
    Ok((candidates, ballots))
}

/// Reads the same ranking matrix from the first sheet of an Excel workbook.
fn read_excel_matrix(path: &str) -> CliResult<(Vec<String>, Vec<Ballot>)> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: path.to_string(),
    })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu {
            path: path.to_string(),
        })?
        .context(OpeningExcelSnafu {
            path: path.to_string(),
        })?;
    let mut rows = wrange.rows();
    let header = rows.next().context(MissingHeaderSnafu {})?;
    let candidates: Vec<String> = header
        .iter()
        .skip(1)
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    debug!("read_excel_matrix: candidates: {:?}", candidates);

    let mut ballots: Vec<Ballot> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let lineno = idx + 2;
        let voter = match row.first() {
            Some(calamine::DataType::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => format!("ballot-{:08}", lineno),
        };
        let mut assignments: Vec<RankingAssignment> = Vec::new();
        for (cell, candidate) in row.iter().skip(1).zip(candidates.iter()) {
            let ranking = match cell {
                calamine::DataType::Empty => continue,
                calamine::DataType::Int(i) if *i >= 0 => *i as u32,
                calamine::DataType::Float(f) if *f >= 0.0 && f.fract() == 0.0 => *f as u32,
                calamine::DataType::String(s) if s.trim().is_empty() => continue,
                calamine::DataType::String(s) => {
                    s.trim().parse::<u32>().ok().context(BadRankingSnafu {
                        lineno,
                        candidate: candidate.clone(),
                        value: s.clone(),
                    })?
                }
                other => whatever!(
                    "could not understand cell {:?} at row {:?} for candidate {:?}",
                    other,
                    lineno,
                    candidate
                ),
            };
            assignments.push(RankingAssignment {
                candidate: candidate.clone(),
                ranking,
            });
        }
        ballots.push(Ballot { voter, assignments });
    }
    Ok((candidates, ballots))
}

// ******** Console rendering *********

fn print_round_banner(round: u32) {
    println!();
    println!("{}", "#".repeat(NUM_CHARS_IN_DIVIDER));
    println!("{:#^width$}", format!(" ROUND {} ", round), width = NUM_CHARS_IN_DIVIDER);
    println!("{}", "#".repeat(NUM_CHARS_IN_DIVIDER));
}

fn print_match_summary(matches: &[DefeatRecord]) {
    println!();
    println!("Candidates still in the race:");
    println!();
    let mut sorted: Vec<&DefeatRecord> = matches.iter().collect();
    sorted.sort_by_key(|record| std::cmp::Reverse(record.defeats.len()));
    let longest_name = matches.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for record in sorted {
        let win_text = if record.defeats.len() == 1 { "win" } else { "wins" };
        let mut line = format!(
            "\t{:<width$} {} 1v1 {}",
            format!("{}:", record.name),
            record.defeats.len(),
            win_text,
            width = longest_name + 1
        );
        if !record.defeats.is_empty() {
            line += &format!(" (beats {})", record.defeats.join(", "));
        }
        println!("{}", line);
    }
}

fn print_runoff_chart(runoff: &RunoffStats, num_valid_voters: usize) {
    println!();
    println!("Instant runoff results:");
    println!();
    let longest_name = runoff.tally.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for tally in runoff.tally.iter() {
        let vote_fraction = if num_valid_voters > 0 {
            tally.supporters.len() as f64 / num_valid_voters as f64
        } else {
            0.0
        };
        let bar_len = (NUM_CHARS_IN_FULL_VOTE_BAR as f64 * vote_fraction).round() as usize;
        let vote_bar = "\u{25A0}".repeat(bar_len);
        let percentage = format!("{:.1}%", 100.0 * vote_fraction);
        let vote_text = if tally.supporters.len() == 1 {
            "vote"
        } else {
            "votes"
        };
        let sign = if tally.support_delta >= 0 { "+" } else { "" };
        let borda_text = match tally.borda_count {
            Some(count) => format!("Borda count {}", count),
            None => "no Borda count".to_string(),
        };
        println!(
            "\t{:<width$}{} {} ({} {}, {}{} this round; {})",
            tally.name,
            vote_bar,
            percentage,
            tally.supporters.len(),
            vote_text,
            sign,
            tally.support_delta,
            borda_text,
            width = longest_name + 2
        );
    }
    println!();
    println!(
        "\t{}: {}",
        INVALID_VOTER_COLUMN_NAME,
        runoff.unused_voters.len()
    );
    println!(
        "\t{}: {} (+{} this round)",
        ELIMINATED_VOTER_COLUMN_NAME,
        runoff.exhausted_voters.len(),
        runoff.exhausted_this_round
    );
}

fn print_contest(result: &ContestResult, num_ballots: usize) {
    for round in result.round_stats.iter() {
        print_round_banner(round.round);
        print_match_summary(&round.matches);
        if !round.eliminated_outside.is_empty() {
            println!();
            println!(
                "Eliminated outside the dominating set {:?}: {}",
                round.dominating_set,
                round.eliminated_outside.join(", ")
            );
        }
        if let Some(runoff) = &round.runoff {
            let num_valid = num_ballots - runoff.unused_voters.len();
            print_runoff_chart(runoff, num_valid);
            if !runoff.eliminated.is_empty() {
                println!(
                    "Eliminated by instant runoff (least-to-greatest Borda count): {}",
                    runoff.eliminated.join(", ")
                );
            }
        }
    }

    println!();
    println!("{}", "#".repeat(NUM_CHARS_IN_DIVIDER));
    println!();
    let reason = match result.end_reason {
        EndReason::TargetReached => "The requested number of winners has been found",
        EndReason::UnbreakableTie => "No candidates were eliminated last round",
    };
    println!("{}, so the contest is over.", reason);
    println!();
    println!("WINNERS: {}", result.winners.join(", "));
    println!();
}

// ******** Spreadsheet writers *********

/// Writes one row per voter and one column per 1v1 matchup, each cell naming
/// the candidate the voter prefers in that matchup.
fn write_matchup_votes(prefix: &str, result: &ContestResult) -> CliResult<()> {
    let path = format!("{}-all-1v1-match-votes.csv", prefix);
    info!("Writing all 1v1 match vote data to {}", path);
    let mut writer = csv::Writer::from_path(&path).context(CsvWriteSnafu { path: path.clone() })?;

    let mut header: Vec<String> = vec![MATCH_VOTES_VOTER_COLUMN_NAME.to_string()];
    for matchup in result.matchups.iter() {
        header.push(format!("{} vs. {}", matchup.left, matchup.right));
    }
    writer
        .write_record(&header)
        .context(CsvWriteSnafu { path: path.clone() })?;

    for ballot in result.reconciled.iter() {
        let rankings: HashMap<&str, u32> = ballot
            .rankings
            .iter()
            .map(|(name, r)| (name.as_str(), *r))
            .collect();
        let mut row: Vec<String> = vec![ballot.voter.clone()];
        for matchup in result.matchups.iter() {
            let left = rankings.get(matchup.left.as_str());
            let right = rankings.get(matchup.right.as_str());
            let cell = match (left, right) {
                (Some(a), Some(b)) if a < b => {
                    format!("{} (rankings: {} vs. {})", matchup.left, a, b)
                }
                (Some(a), Some(b)) => format!("{} (rankings: {} vs. {})", matchup.right, a, b),
                (Some(a), None) => format!("{} (rankings: {} vs. -)", matchup.left, a),
                (None, Some(b)) => format!("{} (rankings: - vs. {})", matchup.right, b),
                (None, None) => "N/A".to_string(),
            };
            row.push(cell);
        }
        writer
            .write_record(&row)
            .context(CsvWriteSnafu { path: path.clone() })?;
    }
    writer
        .flush()
        .with_whatever_context(|_| format!("Error flushing {}", path))?;
    Ok(())
}

/// Writes the defeat matrix of one round: rows and columns are the
/// still-in-race candidates, a 1 marks a win of the row over the column.
fn write_round_matches(prefix: &str, round: &RoundStats) -> CliResult<()> {
    let path = format!("{}-round{}-1v1-matches.csv", prefix, round.round);
    info!("Writing current 1v1 match summary to {}", path);
    let mut writer = csv::Writer::from_path(&path).context(CsvWriteSnafu { path: path.clone() })?;

    let mut header: Vec<String> = vec!["".to_string()];
    for record in round.matches.iter() {
        header.push(record.name.clone());
    }
    header.push(MATCH_SUMMARY_NUM_WINS_COLUMN_NAME.to_string());
    writer
        .write_record(&header)
        .context(CsvWriteSnafu { path: path.clone() })?;

    for record in round.matches.iter() {
        let mut row: Vec<String> = vec![record.name.clone()];
        for other in round.matches.iter() {
            if record.defeats.contains(&other.name) {
                row.push("1".to_string());
            } else {
                row.push("".to_string());
            }
        }
        row.push(record.defeats.len().to_string());
        writer
            .write_record(&row)
            .context(CsvWriteSnafu { path: path.clone() })?;
    }
    writer
        .flush()
        .with_whatever_context(|_| format!("Error flushing {}", path))?;
    Ok(())
}

/// Writes the instant-runoff columns of one round: the unused voters, the
/// exhausted voters, and one column of supporters per candidate.
fn write_round_runoff(prefix: &str, round: u32, runoff: &RunoffStats) -> CliResult<()> {
    let path = format!("{}-round{}-instant-runoff.csv", prefix, round);
    info!("Writing round {} instant runoff data to {}", round, path);
    let mut writer = csv::Writer::from_path(&path).context(CsvWriteSnafu { path: path.clone() })?;

    let mut header: Vec<String> = vec![
        INVALID_VOTER_COLUMN_NAME.to_string(),
        ELIMINATED_VOTER_COLUMN_NAME.to_string(),
    ];
    for tally in runoff.tally.iter() {
        let borda_text = match tally.borda_count {
            Some(count) => count.to_string(),
            None => "-".to_string(),
        };
        header.push(format!(
            "{} ({} votes, Borda count {})",
            tally.name,
            tally.supporters.len(),
            borda_text
        ));
    }
    writer
        .write_record(&header)
        .context(CsvWriteSnafu { path: path.clone() })?;

    let mut columns: Vec<Vec<String>> = vec![
        runoff.unused_voters.clone(),
        runoff.exhausted_voters.clone(),
    ];
    for tally in runoff.tally.iter() {
        columns.push(
            tally
                .supporters
                .iter()
                .map(|s| {
                    format!(
                        "{}: assigned ranking {} (Borda count {}), moved in round {}",
                        s.voter, s.ranking, s.borda_count, s.moved_round
                    )
                })
                .collect(),
        );
    }

    let num_rows = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    for row_idx in 0..num_rows {
        let row: Vec<String> = columns
            .iter()
            .map(|column| column.get(row_idx).cloned().unwrap_or_default())
            .collect();
        writer
            .write_record(&row)
            .context(CsvWriteSnafu { path: path.clone() })?;
    }
    writer
        .flush()
        .with_whatever_context(|_| format!("Error flushing {}", path))?;
    Ok(())
}

fn write_spreadsheets(prefix: &str, result: &ContestResult) -> CliResult<()> {
    write_matchup_votes(prefix, result)?;
    for round in result.round_stats.iter() {
        write_round_matches(prefix, round)?;
        if let Some(runoff) = &round.runoff {
            write_round_runoff(prefix, round.round, runoff)?;
        }
    }
    Ok(())
}

// ******** JSON summary *********

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct SummaryMatchup {
    left: String,
    right: String,
    #[serde(rename = "leftVotes")]
    left_votes: u64,
    #[serde(rename = "rightVotes")]
    right_votes: u64,
    winner: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct SummaryRunoff {
    tally: Vec<(String, u64)>,
    #[serde(rename = "bordaCounts")]
    borda_counts: Vec<(String, u64)>,
    eliminated: Vec<String>,
    #[serde(rename = "unusedVoters")]
    unused_voters: u64,
    #[serde(rename = "exhaustedVoters")]
    exhausted_voters: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct SummaryRound {
    round: u32,
    wins: Vec<(String, u64)>,
    #[serde(rename = "dominatingSet")]
    dominating_set: Vec<String>,
    eliminated: Vec<String>,
    runoff: Option<SummaryRunoff>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct Summary {
    winners: Vec<String>,
    #[serde(rename = "endReason")]
    end_reason: String,
    matchups: Vec<SummaryMatchup>,
    rounds: Vec<SummaryRound>,
}

fn build_summary(result: &ContestResult) -> Summary {
    let end_reason = match result.end_reason {
        EndReason::TargetReached => "targetReached",
        EndReason::UnbreakableTie => "unbreakableTie",
    };
    Summary {
        winners: result.winners.clone(),
        end_reason: end_reason.to_string(),
        matchups: result
            .matchups
            .iter()
            .map(|m| SummaryMatchup {
                left: m.left.clone(),
                right: m.right.clone(),
                left_votes: m.left_votes,
                right_votes: m.right_votes,
                winner: m.winner.clone(),
            })
            .collect(),
        rounds: result
            .round_stats
            .iter()
            .map(|round| SummaryRound {
                round: round.round,
                wins: round
                    .matches
                    .iter()
                    .map(|record| (record.name.clone(), record.defeats.len() as u64))
                    .collect(),
                dominating_set: round.dominating_set.clone(),
                eliminated: round.eliminated_outside.clone(),
                runoff: round.runoff.as_ref().map(|runoff| SummaryRunoff {
                    tally: runoff
                        .tally
                        .iter()
                        .map(|t| (t.name.clone(), t.supporters.len() as u64))
                        .collect(),
                    borda_counts: runoff
                        .tally
                        .iter()
                        .filter_map(|t| t.borda_count.map(|count| (t.name.clone(), count)))
                        .collect(),
                    eliminated: runoff.eliminated.clone(),
                    unused_voters: runoff.unused_voters.len() as u64,
                    exhausted_voters: runoff.exhausted_voters.len() as u64,
                }),
            })
            .collect(),
    }
}

fn read_summary(path: &str) -> CliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// ******** Entry point *********

pub fn run_contest_cli(args: &Args) -> CliResult<()> {
    let input_type = args
        .input_type
        .clone()
        .unwrap_or_else(|| "csv".to_string());
    let (candidates, ballots) = match input_type.as_str() {
        "csv" => read_csv_matrix(&args.input)?,
        "xlsx" => read_excel_matrix(&args.input)?,
        x => whatever!("Input type not implemented {:?}", x),
    };
    info!(
        "Read {:?} ballots for {:?} candidates from {:?}",
        ballots.len(),
        candidates.len(),
        args.input
    );

    let rules = ContestRules {
        num_winners: args.num_winners,
        assignment_order: if args.rank_order {
            AssignmentOrder::AscendingRanking
        } else {
            AssignmentOrder::SourceOrder
        },
    };
    let result = run_contest(&candidates, &ballots, &rules).context(ResolutionSnafu {})?;

    print_contest(&result, ballots.len());

    if let Some(prefix) = &args.output_prefix {
        write_spreadsheets(prefix, &result)?;
    }

    // Converting through serde_json::Value normalizes the key order, so the
    // output is comparable with a parsed reference summary.
    let summary = build_summary(&result);
    let summary_js = serde_json::to_value(&summary).context(ParsingJsonSnafu {})?;
    let pretty_js_stats = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    match args.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => fs::write(path, &pretty_js_stats).context(OpeningJsonSnafu {})?,
        None => {}
    }

    if let Some(reference_path) = &args.reference {
        let summary_ref = read_summary(reference_path)?;
        let pretty_js_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_ref != pretty_js_stats {
            print_diff(pretty_js_ref.as_str(), pretty_js_stats.as_ref(), "\n");
            whatever!("Difference detected between calculated summary and reference summary")
        }
        info!("Summary matches the reference {:?}", reference_path);
    }

    Ok(())
}
