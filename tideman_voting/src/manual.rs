/*!

This is the long-form manual for `tideman_voting` and `tidemancontest`.

## The method

The contest is resolved with Tideman's alternative method, which combines
pairwise (Condorcet-style) comparisons with instant-runoff voting:

1. Every pair of candidates is compared head to head, once, using every
ballot's relative preference. A candidate with a strict majority of
supporting ballots defeats the other; an exact tie records nothing.

2. Each round, the smallest *dominating set* of size at least the requested
number of winners is constructed over the remaining candidates: a set in
which every member defeats every non-member head to head. Everyone outside
the set is eliminated.

3. If more candidates than requested winners survive, one instant-runoff
pass runs: every ballot backs its most-preferred remaining candidate, and
the candidates with the fewest backers are eliminated from least to greatest
Borda count. Tied groups that cannot be eliminated without dropping below
the requested winner count are left in place.

The contest ends when exactly the requested number of winners remains, or
when a full round eliminates nobody. The latter is a legitimate outcome: the
survivors are tied in a way the rules cannot break, and all of them are
reported as winners.

## Ballots

A ballot is an ordered sequence of `(candidate, ranking)` assignments, with 1
as the most preferred ranking. Conflicting assignments are never errors;
they are reconciled deterministically:

* A ranking assigned more than once becomes permanently unassigned for this
ballot (all the candidates involved lose that ranking).
* A candidate assigned more than one ranking keeps the best (smallest) one
that is not otherwise contested.

Because reconciliation depends on the order assignments are submitted, and
the historical order is the candidate-column order of the source
spreadsheet, the submission order is an explicit parameter of the rules. See
`AssignmentOrder`.

## Input format for `tidemancontest`

The command line program reads a ranking matrix, in CSV or Excel (.xlsx)
format. The first column holds the voter names; the remaining header cells
name the candidates; each following row holds one voter's numeric rankings,
with blank cells for candidates the voter did not rank:

```text
voter,Alpha,Bravo,Charlie
voter 1,1,2,3
voter 2,2,1,
voter 3,,1,
```

Non-numeric rankings are rejected when the file is read.

The program prints the round-by-round standings to the console and can also
write, per round, spreadsheets describing every 1v1 match, the remaining
match wins, and the instant-runoff supporter columns. See `tidemancontest
--help` for the flags.

*/
