//! The single ballot behind the `vote` and `cast` commands.
//!
//! A [`PollManager`] holds at most one ballot. The ballot is either open, in
//! which case votes can be cast, or closed with a winner, in which case the
//! only valid transition is opening a new ballot. [`SharedPoll`] wraps the
//! manager in a mutex so command handlers running on different tasks never
//! interleave their read-modify-write of the tallies.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Which command was misused, for the `InvalidUsage` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Vote,
    Cast,
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Usage::Vote => f.write_str("Voting System"),
            Usage::Cast => f.write_str("Cast"),
        }
    }
}

/// Errors reported back to the user by the voting commands.
///
/// None of these mutate the ballot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// The command was invoked without the arguments it needs.
    #[error("Invalid {0} usage.")]
    InvalidUsage(Usage),

    /// A winner has already been declared.
    #[error("The Voting System is closed.")]
    BallotClosed,

    /// The label is not one of the ballot's options.
    #[error("Invalid voting option.")]
    UnknownOption,
}

/// Supplies the number of members who can take part in a ballot.
///
/// Queried once, when a ballot is opened.
pub trait MemberCount {
    fn member_count(&self) -> Option<u64>;
}

/// One option and its current number of votes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyEntry {
    pub option: String,
    pub votes: u64,
}

/// Snapshot of a ballot, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BallotSummary {
    pub entries: Vec<TallyEntry>,
    pub eligible_voters: u64,
    pub closed: bool,
}

impl BallotSummary {
    pub fn votes_for(&self, option: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.option == option)
            .map(|entry| entry.votes)
    }

    /// Renders the summary in at most `max_chars` characters. Entries that do
    /// not fit are replaced by a trailing "…and N more" line.
    pub fn render(&self, max_chars: usize) -> String {
        let full = self.to_string();
        if full.chars().count() <= max_chars {
            return full;
        }

        let budget = max_chars.saturating_sub(hidden_line(self.entries.len()).chars().count());
        let mut rendered = String::new();
        let mut used = 0;
        let mut shown = 0;

        for entry in &self.entries {
            let line = self.entry_line(entry);
            let len = line.chars().count();
            if used + len > budget {
                break;
            }
            rendered.push_str(&line);
            used += len;
            shown += 1;
        }

        rendered.push_str(&hidden_line(self.entries.len() - shown));
        rendered
    }

    fn entry_line(&self, entry: &TallyEntry) -> String {
        format!(
            "**{}** ({}/{})\n",
            entry.option, entry.votes, self.eligible_voters
        )
    }
}

fn hidden_line(hidden: usize) -> String {
    format!("…and {} more\n", hidden)
}

impl fmt::Display for BallotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            f.write_str(&self.entry_line(entry))?;
        }
        Ok(())
    }
}

/// Result of a successful cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    /// The vote was counted and the ballot is still open.
    Counted(BallotSummary),
    /// The vote made `option` reach the threshold and closed the ballot.
    Winner { option: String },
}

#[derive(Debug, Clone)]
struct Ballot {
    options: Vec<String>,
    tallies: HashMap<String, u64>,
    eligible_voters: u64,
}

impl Ballot {
    fn new(options: Vec<String>, eligible_voters: u64) -> Self {
        let mut ballot = Self {
            options: Vec::with_capacity(options.len()),
            tallies: HashMap::with_capacity(options.len()),
            eligible_voters,
        };
        ballot.append(options);
        ballot
    }

    /// Adds options not already on the ballot, keeping first occurrences.
    fn append(&mut self, options: Vec<String>) {
        for option in options {
            if self.tallies.contains_key(&option) {
                debug!("Skipping duplicate ballot option '{}'", option);
                continue;
            }
            self.tallies.insert(option.clone(), 0);
            self.options.push(option);
        }
    }

    fn reset_tallies(&mut self) {
        self.tallies.values_mut().for_each(|votes| *votes = 0);
    }

    /// Counts one vote for `label` and returns the option that reached the
    /// threshold, if any. A zero threshold is never reached.
    fn record(&mut self, label: &str) -> Result<Option<String>, PollError> {
        let votes = self
            .tallies
            .get_mut(label)
            .ok_or(PollError::UnknownOption)?;
        *votes += 1;

        if self.eligible_voters == 0 {
            return Ok(None);
        }

        Ok(self
            .options
            .iter()
            .find(|option| self.tallies.get(*option) == Some(&self.eligible_voters))
            .cloned())
    }

    fn summary(&self, closed: bool) -> BallotSummary {
        BallotSummary {
            entries: self
                .options
                .iter()
                .map(|option| TallyEntry {
                    option: option.clone(),
                    votes: self.tallies.get(option).copied().unwrap_or_default(),
                })
                .collect(),
            eligible_voters: self.eligible_voters,
            closed,
        }
    }
}

#[derive(Debug, Clone, Default)]
enum BallotState {
    #[default]
    Idle,
    Open(Ballot),
    Closed {
        ballot: Ballot,
        winner: String,
    },
}

/// Owns the single ballot and its Open/Closed lifecycle.
#[derive(Debug, Default)]
pub struct PollManager {
    state: BallotState,
}

impl PollManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a ballot with `options`, `eligible_voters` being the threshold
    /// an option must reach to win.
    ///
    /// When the previous ballot is still open the new options are appended to
    /// it and every tally starts again from zero. Otherwise a fresh ballot
    /// replaces whatever was there.
    pub fn open_ballot(
        &mut self,
        options: Vec<String>,
        eligible_voters: u64,
    ) -> Result<BallotSummary, PollError> {
        let options: Vec<String> = options
            .into_iter()
            .map(|option| option.trim().to_string())
            .filter(|option| !option.is_empty())
            .collect();

        if options.is_empty() {
            return Err(PollError::InvalidUsage(Usage::Vote));
        }

        if let BallotState::Open(ballot) = &mut self.state {
            info!(
                "Appending {} option(s) to the open ballot, {} eligible voters",
                options.len(),
                eligible_voters
            );
            ballot.append(options);
            ballot.reset_tallies();
            ballot.eligible_voters = eligible_voters;
            return Ok(ballot.summary(false));
        }

        info!(
            "Opening a new ballot with {} option(s), {} eligible voters",
            options.len(),
            eligible_voters
        );
        let ballot = Ballot::new(options, eligible_voters);
        let summary = ballot.summary(false);
        self.state = BallotState::Open(ballot);
        Ok(summary)
    }

    /// Casts one vote for `label`.
    pub fn cast_vote(&mut self, label: &str) -> Result<CastOutcome, PollError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(PollError::InvalidUsage(Usage::Cast));
        }

        let winner = match &mut self.state {
            BallotState::Idle => return Err(PollError::UnknownOption),
            BallotState::Closed { .. } => return Err(PollError::BallotClosed),
            BallotState::Open(ballot) => ballot.record(label)?,
        };

        let Some(winner) = winner else {
            debug!("Counted a vote for '{}'", label);
            return Ok(CastOutcome::Counted(self.summary()));
        };

        self.state = match std::mem::take(&mut self.state) {
            BallotState::Open(ballot) => BallotState::Closed {
                ballot,
                winner: winner.clone(),
            },
            other => other,
        };
        info!("Ballot closed, winner is '{}'", winner);

        Ok(CastOutcome::Winner { option: winner })
    }

    pub fn summary(&self) -> BallotSummary {
        match &self.state {
            BallotState::Idle => BallotSummary::default(),
            BallotState::Open(ballot) => ballot.summary(false),
            BallotState::Closed { ballot, .. } => ballot.summary(true),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, BallotState::Closed { .. })
    }

    pub fn winner(&self) -> Option<&str> {
        match &self.state {
            BallotState::Closed { winner, .. } => Some(winner),
            _ => None,
        }
    }

    /// Labels of the current ballot in display order.
    pub fn options(&self) -> &[String] {
        match &self.state {
            BallotState::Idle => &[],
            BallotState::Open(ballot) | BallotState::Closed { ballot, .. } => &ballot.options,
        }
    }
}

/// A [`PollManager`] shared between command handlers.
#[derive(Debug, Clone, Default)]
pub struct SharedPoll {
    inner: Arc<Mutex<PollManager>>,
}

impl SharedPoll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a ballot, taking the eligible voter count from `members`.
    pub async fn open_ballot<M>(
        &self,
        options: Vec<String>,
        members: &M,
    ) -> Result<BallotSummary, PollError>
    where
        M: MemberCount + ?Sized,
    {
        let Some(eligible_voters) = members.member_count() else {
            warn!("No member count available, refusing to open a ballot");
            return Err(PollError::InvalidUsage(Usage::Vote));
        };

        self.inner.lock().await.open_ballot(options, eligible_voters)
    }

    pub async fn cast_vote(&self, label: &str) -> Result<CastOutcome, PollError> {
        self.inner.lock().await.cast_vote(label)
    }

    pub async fn summary(&self) -> BallotSummary {
        self.inner.lock().await.summary()
    }

    pub async fn options(&self) -> Vec<String> {
        self.inner.lock().await.options().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn labels(options: &[&str]) -> Vec<String> {
        options.iter().map(|option| option.to_string()).collect()
    }

    #[fixture]
    fn ab_ballot() -> PollManager {
        let mut manager = PollManager::new();
        manager
            .open_ballot(labels(&["A", "B"]), 3)
            .expect("ballot should open");
        manager
    }

    #[rstest]
    #[case(&["A"], 1)]
    #[case(&["A", "B", "C"], 5)]
    #[case(&["Pizza Hut", "Dominos"], 0)]
    fn test_open_ballot_starts_every_tally_at_zero(#[case] options: &[&str], #[case] voters: u64) {
        let mut manager = PollManager::new();
        let summary = manager.open_ballot(labels(options), voters).unwrap();

        assert_eq!(summary.entries.len(), options.len());
        assert!(summary.entries.iter().all(|entry| entry.votes == 0));
        assert_eq!(summary.eligible_voters, voters);
        assert!(!summary.closed);
    }

    #[test]
    fn test_open_ballot_without_options_is_invalid() {
        let mut manager = PollManager::new();

        assert_eq!(
            manager.open_ballot(Vec::new(), 3),
            Err(PollError::InvalidUsage(Usage::Vote))
        );
        assert_eq!(
            manager.open_ballot(labels(&["", "   "]), 3),
            Err(PollError::InvalidUsage(Usage::Vote))
        );
        assert!(manager.options().is_empty());
    }

    #[test]
    fn test_open_ballot_drops_duplicate_options() {
        let mut manager = PollManager::new();
        let summary = manager.open_ballot(labels(&["A", "B", "A"]), 2).unwrap();

        assert_eq!(manager.options(), labels(&["A", "B"]).as_slice());
        assert_eq!(summary.entries.len(), 2);
    }

    #[rstest]
    fn test_summary_renders_tally_over_eligible_voters(mut ab_ballot: PollManager) {
        ab_ballot.cast_vote("B").unwrap();

        assert_eq!(ab_ballot.summary().to_string(), "**A** (0/3)\n**B** (1/3)\n");
    }

    #[rstest]
    fn test_render_fits_short_summary_unchanged(mut ab_ballot: PollManager) {
        ab_ballot.cast_vote("A").unwrap();
        let summary = ab_ballot.summary();

        assert_eq!(summary.render(4096), summary.to_string());
    }

    #[test]
    fn test_render_truncates_large_ballot() {
        let options: Vec<String> = (0..524).map(|i| format!("o{}", i)).collect();
        let mut manager = PollManager::new();
        let summary = manager.open_ballot(options, 150).unwrap();
        assert!(summary.to_string().chars().count() > 4096);

        let rendered = summary.render(4096);
        let shown = rendered.lines().filter(|line| line.starts_with("**")).count();

        assert!(rendered.chars().count() <= 4096);
        assert!(rendered.starts_with("**o0** (0/150)\n**o1** (0/150)\n"));
        assert!(rendered.ends_with(&format!("…and {} more\n", 524 - shown)));
        assert!(shown > 0 && shown < 524);
    }

    #[test]
    fn test_render_oversized_single_option() {
        let mut manager = PollManager::new();
        let summary = manager.open_ballot(vec!["x".repeat(5000)], 2).unwrap();

        assert_eq!(summary.render(4096), "…and 1 more\n");
    }

    #[rstest]
    fn test_cast_counts_vote(mut ab_ballot: PollManager) {
        let outcome = ab_ballot.cast_vote("A").unwrap();

        assert_matches!(outcome, CastOutcome::Counted(summary) => {
            assert_eq!(summary.votes_for("A"), Some(1));
            assert_eq!(summary.votes_for("B"), Some(0));
        });
    }

    #[rstest]
    fn test_cast_unknown_option_leaves_tallies(mut ab_ballot: PollManager) {
        ab_ballot.cast_vote("A").unwrap();
        let before = ab_ballot.summary();

        assert_eq!(ab_ballot.cast_vote("C"), Err(PollError::UnknownOption));
        assert_eq!(ab_ballot.summary(), before);
    }

    #[rstest]
    fn test_cast_is_case_sensitive(mut ab_ballot: PollManager) {
        assert_eq!(ab_ballot.cast_vote("a"), Err(PollError::UnknownOption));
    }

    #[rstest]
    fn test_cast_empty_label_is_invalid(mut ab_ballot: PollManager) {
        assert_eq!(
            ab_ballot.cast_vote("  "),
            Err(PollError::InvalidUsage(Usage::Cast))
        );
    }

    #[test]
    fn test_cast_without_ballot_is_unknown_option() {
        let mut manager = PollManager::new();

        assert_eq!(manager.cast_vote("A"), Err(PollError::UnknownOption));
    }

    #[rstest]
    fn test_third_vote_wins_and_closes(mut ab_ballot: PollManager) {
        assert_matches!(ab_ballot.cast_vote("A"), Ok(CastOutcome::Counted(_)));
        assert_matches!(ab_ballot.cast_vote("A"), Ok(CastOutcome::Counted(_)));

        let outcome = ab_ballot.cast_vote("A").unwrap();
        assert_matches!(outcome, CastOutcome::Winner { option } if option == "A");
        let summary = ab_ballot.summary();
        assert!(summary.closed);
        assert_eq!(summary.votes_for("A"), Some(3));
        assert!(ab_ballot.is_closed());
        assert_eq!(ab_ballot.winner(), Some("A"));
    }

    #[rstest]
    #[case("A")]
    #[case("B")]
    #[case("C")]
    fn test_cast_after_close_is_rejected(mut ab_ballot: PollManager, #[case] label: &str) {
        for _ in 0..3 {
            ab_ballot.cast_vote("A").unwrap();
        }
        let closed = ab_ballot.summary();

        assert_eq!(ab_ballot.cast_vote(label), Err(PollError::BallotClosed));
        assert_eq!(ab_ballot.summary(), closed);
    }

    #[test]
    fn test_zero_eligible_voters_never_closes() {
        let mut manager = PollManager::new();
        manager.open_ballot(labels(&["A", "B"]), 0).unwrap();

        for _ in 0..5 {
            assert_matches!(manager.cast_vote("B"), Ok(CastOutcome::Counted(_)));
        }
        assert!(!manager.is_closed());
        assert_eq!(manager.summary().votes_for("B"), Some(5));
    }

    #[test]
    fn test_reopen_while_open_appends_options() {
        let mut manager = PollManager::new();
        manager.open_ballot(labels(&["A", "B"]), 3).unwrap();
        let summary = manager.open_ballot(labels(&["C", "A"]), 4).unwrap();

        assert_eq!(manager.options(), labels(&["A", "B", "C"]).as_slice());
        assert_eq!(summary.eligible_voters, 4);
        assert!(summary.entries.iter().all(|entry| entry.votes == 0));
    }

    #[test]
    fn test_reopen_while_open_resets_tallies_and_threshold() {
        let mut manager = PollManager::new();
        manager.open_ballot(labels(&["A", "B"]), 3).unwrap();
        manager.cast_vote("A").unwrap();
        manager.cast_vote("A").unwrap();

        manager.open_ballot(labels(&["C"]), 2).unwrap();
        assert_eq!(manager.summary().votes_for("A"), Some(0));

        assert_matches!(manager.cast_vote("C"), Ok(CastOutcome::Counted(_)));
        assert_matches!(
            manager.cast_vote("C"),
            Ok(CastOutcome::Winner { option, .. }) if option == "C"
        );
    }

    #[rstest]
    fn test_reopen_after_close_replaces_ballot(mut ab_ballot: PollManager) {
        for _ in 0..3 {
            ab_ballot.cast_vote("B").unwrap();
        }
        assert!(ab_ballot.is_closed());

        let summary = ab_ballot.open_ballot(labels(&["X", "Y"]), 2).unwrap();

        assert_eq!(ab_ballot.options(), labels(&["X", "Y"]).as_slice());
        assert!(!ab_ballot.is_closed());
        assert_eq!(ab_ballot.winner(), None);
        assert_eq!(summary.to_string(), "**X** (0/2)\n**Y** (0/2)\n");
        assert_eq!(ab_ballot.cast_vote("A"), Err(PollError::UnknownOption));
    }

    #[test]
    fn test_same_voter_can_vote_repeatedly() {
        let mut manager = PollManager::new();
        manager.open_ballot(labels(&["A", "B"]), 10).unwrap();

        for _ in 0..4 {
            manager.cast_vote("A").unwrap();
        }
        assert_eq!(manager.summary().votes_for("A"), Some(4));
    }

    struct FixedCount(Option<u64>);

    impl MemberCount for FixedCount {
        fn member_count(&self) -> Option<u64> {
            self.0
        }
    }

    #[test]
    fn test_shared_poll_uses_member_count() {
        let poll = SharedPoll::new();

        let summary =
            tokio_test::block_on(poll.open_ballot(labels(&["A"]), &FixedCount(Some(7)))).unwrap();
        assert_eq!(summary.eligible_voters, 7);
    }

    #[test]
    fn test_shared_poll_without_member_count_is_invalid() {
        let poll = SharedPoll::new();

        let result = tokio_test::block_on(poll.open_ballot(labels(&["A"]), &FixedCount(None)));
        assert_eq!(result, Err(PollError::InvalidUsage(Usage::Vote)));
        assert!(tokio_test::block_on(poll.options()).is_empty());
    }
}
