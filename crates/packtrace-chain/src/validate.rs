use serde::{Deserialize, Serialize};

use packtrace_types::{ChannelState, CustodyEvent};

use crate::running::running_hash;

/// Result of validating a run of custody events against the chain.
///
/// This is a value, not an error: a gap is an expected consequence of
/// pagination and the caller decides whether to re-fetch or report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainOutcome {
    /// Every entry chained correctly; the state is the new resume point.
    Valid(ChannelState),
    /// Running-hash mismatch at `seq`. Nothing at or past it is trusted.
    Broken { seq: u64 },
    /// The sequence is not contiguous; `missing_seq` was expected next.
    /// Callers must fetch the missing range before concluding forgery.
    Gap { missing_seq: u64 },
}

impl ChainOutcome {
    /// Returns `true` if the full run validated.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The resume state, if validation succeeded.
    pub fn state(&self) -> Option<ChannelState> {
        match self {
            Self::Valid(state) => Some(*state),
            _ => None,
        }
    }
}

/// Chain integrity validator.
pub struct ChainValidator;

impl ChainValidator {
    /// Validate entries (ascending by `seq`) against a resume state.
    ///
    /// For each entry the expected running hash is recomputed from the
    /// prior running hash and the entry's payload hash and compared to the
    /// declared one. Validation stops at the first mismatch — a broken
    /// chain invalidates everything after it, so later entries are never
    /// reported as valid. A non-contiguous sequence number stops
    /// validation with a gap instead, which is a distinct, possibly
    /// repairable condition.
    pub fn validate(entries: &[CustodyEvent], state: ChannelState) -> ChainOutcome {
        let mut state = state;

        for entry in entries {
            let expected_seq = state.next_seq();
            if entry.seq != expected_seq {
                return ChainOutcome::Gap {
                    missing_seq: expected_seq,
                };
            }

            let expected = running_hash(state.last_running_hash.as_ref(), &entry.payload_hash);
            if expected != entry.running_hash {
                return ChainOutcome::Broken { seq: entry.seq };
            }

            state = ChannelState::at(expected, entry.seq);
        }

        ChainOutcome::Valid(state)
    }
}

#[cfg(test)]
mod tests {
    use packtrace_types::{EventKind, LogHash};

    use super::*;

    fn build_chain(count: u64) -> Vec<CustodyEvent> {
        build_chain_from(1, count, None)
    }

    fn build_chain_from(
        start_seq: u64,
        count: u64,
        prior: Option<LogHash>,
    ) -> Vec<CustodyEvent> {
        let mut entries = Vec::new();
        let mut prior = prior;
        for i in 0..count {
            let seq = start_seq + i;
            let payload = LogHash::from_raw([seq as u8; 32]);
            let running = running_hash(prior.as_ref(), &payload);
            entries.push(CustodyEvent {
                seq,
                kind: EventKind::Handover,
                consensus_timestamp: 1_700_000_000_000 + seq as i64,
                payload_hash: payload,
                running_hash: running,
                from_facility: None,
                to_facility: None,
            });
            prior = Some(running);
        }
        entries
    }

    #[test]
    fn empty_run_is_valid() {
        let outcome = ChainValidator::validate(&[], ChannelState::genesis());
        assert_eq!(outcome, ChainOutcome::Valid(ChannelState::genesis()));
    }

    #[test]
    fn contiguous_chain_validates_and_returns_final_hash() {
        let entries = build_chain(5);
        let outcome = ChainValidator::validate(&entries, ChannelState::genesis());
        let state = outcome.state().unwrap();
        assert_eq!(state.validated_up_to, Some(5));
        assert_eq!(state.last_running_hash, Some(entries[4].running_hash));
    }

    #[test]
    fn flipped_payload_breaks_at_exactly_that_seq() {
        let mut entries = build_chain(6);
        entries[3].payload_hash = LogHash::from_raw([0xEE; 32]);
        let outcome = ChainValidator::validate(&entries, ChannelState::genesis());
        assert_eq!(outcome, ChainOutcome::Broken { seq: 4 });
    }

    #[test]
    fn flipped_running_hash_breaks_there() {
        let mut entries = build_chain(4);
        entries[1].running_hash = LogHash::from_raw([0xEE; 32]);
        let outcome = ChainValidator::validate(&entries, ChannelState::genesis());
        assert_eq!(outcome, ChainOutcome::Broken { seq: 2 });
    }

    #[test]
    fn removed_entry_reports_gap_at_missing_seq() {
        let mut entries = build_chain(5);
        entries.remove(2); // drop seq 3
        let outcome = ChainValidator::validate(&entries, ChannelState::genesis());
        assert_eq!(outcome, ChainOutcome::Gap { missing_seq: 3 });
    }

    #[test]
    fn gap_is_distinct_from_broken() {
        let mut gapped = build_chain(3);
        gapped.remove(1);
        let mut broken = build_chain(3);
        broken[1].payload_hash = LogHash::from_raw([0xEE; 32]);

        let gap = ChainValidator::validate(&gapped, ChannelState::genesis());
        let brk = ChainValidator::validate(&broken, ChannelState::genesis());
        assert!(matches!(gap, ChainOutcome::Gap { .. }));
        assert!(matches!(brk, ChainOutcome::Broken { .. }));
    }

    #[test]
    fn validation_resumes_across_pages() {
        let all = build_chain(8);
        let (first, second) = all.split_at(4);

        let mid = ChainValidator::validate(first, ChannelState::genesis())
            .state()
            .unwrap();
        let outcome = ChainValidator::validate(second, mid);
        let state = outcome.state().unwrap();
        assert_eq!(state.validated_up_to, Some(8));
        assert_eq!(state.last_running_hash, Some(all[7].running_hash));
    }

    #[test]
    fn resume_from_wrong_hash_breaks_first_entry_of_page() {
        let all = build_chain(4);
        let second = &all[2..];
        let bad = ChannelState::at(LogHash::from_raw([9; 32]), 2);
        let outcome = ChainValidator::validate(second, bad);
        assert_eq!(outcome, ChainOutcome::Broken { seq: 3 });
    }

    #[test]
    fn mid_stream_start_without_state_is_a_gap() {
        let entries = build_chain_from(10, 2, Some(LogHash::from_raw([1; 32])));
        let outcome = ChainValidator::validate(&entries, ChannelState::genesis());
        assert_eq!(outcome, ChainOutcome::Gap { missing_seq: 1 });
    }
}
