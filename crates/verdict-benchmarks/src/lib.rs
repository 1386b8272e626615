//! # Verdict Benchmarks
//!
//! Fixtures shared by the criterion benches. The table lists the latency
//! the engine is expected to meet on commodity hardware.
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Weigh one vote | < 1µs |
//! | Tally and evaluate 1,000 votes | < 1ms |
//! | Settle one campaign | < 50µs |
//! | Derive economics | < 10µs |
//!
//! ## Usage
//!
//! ```bash
//! cargo bench --package verdict-benchmarks
//! cargo bench --package verdict-benchmarks -- settlement
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use verdict_consensus::{Vote, VoteBook};
use verdict_core::{Amount, ContentId, ContentKind, Decision, ParticipantId, Score};
use verdict_economics::TopCompletion;

/// Fixed campaign opening time so benches never read the clock
pub fn campaign_opened() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn window_end(days: u32) -> DateTime<Utc> {
    campaign_opened() + Duration::days(days as i64)
}

/// A vote with deterministic stake, age, and experience derived from `index`
pub fn sample_vote(content_id: &ContentId, index: u32) -> Vote {
    let decision = if index % 4 == 3 {
        Decision::Reject
    } else {
        Decision::Accept
    };
    Vote::new(format!("0xvoter{:06}", index).as_str(), content_id.clone(), decision)
        .with_stake(Amount::from_units(10 + (index % 90) as i64), (index % 400) as i64)
        .with_experience((index % 1_000) as i64)
        .with_quality(50 + index % 50)
}

/// A completion vote book holding `voters` distinct votes
pub fn sample_book(voters: u32) -> VoteBook {
    let content_id = ContentId::new("bench-completion");
    let mut book = VoteBook::new(content_id.clone(), ContentKind::Completion);
    for i in 0..voters {
        // fixtures are always valid
        let _ = book.cast(sample_vote(&content_id, i));
    }
    book
}

/// Up to three ranked top completions
pub fn sample_tops(count: usize) -> Vec<TopCompletion> {
    (0..count.min(3))
        .map(|i| TopCompletion {
            completion_id: ContentId::new(format!("completion-{}", i)),
            recipient: ParticipantId::new(format!("completer-{}", i)),
            score: Score::from_hundredths(9_000 - 500 * i as u32).unwrap_or(Score::MIDPOINT),
        })
        .collect()
}
