// Candidate set construction: one complaint crossed with every ATM row.

use crate::models::{AtmRecord, Candidate, Complaint};

/// Broadcast one complaint against the full ATM master snapshot.
///
/// The candidate count always equals the snapshot row count; an empty
/// snapshot yields an empty set, which the engine short-circuits on.
pub fn build_candidates<'a>(
    complaint: &'a Complaint,
    atms: &'a [AtmRecord],
) -> Vec<Candidate<'a>> {
    atms.iter().map(|atm| Candidate { complaint, atm }).collect()
}
