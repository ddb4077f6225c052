use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::domain::{ApplicationNumber, ExamAllocation, PersonalInfo};

/// Candidate pool of exam centers. Allocation picks from here exactly once
/// per record; the first entry doubles as the admit-card fallback.
pub const CENTER_POOL: &[&str] = &[
    "DAV PUBLIC SCHOOL, RANCHI",
    "DAV PUBLIC SCHOOL, PATNA",
    "DAV PUBLIC SCHOOL, MUZAFFARPUR",
    "DAV PUBLIC SCHOOL, BEGUSARAI",
];

pub const SHIFT_POOL: &[&str] = &[
    "A (9:00 AM - 10:00 AM, 12-06-2025)",
    "B (12:00 PM - 1:00 PM, 12-06-2025)",
    "C (3:00 PM - 4:00 PM, 12-06-2025)",
];

/// Assignment policy for exam center, shift, and application number.
///
/// Invoked exactly once per record, at the end of the registration step.
/// Uniqueness of the returned number is session-local only; there is no
/// backing store to check collisions against.
pub trait AllocationPolicy: Send + Sync {
    fn allocate(&self, info: &PersonalInfo) -> (ApplicationNumber, ExamAllocation);
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_sequence() -> u64 {
    APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Deterministic policy: sequential application numbers, center keyed off
/// the candidate's first district preference so repeated runs with the same
/// form produce the same venue.
#[derive(Debug, Default)]
pub struct RosterAllocationPolicy;

impl AllocationPolicy for RosterAllocationPolicy {
    fn allocate(&self, info: &PersonalInfo) -> (ApplicationNumber, ExamAllocation) {
        let sequence = next_sequence();
        let number = ApplicationNumber(format!("CBT2025-{sequence:06}"));

        let center_index = info
            .district_preferences
            .first()
            .map(|district| *district as usize % CENTER_POOL.len())
            .unwrap_or(0);
        let shift_index = sequence as usize % SHIFT_POOL.len();

        let allocation = ExamAllocation {
            center: CENTER_POOL[center_index].to_string(),
            shift: SHIFT_POOL[shift_index].to_string(),
        };
        (number, allocation)
    }
}

/// Pseudo-random policy drawing from the same pools, seedable for tests.
pub struct SeededAllocationPolicy {
    rng: Mutex<StdRng>,
}

impl SeededAllocationPolicy {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl AllocationPolicy for SeededAllocationPolicy {
    fn allocate(&self, _info: &PersonalInfo) -> (ApplicationNumber, ExamAllocation) {
        let mut rng = self.rng.lock().expect("allocation rng poisoned");

        const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let token: String = (0..8)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        let number = ApplicationNumber(format!("CBT2025-{token}"));

        let allocation = ExamAllocation {
            center: CENTER_POOL[rng.gen_range(0..CENTER_POOL.len())].to_string(),
            shift: SHIFT_POOL[rng.gen_range(0..SHIFT_POOL.len())].to_string(),
        };
        (number, allocation)
    }
}
