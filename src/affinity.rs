// affinity.rs — Best-effort CPU affinity requests.
//
// The engine never depends on affinity for correctness. A strategy that
// carries an AffinityHint forwards it to an AffinityControl before running
// and only logs the outcome.
//
// Platform support for SystemAffinity:
//   Linux  : sched_setaffinity on the calling thread (libc)
//   Windows: SetThreadAffinityMask on the calling thread (windows crate)
//   other  : always refused

use std::fmt;

/// Set of processing-unit indices the caller would like to run on.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct AffinityHint {
    /// Sorted, deduplicated.
    units: Vec<usize>,
}

impl AffinityHint {
    pub fn new(units: impl IntoIterator<Item = usize>) -> Self {
        let mut units: Vec<usize> = units.into_iter().collect();
        units.sort_unstable();
        units.dedup();
        AffinityHint { units }
    }

    /// Units whose bit is set in `mask` (bit 0 = unit 0).
    pub fn from_mask(mask: u64) -> Self {
        Self::new((0..64).filter(|bit| mask & (1u64 << bit) != 0))
    }

    /// Units 0 and 1 (mask `0b11`).
    pub fn first_two_units() -> Self {
        Self::from_mask(0b11)
    }

    pub fn units(&self) -> &[usize] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Bit mask form, or `None` if a unit does not fit in 64 bits.
    pub fn mask(&self) -> Option<u64> {
        self.units
            .iter()
            .try_fold(0u64, |mask, &unit| (unit < 64).then(|| mask | (1u64 << unit)))
    }
}

impl fmt::Debug for AffinityHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AffinityHint{:?}", self.units)
    }
}

/// Capability to pin the calling execution context.
pub trait AffinityControl: Send + Sync {
    /// Ask the host to run the current thread on `hint`'s units.
    /// Returns whether the request was accepted.
    fn request_affinity(&self, hint: &AffinityHint) -> bool;
}

/// Refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAffinity;

impl AffinityControl for NoAffinity {
    fn request_affinity(&self, _hint: &AffinityHint) -> bool {
        false
    }
}

/// Forwards requests to the operating system for the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAffinity;

impl AffinityControl for SystemAffinity {
    fn request_affinity(&self, hint: &AffinityHint) -> bool {
        if hint.is_empty() {
            return false;
        }
        pin_current_thread(hint)
    }
}

#[cfg(target_os = "linux")]
fn pin_current_thread(hint: &AffinityHint) -> bool {
    // SAFETY: cpu_set_t is a plain bit array; all-zero is the empty set.
    let mut set: libc::cpu_set_t = unsafe { std::mem::zeroed() };
    for &unit in hint.units() {
        if unit >= libc::CPU_SETSIZE as usize {
            return false;
        }
        // SAFETY: unit is below CPU_SETSIZE, so the bit lies inside `set`.
        unsafe { libc::CPU_SET(unit, &mut set) };
    }
    // SAFETY: pid 0 targets the calling thread; `set` outlives the call.
    let rc = unsafe {
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
    };
    rc == 0
}

#[cfg(target_os = "windows")]
fn pin_current_thread(hint: &AffinityHint) -> bool {
    use windows::Win32::System::Threading::{GetCurrentThread, SetThreadAffinityMask};

    let Some(mask) = hint.mask().and_then(|m| usize::try_from(m).ok()) else {
        return false;
    };
    // SAFETY: GetCurrentThread returns a pseudo-handle valid for this thread.
    // A zero return means the mask was rejected.
    let previous = unsafe { SetThreadAffinityMask(GetCurrentThread(), mask) };
    previous != 0
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn pin_current_thread(_hint: &AffinityHint) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_is_sorted_and_deduplicated() {
        let hint = AffinityHint::new([3, 1, 3, 0]);
        assert_eq!(hint.units(), &[0, 1, 3]);
        assert_eq!(hint.mask(), Some(0b1011));
    }

    #[test]
    fn test_mask_round_trip() {
        assert_eq!(AffinityHint::first_two_units().units(), &[0, 1]);
        assert_eq!(AffinityHint::from_mask(0).units(), &[] as &[usize]);
        assert_eq!(AffinityHint::new([70]).mask(), None);
    }

    #[test]
    fn test_no_affinity_refuses() {
        assert!(!NoAffinity.request_affinity(&AffinityHint::first_two_units()));
    }

    #[test]
    fn test_empty_hint_is_refused() {
        assert!(!SystemAffinity.request_affinity(&AffinityHint::default()));
    }

    #[test]
    fn test_system_affinity_does_not_panic() {
        // Run on a scratch thread so the test harness thread keeps its mask.
        // Accepted or refused are both fine; only the call must be safe.
        let handle = std::thread::spawn(|| {
            SystemAffinity.request_affinity(&AffinityHint::new([0]))
        });
        let _accepted: bool = handle.join().unwrap();
    }
}
