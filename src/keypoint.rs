//! Keypoint gather (spec §4.11, component C16): merges up to sixteen
//! keypoint streams into one, in block or cyclic port order.
//!
//! The original tracks an input-port bitmask `mask = all_ones <<
//! mask_shift`, where `mask_shift` holds the position just past the last
//! port read this cycle and resets to zero exactly on a new-cycle
//! boundary — i.e. every cycle rescans active ports starting from port 0.
//! This port keeps that same "full rescan from port 0 every cycle" rule
//! but tracks which ports are active directly as a `[bool; PORTS]` vector
//! instead of a shifted integer mask; the two are equivalent (a masked
//! shift-and-scan and a plain boolean scan visit ports in the same order)
//! and the boolean form cannot desynchronise the way a stale shift amount
//! could.

use crate::element::Elem;
use std::collections::VecDeque;

/// The all-ones sentinel marking "invalid keypoint / end of list".
pub const SENTINEL: u64 = u64::MAX;

/// One decoded keypoint record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keypoint {
    pub x: u16,
    pub y: u16,
    pub response: u16,
    pub scale: u8,
    pub orientation: u8,
}

impl Keypoint {
    pub fn pack(self) -> u64 {
        (self.x as u64)
            | (self.y as u64) << 16
            | (self.response as u64) << 32
            | (self.scale as u64) << 48
            | (self.orientation as u64) << 56
    }

    /// Decodes a record, returning `None` for the sentinel.
    pub fn unpack(v: u64) -> Option<Self> {
        if v == SENTINEL {
            return None;
        }
        Some(Keypoint {
            x: v as u16,
            y: (v >> 16) as u16,
            response: (v >> 32) as u16,
            scale: (v >> 48) as u8,
            orientation: (v >> 56) as u8,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatherMode {
    Block,
    Cyclic,
}

fn run_block<const PORTS: usize>(
    streams: &mut [VecDeque<u64>; PORTS],
    active: &mut [bool; PORTS],
    out: &mut Vec<u64>,
    m: usize,
) {
    for p in 0..PORTS {
        while active[p] {
            if out.len() >= m {
                return;
            }
            match streams[p].pop_front() {
                Some(v) if v != SENTINEL => out.push(v),
                _ => active[p] = false,
            }
        }
    }
}

fn run_cyclic<const PORTS: usize>(
    streams: &mut [VecDeque<u64>; PORTS],
    active: &mut [bool; PORTS],
    out: &mut Vec<u64>,
    m: usize,
) {
    loop {
        if out.len() >= m || active.iter().all(|a| !a) {
            return;
        }
        for p in 0..PORTS {
            if !active[p] {
                continue;
            }
            if out.len() >= m {
                return;
            }
            match streams[p].pop_front() {
                Some(v) if v != SENTINEL => out.push(v),
                _ => active[p] = false,
            }
        }
    }
}

/// Merges `PORTS` keypoint streams (each a queue of packed records,
/// terminated or not by an explicit [`SENTINEL`]) into at most `m` output
/// keypoints, per `mode`.
///
/// If every port goes inactive before `m` outputs have been produced, one
/// trailing sentinel is appended; reaching `m` real keypoints first is an
/// early termination and gets no trailing sentinel. An empty result before
/// that trailing sentinel is itself the "no keypoints at all" case, so the
/// sentinel (the run's only element) carries `sof = true`.
pub fn gather<const PORTS: usize>(
    mode: GatherMode,
    mut streams: [VecDeque<u64>; PORTS],
    m: usize,
) -> Vec<Elem<u64, 1>> {
    let mut active = [true; PORTS];
    let mut out: Vec<u64> = Vec::new();

    match mode {
        GatherMode::Block => run_block(&mut streams, &mut active, &mut out, m),
        GatherMode::Cyclic => run_cyclic(&mut streams, &mut active, &mut out, m),
    }

    if out.len() < m {
        out.push(SENTINEL);
    }

    let total = out.len();
    out.into_iter()
        .enumerate()
        .map(|(i, v)| Elem::with_flags([v], i == 0, i == total - 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: u16, y: u16) -> u64 {
        Keypoint {
            x,
            y,
            response: 0,
            scale: 0,
            orientation: 0,
        }
        .pack()
    }

    #[test]
    fn cyclic_merge_of_two_streams_interleaves_then_drains() {
        let s0: VecDeque<u64> = VecDeque::from([kp(1, 1), kp(2, 2), SENTINEL]);
        let s1: VecDeque<u64> = VecDeque::from([kp(3, 3), SENTINEL]);
        let out = gather(GatherMode::Cyclic, [s0, s1], 4);
        let values: Vec<u64> = out.iter().map(|e| e.lanes[0]).collect();
        assert_eq!(values, vec![kp(1, 1), kp(3, 3), kp(2, 2), SENTINEL]);
        assert!(out[0].sof && !out[0].eof);
        assert!(out.last().unwrap().eof);
    }

    #[test]
    fn block_mode_drains_each_port_fully_before_advancing() {
        let s0: VecDeque<u64> = VecDeque::from([kp(1, 1), kp(2, 2), SENTINEL]);
        let s1: VecDeque<u64> = VecDeque::from([kp(3, 3), SENTINEL]);
        let out = gather(GatherMode::Block, [s0, s1], 4);
        let values: Vec<u64> = out.iter().map(|e| e.lanes[0]).collect();
        assert_eq!(values, vec![kp(1, 1), kp(2, 2), kp(3, 3), SENTINEL]);
    }

    #[test]
    fn reaching_m_terminates_without_a_trailing_sentinel() {
        let s0: VecDeque<u64> = VecDeque::from([kp(1, 1), kp(2, 2), kp(3, 3), SENTINEL]);
        let out = gather(GatherMode::Block, [s0], 2);
        let values: Vec<u64> = out.iter().map(|e| e.lanes[0]).collect();
        assert_eq!(values, vec![kp(1, 1), kp(2, 2)]);
    }

    #[test]
    fn all_ports_immediately_empty_emits_a_single_sof_sentinel() {
        let s0: VecDeque<u64> = VecDeque::from([SENTINEL]);
        let out = gather(GatherMode::Cyclic, [s0], 4);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].lanes[0], SENTINEL);
        assert!(out[0].sof && out[0].eof);
    }

    #[test]
    fn pack_unpack_round_trips() {
        let k = Keypoint {
            x: 100,
            y: 200,
            response: 3000,
            scale: 5,
            orientation: 200,
        };
        assert_eq!(Keypoint::unpack(k.pack()), Some(k));
        assert_eq!(Keypoint::unpack(SENTINEL), None);
    }
}
