//! Animation frame selection.
//!
//! Turns the merged radar timeline into the ordered set of frames worth
//! rendering: everything within the caller's past/future window around the
//! newest available timestamp. Window arithmetic works in whole minutes
//! derived from second-resolution stamps, matching the 10-minute cadence of
//! the radar feed.

use image::RgbaImage;

/// One frame of an animated radar sequence. Ownership transfers to the
/// caller; the engine retains only the shared base map.
#[derive(Debug)]
pub struct RadarFrame {
    /// The composited bitmap for this frame.
    pub image: RgbaImage,
    /// Radar scan timestamp, Unix seconds.
    pub timestamp: i64,
    /// Whether the frame is at or before the newest scan.
    pub is_past: bool,
}

/// A selected animation window: the reference "now" stamp plus the ordered
/// stamps to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameWindow {
    /// Newest timestamp present in the timeline.
    pub now: i64,
    /// Retained stamps, ascending; each paired with its past flag.
    pub stamps: Vec<(i64, bool)>,
}

/// Selects the in-window stamps from a merged timeline.
///
/// `stamps` need not be sorted; the result is ascending. Returns `None`
/// when the timeline is empty. A stamp is kept when it lies within
/// `[now - past_minutes, now + future_minutes]`, with ages computed as
/// whole minutes (`seconds / 60`).
pub fn select_window(mut stamps: Vec<i64>, past_minutes: u32, future_minutes: u32) -> Option<FrameWindow> {
    if stamps.is_empty() {
        return None;
    }
    stamps.sort_unstable();
    stamps.dedup();
    let now = *stamps.last()?;

    let retained = stamps
        .into_iter()
        .filter_map(|ts| {
            let is_past = ts <= now;
            if is_past {
                let age_min = (now - ts) / 60;
                (age_min <= i64::from(past_minutes)).then_some((ts, true))
            } else {
                let ahead_min = (ts - now) / 60;
                (ahead_min <= i64::from(future_minutes)).then_some((ts, false))
            }
        })
        .collect();

    Some(FrameWindow {
        now,
        stamps: retained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_empty_timeline_yields_none() {
        assert!(select_window(vec![], 60, 120).is_none());
    }

    #[test]
    fn test_now_is_latest_stamp() {
        let window = select_window(vec![NOW - 600, NOW, NOW - 1200], 60, 120).unwrap();
        assert_eq!(window.now, NOW);
    }

    #[test]
    fn test_result_is_sorted_ascending() {
        let window = select_window(vec![NOW, NOW - 1200, NOW - 600], 60, 120).unwrap();
        let stamps: Vec<i64> = window.stamps.iter().map(|(ts, _)| *ts).collect();
        assert_eq!(stamps, vec![NOW - 1200, NOW - 600, NOW]);
    }

    #[test]
    fn test_out_of_window_past_stamps_filtered() {
        // 61+ minutes old falls outside a 60-minute window.
        let stale = NOW - 61 * 60;
        let fresh = NOW - 59 * 60;
        let window = select_window(vec![stale, fresh, NOW], 60, 120).unwrap();
        let stamps: Vec<i64> = window.stamps.iter().map(|(ts, _)| *ts).collect();
        assert_eq!(stamps, vec![fresh, NOW]);
    }

    #[test]
    fn test_exact_window_edge_is_kept() {
        // Exactly past_minutes old stays in, matching the <= comparison.
        let edge = NOW - 60 * 60;
        let window = select_window(vec![edge, NOW], 60, 120).unwrap();
        assert_eq!(window.stamps.len(), 2);
    }

    #[test]
    fn test_all_frames_flagged_past_relative_to_latest() {
        // "now" is the newest stamp present, so every retained frame is
        // past (the nowcast stamps fold into the merged timeline before
        // the maximum is taken).
        let window = select_window(vec![NOW - 600, NOW], 60, 120).unwrap();
        assert!(window.stamps.iter().all(|(_, is_past)| *is_past));
    }

    #[test]
    fn test_exactly_one_now_stamp() {
        let window = select_window(vec![NOW - 1200, NOW - 600, NOW], 60, 120).unwrap();
        let now_frames: Vec<_> = window
            .stamps
            .iter()
            .filter(|(ts, _)| *ts == window.now)
            .collect();
        assert_eq!(now_frames.len(), 1);
    }

    #[test]
    fn test_duplicate_stamps_collapse() {
        let window = select_window(vec![NOW, NOW, NOW - 600], 60, 120).unwrap();
        assert_eq!(window.stamps.len(), 2);
    }
}
