//! Sound-effect requests
//!
//! The core never touches an audio device. Burst pops are queued as commands
//! the host drains each frame, rate-limited so overlapping bursts do not
//! machine-gun the speaker. Playback is a non-essential enhancement: before
//! `unlock()` primes the queue (user-gesture requirement on some platforms),
//! and while muted, requests are dropped silently.

use crate::util::Rng;

#[derive(Debug, Clone, PartialEq)]
pub enum SfxCommand {
    /// Host should muted-play-then-pause this asset to satisfy gesture gating
    Prime { asset: usize },
    /// Play one pop
    Play { asset: usize, pitch: f32 },
}

pub struct SfxQueue {
    primed: bool,
    muted: bool,
    asset_count: usize,
    min_gap_ms: f32,
    next_asset: usize,
    last_play_ms: f32,
    pending: Vec<SfxCommand>,
}

impl SfxQueue {
    pub fn new(asset_count: usize, min_gap_ms: f32) -> Self {
        Self {
            primed: false,
            muted: false,
            asset_count: asset_count.max(1),
            min_gap_ms,
            next_asset: 0,
            last_play_ms: f32::NEG_INFINITY,
            pending: Vec::new(),
        }
    }

    /// Prime playback. Queues one Prime command per asset so the host can do
    /// its muted-play trick; idempotent.
    pub fn unlock(&mut self) {
        if self.primed {
            return;
        }
        self.primed = true;
        for asset in 0..self.asset_count {
            self.pending.push(SfxCommand::Prime { asset });
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Request a burst pop at simulation time `now_ms`. Returns whether a play
    /// was actually queued (rate limit, mute, and priming all drop silently).
    pub fn request_pop(&mut self, now_ms: f32, rng: &mut Rng) -> bool {
        if !self.primed || self.muted {
            return false;
        }
        if now_ms - self.last_play_ms < self.min_gap_ms {
            return false;
        }
        self.last_play_ms = now_ms;

        let asset = self.next_asset;
        self.next_asset = (self.next_asset + 1) % self.asset_count;
        self.pending.push(SfxCommand::Play {
            asset,
            pitch: rng.range_f32(0.92, 1.08),
        });
        true
    }

    /// Take all queued commands
    pub fn drain(&mut self) -> Vec<SfxCommand> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> (SfxQueue, Rng) {
        let mut q = SfxQueue::new(3, 120.0);
        q.unlock();
        q.drain(); // discard Prime commands
        (q, Rng::new(0xF00D))
    }

    #[test]
    fn test_rate_limit_drops_second_request() {
        let (mut q, mut rng) = queue();
        assert!(q.request_pop(0.0, &mut rng));
        assert!(!q.request_pop(50.0, &mut rng));
        assert!(q.request_pop(130.0, &mut rng));
        assert_eq!(q.drain().len(), 2);
    }

    #[test]
    fn test_unprimed_requests_dropped() {
        let mut q = SfxQueue::new(3, 120.0);
        let mut rng = Rng::new(1);
        assert!(!q.request_pop(0.0, &mut rng));
        assert!(q.drain().is_empty());
    }

    #[test]
    fn test_mute_drops_requests() {
        let (mut q, mut rng) = queue();
        q.set_muted(true);
        assert!(!q.request_pop(0.0, &mut rng));
        q.set_muted(false);
        assert!(q.request_pop(200.0, &mut rng));
    }

    #[test]
    fn test_assets_round_robin() {
        let (mut q, mut rng) = queue();
        q.request_pop(0.0, &mut rng);
        q.request_pop(200.0, &mut rng);
        q.request_pop(400.0, &mut rng);
        q.request_pop(600.0, &mut rng);
        let assets: Vec<usize> = q
            .drain()
            .iter()
            .map(|c| match c {
                SfxCommand::Play { asset, .. } => *asset,
                SfxCommand::Prime { asset } => *asset,
            })
            .collect();
        assert_eq!(assets, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut q = SfxQueue::new(2, 120.0);
        q.unlock();
        q.unlock();
        assert_eq!(q.drain().len(), 2);
    }

    #[test]
    fn test_pitch_within_range() {
        let (mut q, mut rng) = queue();
        q.request_pop(0.0, &mut rng);
        match &q.drain()[0] {
            SfxCommand::Play { pitch, .. } => assert!((0.92..1.08).contains(pitch)),
            SfxCommand::Prime { .. } => panic!("expected Play"),
        }
    }
}
