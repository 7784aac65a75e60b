//! Lifecycle behavior of the show context driven purely through the public API

use skyburst::{Show, ShowState, StartOptions, Tuning};

const DT: f32 = 1.0 / 60.0;

fn show() -> Show {
    Show::with_seed(800.0, 600.0, Tuning::default(), false, 0xABCD)
}

fn tick_for(show: &mut Show, seconds: f32) {
    let steps = (seconds / DT).ceil() as usize;
    for _ in 0..steps {
        show.tick(DT);
    }
}

#[test]
fn starts_stopped_and_start_runs() {
    let mut show = show();
    assert_eq!(show.state(), ShowState::Stopped);
    show.start(StartOptions::default());
    assert_eq!(show.state(), ShowState::Running);
}

#[test]
fn clock_advances_only_while_running() {
    let mut show = show();
    show.tick(DT);
    assert_eq!(show.clock_ms(), 0.0);

    show.start(StartOptions { celebrate: false });
    tick_for(&mut show, 0.5);
    let at_pause = show.clock_ms();
    assert!(at_pause > 400.0);

    show.pause();
    tick_for(&mut show, 1.0);
    assert_eq!(show.clock_ms(), at_pause);

    show.resume();
    show.tick(DT);
    assert!(show.clock_ms() > at_pause);
}

#[test]
fn long_stall_is_clamped_to_one_small_step() {
    let mut show = show();
    show.start(StartOptions { celebrate: false });
    let before = show.clock_ms();
    // Host hiccup: a single 5 second frame
    show.tick(5.0);
    let advanced = show.clock_ms() - before;
    assert!(advanced <= Tuning::default().max_dt * 1000.0 + 0.01);
}

#[test]
fn pause_freezes_entities_resume_continues() {
    let mut show = show();
    show.start(StartOptions { celebrate: true });
    tick_for(&mut show, 0.5);
    assert!(show.live_counts().1 > 0, "celebration bursts should have fired");

    show.pause();
    let frozen = show.live_counts();
    tick_for(&mut show, 2.0);
    assert_eq!(show.live_counts(), frozen, "paused ticks must not mutate entities");

    show.resume();
    assert_eq!(show.state(), ShowState::Running);
    // Long enough for every frozen celebration particle to expire
    tick_for(&mut show, 3.0);
    assert_ne!(show.live_counts(), frozen);
}

#[test]
fn stop_releases_every_entity_to_its_pool() {
    let mut show = show();
    show.start(StartOptions { celebrate: true });
    tick_for(&mut show, 1.0);
    let (rockets, particles, smoke) = show.live_counts();
    assert!(particles > 0);

    show.stop();
    assert_eq!(show.state(), ShowState::Stopped);
    assert_eq!(show.live_counts(), (0, 0, 0));
    let (pr, pp, ps) = show.pooled_counts();
    assert!(pr >= rockets && pp >= particles && ps >= smoke);
}

#[test]
fn stop_cancels_scheduled_bursts() {
    let mut show = show();
    show.start(StartOptions { celebrate: true });
    // Stop before the first celebration offset (90ms) comes due
    show.tick(DT);
    show.stop();
    show.start(StartOptions { celebrate: false });
    tick_for(&mut show, 0.5);
    // Nothing from the cancelled celebration; autonomous launches need >1s
    assert_eq!(show.live_counts().1, 0);
}

#[test]
fn autonomous_launcher_respects_cadence() {
    let mut show = show();
    show.start(StartOptions { celebrate: false });

    tick_for(&mut show, 1.0);
    assert_eq!(show.live_counts().0, 0, "no launch before the base interval");

    // The first interval is at most twice the base (1050ms * [1, 2)); an
    // early launch may already have detonated into particles
    tick_for(&mut show, 1.3);
    let (rockets, particles, _) = show.live_counts();
    assert!(rockets > 0 || particles > 0, "a launch should have happened by 2.3s");
}

#[test]
fn celebration_bursts_fire_shortly_after_start() {
    let mut show = show();
    show.start(StartOptions { celebrate: true });
    tick_for(&mut show, 0.3);
    assert!(show.live_counts().1 > 0);
}

#[test]
fn celebration_bursts_roll_smoke_exactly_once() {
    // With a certain smoke chance and sub-bursts disabled, each of the three
    // celebration bursts must produce exactly one puff, not two
    let mut tuning = Tuning::default();
    tuning.smoke_chance = 1.0;
    tuning.sub_burst_chance = 0.0;
    let mut show = Show::with_seed(800.0, 600.0, tuning, false, 0xABCD);
    show.start(StartOptions { celebrate: true });
    tick_for(&mut show, 0.3);
    assert_eq!(show.live_counts().2, 3);
}

#[test]
fn click_ignored_during_start_window() {
    let mut show = show();
    show.start(StartOptions { celebrate: false });
    show.tick(DT);
    show.click(400.0, 300.0);
    assert_eq!(show.live_counts().0, 0, "clicks in the post-start window are dropped");

    // Past the 600ms window the same click launches
    tick_for(&mut show, 0.7);
    show.click(400.0, 300.0);
    assert!(show.live_counts().0 > 0);
}

#[test]
fn manual_burst_works_even_when_stopped() {
    let mut show = show();
    show.burst(Some(400.0), Some(200.0));
    assert!(show.live_counts().1 > 0, "manual bursts bypass the lifecycle");
}

#[test]
fn rockets_detonate_into_particles() {
    let mut show = show();
    show.start(StartOptions { celebrate: false });
    tick_for(&mut show, 1.0);
    show.click(400.0, 300.0);
    // Give the shell time to climb to apex and burst
    tick_for(&mut show, 3.0);
    assert!(show.live_counts().1 > 0);
}

#[test]
fn zero_area_surface_disables_everything() {
    let mut show = Show::with_seed(0.0, 600.0, Tuning::default(), false, 7);
    assert!(!show.is_enabled());
    show.start(StartOptions::default());
    assert_eq!(show.state(), ShowState::Stopped);
    show.burst(None, None);
    show.click(10.0, 10.0);
    tick_for(&mut show, 1.0);
    assert_eq!(show.live_counts(), (0, 0, 0));
    assert_eq!(show.clock_ms(), 0.0);
}

#[test]
fn reduced_motion_disables_everything() {
    let mut show = Show::with_seed(800.0, 600.0, Tuning::default(), true, 7);
    assert!(!show.is_enabled());
    show.start(StartOptions::default());
    show.burst(None, None);
    tick_for(&mut show, 1.0);
    assert_eq!(show.live_counts(), (0, 0, 0));
}

#[test]
fn resize_adopts_new_surface() {
    let mut show = show();
    show.start(StartOptions { celebrate: false });
    show.resize(400.0, 300.0);
    // Bad sizes are ignored, the last good surface stays
    show.resize(0.0, 300.0);
    show.resize(-10.0, -10.0);
    // Bursts still land inside the (new) surface
    show.burst(None, None);
    assert!(show.live_counts().1 > 0);
}

#[test]
fn identical_seeds_replay_identically() {
    let mut a = Show::with_seed(800.0, 600.0, Tuning::default(), false, 42);
    let mut b = Show::with_seed(800.0, 600.0, Tuning::default(), false, 42);
    a.start(StartOptions { celebrate: true });
    b.start(StartOptions { celebrate: true });
    for _ in 0..240 {
        a.tick(DT);
        b.tick(DT);
    }
    assert_eq!(a.live_counts(), b.live_counts());
    assert_eq!(a.clock_ms(), b.clock_ms());
    assert_eq!(a.wind(), b.wind());
}
