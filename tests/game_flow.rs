use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cluck_shooter::audio::{AudioPort, MusicTrack, SoundEffect};
use cluck_shooter::observer::GameObserver;
use cluck_shooter::platform::ScriptedInput;
use cluck_shooter::sim::{BossState, EffectKind, MatchPhase, ShipVariant, TickInput};
use cluck_shooter::{Game, Settings};

#[derive(Default)]
struct Log {
    scores: Vec<u64>,
    levels: Vec<u32>,
    boss_health: Vec<(f32, f32)>,
    effects: Vec<BTreeMap<EffectKind, f32>>,
    sounds: Vec<SoundEffect>,
    music: Vec<MusicTrack>,
    game_overs: usize,
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Log>>);

impl GameObserver for Recorder {
    fn score_changed(&mut self, score: u64) {
        self.0.borrow_mut().scores.push(score);
    }

    fn level_changed(&mut self, level: u32) {
        self.0.borrow_mut().levels.push(level);
    }

    fn boss_health_changed(&mut self, current: f32, max: f32) {
        self.0.borrow_mut().boss_health.push((current, max));
    }

    fn effects_changed(&mut self, effects: BTreeMap<EffectKind, f32>) {
        self.0.borrow_mut().effects.push(effects);
    }

    fn game_over(&mut self, _score: u64, _level: u32) {
        self.0.borrow_mut().game_overs += 1;
    }
}

impl AudioPort for Recorder {
    fn play(&mut self, effect: SoundEffect) {
        self.0.borrow_mut().sounds.push(effect);
    }

    fn play_music(&mut self, track: MusicTrack) {
        self.0.borrow_mut().music.push(track);
    }

    fn set_muted(&mut self, _muted: bool) {}
}

fn recorded_game(seed: u64, input: ScriptedInput) -> (Game, Recorder) {
    let recorder = Recorder::default();
    let game = Game::new(
        seed,
        Settings::default(),
        Box::new(recorder.clone()),
        Box::new(recorder.clone()),
        Box::new(input),
    );
    (game, recorder)
}

fn run_frames(game: &mut Game, start_ms: f64, frames: usize) -> f64 {
    let mut now = start_ms;
    for _ in 0..frames {
        now += 1000.0 / 60.0;
        game.frame(now);
    }
    now
}

#[test]
fn test_pause_freezes_timers() {
    let (mut game, _) = recorded_game(5, ScriptedInput::default());
    game.start(None);
    game.skip_to_boss();
    assert_eq!(game.state().phase, MatchPhase::BossIntro);

    game.frame(0.0);
    let now = run_frames(&mut game, 0.0, 30);
    let time_before = game.state().time;
    let timers_before = format!("{:?}", game.state().timers);

    game.pause();
    let now = run_frames(&mut game, now, 600);
    game.update(1.0);
    assert_eq!(game.state().time, time_before);
    assert_eq!(format!("{:?}", game.state().timers), timers_before);

    // The first frame after resume only rebases the clock
    game.resume();
    game.frame(now + 10_000.0);
    assert_eq!(game.state().time, time_before);
    assert_eq!(game.state().phase, MatchPhase::BossIntro);

    run_frames(&mut game, now + 10_000.0, 120);
    assert_eq!(game.state().phase, MatchPhase::BossActive);
}

#[test]
fn test_pause_freezes_wave_and_boss_clocks() {
    let (mut game, _) = recorded_game(11, ScriptedInput::default());
    game.start(None);
    game.frame(0.0);
    let now = run_frames(&mut game, 0.0, 100);
    assert_eq!(game.state().phase, MatchPhase::WaveActive);
    assert!(game.use_bomb());

    let wave_clocks = |game: &Game| {
        let state = game.state();
        (state.spawn_timer, state.spawn_queue.len(), state.effects.snapshot())
    };
    let before = wave_clocks(&game);
    assert!(before.2.contains_key(&EffectKind::Bomb));
    game.pause();
    let now = run_frames(&mut game, now, 300);
    game.update(0.5);
    assert_eq!(wave_clocks(&game), before);

    game.resume();
    game.skip_to_boss();
    game.frame(now);
    let now = run_frames(&mut game, now, 240);
    let boss_clocks = |game: &Game| {
        let state = game.state();
        let boss = state.boss.as_ref().map(|b| (b.state, b.attack_timer, b.pos, b.health));
        (boss, state.effects.snapshot())
    };
    let before = boss_clocks(&game);
    assert_eq!(before.0.map(|b| b.0), Some(BossState::Active));
    game.pause();
    run_frames(&mut game, now, 300);
    game.update(0.5);
    assert_eq!(boss_clocks(&game), before);
}

#[test]
fn test_observer_only_hears_changes() {
    let (mut game, recorder) = recorded_game(9, ScriptedInput::default());
    game.start(None);
    {
        let log = recorder.0.borrow();
        assert_eq!(log.scores, vec![0]);
        assert_eq!(log.levels, vec![1]);
        assert_eq!(log.boss_health, vec![(0.0, 0.0)]);
        assert_eq!(log.effects.len(), 1);
    }

    game.update(0.016);
    game.update(0.016);
    let log = recorder.0.borrow();
    assert_eq!(log.scores.len(), 1);
    assert_eq!(log.levels.len(), 1);
    assert_eq!(log.effects.len(), 1);
    assert_eq!(log.music, vec![MusicTrack::Menu, MusicTrack::Stage, MusicTrack::Stage]);
}

#[test]
fn test_boss_fight_reports_health_and_music() {
    let (mut game, recorder) = recorded_game(21, ScriptedInput::default());
    game.start(Some(ShipVariant::Laser));
    game.skip_to_boss();
    game.frame(0.0);
    run_frames(&mut game, 0.0, 150);

    let boss = game.state().boss.as_ref().map(|b| b.max_health);
    assert!(boss.is_some());
    let log = recorder.0.borrow();
    assert!(log.sounds.contains(&SoundEffect::BossWarning));
    assert!(log.music.contains(&MusicTrack::Boss));
    let (current, max) = *log.boss_health.last().unwrap_or(&(0.0, 0.0));
    assert_eq!(Some(max), boss);
    assert!(current > 0.0 && current <= max);
}

#[test]
fn test_bomb_command() {
    let (mut game, recorder) = recorded_game(3, ScriptedInput::default());
    // No match yet
    assert!(!game.use_bomb());

    game.start(None);
    game.frame(0.0);
    let now = run_frames(&mut game, 0.0, 150);
    assert_eq!(game.state().phase, MatchPhase::WaveActive);

    assert!(game.use_bomb());
    assert_eq!(game.state().bombs, 0);
    assert!(game.state().enemies.is_empty());
    assert!(game.state().effects.is_active(EffectKind::Bomb));
    assert!(recorder.0.borrow().sounds.contains(&SoundEffect::Bomb));
    assert!(!game.use_bomb());

    // Cosmetic tag expires after a second of play
    run_frames(&mut game, now, 70);
    assert!(!game.state().effects.is_active(EffectKind::Bomb));
}

#[test]
fn test_commands_ignored_before_start() {
    let (mut game, _) = recorded_game(1, ScriptedInput::default());
    game.skip_to_boss();
    game.next_level();
    game.restart_level();
    assert_eq!(game.state().phase, MatchPhase::Idle);
    assert_eq!(game.state().level, 1);
}

#[test]
fn test_level_commands() {
    let (mut game, recorder) = recorded_game(1, ScriptedInput::default());
    game.start(None);
    game.next_level();
    assert_eq!(game.state().level, 2);
    game.skip_to_boss();
    assert_eq!(game.state().level, 3);
    game.skip_to_boss();
    assert_eq!(game.state().level, 6);
    game.restart_level();
    assert_eq!(game.state().level, 6);
    assert_eq!(game.state().phase, MatchPhase::BossIntro);
    assert_eq!(recorder.0.borrow().levels, vec![1, 2, 3, 6]);
}

#[test]
fn test_player_moves_from_input() {
    let right = TickInput {
        right: true,
        ..Default::default()
    };
    let (mut game, _) = recorded_game(2, ScriptedInput::new([right]));
    game.start(None);
    let x0 = game.state().player.pos.x;
    game.update(0.1);
    assert!((game.state().player.pos.x - x0 - 30.0).abs() < 1e-3);
}

#[test]
fn test_autopilot_matches_are_reproducible() {
    let play = || {
        let (mut game, _) = recorded_game(777, ScriptedInput::autopilot());
        game.start(Some(ShipVariant::Bomber));
        game.frame(0.0);
        run_frames(&mut game, 0.0, 60 * 20);
        let state = game.state();
        (state.score, state.level, state.lives, state.player.pos)
    };
    assert_eq!(play(), play());
}

#[test]
fn test_long_autopilot_run_keeps_invariants() {
    let (mut game, recorder) = recorded_game(4242, ScriptedInput::autopilot());
    game.start(None);
    game.frame(0.0);
    let mut now = 0.0;
    for _ in 0..60 * 90 {
        now += 1000.0 / 60.0;
        game.frame(now);
        let state = game.state();
        assert!((1..=5).contains(&state.player.weapon_level));
        assert!(state.particles.len() <= state.max_particles);
        assert!(state.screen_shake >= 0.0 && state.screen_shake <= 1.0);
        if let Some(boss) = &state.boss {
            assert!(boss.phase < boss.max_phases);
        }
        if state.phase == MatchPhase::GameOver {
            break;
        }
    }
    let log = recorder.0.borrow();
    let game_over = game.state().phase == MatchPhase::GameOver;
    assert_eq!(log.game_overs, usize::from(game_over));
    // Scores only ever go up
    assert!(log.scores.windows(2).all(|w| w[0] <= w[1]));
}
