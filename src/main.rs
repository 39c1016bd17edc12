/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};

use config::GameConfig;
use sim::level::{self, LevelSource};
use sim::step;
use sim::world::{InitStatus, Phase, TickStatus, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_CANCEL, KEYS_CONFIRM};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Ticks spent on the "Ouch!" banner before the level restarts.
const DYING_TICKS: u32 = 20;
/// Ticks spent on the "Level complete!" banner before the next level loads.
const LEVEL_COMPLETE_TICKS: u32 = 30;

fn main() {
    init_logging();

    let config = GameConfig::load();
    log::info!("config: {:?}", config);

    let source = LevelSource::from_dir(&config.levels_dir);
    let mut world = match config.seed {
        Some(seed) => WorldState::with_seed(seed),
        None => WorldState::new(),
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut kb = InputState::new();
    kb.honor_release = enable_key_release();

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, &mut kb, sound.as_ref(), &config, &source);

    if kb.honor_release {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Super Peach Sisters!");
    println!("Final Score: {}", world.score);
}

/// Log to a file: the terminal belongs to the renderer while the game runs.
fn init_logging() {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let path = std::env::temp_dir().join("superpeach.log");
    match File::create(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("could not open {}: {e}; logging to stderr", path.display()),
    }
    builder.init();
}

/// Ask the terminal for key release events; held keys then end on release
/// instead of on a timeout.
fn enable_key_release() -> bool {
    if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
        return false;
    }
    let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
    match execute!(std::io::stdout(), PushKeyboardEnhancementFlags(flags)) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("keyboard enhancement unavailable: {e}");
            false
        }
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    kb: &mut InputState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    source: &LevelSource,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, kb, &gp, config, source) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            world.anim_tick = world.anim_tick.wrapping_add(1);
            match world.phase {
                Phase::Playing => {
                    let input = kb.actions().merge(gp.actions()).to_player_input();
                    let status = step::tick(world, input);
                    process_sound_events(sound, &world.take_events());
                    on_tick_status(world, status);
                }
                Phase::Dying => tick_dying(world, source),
                Phase::LevelComplete => tick_level_complete(world, source),
                _ => {}
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[sim::event::GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for &event in events {
        sfx.play(event);
    }
}

// ── Phase transitions ──

fn on_tick_status(world: &mut WorldState, status: TickStatus) {
    match status {
        TickStatus::Continue => {}
        TickStatus::PlayerDied => enter_phase(world, Phase::Dying),
        TickStatus::LevelFinished => enter_phase(world, Phase::LevelComplete),
        TickStatus::GameWon => enter_phase(world, Phase::GameComplete),
    }
}

fn enter_phase(world: &mut WorldState, phase: Phase) {
    log::debug!("phase {:?} -> {:?}", world.phase, phase);
    world.phase = phase;
    world.anim_tick = 0;
}

/// Build `world.level` and either start playing or show the load error.
fn start_level(world: &mut WorldState, source: &LevelSource) {
    world.message.clear();
    match level::init_level(world, source) {
        InitStatus::Continue => enter_phase(world, Phase::Playing),
        InitStatus::LevelError => enter_phase(world, Phase::LevelError),
    }
}

fn start_new_game(world: &mut WorldState, config: &GameConfig, source: &LevelSource) {
    world.reset_progress(config.start_lives);
    start_level(world, source);
}

fn return_to_title(world: &mut WorldState) {
    world.teardown();
    world.message.clear();
    enter_phase(world, Phase::Title);
}

fn tick_dying(world: &mut WorldState, source: &LevelSource) {
    if world.anim_tick < DYING_TICKS {
        return;
    }
    if world.lives == 0 {
        world.refresh_status_text();
        enter_phase(world, Phase::GameOver);
    } else {
        start_level(world, source);
    }
}

fn tick_level_complete(world: &mut WorldState, source: &LevelSource) {
    if world.anim_tick < LEVEL_COMPLETE_TICKS {
        return;
    }
    world.level += 1;
    start_level(world, source);
}

/// Menu keys for every phase. Returns true when the game should quit.
fn handle_meta(
    world: &mut WorldState,
    kb: &InputState,
    gp: &GamepadState,
    config: &GameConfig,
    source: &LevelSource,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(KEYS_CANCEL) || gp.cancel_pressed();

    match world.phase {
        Phase::Title => {
            if esc {
                return true;
            }
            if confirm {
                start_new_game(world, config, source);
            }
        }
        Phase::Playing | Phase::Dying | Phase::LevelComplete => {
            if esc {
                return_to_title(world);
            }
        }
        Phase::GameOver => {
            if confirm {
                start_new_game(world, config, source);
            } else if esc {
                return_to_title(world);
            }
        }
        Phase::GameComplete | Phase::LevelError => {
            if confirm || esc {
                return_to_title(world);
            }
        }
    }

    false
}
