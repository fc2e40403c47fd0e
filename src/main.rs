//! Arcade entry point
//!
//! Runs the configured game headlessly at 60 Hz with demo input and a
//! logging presenter. Settings come from the file named by `ARCADE_SETTINGS`.

use arcade_engine::Settings;
use arcade_engine::audio::SoundBank;
use arcade_engine::driver::{BoardDemoInput, DemoInput, FrameDriver, LogPresenter};
use arcade_engine::sim::{GameKind, Session};
use arcade_engine::tictactoe::TicTacToe;

fn main() {
    env_logger::init();
    log::info!("Arcade engine starting...");

    let settings = Settings::load();

    let mut sounds = SoundBank::load_or_silent(&settings.asset_dir);
    sounds.set_master_volume(settings.master_volume);
    sounds.set_sfx_volume(settings.sfx_volume);
    sounds.set_muted(settings.muted);

    let driver = FrameDriver::new()
        .with_pacing(settings.pacing)
        .with_max_ticks(settings.demo_ticks);
    let mut presenter = LogPresenter::new(sounds);

    match settings.game.arcade_kind() {
        Some(kind) => run_arcade(kind, &settings, &driver, &mut presenter),
        None => run_board(&settings, &driver, &mut presenter),
    }
}

fn run_arcade(
    kind: GameKind,
    settings: &Settings,
    driver: &FrameDriver,
    presenter: &mut LogPresenter,
) {
    let mut session =
        Session::new(kind, settings.seed).with_particle_cap(settings.max_particles());
    let mut input = DemoInput::new(kind, session.bounds.center());
    let summary = driver.run(&mut session, &mut input, presenter);

    log::info!(
        "{} finished after {} ticks: level {}, score {}, lives {}, {} sounds played, {} late frames",
        kind.name(),
        summary.ticks,
        session.level,
        session.score,
        session.lives,
        presenter.sounds().played(),
        summary.late_frames
    );
}

fn run_board(settings: &Settings, driver: &FrameDriver, presenter: &mut LogPresenter) {
    let mut game = TicTacToe::new(settings.opponent(), settings.seed);
    let mut input = BoardDemoInput::new(game.layout);
    let summary = driver.run(&mut game, &mut input, presenter);

    log::info!(
        "{} finished after {} ticks: {} moves on the board, verdict {:?}, {} sounds played",
        settings.game.name(),
        summary.ticks,
        9 - game.board.empty_cells().len(),
        game.verdict,
        presenter.sounds().played()
    );
}
