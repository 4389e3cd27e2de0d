use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::Rng;
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

mod entities;
mod game;
mod maze;
mod settings;
mod throttler;

use entities::place_entities;
use game::{GameState, Phase, Session};
use maze::{generate_maze, CellCoords, Dir};
use settings::Settings;
use throttler::Throttler;

/// Horizontal character stride per maze cell: one wall column plus a
/// two-column interior.
const CELL_STRIDE: usize = 3;
const CELL_INNER_W: usize = 2;
const INPUT_THROTTLE_MS: u64 = 100;
const WALL_COLOR: Color = Color::DarkGrey;

const MONSTER_COLORS: [Color; 6] = [
    Color::Red,
    Color::Magenta,
    Color::Cyan,
    Color::Green,
    Color::Blue,
    Color::White,
];

/// What occupies a cell interior, for the diff renderer.
#[derive(Clone, Copy, PartialEq)]
enum CellView {
    Empty,
    Avatar,
    Monster(u32),
    Pumpkin,
    Goal,
}

struct Renderer {
    last: Vec<CellView>,
    last_hud: String,
    last_banner: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Renderer {
            last: vec![CellView::Empty; width * height],
            last_hud: String::new(),
            last_banner: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout) -> io::Result<()> {
    let mut rng = rand::thread_rng();
    let settings = Settings::from_env();
    let mut game = GameState::Init;
    let mut renderer = Renderer::new(settings.maze_width, settings.maze_height);
    let mut throttler = Throttler::new(Duration::from_millis(INPUT_THROTTLE_MS));
    let tick_period = settings.monster_tick_period();
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char(' ') => {
                            if matches!(game.phase(), Phase::Won | Phase::Lost) {
                                game.reset();
                                renderer.needs_full = true;
                            }
                        }
                        code => {
                            if let Some(dir) = dir_for_key(code) {
                                if throttler.should_proceed(code) {
                                    game.move_avatar(dir);
                                }
                            }
                        }
                    },
                    _ => {}
                }
            }
        }

        if game.phase() == Phase::Init {
            // Init waits until the viewport can hold the board, then brings
            // up a brand-new maze and placement.
            let (needed_w, needed_h) = needed_size(&settings);
            let (term_w, term_h) = terminal::size()?;
            if term_w >= needed_w && term_h >= needed_h {
                game.start(new_session(&settings, &mut rng));
                last_tick = Instant::now();
                renderer.needs_full = true;
            }
        }

        // The tick only fires while Playing, so a finished session never
        // sees another monster step.
        if game.phase() == Phase::Playing && last_tick.elapsed() >= tick_period {
            last_tick = Instant::now();
            game.tick_monsters(&mut rng);
        }

        render(stdout, &game, &settings, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}

fn new_session(settings: &Settings, rng: &mut impl Rng) -> Session {
    let maze = generate_maze(rng, settings.maze_width, settings.maze_height);
    let entities = place_entities(
        rng,
        settings.maze_width,
        settings.maze_height,
        settings.num_pumpkins,
        settings.num_monsters,
        settings.safe_zone_size,
    );
    Session::new(maze, entities, settings.safe_zone_size)
}

fn needed_size(settings: &Settings) -> (u16, u16) {
    let board_w = (settings.maze_width * CELL_STRIDE + 1) as u16;
    let board_h = (settings.maze_height * 2 + 1) as u16;
    // One HUD row above the board, one banner row below.
    (board_w, board_h + 2)
}

fn render(
    stdout: &mut Stdout,
    game: &GameState,
    settings: &Settings,
    renderer: &mut Renderer,
) -> io::Result<()> {
    let (needed_w, needed_h) = needed_size(settings);
    let board_h = needed_h - 2;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let session = match game.session() {
        Some(session) => session,
        None => {
            stdout.flush()?;
            return Ok(());
        }
    };

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = hud_line(session);
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    // Walls never change within a session; the lattice is drawn only on
    // full repaints.
    if renderer.needs_full {
        stdout.queue(SetForegroundColor(WALL_COLOR))?;
        for (row, line) in session.maze().to_ascii().lines().enumerate() {
            stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y + row as u16))?;
            stdout.queue(Print(line))?;
        }
        stdout.queue(ResetColor)?;
    }

    let maze = session.maze();
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            let view = cell_view(session, CellCoords { x, y });
            let idx = y * maze.width() + x;
            if renderer.needs_full || view != renderer.last[idx] {
                renderer.last[idx] = view;
                draw_cell(stdout, renderer, x, y, view)?;
            }
        }
    }

    let (banner, banner_color) = match game.phase() {
        Phase::Won => (
            "You escaped with every pumpkin! Press space to play again.",
            Color::Green,
        ),
        Phase::Lost => (
            "The monsters won this time... Press space to try again.",
            Color::Red,
        ),
        _ => ("", Color::Reset),
    };
    if renderer.needs_full || banner != renderer.last_banner {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y + board_h))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(banner_color))?;
        stdout.queue(Print(banner))?;
        stdout.queue(ResetColor)?;
        renderer.last_banner = banner.to_string();
    }

    renderer.needs_full = false;
    stdout.flush()?;
    Ok(())
}

fn hud_line(session: &Session) -> String {
    let caught = session.captured().len();
    let total = caught + session.pumpkins().len();
    let monsters: usize = session.monsters().values().map(Vec::len).sum();
    let mut shelf = String::new();
    for _ in session.captured() {
        shelf.push_str("🎃");
    }
    format!(
        "Pumpkins {}/{} {}  Monsters: {}  (arrows move, q to quit)",
        caught, total, shelf, monsters
    )
}

fn cell_view(session: &Session, coords: CellCoords) -> CellView {
    if session.avatar() == coords {
        return CellView::Avatar;
    }
    let index = session.maze().coords_to_index(coords);
    if let Some(monster) = session.monsters().get(&index).and_then(|pack| pack.last()) {
        return CellView::Monster(monster.style_id);
    }
    if session.pumpkins().contains_key(&index) {
        return CellView::Pumpkin;
    }
    if coords == session.maze().goal() {
        return CellView::Goal;
    }
    CellView::Empty
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    view: CellView,
) -> io::Result<()> {
    let (text, color) = match view {
        CellView::Avatar => ("😃", Color::Yellow),
        CellView::Monster(style_id) => (
            "👻",
            MONSTER_COLORS[style_id as usize % MONSTER_COLORS.len()],
        ),
        CellView::Pumpkin => ("🎃", Color::Reset),
        CellView::Goal => ("⭐", Color::Yellow),
        CellView::Empty => ("  ", Color::Reset),
    };
    let x_pos = renderer.origin_x + (x * CELL_STRIDE + 1) as u16;
    let y_pos = renderer.origin_y + (y * 2 + 1) as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_INNER_W {
        for _ in 0..(CELL_INNER_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
