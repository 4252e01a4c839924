// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - A keyboard-driven regex template processor TUI for Linux

mod app;
mod commands;
mod config;
mod handlers;
mod logging;
mod picker;
mod syntax;
mod theme;
mod ui;

use anyhow::{bail, Result};
use app::{App, Focus};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use handlers::{key_matches, text_char};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "rexpad")]
#[command(author = "Rexpad Contributors")]
#[command(version)]
#[command(about = "Extract text with named regexes and format it with a template")]
struct CliArgs {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this presets directory instead of the configured one.
    #[arg(long, global = true)]
    presets_dir: Option<PathBuf>,

    /// Preset to open in the TUI.
    #[arg(long)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a preset against a file or stdin.
    Render {
        #[arg(long)]
        preset: String,
        /// Input file; stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Report template problems in a preset.
    Check {
        #[arg(long)]
        preset: String,
    },
    /// List saved presets.
    List,
    /// Delete a saved preset.
    Delete {
        #[arg(long)]
        preset: String,
    },
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let poll_timeout = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(poll_timeout)? {
            continue;
        }

        let Ok(Event::Key(key)) = event::read() else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let k = app.resolved_keys.clone();
        app.message = None;

        // Global
        if key_matches(key, &[k.quit]) {
            break;
        }
        if app.focus.is_pane() {
            if key_matches(key, &[k.save]) {
                app.save_preset();
                continue;
            }
            if key_matches(key, &[k.open_preset]) {
                app.enter_preset_picker();
                continue;
            }
            if key_matches(key, &[k.command_palette]) {
                app.enter_command_palette();
                continue;
            }
            if key_matches(key, &[k.next_pane]) {
                app.next_pane();
                continue;
            }
            if key_matches(key, &[k.prev_pane]) {
                app.prev_pane();
                continue;
            }
            if key_matches(key, &[k.toggle_view]) {
                app.toggle_output_view();
                continue;
            }
            if key_matches(key, &[k.render]) {
                app.recompute();
                continue;
            }
        }

        // Focus-specific handling
        match app.focus {
            Focus::Patterns => {
                if key_matches(key, &[k.move_up, k.move_up_alt]) {
                    app.pattern_move_up();
                } else if key_matches(key, &[k.move_down, k.move_down_alt]) {
                    app.pattern_move_down();
                } else if key_matches(key, &[k.pattern_new]) {
                    app.open_new_pattern();
                } else if key_matches(key, &[k.pattern_edit, k.enter]) {
                    app.open_edit_pattern();
                } else if key_matches(key, &[k.pattern_delete, k.delete]) {
                    app.delete_selected_pattern();
                }
            }
            Focus::Input | Focus::Template => {
                if key_matches(key, &[k.escape]) {
                    app.focus = Focus::Patterns;
                    app.last_pane = Focus::Patterns;
                } else {
                    app.editor_input(key);
                }
            }
            Focus::Output => {
                if key_matches(key, &[k.move_up, k.move_up_alt]) {
                    app.output_scroll_up();
                } else if key_matches(key, &[k.move_down, k.move_down_alt]) {
                    app.output_scroll_down();
                }
            }
            Focus::PatternEditor => {
                if key_matches(key, &[k.escape]) {
                    app.exit_pattern_editor();
                } else if key_matches(key, &[k.enter]) {
                    app.confirm_pattern_edit();
                } else if key_matches(key, &[k.next_pane, k.prev_pane]) {
                    app.edit_toggle_field();
                } else if key_matches(key, &[k.backspace]) {
                    app.edit_backspace();
                } else if let Some(c) = text_char(key) {
                    app.edit_add_char(c);
                }
            }
            Focus::PresetPicker => {
                if key_matches(key, &[k.escape]) {
                    app.exit_preset_picker();
                } else if key_matches(key, &[k.enter]) {
                    app.open_selected_preset();
                } else if key_matches(key, &[k.backspace]) {
                    app.picker_backspace();
                } else if key_matches(key, &[k.move_up_alt]) {
                    app.picker_move_up();
                } else if key_matches(key, &[k.move_down_alt]) {
                    app.picker_move_down();
                } else if let Some(c) = text_char(key) {
                    app.picker_add_char(c);
                }
            }
            Focus::SavePrompt => {
                if key_matches(key, &[k.escape]) {
                    app.exit_save_prompt();
                } else if key_matches(key, &[k.enter]) {
                    app.confirm_save_prompt();
                } else if key_matches(key, &[k.backspace]) {
                    app.save_prompt_backspace();
                } else if let Some(c) = text_char(key) {
                    app.save_prompt_add_char(c);
                }
            }
            Focus::CommandPalette => {
                if key_matches(key, &[k.escape]) {
                    app.exit_command_palette();
                } else if key_matches(key, &[k.enter]) {
                    if let Some(action) = app.get_command_palette_action() {
                        app.execute_command(action);
                    }
                } else if key_matches(key, &[k.backspace]) {
                    app.command_palette_backspace();
                } else if key_matches(key, &[k.move_up_alt]) {
                    app.command_palette_move_up();
                } else if key_matches(key, &[k.move_down_alt]) {
                    app.command_palette_move_down();
                } else if let Some(c) = text_char(key) {
                    app.command_palette_add_char(c);
                }
            }
        }
    }
    Ok(())
}

fn run_tui(args: CliArgs) -> Result<()> {
    let data_dir = config::ensure_data_dir()?;
    logging::init_file_logging(&data_dir.join("rexpad.log"), args.verbose)?;

    let mut app = App::new(args.preset, args.presets_dir)?;
    tracing::info!(presets_dir = %app.presets_dir.display(), "starting tui");

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    enable_raw_mode()?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn main() -> Result<()> {
    let mut args = CliArgs::parse();

    let Some(command) = args.command.take() else {
        return run_tui(args);
    };

    logging::init_stderr_logging(args.verbose)?;
    let presets_dir = match args.presets_dir {
        Some(dir) => dir,
        None => config::load_config()?.presets_dir(),
    };
    let mut stdout = io::stdout().lock();

    match command {
        Command::Render { preset, input } => {
            commands::render(&presets_dir, &preset, input.as_deref(), &mut stdout)
        }
        Command::Check { preset } => {
            let problems = commands::check(&presets_dir, &preset, &mut stdout)?;
            if problems > 0 {
                bail!("{} problem(s) found in '{}'", problems, preset);
            }
            Ok(())
        }
        Command::List => commands::list(&presets_dir, &mut stdout),
        Command::Delete { preset } => {
            let path = rexpad::preset::delete_preset(&presets_dir, &preset)?;
            writeln!(stdout, "Deleted {}", path.display())?;
            Ok(())
        }
    }
}
