use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impostor::config::GameConfig;
use impostor::reveal::RevealPhase;
use impostor::state::GameController;
use impostor::storage::FileStorage;
use impostor::transfer::ConflictDecision;
use impostor::types::*;
use impostor::words;

const CLEAR: &str = "\x1B[2J\x1B[H";

/// Line-based terminal input
struct Terminal {
    lines: io::Lines<io::StdinLock<'static>>,
}

impl Terminal {
    fn new() -> Self {
        Self {
            lines: io::stdin().lock().lines(),
        }
    }

    /// Print a prompt and read one trimmed line; `None` on end of input
    fn ask(&mut self, prompt: &str) -> Option<String> {
        print!("{} ", prompt);
        let _ = io::stdout().flush();
        match self.lines.next() {
            Some(Ok(line)) => Some(line.trim().to_string()),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impostor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = GameConfig::from_env();
    let storage = match FileStorage::open(&config.data_dir) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            eprintln!(
                "Cannot open data directory {}: {}",
                config.data_dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };
    let mut controller = GameController::load(storage, &config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("play") => play(&mut controller),
        Some("export") => {
            println!("{}", controller.export_banks());
            Ok(())
        }
        Some("import") => match args.get(1) {
            Some(path) => import(&mut controller, path),
            None => Err("Usage: impostor import <file>".to_string()),
        },
        Some(other) => Err(format!(
            "Unknown command: {}\nUsage: impostor [play | export | import <file>]",
            other
        )),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn import(controller: &mut GameController, path: &str) -> Result<(), String> {
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path, e))?;
    controller.begin_import(&text)?;

    let mut term = Terminal::new();
    loop {
        let Some(conflict) = controller
            .import_session()
            .and_then(|s| s.current_conflict())
            .cloned()
        else {
            break;
        };
        let answer = term
            .ask(&format!(
                "\"{}\" already exists. [o]verwrite, [s]kip or [c]ancel?",
                conflict.existing_name
            ))
            .unwrap_or_default();
        match answer.to_lowercase().as_str() {
            "o" | "overwrite" => controller.resolve_import_conflict(ConflictDecision::Overwrite)?,
            "s" | "skip" => controller.resolve_import_conflict(ConflictDecision::Skip)?,
            "c" | "cancel" | "" => {
                controller.cancel_import();
                println!("Import cancelled, nothing changed.");
                return Ok(());
            }
            _ => println!("Please answer o, s or c."),
        }
    }

    let summary = controller.finish_import()?;
    println!(
        "Imported: {} new, {} overwritten, {} skipped.",
        summary.created, summary.overwritten, summary.skipped
    );
    Ok(())
}

fn play(controller: &mut GameController) -> Result<(), String> {
    let mut term = Terminal::new();
    loop {
        let keep_going = match controller.screen() {
            Screen::Home => home_screen(controller, &mut term),
            Screen::Players => players_screen(controller, &mut term),
            Screen::Categories => categories_screen(controller, &mut term),
            Screen::CustomBanks => custom_banks_screen(controller, &mut term),
            Screen::RevealLoop => reveal_screen(controller, &mut term),
            Screen::Discussion => discussion_screen(controller, &mut term),
            Screen::PostGame => post_game_screen(controller, &mut term),
        };
        if !keep_going {
            return Ok(());
        }
    }
}

/// Report a rejected action without leaving the loop
fn report(result: Result<impl Sized, String>) {
    if let Err(e) = result {
        println!("! {}", e);
    }
}

fn home_screen(controller: &mut GameController, term: &mut Terminal) -> bool {
    println!("\n=== Impostor! ===");
    println!("[n] New game");
    if controller.has_saved_players() {
        println!("[p] Play again");
    }
    println!("[c] Custom categories");
    println!("[q] Quit");

    match term.ask(">").as_deref() {
        Some("n") => report(controller.go_to(Screen::Players)),
        Some("p") => report(controller.go_to(Screen::Categories)),
        Some("c") => report(controller.go_to(Screen::CustomBanks)),
        Some("q") | None => return false,
        _ => {}
    }
    true
}

fn players_screen(controller: &mut GameController, term: &mut Terminal) -> bool {
    println!("\n=== Players ===");
    let presets = controller.presets();
    for (i, preset) in presets.iter().enumerate() {
        println!(
            "  preset {}: {} ({} players, {} impostor(s))",
            i + 1,
            preset.name,
            preset.player_count,
            preset.impostor_count
        );
    }
    if !presets.is_empty() {
        match term.ask("Load a preset number, or enter to skip:") {
            None => return false,
            Some(answer) => {
                if let Some(preset) = answer
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| presets.get(n.wrapping_sub(1)))
                {
                    report(controller.apply_preset(&preset.id));
                }
            }
        }
    }

    let current = controller.round_config().clone();
    let Some(count) = term.ask(&format!("Players [{}]:", current.player_count)) else {
        return false;
    };
    if let Ok(n) = count.parse() {
        controller.set_player_count(n);
    }
    let config = controller.round_config().clone();
    let Some(impostors) = term.ask(&format!(
        "Impostors (1-{}) [{}]:",
        config.player_count - 1,
        config.impostor_count
    )) else {
        return false;
    };
    if let Ok(k) = impostors.parse() {
        controller.set_impostor_count(k);
    }

    for i in 0..controller.round_config().player_count {
        let existing = controller.round_config().player_names[i].clone();
        let shown = if existing.trim().is_empty() {
            default_player_name(i)
        } else {
            existing
        };
        let Some(name) = term.ask(&format!("Name for seat {} [{}]:", i + 1, shown)) else {
            return false;
        };
        if !name.is_empty() {
            report(controller.set_player_name(i, &name));
        }
    }

    if let Some(name) = term.ask("Save as preset (name, or enter to skip):") {
        if !name.is_empty() {
            let preset = controller.save_preset(&name);
            println!("Saved preset {}.", preset.name);
        }
    }

    report(controller.finalize_players());
    true
}

fn categories_screen(controller: &mut GameController, term: &mut Terminal) -> bool {
    println!("\n=== Choose categories ===");
    let builtin: Vec<&str> = words::category_names().collect();
    for (i, name) in builtin.iter().enumerate() {
        let mark = if controller.selected_categories().iter().any(|c| c == name) {
            "x"
        } else {
            " "
        };
        println!("  [{}] {}. {}", mark, i + 1, name);
    }

    let enabled: Vec<WordBank> = controller
        .sorted_banks()
        .into_iter()
        .filter(|b| controller.enabled_bank_ids().contains(&b.id))
        .collect();
    for (i, bank) in enabled.iter().enumerate() {
        let mark = if controller.selected_bank_ids().contains(&bank.id) {
            "x"
        } else {
            " "
        };
        println!("  [{}] c{}. {} ({} words)", mark, i + 1, bank.name, bank.words.len());
    }
    println!(
        "{} words in play. <n> toggle, c<n> toggle custom, [s]tart, [m]anage custom, [b]ack",
        controller.word_pool().len()
    );

    let Some(answer) = term.ask(">") else {
        return false;
    };
    match answer.as_str() {
        "s" => {
            let mut rng = rand::rng();
            report(controller.start_round(&mut rng, now_millis()));
        }
        "m" => report(controller.go_to(Screen::CustomBanks)),
        "b" => report(controller.go_to(Screen::Players)),
        other => {
            if let Some(n) = other.strip_prefix('c').and_then(|n| n.parse::<usize>().ok()) {
                if let Some(bank) = enabled.get(n.wrapping_sub(1)) {
                    report(controller.toggle_custom_bank_selection(&bank.id));
                }
            } else if let Some(name) = other
                .parse::<usize>()
                .ok()
                .and_then(|n| builtin.get(n.wrapping_sub(1)))
            {
                report(controller.toggle_builtin_category(name));
            }
        }
    }
    true
}

fn custom_banks_screen(controller: &mut GameController, term: &mut Terminal) -> bool {
    println!("\n=== Custom categories ({:?}) ===", controller.bank_sort_mode());
    let banks = controller.sorted_banks();
    for (i, bank) in banks.iter().enumerate() {
        let mark = if controller.enabled_bank_ids().contains(&bank.id) {
            "on "
        } else {
            "off"
        };
        println!("  {}. [{}] {}: {}", i + 1, mark, bank.name, bank.words.join(", "));
    }
    println!("[a]dd, [e <n>] edit, [d <n>] delete, [t <n>] toggle shown, [p]redefined, [o]rder, [b]ack");

    let Some(answer) = term.ask(">") else {
        return false;
    };
    let mut parts = answer.splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let target = parts
        .next()
        .and_then(|n| n.trim().parse::<usize>().ok())
        .and_then(|n| banks.get(n.wrapping_sub(1)));

    match (command, target) {
        ("a", _) => {
            let (Some(name), Some(words)) = (
                term.ask("Name:"),
                term.ask("Words (comma separated):"),
            ) else {
                return false;
            };
            controller.create_bank(BankInput::new(name, words));
        }
        ("e", Some(bank)) => {
            let (Some(name), Some(words)) = (
                term.ask(&format!("Name [{}]:", bank.name)),
                term.ask("Words:"),
            ) else {
                return false;
            };
            report(controller.update_bank(&bank.id, BankInput::new(name, words)));
        }
        ("d", Some(bank)) => report(controller.delete_bank(&bank.id)),
        ("t", Some(bank)) => {
            let shown = controller.enabled_bank_ids().contains(&bank.id);
            report(controller.set_bank_enabled(&bank.id, !shown));
        }
        ("p", _) => {
            for theme in words::themes() {
                let names: Vec<&str> = theme.items.iter().map(|t| t.name).collect();
                println!("  {}: {}", theme.label, names.join(", "));
            }
            if let Some(name) = term.ask("Template name:") {
                report(controller.save_predefined(&name));
            }
        }
        ("o", _) => {
            let next = match controller.bank_sort_mode() {
                BankSortMode::OrderOfSaving => BankSortMode::RecentlyPlayed,
                BankSortMode::RecentlyPlayed => BankSortMode::OrderOfSaving,
            };
            controller.set_bank_sort_mode(next);
        }
        ("b", _) => report(controller.back_from_custom_banks()),
        _ => {}
    }
    true
}

fn reveal_screen(controller: &mut GameController, term: &mut Terminal) -> bool {
    let Some(seq) = controller.reveal() else {
        report(controller.go_to(Screen::Home));
        return true;
    };
    let phase = seq.phase();
    let name = seq
        .current_player()
        .map(|p| p.name.clone())
        .unwrap_or_default();
    let is_last = seq.is_last_player();

    match phase {
        RevealPhase::AwaitingPass(_) => {
            print!("{}", CLEAR);
            if term
                .ask(&format!("Pass the device to {}. Press enter when ready.", name))
                .is_none()
            {
                return false;
            }
            report(controller.ready());
        }
        RevealPhase::AwaitingReveal {
            revealed_at: None, ..
        } => {
            if term.ask(&format!("{}, press enter to reveal.", name)).is_none() {
                return false;
            }
            report(controller.commit_reveal(Instant::now()));
            match controller.current_card() {
                Some(RoleCard::Word(word)) => println!("\n  The word is: {}\n", word),
                Some(RoleCard::Impostor) => println!("\n  You are the IMPOSTOR!\n"),
                None => {}
            }
        }
        RevealPhase::AwaitingReveal { .. } | RevealPhase::Revealed(_) => {
            let label = if is_last { "start" } else { "hide" };
            if term
                .ask(&format!("Press enter to {}.", label))
                .is_none()
            {
                return false;
            }
            let wait = controller
                .reveal()
                .and_then(|seq| seq.remaining_view_time(Instant::now()))
                .unwrap_or_default();
            std::thread::sleep(wait);
            report(controller.next(Instant::now()));
        }
        RevealPhase::AllRevealed => {
            print!("{}", CLEAR);
            match controller.start_discussion() {
                Ok(starter) => println!("Everyone has seen their card. {} starts!", starter.name),
                Err(e) => println!("! {}", e),
            }
        }
    }
    true
}

fn discussion_screen(controller: &mut GameController, term: &mut Terminal) -> bool {
    let now = Instant::now();
    let status = match controller.timer() {
        Some(timer) if timer.is_finished(now) => "Time's up!".to_string(),
        Some(timer) if timer.is_running() => format!("{} left", timer.format_remaining(now)),
        Some(timer) if timer.is_paused() => format!("{} (paused)", timer.format_remaining(now)),
        Some(timer) => format!("{} minute timer", timer.minutes()),
        None => String::new(),
    };
    println!("\n=== Discussion: {} ===", status);
    println!("[+/-] timer length, [s]tart/pause/resume, [r]eset, [e]nd timer, [v]ote done");

    let Some(answer) = term.ask(">") else {
        return false;
    };
    let now = Instant::now();
    match answer.as_str() {
        "+" => {
            controller.set_timer_minutes(1);
        }
        "-" => {
            controller.set_timer_minutes(-1);
        }
        "s" => {
            if let Some(timer) = controller.timer_mut() {
                let result = if timer.is_running() {
                    timer.pause(now)
                } else {
                    timer.start(now)
                };
                report(result);
            }
        }
        "r" => {
            if let Some(timer) = controller.timer_mut() {
                timer.reset();
            }
        }
        "e" => {
            if let Some(timer) = controller.timer_mut() {
                timer.force_end();
            }
        }
        "v" => report(controller.end_game()),
        _ => {}
    }
    true
}

fn post_game_screen(controller: &mut GameController, term: &mut Terminal) -> bool {
    println!("\n=== Round over! ===");
    if controller.everyone_was_impostor() {
        println!("Everyone was the impostor!");
    }
    println!("[a] Play again, [p] Players, [h] Home, [q] Quit");

    match term.ask(">").as_deref() {
        Some("a") => report(controller.go_to(Screen::Categories)),
        Some("p") => report(controller.go_to(Screen::Players)),
        Some("h") => report(controller.go_to(Screen::Home)),
        Some("q") | None => return false,
        _ => {}
    }
    true
}
