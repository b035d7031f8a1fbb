//! Terminal front end: coordinate parsing, board printing and prompts.

use std::io::{self, BufRead, Write};
use std::string::{String, ToString};
use std::vec::Vec;

use crate::{
    board::Board,
    common::{Cell, Side},
    game::{Match, MatchObserver, MatchSummary, ShotEvent},
    ship::Direction,
};

/// Spreadsheet-style column label: `A`..`Z`, then `AA`, `AB` and so on.
pub fn column_label(column: usize) -> String {
    let mut letters = Vec::new();
    let mut n = column + 1;
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// `(row 6, column 1)` renders as `B7`, `(row 0, column 26)` as `AA1`.
pub fn coord_to_string(cell: Cell) -> String {
    std::format!("{}{}", column_label(cell.column), cell.row + 1)
}

/// Parse a coordinate such as `B7` or `AA12` (column letters, 1-based row).
pub fn parse_coord(input: &str) -> Option<Cell> {
    let input = input.trim();
    let split = input
        .find(|ch: char| !ch.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (letters, digits) = input.split_at(split);
    if letters.is_empty() || digits.is_empty() {
        return None;
    }
    let mut column = 0usize;
    for ch in letters.bytes() {
        let digit = (ch.to_ascii_uppercase() - b'A') as usize + 1;
        column = column.checked_mul(26)?.checked_add(digit)?;
    }
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(Cell::new(row - 1, column - 1))
}

fn parse_direction(input: &str) -> Option<Direction> {
    match input.trim().to_ascii_lowercase().as_str() {
        "h" | "horizontal" => Some(Direction::Horizontal),
        "v" | "vertical" => Some(Direction::Vertical),
        _ => None,
    }
}

fn label_width(columns: usize) -> usize {
    column_label(columns.saturating_sub(1)).len()
}

fn print_header(rows: usize, columns: usize) {
    let width = label_width(columns);
    std::print!("{:>pad$} ", "", pad = rows.to_string().len());
    for c in 0..columns {
        std::print!(" {:>width$}", column_label(c), width = width);
    }
    std::println!();
}

/// Print a board. With `reveal`, ship cells are shown as `S`.
pub fn print_board(board: &Board, reveal: bool) {
    let width = label_width(board.columns());
    let pad = board.rows().to_string().len();
    print_header(board.rows(), board.columns());
    for r in 0..board.rows() {
        std::print!("{:>pad$} ", r + 1, pad = pad);
        for c in 0..board.columns() {
            let cell = Cell::new(r, c);
            let ch = if board.is_hit(cell) {
                'X'
            } else if board.is_fired(cell) {
                'o'
            } else if reveal && board.occupant(cell).is_some() {
                'S'
            } else {
                '.'
            };
            std::print!(" {:>width$}", ch, width = width);
        }
        std::println!();
    }
}

/// Display the enemy board (top) and the player's board (bottom).
pub fn print_player_view(game: &Match) {
    std::println!(
        "Score: you {}  enemy {}",
        game.score(Side::Player),
        game.score(Side::Opponent)
    );
    std::println!("Enemy board:");
    print_board(game.opponent_board(), false);
    std::println!("\nYour board:");
    print_board(game.player_board(), true);
}

/// Prints the shot log as it happens.
#[derive(Debug, Default)]
pub struct TerminalObserver;

impl MatchObserver for TerminalObserver {
    fn on_shot_resolved(&mut self, event: &ShotEvent) {
        std::println!("{} ({})", event, coord_to_string(event.cell));
    }

    fn on_match_finished(&mut self, summary: &MatchSummary) {
        let headline = match summary.winner {
            Side::Player => "Player wins!",
            Side::Opponent => "You lose!",
        };
        std::println!(
            "\n{} Time: {}s, score {} to {}",
            headline,
            summary.elapsed_ms / 1000,
            summary.score_player,
            summary.score_opponent
        );
    }
}

/// Read one trimmed line; `None` on end of input.
fn prompt(message: &str) -> io::Result<Option<String>> {
    std::print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask the user to place every remaining ship. `auto` lays out the rest.
pub fn place_interactively(game: &mut Match) -> anyhow::Result<()> {
    while let Some(&id) = game.unplaced_ships().first() {
        let ship_type = game
            .player_fleet()
            .get(id)
            .map(|s| s.ship_type())
            .ok_or_else(|| anyhow::anyhow!("unknown ship {}", id))?;
        print_board(game.player_board(), true);
        let message = std::format!(
            "Place {} {} (length {}), e.g. `A1 h`, or `auto`: ",
            ship_type,
            id,
            ship_type.length()
        );
        let Some(line) = prompt(&message)? else {
            anyhow::bail!("input closed during placement");
        };
        if line.eq_ignore_ascii_case("auto") {
            game.auto_place_player_ships()?;
            break;
        }
        let mut parts = line.split_whitespace();
        let (Some(start), direction) = (parts.next().and_then(parse_coord), parts.next()) else {
            std::println!("Could not read a coordinate.");
            continue;
        };
        if let Some(direction) = direction.and_then(parse_direction) {
            game.set_ship_direction(id, direction)?;
        }
        game.select_ship(id)?;
        if !game.place_selected(start)? {
            game.cancel_selection();
            std::println!("That ship does not fit there.");
        }
    }
    Ok(())
}

/// Ask for the next shot until the user gives an in-bounds, unfired cell.
pub fn read_target(game: &Match) -> anyhow::Result<Cell> {
    let board = game.opponent_board();
    loop {
        let Some(line) = prompt("Target (e.g. B7): ")? else {
            anyhow::bail!("input closed during battle");
        };
        match parse_coord(&line) {
            Some(cell) if !board.in_bounds(cell) => std::println!("Off the board."),
            Some(cell) if board.is_fired(cell) => std::println!("Already fired there."),
            Some(cell) => return Ok(cell),
            None => std::println!("Could not read a coordinate."),
        }
    }
}
