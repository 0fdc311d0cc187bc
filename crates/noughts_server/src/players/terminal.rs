//! Human player reading choices from standard input.

use super::Player;
use anyhow::{Context, Result};
use noughts_board::{Board, Marker, Position};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Prompts on stdout and reads answers line by line from stdin.
pub struct TerminalPlayer {
    name: String,
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalPlayer {
    /// Creates a player bound to this process's terminal.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Asks for a numeric identifier until one parses.
    pub async fn ask_id(&mut self) -> Result<u64> {
        let mut prompt = "Please enter your id (must be an integer): ";
        loop {
            let answer = self.ask(prompt).await?;
            match answer.trim().parse::<u64>() {
                Ok(id) => return Ok(id),
                Err(_) => prompt = "Id must be an integer, please enter a correct number: ",
            }
        }
    }

    async fn ask(&mut self, prompt: &str) -> Result<String> {
        println!("{prompt}");
        self.lines
            .next_line()
            .await?
            .context("Input closed")
    }
}

#[async_trait::async_trait]
impl Player for TerminalPlayer {
    async fn choose_marker(&mut self) -> Result<Marker> {
        loop {
            let answer = self.ask("Please choose your marker (x or o): ").await?;
            match answer.parse::<Marker>() {
                Ok(marker) => return Ok(marker),
                Err(_) => println!("It's not a valid symbol."),
            }
        }
    }

    async fn choose_tile(&mut self, board: &Board, marker: Marker) -> Result<Position> {
        loop {
            let answer = self
                .ask(&format!(
                    "Current player: {marker}\nPlease choose an unoccupied tile - from 1 to 9."
                ))
                .await?;
            match Position::parse_choice(&answer) {
                Some(tile) if board.is_empty(tile) => return Ok(tile),
                Some(_) => println!("This tile is occupied."),
                None => println!("It's not a valid symbol."),
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observe(&mut self, board: &Board) {
        println!("\n{}\n", board.display());
    }
}
