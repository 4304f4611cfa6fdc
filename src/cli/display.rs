//! Terminal rendering of trial scenes
//!
//! Every scene is drawn centered on the screen measured at startup. Photos
//! become a labeled placeholder box (a terminal cannot blit a jpeg; the
//! label keeps dry runs performable). Methods queue crossterm commands;
//! `commit` flushes them as one frame.

use std::io::{stdout, Stdout, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use crate::error::Result;
use crate::surface::Key;

const BOX_WIDTH: u16 = 28;
const BOX_HEIGHT: u16 = 9;

/// Queues scene drawing onto stdout
pub struct Screen {
    out: Stdout,
    cols: u16,
    rows: u16,
}

impl Screen {
    pub fn new() -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Screen {
            out: stdout(),
            cols,
            rows,
        })
    }

    fn center(&self, width: u16) -> (u16, u16) {
        (self.cols.saturating_sub(width) / 2, self.rows / 2)
    }

    /// Queue a full clear; every frame starts from a blank screen
    pub fn clear(&mut self) -> Result<()> {
        queue!(
            self.out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            cursor::Hide
        )?;
        Ok(())
    }

    pub fn fixation(&mut self) -> Result<()> {
        let (col, row) = self.center(1);
        queue!(
            self.out,
            cursor::MoveTo(col, row),
            SetForegroundColor(Color::White),
            Print("+"),
            ResetColor
        )?;
        Ok(())
    }

    /// Placeholder box standing in for the photo
    pub fn image_box(&mut self, label: &str) -> Result<()> {
        let (col, mid) = self.center(BOX_WIDTH);
        let top = mid.saturating_sub(BOX_HEIGHT / 2);
        let inner = (BOX_WIDTH - 2) as usize;

        queue!(self.out, SetForegroundColor(Color::DarkGrey))?;
        queue!(
            self.out,
            cursor::MoveTo(col, top),
            Print(format!("┌{}┐", "─".repeat(inner)))
        )?;
        for line in 1..BOX_HEIGHT - 1 {
            queue!(
                self.out,
                cursor::MoveTo(col, top + line),
                Print(format!("│{}│", " ".repeat(inner)))
            )?;
        }
        queue!(
            self.out,
            cursor::MoveTo(col, top + BOX_HEIGHT - 1),
            Print(format!("└{}┘", "─".repeat(inner))),
            ResetColor
        )?;

        let text: String = label.chars().take(inner).collect();
        let text_col = col + 1 + (inner.saturating_sub(text.chars().count()) / 2) as u16;
        queue!(
            self.out,
            cursor::MoveTo(text_col, top + BOX_HEIGHT / 2),
            SetForegroundColor(Color::Cyan),
            Print(text),
            ResetColor
        )?;
        Ok(())
    }

    pub fn word(&mut self, word: &str) -> Result<()> {
        let (col, row) = self.center(word.chars().count() as u16);
        queue!(
            self.out,
            cursor::MoveTo(col, row),
            SetForegroundColor(Color::White),
            Print(word),
            ResetColor
        )?;
        Ok(())
    }

    pub fn feedback(&mut self, correct: bool) -> Result<()> {
        let (text, color) = if correct {
            ("CORRECT", Color::Green)
        } else {
            ("WRONG", Color::Red)
        };
        let (col, row) = self.center(text.len() as u16);
        queue!(
            self.out,
            cursor::MoveTo(col, row),
            SetForegroundColor(color),
            Print(text),
            ResetColor
        )?;
        Ok(())
    }

    pub fn round_intro(&mut self, round: usize) -> Result<()> {
        let text = format!("Round {round}");
        let (col, row) = self.center(text.len() as u16);
        queue!(
            self.out,
            cursor::MoveTo(col, row),
            SetForegroundColor(Color::Yellow),
            Print(text),
            ResetColor
        )?;
        Ok(())
    }

    pub fn slow_notice(&mut self) -> Result<()> {
        let text = "TOO SLOW";
        let (col, row) = self.center(text.len() as u16);
        queue!(
            self.out,
            cursor::MoveTo(col, row),
            SetForegroundColor(Color::Red),
            Print(text),
            ResetColor
        )?;
        Ok(())
    }

    pub fn rest_break(&mut self, resume: (Key, Key)) -> Result<()> {
        let line1 = "Take a break.";
        let line2 = format!(
            "Press {} then {} to continue.",
            resume.0.label(),
            resume.1.label()
        );
        let (col1, row) = self.center(line1.len() as u16);
        let (col2, _) = self.center(line2.chars().count() as u16);
        queue!(
            self.out,
            cursor::MoveTo(col1, row),
            SetForegroundColor(Color::Cyan),
            Print(line1),
            cursor::MoveTo(col2, row + 2),
            Print(line2),
            ResetColor
        )?;
        Ok(())
    }

    /// Flush everything queued since the last commit as one frame
    pub fn commit(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Restore the cursor and leave a clean screen
    pub fn shutdown(&mut self) -> Result<()> {
        queue!(
            self.out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            cursor::Show,
            ResetColor
        )?;
        self.out.flush()?;
        Ok(())
    }
}
