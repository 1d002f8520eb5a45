use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};

use termsweeper_core::{CellView, Minefield};

/// Draws boards and screens as plain text, optionally with ANSI colors and screen clearing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Renderer {
    ansi: bool,
}

impl Renderer {
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    pub fn clear(&self, out: &mut impl Write) -> io::Result<()> {
        if self.ansi {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    pub fn paint(&self, text: impl Into<String>, color: Color) -> String {
        let text = text.into();
        if self.ansi {
            text.with(color).to_string()
        } else {
            text
        }
    }

    /// Column header, then one line per row with its label. Cells are `.` hidden, `F` flagged, `M` mine or the count.
    pub fn board(&self, out: &mut impl Write, minefield: &Minefield) -> io::Result<()> {
        let (rows, cols) = minefield.size();
        let row_width = digits(rows - 1);
        let cell_width = digits(cols - 1).max(2);

        write!(out, "{:row_width$} ", "")?;
        for y in 0..cols {
            let label = format!("{y:>cell_width$}");
            write!(out, "{} ", self.paint(label, Color::Blue))?;
        }
        writeln!(out)?;

        for x in 0..rows {
            let label = format!("{x:>row_width$}");
            write!(out, "{} ", self.paint(label, Color::Green))?;
            for y in 0..cols {
                let cell = match minefield.view_at((x, y)) {
                    CellView::Hidden => format!("{:>cell_width$}", "."),
                    CellView::Flagged => format!("{:>cell_width$}", "F"),
                    CellView::Mine => self.paint(format!("{:>cell_width$}", "M"), Color::Red),
                    CellView::Open(count) => format!("{count:>cell_width$}"),
                };
                write!(out, "{cell} ")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

fn digits(value: usize) -> usize {
    value.to_string().len()
}
