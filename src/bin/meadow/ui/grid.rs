//! Grid widget - the LED frame the firmware last committed, plus the
//! trigger outputs down the left edge

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use meadow_seq::{sequencing::LedFrame, NUM_ROWS, NUM_STEPS};

use super::state::UiState;

fn level_style(level: u8) -> (&'static str, Style) {
    match level {
        0 => ("· ", Style::default().fg(Color::DarkGray)),
        1..=3 => ("░░", Style::default().fg(Color::DarkGray)),
        4..=7 => ("▓▓", Style::default().fg(Color::Blue)),
        8..=12 => ("██", Style::default().fg(Color::Green)),
        _ => (
            "██",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    }
}

pub fn render_grid(
    frame: &mut Frame,
    area: Rect,
    state: &UiState,
    cursor: (usize, usize),
    connected: bool,
) {
    let leds = match (connected, state.leds) {
        (true, Some(leds)) => leds,
        (true, None) => LedFrame::default(),
        (false, _) => {
            let text = Paragraph::new(" grid disconnected - [G] to plug it in")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(text, area);
            return;
        }
    };

    let lines: Vec<Line> = (0..NUM_ROWS)
        .map(|row| {
            let gate_high = state.triggers & (1 << row) != 0;
            let mut spans = vec![
                Span::styled(format!(" {} ", row + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    if gate_high { "● " } else { "○ " },
                    Style::default().fg(if gate_high { Color::Red } else { Color::DarkGray }),
                ),
            ];
            for step in 0..NUM_STEPS {
                let (glyph, mut style) = level_style(leds.level(row, step));
                if (step, row) == cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                spans.push(Span::styled(glyph, style));
                if step % 4 == 3 {
                    spans.push(Span::raw(" "));
                }
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}
