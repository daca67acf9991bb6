//! Transport bar widget - clock source, tempo, playhead, diagnostics

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use meadow_seq::NUM_STEPS;

use super::state::{PanelView, UiState};

/// Quarter-note tempo for a clock half period at four steps per beat.
fn bpm_from_half_period(half_period_ms: u32) -> f64 {
    if half_period_ms == 0 {
        return 0.0;
    }
    7500.0 / f64::from(half_period_ms)
}

pub fn render_transport(frame: &mut Frame, area: Rect, state: &UiState, panel: &PanelView) {
    let block = Block::default().title(" meadow ").borders(Borders::ALL);
    let status = &state.status;

    let (source, source_color, tempo) = if status.external {
        ("EXT", Color::Magenta, format!("{:.0} BPM in  ", panel.ext_bpm))
    } else {
        (
            "INT",
            Color::Cyan,
            format!(
                "{:.0} BPM ({} ms)  ",
                bpm_from_half_period(status.half_period_ms),
                status.half_period_ms
            ),
        )
    };

    let position = match status.step {
        Some(step) => format!("Step {:>2}/{}  ", step + 1, NUM_STEPS),
        None => "Stopped    ".to_string(),
    };

    let jitter = match status.jitter {
        Some(summary) => format!(
            "Jitter spread {} ms avg {} ({})  ",
            summary.spread(),
            summary.mean,
            summary.samples
        ),
        None => "Jitter -  ".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {source} "),
            Style::default()
                .fg(Color::Black)
                .bg(source_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(tempo, Style::default().fg(source_color)),
        Span::styled(position, Style::default().fg(Color::White)),
        Span::styled(
            if state.clock { "● " } else { "○ " },
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("Knob {:>4}  ", panel.knob),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(jitter, Style::default().fg(Color::DarkGray)),
    ];

    if let Some(held) = status.button_held {
        spans.push(Span::styled(
            format!("BUTTON {held}  "),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    if status.dropped_events > 0 {
        spans.push(Span::styled(
            format!("Dropped {}", status.dropped_events),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpm_from_half_period() {
        assert_eq!(bpm_from_half_period(0), 0.0);
        // boot tempo
        assert!((bpm_from_half_period(120) - 62.5).abs() < 1e-9);
        assert!((bpm_from_half_period(50) - 150.0).abs() < 1e-9);
    }
}
