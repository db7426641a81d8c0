use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use noorpath::{
    aim::AimPhase,
    arcade::{Arcade, GameKind, CELL_HEIGHT, CELL_WIDTH},
    number_memory::NumberPhase,
    reaction::ReactionPhase,
    verbal_memory::{VerbalPhase, STARTING_LIVES},
    Clock,
};

const ORANGE: Color = Color::Rgb(255, 140, 0);

pub fn draw<C: Clock + Clone>(arcade: &mut Arcade<C>, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_tabs(arcade.selected, f, chunks[0]);

    match arcade.selected {
        GameKind::Reaction => render_reaction(arcade, f, chunks[1]),
        GameKind::Aim => render_aim(arcade, f, chunks[1]),
        GameKind::Number => render_number(arcade, f, chunks[1]),
        GameKind::Verbal => render_verbal(arcade, f, chunks[1]),
    }

    let help = Paragraph::new(help_text(arcade.selected))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);
}

fn render_tabs(selected: GameKind, f: &mut Frame, area: Rect) {
    let titles = GameKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| format!("{} {}", i + 1, kind.title()))
        .collect::<Vec<_>>();
    let selected_idx = GameKind::ALL
        .iter()
        .position(|k| *k == selected)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Noorpath"))
        .select(selected_idx)
        .highlight_style(
            Style::default()
                .fg(ORANGE)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn help_text(kind: GameKind) -> &'static str {
    match kind {
        GameKind::Reaction => "(space) tap  (s)tart  (r)eset | (tab)/(1-4) switch  (esc)ape",
        GameKind::Aim => "arrows/hjkl aim  (space) shoot  (s)tart  (r)eset | (tab) switch  (esc)ape",
        GameKind::Number => "(enter) start/submit  digits type  (r)eset | (tab) switch  (esc)ape",
        GameKind::Verbal => "(y) seen  (n) new  (s)tart  (r)eset | (tab)/(1-4) switch  (esc)ape",
    }
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

fn ms_or_dash(value: Option<u64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{v} ms"))
}

fn render_reaction<C: Clock + Clone>(arcade: &Arcade<C>, f: &mut Frame, area: Rect) {
    let snap = arcade.reaction.snapshot();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let (bg, title, subtitle) = match snap.phase {
        ReactionPhase::Idle => (
            Color::DarkGray,
            "Press space to begin",
            "A random delay keeps you guessing.",
        ),
        ReactionPhase::Waiting => (
            Color::Red,
            "Wait for orange...",
            "Stay focused and don't tap early.",
        ),
        ReactionPhase::Ready => (ORANGE, "TAP NOW!", "React as quickly as you can."),
        ReactionPhase::TooSoon => (
            Color::Yellow,
            "Too soon -- tap to retry",
            "We'll restart with a new delay.",
        ),
        ReactionPhase::Result => (
            Color::Green,
            "Great! Tap to go again",
            "Compare your score and beat your best.",
        ),
    };

    let pad_height = chunks[0].height.saturating_sub(2);
    let mut lines = vec![Line::from(""); (pad_height / 2).saturating_sub(1) as usize];
    lines.push(Line::from(Span::styled(
        title,
        Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        subtitle,
        Style::default().fg(Color::Black),
    )));
    let pad = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Reaction Sprint"))
        .style(Style::default().bg(bg))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(pad, chunks[0]);

    let recent = if snap.history.is_empty() {
        "Complete a run to see results.".to_string()
    } else {
        snap.history.iter().map(|t| format!("{t} ms")).join("  ")
    };
    let panel = Paragraph::new(vec![
        stat_line("Last", ms_or_dash(snap.last_time)),
        stat_line("Best", ms_or_dash(snap.best_time)),
        stat_line(
            "Average",
            snap.average
                .map_or_else(|| "--".to_string(), |a| format!("{a:.0} ms")),
        ),
        stat_line(
            "Spread",
            snap.std_dev
                .map_or_else(|| "--".to_string(), |s| format!("{s:.1} ms")),
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Recent attempts",
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(recent),
    ])
    .block(Block::default().borders(Borders::ALL).title("How it works"))
    .wrap(Wrap { trim: true });
    f.render_widget(panel, chunks[1]);
}

fn render_aim<C: Clock + Clone>(arcade: &mut Arcade<C>, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let snap = arcade.aim.snapshot();
    let accuracy = arcade
        .aim
        .accuracy()
        .map_or_else(|| "--".to_string(), |a| format!("{a}%"));
    let stats = Line::from(vec![
        Span::styled(
            format!("Time {:>2}s", snap.time_left),
            Style::default().fg(ORANGE).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "   Hits {}   Misses {}   Accuracy {}   Best {}",
            snap.score, snap.misses, accuracy, snap.best
        )),
    ]);
    f.render_widget(Paragraph::new(stats), chunks[0]);

    let board = Block::default().borders(Borders::ALL).title("Focus Aim");
    let inner = board.inner(chunks[1]);
    f.render_widget(board, chunks[1]);
    // The game places targets on whatever area we report here
    arcade.set_board(inner.width, inner.height);

    match snap.phase {
        AimPhase::Running => {
            if let Some(target) = snap.target {
                let col0 = (target.x / CELL_WIDTH).floor() as u16;
                let row0 = (target.y / CELL_HEIGHT).floor() as u16;
                let cols = (snap.target_size / CELL_WIDTH).ceil().max(1.0) as u16;
                let rows = (snap.target_size / CELL_HEIGHT).ceil().max(1.0) as u16;
                let buf = f.buffer_mut();
                for dy in 0..rows {
                    for dx in 0..cols {
                        let (x, y) = (inner.x + col0 + dx, inner.y + row0 + dy);
                        if x < inner.right() && y < inner.bottom() {
                            if let Some(cell) = buf.cell_mut((x, y)) {
                                cell.set_symbol("█").set_fg(ORANGE);
                            }
                        }
                    }
                }
            }
            let (cx, cy) = arcade.cursor();
            if let Some(cell) = f.buffer_mut().cell_mut((inner.x + cx, inner.y + cy)) {
                cell.set_symbol("+")
                    .set_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
            }
        }
        AimPhase::Idle | AimPhase::Stopped => {
            let message = if snap.phase == AimPhase::Idle {
                "Press s to start a round".to_string()
            } else {
                format!("Time! {} hits, {} misses. Press s to go again", snap.score, snap.misses)
            };
            let mut lines = vec![Line::from(""); (inner.height / 2) as usize];
            lines.push(Line::from(Span::styled(
                message,
                Style::default().add_modifier(Modifier::BOLD),
            )));
            f.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center),
                inner,
            );
        }
    }
}

fn render_number<C: Clock + Clone>(arcade: &Arcade<C>, f: &mut Frame, area: Rect) {
    let snap = arcade.number.snapshot();
    let big = Style::default().fg(ORANGE).add_modifier(Modifier::BOLD);

    let mut lines = vec![
        stat_line("Level", snap.length.to_string()),
        stat_line("Best", snap.best.to_string()),
        Line::from(""),
    ];
    let pad = (area.height / 2).saturating_sub(4) as usize;
    lines.extend(std::iter::repeat(Line::from("")).take(pad));

    match snap.phase {
        NumberPhase::Idle => {
            lines.push(Line::from("Remember the number, then type it back."));
            lines.push(Line::from("Press enter to begin."));
        }
        NumberPhase::Show => {
            let shown = snap
                .visible_digit
                .map_or_else(|| "·".to_string(), |d| d.to_string());
            lines.push(Line::from(Span::styled(shown, big)));
            lines.push(Line::from(format!(
                "digit {} of {}",
                snap.reveal_cursor, snap.length
            )));
        }
        NumberPhase::Input => {
            lines.push(Line::from("What was the number?"));
            lines.push(Line::from(Span::styled(format!("> {}_", snap.input), big)));
        }
        NumberPhase::Result => {
            lines.push(Line::from(Span::styled(
                "Not quite.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(stat_line("Number", snap.sequence.unwrap_or_default()));
            lines.push(stat_line("You typed", snap.input));
            lines.push(Line::from("Press enter to try again."));
        }
    }

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Number Recall"))
        .alignment(Alignment::Center);
    f.render_widget(body, area);
}

fn render_verbal<C: Clock + Clone>(arcade: &Arcade<C>, f: &mut Frame, area: Rect) {
    let snap = arcade.verbal.snapshot();
    let hearts = format!(
        "{}{}",
        "♥".repeat(snap.lives as usize),
        "♡".repeat(STARTING_LIVES.saturating_sub(snap.lives) as usize)
    );

    let mut lines = vec![
        Line::from(vec![
            Span::styled(hearts, Style::default().fg(Color::Red)),
            Span::raw(format!("   Score {}   Best {}", snap.score, snap.best)),
        ]),
        Line::from(""),
    ];
    let pad = (area.height / 2).saturating_sub(4) as usize;
    lines.extend(std::iter::repeat(Line::from("")).take(pad));

    match (snap.phase, snap.current_word) {
        (VerbalPhase::Play, Some(word)) => {
            let underline = "‾".repeat(word.width());
            lines.push(Line::from(Span::styled(
                word,
                Style::default().fg(ORANGE).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(underline));
            lines.push(Line::from("Seen it this run? (y) seen  (n) new"));
        }
        (VerbalPhase::Result, word) => {
            lines.push(Line::from(Span::styled(
                format!("Out of lives with {} words.", snap.score),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if let Some(word) = word {
                lines.push(stat_line("Last word", word));
            }
            lines.push(Line::from("Press enter to play again."));
        }
        _ => {
            lines.push(Line::from("Is the word new, or have you seen it already?"));
            lines.push(Line::from("Press enter to begin."));
        }
    }

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Verbal Map"))
        .alignment(Alignment::Center);
    f.render_widget(body, area);
}
