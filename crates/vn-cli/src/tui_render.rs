use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;
use vn_core::{ChoiceControl, LayerSlot};

use crate::stage::{LayerContent, LayerView, StageView};
use crate::tui_state::{TuiUiState, CHOICE_VIEWPORT_ROWS};

const ELLIPSIS: &str = "…";

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let chars = value.chars().collect::<Vec<_>>();
    if chars.len() <= width {
        return value.to_string();
    }
    if width == 1 {
        return ELLIPSIS.to_string();
    }
    let mut out = chars.into_iter().take(width - 1).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}

pub(crate) fn wrap_line_to_width(value: &str, width: usize) -> Vec<String> {
    let chars = value.chars().collect::<Vec<_>>();
    if width == 0 || chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

pub(crate) fn describe_layer(slot: LayerSlot, layer: &LayerView, front: bool) -> String {
    let marker = if front { "*" } else { " " };
    let content = match &layer.content {
        LayerContent::Empty => "empty".to_string(),
        LayerContent::Image(path) => format!(
            "image {} @ {:.0}%,{:.0}%",
            path.file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            layer.focal_point.x_percent,
            layer.focal_point.y_percent
        ),
        LayerContent::Fill(color) => format!("fill {}", color),
    };
    format!("{} {:<9} {}", marker, slot.name(), content)
}

pub(crate) fn describe_audio(view: &StageView) -> String {
    let music = match &view.music.source {
        Some(path) => format!(
            "music {} {} {:.2}",
            path.display(),
            if view.music.playing { "playing" } else { "paused" },
            view.music.volume
        ),
        None => format!("music none {:.2}", view.music.volume),
    };
    let effect = match (&view.effect.source, view.effect.playing) {
        (Some(path), true) => format!("sfx {} {:.2}", path.display(), view.effect.volume),
        _ => "sfx idle".to_string(),
    };
    format!("{} | {}", music, effect)
}

pub(crate) fn render_tui(frame: &mut Frame<'_>, ui: &TuiUiState, view: &StageView, title: &str) {
    let terminal_rows = frame.area().height as usize;
    let content_width = (frame.area().width as usize).saturating_sub(2).max(16);
    let gray = Style::default().fg(Color::Gray);

    let mut lines_out: Vec<Line<'_>> = vec![
        Line::from(truncate_to_width(title, content_width)),
        Line::from(Span::styled(
            truncate_to_width(&format!("status: {}", ui.status), content_width),
            gray,
        )),
    ];
    let front = view.front();
    for slot in LayerSlot::ALL {
        let text = describe_layer(slot, view.layer(slot), front == Some(slot));
        let style = if front == Some(slot) {
            Style::default().fg(Color::Cyan)
        } else {
            gray
        };
        lines_out.push(Line::from(Span::styled(
            truncate_to_width(&text, content_width),
            style,
        )));
    }
    lines_out.push(Line::from(Span::styled(
        truncate_to_width(&describe_audio(view), content_width),
        gray,
    )));
    lines_out.push(Line::from(Span::styled("─".repeat(content_width), gray)));

    let reserved_rows = 6 + 1 + CHOICE_VIEWPORT_ROWS + 1 + usize::from(ui.help_visible);
    let visible_text_rows = terminal_rows.saturating_sub(reserved_rows).max(1);
    let mut text_rows = match &view.diagnostic {
        Some(diagnostic) if view.revealed => wrap_line_to_width(diagnostic, content_width),
        _ => ui
            .visible_text(view)
            .lines()
            .flat_map(|line| wrap_line_to_width(line, content_width))
            .collect(),
    };
    if text_rows.len() > visible_text_rows {
        text_rows.drain(..text_rows.len() - visible_text_rows);
    }
    let text_style = if view.diagnostic.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    for row in text_rows {
        lines_out.push(Line::from(Span::styled(row, text_style)));
    }
    lines_out.push(Line::from(Span::styled("─".repeat(content_width), gray)));

    let choices: &[ChoiceControl] = if ui.choices_enabled(view) {
        view.choices.as_slice()
    } else {
        &[]
    };
    for row_index in 0..CHOICE_VIEWPORT_ROWS {
        let absolute_index = ui.choice_scroll_offset + row_index;
        let Some(choice) = choices.get(absolute_index) else {
            lines_out.push(Line::from(" "));
            continue;
        };
        let selected = absolute_index == ui.selected_choice_index;
        let label = truncate_to_width(&choice.label, content_width.saturating_sub(2).max(8));
        lines_out.push(Line::from(Span::styled(
            format!("{}{}", if selected { "> " } else { "  " }, label),
            if selected {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            },
        )));
    }

    lines_out.push(Line::from(Span::styled(
        truncate_to_width(
            "keys: up/down move | enter choose | r restart | h help | q quit",
            content_width,
        ),
        Style::default().fg(Color::Yellow),
    )));
    if ui.help_visible {
        lines_out.push(Line::from(Span::styled(
            truncate_to_width(
                "text appears once the scene effect finishes. * marks the front layer.",
                content_width,
            ),
            Style::default().fg(Color::Magenta),
        )));
    }

    let paragraph = Paragraph::new(lines_out).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, frame.area());
}
