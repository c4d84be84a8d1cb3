//! Slideshow views
//!
//! ```text
//! ┌ Slideshow ─────────────────────────┐
//! │                                    │
//! │          harbour-at-dawn.jpg       │
//! │               2 / 6                │
//! │                                    │
//! └────────────────────────────────────┘
//!  loop on · forward · 1000ms       keys
//! ```

use crate::selectors::SlideshowViewModel;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

const KEYS: &str = "←/→ step · p play · space pause · r loop · d dir · +/- speed · v hide · q quit";
const HIDDEN_KEYS: &str = "v show · q quit";

pub fn render(vm: Option<&SlideshowViewModel>, frame: &mut Frame) {
    let [main, status] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    match vm {
        Some(vm) => {
            frame.render_widget(PhotoWidget(vm), main);
            frame.render_widget(StatusBarWidget { vm: Some(vm) }, status);
        }
        None => {
            frame.render_widget(
                Paragraph::new("Slideshow hidden")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::default().borders(Borders::ALL)),
                main,
            );
            frame.render_widget(StatusBarWidget { vm: None }, status);
        }
    }
}

/// Current photo, centred
struct PhotoWidget<'a>(&'a SlideshowViewModel);

impl Widget for PhotoWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let vm = self.0;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Slideshow ")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        block.render(area, buf);

        let (position, count) = vm.position;
        let lines = match &vm.current_photo {
            Some(photo) => vec![
                Line::from(Span::styled(
                    photo.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{} / {}", position, count),
                    Style::default().fg(Color::DarkGray),
                )),
            ],
            None => vec![Line::from("No photos")],
        };

        let height = lines.len() as u16;
        let [_, centre, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .areas(inner);
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(centre, buf);
    }
}

struct StatusBarWidget<'a> {
    vm: Option<&'a SlideshowViewModel>,
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let metadata_style = Style::default().fg(Color::DarkGray);
        if let Some(vm) = self.vm {
            let summary = format!(
                " loop {} · {} · {}ms",
                if vm.loop_enabled { "on" } else { "off" },
                vm.direction.label(),
                vm.speed_ms
            );
            buf.set_string(area.x, area.y, &summary, Style::default().fg(Color::Yellow));
        }

        let keys = if self.vm.is_some() { KEYS } else { HIDDEN_KEYS };
        let width = keys.chars().count() as u16;
        if width < area.width {
            buf.set_string(area.x + area.width - width - 1, area.y, keys, metadata_style);
        }
    }
}
