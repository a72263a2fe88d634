use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::app::App;
use super::document::{DocLine, Document, NAV_HEIGHT, Role, Segment};
use crate::internal::content::SiteContent;
use crate::internal::page::{ElementKey, Page, Section};
use crate::internal::theme::ThemeMode;
use crate::utils::theme_loader::Palette;

const CURSOR_GLYPH: &str = "█";
const BLINK_PERIOD: Duration = Duration::from_millis(530);

#[tracing::instrument(skip(app, f))]
pub fn draw(app: &mut App, f: &mut Frame) {
    let palette = *app.palettes.for_theme(app.site.theme());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.foreground)),
        f.area(),
    );

    let document = Document::build(&app.content, app.site.page(), chunks[0].width);
    render_document(app, &document, &palette, f, chunks[0]);

    let hits = if app.site.page().contains(ElementKey::NavBar) {
        let nav_area = Rect {
            height: NAV_HEIGHT.min(chunks[0].height),
            ..chunks[0]
        };
        render_nav_bar(app, &palette, f, nav_area)
    } else {
        Vec::new()
    };
    app.hit_map = hits;

    render_status_bar(app, &palette, f, chunks[1]);
}

fn blink_on(now: Duration) -> bool {
    (now.as_millis() / BLINK_PERIOD.as_millis()) % 2 == 0
}

fn role_color(palette: &Palette, role: Role) -> ratatui::style::Color {
    match role {
        Role::Prompt => palette.prompt,
        Role::Command => palette.command,
        Role::Body | Role::Tagline => palette.foreground,
        Role::Art => palette.art,
        Role::Hint => palette.muted,
        Role::Rule => palette.border,
    }
}

fn styled_line(line: &DocLine, page: &Page, palette: &Palette, now: Duration) -> Line<'static> {
    let opacity = line.opacity(page, now);
    if opacity <= 0.0 {
        // Fully transparent rows keep their space but show nothing.
        return Line::default();
    }
    let spans: Vec<Span> = line
        .segments
        .iter()
        .map(|segment| match segment {
            Segment::Text { text, role } => Span::styled(
                text.clone(),
                Style::default().fg(palette.faded(role_color(palette, *role), opacity)),
            ),
            Segment::Cursor(target) => {
                let lit = page
                    .get(ElementKey::Cursor(*target))
                    .is_some_and(|cursor| cursor.active && cursor.displayed)
                    && blink_on(now);
                let glyph = if lit { CURSOR_GLYPH } else { " " };
                Span::styled(
                    glyph,
                    Style::default().fg(palette.faded(palette.cursor, opacity)),
                )
            }
        })
        .collect();
    Line::from(spans)
}

fn render_document(app: &App, document: &Document, palette: &Palette, f: &mut Frame, area: Rect) {
    let page = app.site.page();
    let now = app.site.now();
    let scroll = page.scroll_y();

    let lines: Vec<Line> = (0..u32::from(area.height))
        .map(|row| match document.line(scroll + row) {
            Some(line) => styled_line(line, page, palette, now),
            None => Line::default(),
        })
        .collect();

    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(palette.background)),
        area,
    );
}

fn nav_label(content: &SiteContent, item: usize) -> String {
    if item == 0 {
        return content.home_label.clone();
    }
    match Section::from_index(item) {
        Some(section) => content
            .section(section)
            .map(|s| s.nav_label.clone())
            .unwrap_or_else(|| section.id().to_string()),
        None => String::new(),
    }
}

/// Draws the sticky nav bar and returns the clickable regions.
fn render_nav_bar(
    app: &App,
    palette: &Palette,
    f: &mut Frame,
    area: Rect,
) -> Vec<(Rect, ElementKey)> {
    let page = app.site.page();
    let focus = page.focus();
    let base = Style::default().fg(palette.foreground).bg(palette.background);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(palette.border))
        .style(base);
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    if inner.height == 0 {
        return Vec::new();
    }

    let mut hits = Vec::new();
    let item_style = |key: ElementKey, highlighted: bool| {
        let mut style = base;
        if highlighted {
            style = style.fg(palette.accent_foreground).bg(palette.accent);
        }
        if focus == Some(key) {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    };

    // Section links, left aligned.
    let mut spans = vec![Span::raw(" ")];
    let mut x = inner.x + 1;
    for item in page.nav_items() {
        let key = ElementKey::NavItem(item);
        let active = page.get(key).is_some_and(|el| el.active);
        let span = Span::styled(format!(" {} ", nav_label(&app.content, item)), item_style(key, active));
        let width = span.width() as u16;
        hits.push((Rect::new(x, inner.y, width, 1), key));
        x = x.saturating_add(width + 1);
        spans.push(span);
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), inner);

    // Theme switcher, right aligned.
    let buttons: Vec<(ThemeMode, Span)> = page
        .theme_buttons()
        .into_iter()
        .map(|mode| {
            let key = ElementKey::ThemeButton(mode);
            let pressed = page.get(key).is_some_and(|el| el.pressed);
            (mode, Span::styled(format!("[{mode}]"), item_style(key, pressed)))
        })
        .collect();
    let total: u16 = buttons.iter().map(|(_, span)| span.width() as u16 + 1).sum();
    let start = inner.right().saturating_sub(total).max(x);
    let mut bx = start;
    let mut switcher = Vec::new();
    for (mode, span) in buttons {
        let width = span.width() as u16;
        hits.push((Rect::new(bx, inner.y, width, 1), ElementKey::ThemeButton(mode)));
        bx = bx.saturating_add(width + 1);
        switcher.push(span);
        switcher.push(Span::raw(" "));
    }
    let switcher_area = Rect {
        x: start,
        width: inner.right().saturating_sub(start),
        ..inner
    };
    f.render_widget(Paragraph::new(Line::from(switcher)), switcher_area);

    hits.retain(|(rect, _)| rect.right() <= inner.right());
    hits
}

fn render_status_bar(app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
    let intro = app.site.intro();
    let hint = if intro.is_listening() {
        "Any key: Continue | Ctrl+C: Quit"
    } else if !intro.is_complete() {
        ""
    } else {
        "j/k: Sections | Tab: Focus | Enter: Select | a/l/d: Theme | q: Quit"
    };
    let status = format!(
        "{} | Theme: {} ({})",
        app.site.tracker().current_section(),
        app.site.theme_mode(),
        app.site.theme()
    );

    let style = Style::default().fg(palette.muted).bg(palette.background);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(status.chars().count() as u16 + 1),
        ])
        .split(area);
    f.render_widget(Paragraph::new(hint).style(style), chunks[0]);
    f.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Right)
            .style(style),
        chunks[1],
    );
}
