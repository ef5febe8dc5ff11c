use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::components::dropdown::{Dropdown, DropdownItem, popup_area};
use crate::components::game_card::{CARD_HEIGHT, GameCard, MIN_CARD_WIDTH, columns_for_width};
use crate::state::app_state::{CustomField, FetchState, Overlay};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::period::PeriodKind;
use crate::state::sections::Section;
use crate::ui::layout::LayoutAreas;
use extrainnings_api::SortOption;

const TITLE: &str = "EXTRAINNINGS";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), !app.state.period.is_custom(), app.state.show_logs);

        draw_header(f, layout.header, app);
        if layout.nav.height > 0 {
            draw_nav(f, layout.nav, app);
        }
        draw_games(f, layout.main, app, loading);
        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }
        draw_footer(f, layout.footer, app);
        draw_overlay(f, &layout, app);
        draw_loading_spinner(f, layout.header[0], loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

// ---------------------------------------------------------------------------
// Header: title and the three controls
// ---------------------------------------------------------------------------

fn draw_header(f: &mut Frame, header: [Rect; 4], app: &App) {
    let title = Paragraph::new(TITLE)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(default_border(Color::White));
    f.render_widget(title, header[0]);

    let overlay = app.state.overlay();
    let period_label = if app.state.period.is_custom() {
        app.state.period.title().unwrap_or_default()
    } else {
        app.state.period.kind.label().to_string()
    };
    let controls = [
        ("Period", 'p', period_label, overlay == Overlay::PeriodMenu || overlay == Overlay::CustomRange),
        ("Sort", 's', app.state.sort.label().to_string(), overlay == Overlay::SortMenu),
        ("Teams", 't', app.teams_label(), overlay == Overlay::TeamMenu),
    ];

    for ((name, key, value, open), area) in controls.into_iter().zip(&header[1..]) {
        let color = if open { Color::Yellow } else { Color::DarkGray };
        let line = Line::from(vec![
            Span::styled(format!("{name} "), Style::default().fg(Color::Gray)),
            Span::styled(format!("[{key}] "), Style::default().fg(Color::DarkGray)),
            Span::styled(value, Style::default().fg(Color::White)),
        ]);
        f.render_widget(Paragraph::new(line).block(default_border(color)), *area);
    }
}

// ---------------------------------------------------------------------------
// Navigation bar
// ---------------------------------------------------------------------------

fn draw_nav(f: &mut Frame, area: Rect, app: &App) {
    let period = &app.state.period;
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [left, center, right] = Layout::horizontal([
        Constraint::Length(14),
        Constraint::Fill(1),
        Constraint::Length(24),
    ])
    .areas(inner);

    let hint = |enabled: bool| {
        if enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        }
    };

    f.render_widget(
        Paragraph::new("← h Previous").style(hint(period.can_go_older())),
        left,
    );

    let mut title = vec![Span::styled(
        period.title().unwrap_or_default(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    if period.kind == PeriodKind::Season
        && let Some(seasons) = app.state.season_list.data()
        && !seasons.is_empty()
    {
        title.push(Span::styled(
            format!("  (seasons on record: {})", seasons.join(", ")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(title)).alignment(Alignment::Center), center);

    let mut right_spans = Vec::new();
    if period.offset > 0 {
        right_spans.push(Span::styled("0 Back to current  ", Style::default().fg(Color::Cyan)));
    }
    right_spans.push(Span::styled("Next l →", hint(period.can_go_newer())));
    f.render_widget(
        Paragraph::new(Line::from(right_spans)).alignment(Alignment::Right),
        right,
    );
}

// ---------------------------------------------------------------------------
// Game list
// ---------------------------------------------------------------------------

enum PlacedKind {
    Heading(String),
    /// Message line under the heading of a section with no games.
    EmptySection(&'static str),
    Card { section: usize, index: usize, flat: usize, col: usize },
}

struct Placed {
    /// Virtual row within the whole scrollable list.
    y: u16,
    height: u16,
    kind: PlacedKind,
}

/// Lay every section out on one tall virtual page.
fn place_sections(sections: &[Section], cols: usize) -> Vec<Placed> {
    let mut placed = Vec::new();
    let mut y: u16 = 0;
    let mut flat = 0;
    for (s, section) in sections.iter().enumerate() {
        placed.push(Placed { y, height: 1, kind: PlacedKind::Heading(section.heading()) });
        y = y.saturating_add(1);

        if section.games().is_empty() {
            let message = match section {
                Section::Period { .. } => "No games found for this period.",
                Section::Date { .. } => "No games found for this section.",
            };
            placed.push(Placed { y, height: 1, kind: PlacedKind::EmptySection(message) });
            y = y.saturating_add(2);
            continue;
        }

        for index in 0..section.games().len() {
            let row = (index / cols) as u16;
            placed.push(Placed {
                y: y.saturating_add(row.saturating_mul(CARD_HEIGHT)),
                height: CARD_HEIGHT,
                kind: PlacedKind::Card { section: s, index, flat, col: index % cols },
            });
            flat += 1;
        }
        let rows = section.games().len().div_ceil(cols) as u16;
        y = y.saturating_add(rows.saturating_mul(CARD_HEIGHT)).saturating_add(1);
    }
    placed
}

/// Scroll just far enough that the selected card is fully in view.
fn scroll_to_selected(placed: &[Placed], selected: usize, scroll: u16, view: u16) -> u16 {
    if selected == 0 {
        return 0;
    }
    let Some(card) = placed
        .iter()
        .find(|p| matches!(p.kind, PlacedKind::Card { flat, .. } if flat == selected))
    else {
        return 0;
    };
    if card.y < scroll {
        card.y
    } else if card.y + card.height > scroll + view {
        (card.y + card.height).saturating_sub(view)
    } else {
        scroll
    }
}

fn draw_games(f: &mut Frame, area: Rect, app: &mut App, loading: LoadingState) {
    match &app.state.games {
        FetchState::Loading => {
            let spinner = if loading.is_loading { loading.spinner_char } else { '⠋' };
            draw_centered(
                f,
                area,
                vec![Line::from(format!("{spinner} Loading games..."))],
                Style::default().fg(Color::Gray),
            );
            return;
        }
        FetchState::Error(message) => {
            let lines = vec![
                Line::from(Span::styled(
                    "Error loading games",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(message.clone()),
                Line::from(""),
                Line::from(Span::styled("Press r to try again", Style::default().fg(Color::Yellow))),
            ];
            draw_centered(f, area, lines, Style::default().fg(Color::Gray));
            return;
        }
        FetchState::Success(_) => {}
    }

    let sections = app.sections();
    if sections.is_empty() {
        let lines = vec![
            Line::from("No games found for the selected period."),
            Line::from(Span::styled(
                "Try selecting a different time range or check back later.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        draw_centered(f, area, lines, Style::default().fg(Color::Gray));
        return;
    }

    let cols = columns_for_width(area.width).min((area.width / MIN_CARD_WIDTH).max(1) as usize);
    let card_width = area.width / cols as u16;
    let placed = place_sections(&sections, cols);

    let scroll = scroll_to_selected(&placed, app.state.cards.selected, app.state.cards.scroll, area.height);
    app.state.cards.scroll = scroll;
    let bottom = scroll.saturating_add(area.height);

    for item in &placed {
        if item.y < scroll || item.y + item.height > bottom {
            continue;
        }
        let y = area.y + (item.y - scroll);
        match &item.kind {
            PlacedKind::Heading(heading) => {
                f.render_widget(
                    Paragraph::new(heading.as_str())
                        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                    Rect::new(area.x, y, area.width, 1),
                );
            }
            PlacedKind::EmptySection(message) => {
                f.render_widget(
                    Paragraph::new(*message)
                        .style(Style::default().fg(Color::DarkGray)),
                    Rect::new(area.x, y, area.width, 1),
                );
            }
            PlacedKind::Card { section, index, flat, col } => {
                let game = &sections[*section].games()[*index];
                let x = area.x + *col as u16 * card_width;
                f.render_widget(
                    GameCard {
                        game,
                        number: index + 1,
                        revealed: app.state.cards.is_revealed(game.id),
                        selected: *flat == app.state.cards.selected,
                    },
                    Rect::new(x, y, card_width, CARD_HEIGHT),
                );
            }
        }
    }
}

fn draw_centered(f: &mut Frame, area: Rect, lines: Vec<Line>, style: Style) {
    let height = lines.len() as u16;
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    f.render_widget(
        Paragraph::new(lines).style(style).alignment(Alignment::Center),
        middle,
    );
}

// ---------------------------------------------------------------------------
// Footer and logs
// ---------------------------------------------------------------------------

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let [left, right] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(36)]).areas(area);

    if let Some(response) = app.state.games.data() {
        let shown = app.visible_games().len();
        f.render_widget(
            Paragraph::new(format!("Showing {shown} of {} games", response.total))
                .style(Style::default().fg(Color::Gray)),
            left,
        );
    }

    f.render_widget(
        Paragraph::new("? help  \" logs  q quit")
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray)),
        right,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn draw_overlay(f: &mut Frame, layout: &LayoutAreas, app: &App) {
    let bounds = f.area();
    match app.state.overlay() {
        Overlay::None => {}
        Overlay::PeriodMenu => {
            let items: Vec<DropdownItem> = PeriodKind::ALL
                .iter()
                .map(|k| DropdownItem::single(k.label(), *k == app.state.period.kind))
                .collect();
            draw_dropdown(f, layout.header[1], bounds, "Period", &items, app.state.period_menu.cursor, None);
        }
        Overlay::SortMenu => {
            let items: Vec<DropdownItem> = SortOption::ALL
                .iter()
                .map(|s| DropdownItem::single(s.label(), *s == app.state.sort))
                .collect();
            draw_dropdown(f, layout.header[2], bounds, "Sort by", &items, app.state.sort_menu.cursor, None);
        }
        Overlay::TeamMenu => {
            let items: Vec<DropdownItem> = match &app.state.team_list {
                FetchState::Success(teams) => teams
                    .iter()
                    .map(|t| DropdownItem::check(t.as_str(), app.state.teams.is_selected(t)))
                    .collect(),
                FetchState::Loading => vec![DropdownItem::single("Loading teams...", false)],
                FetchState::Error(message) => vec![DropdownItem::single(format!("Error: {message}"), false)],
            };
            draw_dropdown(
                f,
                layout.header[3],
                bounds,
                "Teams",
                &items,
                app.state.team_menu.cursor,
                Some("Space toggle  c clear"),
            );
        }
        Overlay::CustomRange => draw_custom_form(f, bounds, app),
        Overlay::Help => draw_help(f, bounds),
    }
}

fn draw_dropdown(
    f: &mut Frame,
    anchor: Rect,
    bounds: Rect,
    title: &str,
    items: &[DropdownItem],
    cursor: usize,
    footer: Option<&str>,
) {
    let dropdown = Dropdown { title, items, cursor, footer };
    let width = dropdown.desired_width().max(anchor.width);
    let area = popup_area(anchor, width, dropdown.desired_height(), bounds);
    f.render_widget(dropdown, area);
}

fn centered_rect(width: u16, height: u16, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);
    Rect::new(
        bounds.x + (bounds.width - width) / 2,
        bounds.y + (bounds.height - height) / 2,
        width,
        height,
    )
}

fn draw_custom_form(f: &mut Frame, bounds: Rect, app: &App) {
    let form = &app.state.custom_form;
    let area = centered_rect(44, 9, bounds);
    f.render_widget(Clear, area);
    let block = default_border(Color::Yellow).title(" Custom Range ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:<7}"), Style::default().fg(Color::Gray)),
            Span::styled(format!("{value:<10}{cursor}"), style),
            Span::styled("  YYYY-MM-DD", Style::default().fg(Color::DarkGray)),
        ])
    };

    let apply_style = if form.can_submit() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    };

    let mut lines = vec![
        field("Start", &form.start, form.focus == CustomField::Start),
        field("End", &form.end, form.focus == CustomField::End),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] Apply", apply_style),
            Span::styled("  [Tab] switch  [Esc] cancel", Style::default().fg(Color::DarkGray)),
        ]),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

const HELP_LINES: &[(&str, &str)] = &[
    ("p", "choose period"),
    ("s", "choose sort"),
    ("t", "filter teams"),
    ("h / ←", "previous period"),
    ("l / →", "next period"),
    ("0 / Home", "back to current"),
    ("j k / ↑ ↓", "select game"),
    ("Enter / Space", "reveal score"),
    ("r", "reload"),
    ("\"", "toggle logs"),
    ("q / Ctrl-c", "quit"),
];

fn draw_help(f: &mut Frame, bounds: Rect) {
    let area = centered_rect(40, HELP_LINES.len() as u16 + 2, bounds);
    f.render_widget(Clear, area);
    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:<15}"), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(default_border(Color::White).title(" Help ")),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, title_area: Rect, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string()).style(style);
    let area = Rect::new(
        title_area.x + title_area.width.saturating_sub(2),
        title_area.y + 1,
        1,
        1,
    );
    f.render_widget(spinner, area);
}
