//! Screen rendering for [`App`]. Drawing only; no state changes here.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Focus};
use super::{split_layout, standard_layout, truncate_to_width, TuiPalette};
use crate::content::Pattern;
use crate::lesson::{step_view, Overlay, Phase, PlaybackMode, Screen, StepView};
use crate::progress::ProgressStatus;
use crate::quiz::QuizOutcome;
use crate::ui::style::Glyphs;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(TuiPalette::border_style())
        .title(Span::styled(format!(" {} ", title), TuiPalette::title_style()))
}

fn focused_panel(title: &str, focused: bool) -> Block<'_> {
    let block = panel(title);
    if focused {
        block.border_style(TuiPalette::focused_border_style())
    } else {
        block
    }
}

fn bullets<'a>(items: &'a [String]) -> impl Iterator<Item = Line<'a>> {
    items.iter().map(|item| {
        Line::from(vec![
            Span::styled(format!(" {} ", Glyphs::bullet()), TuiPalette::muted_style()),
            Span::raw(item.as_str()),
        ])
    })
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(TuiPalette::VIOLET)
            .add_modifier(Modifier::BOLD),
    ))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 3,
        width,
        height,
    )
}

impl App {
    pub fn render(&self, frame: &mut Frame) {
        let chunks = standard_layout(frame.area());
        self.render_header(frame, chunks[0]);

        match self.flow.screen() {
            Screen::Landing => self.render_landing(frame, chunks[1]),
            Screen::Patterns => self.render_patterns(frame, chunks[1]),
            Screen::Overview => self.render_overview(frame, chunks[1]),
            Screen::Theory => self.render_theory(frame, chunks[1]),
            Screen::Input => self.render_input(frame, chunks[1]),
            Screen::Visualization => self.render_visualization(frame, chunks[1]),
            Screen::Post => self.render_post(frame, chunks[1]),
            Screen::Quiz => self.render_quiz(frame, chunks[1]),
        }

        self.render_status_bar(frame, chunks[2]);
        if self.confirm_quit {
            self.render_confirm(frame, frame.area());
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = match self.flow.pattern() {
            Some(pattern) => format!(" CodeFlux | {} | {} ", pattern.name, self.flow.screen()),
            None => " CodeFlux ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(TuiPalette::border_style())
            .title(Span::styled(title, TuiPalette::title_style()));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Span::styled(self.tagline(), TuiPalette::muted_style())),
            inner,
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints = match (self.flow.screen(), self.focus) {
            (_, Focus::Tutor) => "Enter ask | Esc back to lesson",
            (_, Focus::Notes) => "Type your notes | Esc done",
            (Screen::Landing, _) => "Enter start | q quit",
            (Screen::Patterns, _) => "Up/Down choose | Enter open | Esc back | q quit",
            (Screen::Overview | Screen::Theory, _) => "Enter next | Esc back | q quit",
            (Screen::Input, _) => "Up/Down field | type to edit | Enter visualize | Esc back",
            (Screen::Visualization, _) => {
                "n next | space reveal | g guided | f fast | p pause | r restart | l language | t tutor | Enter summary"
            }
            (Screen::Post, _) => "e notes | Enter quiz | Esc back | q quit",
            (Screen::Quiz, _) => "Up/Down question | 1-9 answer | Enter submit | r retake | Esc back",
        };

        let (text, style) = if self.status.is_empty() {
            (hints.to_string(), TuiPalette::muted_style())
        } else {
            (self.status.clone(), TuiPalette::warning_style())
        };
        let width = area.width.saturating_sub(2) as usize;
        frame.render_widget(
            Paragraph::new(format!(" {}", truncate_to_width(&text, width))).style(style),
            area,
        );
    }

    fn render_confirm(&self, frame: &mut Frame, area: Rect) {
        let dialog = centered(area, 36, 3);
        frame.render_widget(Clear, dialog);
        frame.render_widget(
            Paragraph::new("Quit CodeFlux? (y/n)").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(TuiPalette::focused_border_style()),
            ),
            dialog,
        );
    }

    fn render_landing(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("CodeFlux", TuiPalette::title_style())),
            Line::from(""),
            Line::from(Span::styled(
                self.tagline(),
                Style::default().fg(TuiPalette::VIOLET),
            )),
            Line::from(""),
            Line::from(format!(
                "{} algorithm patterns, one step at a time.",
                self.flow.patterns().len()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to begin",
                TuiPalette::muted_style(),
            )),
        ];
        let body = centered(area, 60, lines.len() as u16 + 2);
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(ratatui::layout::Alignment::Center)
                .block(Block::default()),
            body,
        );
    }

    fn render_patterns(&self, frame: &mut Frame, area: Rect) {
        let tracker = self.flow.tracker();
        let items: Vec<ListItem> = self
            .flow
            .patterns()
            .patterns()
            .iter()
            .map(|pattern| {
                let status = tracker.progress(&pattern.id).unwrap_or_default();
                let score = tracker
                    .quiz_score(&pattern.id)
                    .ok()
                    .flatten()
                    .map(|s| format!("  quiz {}", s))
                    .unwrap_or_default();
                let status_style = match status {
                    ProgressStatus::Completed => TuiPalette::success_style(),
                    ProgressStatus::InProgress => TuiPalette::warning_style(),
                    ProgressStatus::YetToStart => TuiPalette::muted_style(),
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!(" {} ", Glyphs::status(status))),
                    Span::styled(
                        pattern.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", pattern.difficulty.label()),
                        TuiPalette::muted_style(),
                    ),
                    Span::styled(format!("  {}", status), status_style),
                    Span::styled(score, TuiPalette::muted_style()),
                ]))
            })
            .collect();

        let (left, right) = split_layout(area, 55);
        let list = List::new(items)
            .block(panel("Patterns"))
            .highlight_style(TuiPalette::selected_style());
        let mut state = ListState::default();
        state.select(Some(self.pattern_cursor));
        frame.render_stateful_widget(list, left, &mut state);

        let description = self
            .flow
            .patterns()
            .patterns()
            .get(self.pattern_cursor)
            .map(|p| p.description.clone())
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(description)
                .wrap(Wrap { trim: true })
                .block(panel("About")),
            right,
        );
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect) {
        let Some(pattern) = self.flow.pattern() else {
            return;
        };
        let mut lines = vec![
            heading("What it is"),
            Line::from(pattern.overview.what.as_str()),
            Line::from(""),
            heading("When to use it"),
            Line::from(pattern.overview.when.as_str()),
            Line::from(""),
            heading("Complexity"),
            Line::from(Span::styled(
                pattern.overview.complexity.as_str(),
                Style::default().fg(TuiPalette::AMBER),
            )),
        ];
        if !pattern.detect.is_empty() {
            lines.push(Line::from(""));
            lines.push(heading("How to spot it"));
            lines.extend(bullets(&pattern.detect));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(panel(&pattern.name)),
            area,
        );
    }

    fn render_theory(&self, frame: &mut Frame, area: Rect) {
        let Some(pattern) = self.flow.pattern() else {
            return;
        };
        let (left, right) = split_layout(area, 45);

        let video = match pattern.video_asset(self.content_dir.as_deref()) {
            Some(path) => vec![
                Line::from(format!("{} Preview video", Glyphs::video())),
                Line::from(Span::styled(
                    path.display().to_string(),
                    TuiPalette::muted_style(),
                )),
            ],
            None => vec![
                Line::from(format!("{} Video preview unavailable", Glyphs::video())),
                Line::from(Span::styled(
                    "Step through the visualization instead.",
                    TuiPalette::muted_style(),
                )),
            ],
        };
        frame.render_widget(
            Paragraph::new(video)
                .wrap(Wrap { trim: true })
                .block(panel("Preview")),
            left,
        );

        let mut lines = Vec::new();
        for (title, items) in [
            ("Tips", &pattern.tips),
            ("Common mistakes", &pattern.mistakes),
            ("Practice problems", &pattern.problems),
        ] {
            if items.is_empty() {
                continue;
            }
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(heading(title));
            lines.extend(bullets(items));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(panel("Theory")),
            right,
        );
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let block = panel("Inputs");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let label_width = self
            .flow
            .inputs()
            .iter()
            .map(|f| f.name.len())
            .max()
            .unwrap_or(0);
        let mut lines: Vec<Line> = self
            .flow
            .inputs()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let selected = i == self.field_cursor;
                let marker = if selected { Glyphs::arrow() } else { "  " };
                let value_style = if selected {
                    TuiPalette::selected_style()
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!(" {} ", marker)),
                    Span::styled(
                        format!("{:width$} : ", field.name, width = label_width),
                        TuiPalette::muted_style(),
                    ),
                    Span::styled(field.value.clone(), value_style),
                ])
            })
            .collect();
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "This pattern takes no inputs. Press Enter to continue.",
                TuiPalette::muted_style(),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Arrays accept [1, 2, 3] or 1, 2, 3. Bad values fall back to safe defaults.",
            TuiPalette::muted_style(),
        )));
        frame.render_widget(Paragraph::new(lines), inner);

        if let Some(field) = self.flow.inputs().get(self.field_cursor) {
            let prefix = 3 + unicode_width::UnicodeWidthStr::width(Glyphs::arrow()) + label_width + 3;
            let value = unicode_width::UnicodeWidthStr::width(field.value.as_str());
            let x = inner.x + ((prefix + value) as u16).min(inner.width.saturating_sub(1));
            frame.set_cursor_position((x, inner.y + self.field_cursor as u16));
        }
    }

    fn render_visualization(&self, frame: &mut Frame, area: Rect) {
        let (Some(pattern), Some(animator), Some(input)) = (
            self.flow.pattern(),
            self.flow.animator(),
            self.flow.lesson_input(),
        ) else {
            return;
        };
        let state = animator.state();
        let view = step_view(pattern, input, &state, self.listing);

        let (left, right) = split_layout(area, 50);
        self.render_code(frame, left, pattern, &view);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Min(5),
                Constraint::Length(7),
            ])
            .split(right);

        self.render_array(frame, rows[0], &input.array, &view);

        let playback = if state.finished {
            Span::styled("Finished", TuiPalette::success_style())
        } else {
            match state.playback {
                Some(PlaybackMode::Guided) => {
                    Span::raw(format!("{} Playing (guided)", Glyphs::play()))
                }
                Some(PlaybackMode::Fast) => Span::raw(format!("{} Playing (fast)", Glyphs::play())),
                None => Span::styled(
                    format!("{} Paused", Glyphs::pause()),
                    TuiPalette::muted_style(),
                ),
            }
        };
        let phase = match state.phase {
            Phase::Explain => "explain",
            Phase::Apply => "apply",
        };
        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("Step {}/{} ", view.step_index + 1, view.step_count.max(1)),
                    TuiPalette::title_style(),
                ),
                Span::styled(format!("({}) ", phase), TuiPalette::muted_style()),
                playback,
            ]),
            Line::from(""),
            Line::from(view.caption),
        ];
        if let Some(target) = input.field("target") {
            lines.insert(
                1,
                Line::from(Span::styled(
                    format!("target = {}", target),
                    TuiPalette::muted_style(),
                )),
            );
        }
        if let Some(reason) = view.reason {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::raw(format!("{} ", Glyphs::bulb())),
                Span::styled(reason, Style::default().fg(TuiPalette::AMBER)),
            ]));
        }
        for issue in &input.issues {
            lines.push(Line::from(Span::styled(
                format!("{} {}", Glyphs::warning(), issue),
                TuiPalette::warning_style(),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(panel("Walkthrough")),
            rows[1],
        );

        self.render_tutor(frame, rows[2]);
    }

    fn render_code(&self, frame: &mut Frame, area: Rect, pattern: &Pattern, view: &StepView) {
        let Some(listing) = pattern.code.get(self.listing) else {
            frame.render_widget(
                Paragraph::new(Span::styled("No code listing", TuiPalette::muted_style()))
                    .block(panel("Code")),
                area,
            );
            return;
        };
        let gutter = listing.lines.len().to_string().len();
        let lines: Vec<Line> = listing
            .lines
            .iter()
            .enumerate()
            .map(|(i, code)| {
                let number = Span::styled(
                    format!("{:>width$} ", i + 1, width = gutter),
                    TuiPalette::muted_style(),
                );
                if view.code_line == Some(i) {
                    Line::from(vec![
                        number,
                        Span::styled(code.as_str(), TuiPalette::code_line_style()),
                    ])
                } else {
                    Line::from(vec![number, Span::raw(code.as_str())])
                }
            })
            .collect();

        let title = if pattern.code.len() > 1 {
            format!("Code ({}, l to switch)", listing.language)
        } else {
            format!("Code ({})", listing.language)
        };
        frame.render_widget(Paragraph::new(lines).block(panel(&title)), area);
    }

    fn render_array(&self, frame: &mut Frame, area: Rect, array: &[i64], view: &StepView) {
        if array.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("Empty input", TuiPalette::muted_style()))
                    .block(panel("Array")),
                area,
            );
            return;
        }
        let cell = array
            .iter()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1)
            + 2;

        let highlighted = |i: usize| match &view.overlay {
            Overlay::Window(range) => range.contains(&i),
            Overlay::Pointers(p) => i == p.left || i == p.right,
            Overlay::Runners(r) => i == r.slow || i == r.fast,
            Overlay::None => false,
        };
        let marker = |i: usize| -> &'static str {
            match &view.overlay {
                Overlay::Pointers(p) if p.left == i && p.right == i => "LR",
                Overlay::Pointers(p) if p.left == i => "L",
                Overlay::Pointers(p) if p.right == i => "R",
                Overlay::Runners(r) if r.slow == i && r.fast == i => "SF",
                Overlay::Runners(r) if r.slow == i => "S",
                Overlay::Runners(r) if r.fast == i => "F",
                Overlay::Window(range) if *range.start() == i => Glyphs::pointer(),
                _ => "",
            }
        };

        let values: Vec<Span> = array
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let style = if highlighted(i) {
                    TuiPalette::window_style()
                } else {
                    Style::default()
                };
                Span::styled(format!("{:^width$}", v, width = cell), style)
            })
            .collect();
        let markers: Vec<Span> = (0..array.len())
            .map(|i| {
                Span::styled(
                    format!("{:^width$}", marker(i), width = cell),
                    TuiPalette::warning_style(),
                )
            })
            .collect();
        let indices: Vec<Span> = (0..array.len())
            .map(|i| {
                Span::styled(
                    format!("{:^width$}", i, width = cell),
                    TuiPalette::muted_style(),
                )
            })
            .collect();

        frame.render_widget(
            Paragraph::new(vec![Line::from(values), Line::from(markers), Line::from(indices)])
                .block(panel("Array")),
            area,
        );
    }

    fn render_tutor(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Tutor;
        let block = focused_panel("Ask the tutor", focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let prompt = if self.tutor.in_flight {
            Span::styled(
                format!("{} {} (thinking...)", Glyphs::tutor(), self.tutor.question),
                TuiPalette::muted_style(),
            )
        } else if self.tutor.question.is_empty() && !focused {
            Span::styled(
                format!("{} Press t to ask about this step", Glyphs::tutor()),
                TuiPalette::muted_style(),
            )
        } else {
            Span::raw(format!("{} {}", Glyphs::tutor(), self.tutor.question))
        };
        let mut lines = vec![Line::from(prompt)];
        if let Some(reply) = &self.tutor.reply {
            lines.push(Line::from(""));
            lines.push(Line::from(reply.as_str()));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn render_post(&self, frame: &mut Frame, area: Rect) {
        let Some(pattern) = self.flow.pattern() else {
            return;
        };
        let (left, right) = split_layout(area, 50);

        let status = self
            .flow
            .tracker()
            .progress(&pattern.id)
            .unwrap_or_default();
        let mut lines = vec![
            Line::from(vec![
                Span::raw(format!("{} ", Glyphs::status(status))),
                Span::styled(
                    format!("{} walkthrough {}", pattern.name, status),
                    TuiPalette::success_style(),
                ),
            ]),
            Line::from(""),
            heading("Complexity"),
            Line::from(pattern.overview.complexity.as_str()),
        ];
        if !pattern.tips.is_empty() {
            lines.push(Line::from(""));
            lines.push(heading("Remember"));
            lines.extend(bullets(&pattern.tips));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(panel("Summary")),
            left,
        );

        let focused = self.focus == Focus::Notes;
        let text = if self.notes.is_empty() && !focused {
            Paragraph::new(Span::styled(
                "Press e to write notes for this pattern",
                TuiPalette::muted_style(),
            ))
        } else {
            Paragraph::new(self.notes.as_str())
        };
        frame.render_widget(
            text.wrap(Wrap { trim: false })
                .block(focused_panel("Notes", focused)),
            right,
        );
    }

    fn render_quiz(&self, frame: &mut Frame, area: Rect) {
        let Some(quiz) = self.flow.quiz() else {
            return;
        };
        let scored = matches!(quiz.outcome(), Some(QuizOutcome::Scored(_)));
        let mut lines = Vec::new();

        for (q, question) in quiz.questions().iter().enumerate() {
            let current = q == self.quiz_cursor;
            let title_style = if current {
                TuiPalette::title_style()
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(Span::styled(
                format!("{}. {}", q + 1, question.prompt),
                title_style,
            )));

            let selected = quiz.selections().get(q).copied().flatten();
            for (o, option) in question.options.iter().enumerate() {
                let chosen = selected == Some(o);
                let mark = if chosen { "(*)" } else { "( )" };
                let style = if scored && o == question.correct {
                    TuiPalette::success_style()
                } else if scored && chosen {
                    TuiPalette::error_style()
                } else if chosen {
                    Style::default().fg(TuiPalette::VIOLET)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!("   {} {} {}", mark, o + 1, option),
                    style,
                )));
            }
            if scored {
                if let Some(explanation) = &question.explanation {
                    lines.push(Line::from(Span::styled(
                        format!("   {} {}", Glyphs::bulb(), explanation),
                        TuiPalette::muted_style(),
                    )));
                }
            }
            lines.push(Line::from(""));
        }

        if let Some(feedback) = quiz.feedback() {
            let style = if scored {
                TuiPalette::success_style()
            } else {
                TuiPalette::warning_style()
            };
            lines.push(Line::from(Span::styled(feedback, style)));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(panel("Quiz")),
            area,
        );
    }
}
