use crate::age::BadgeStyle;
use crate::fields::{FieldDefinition, FieldId, FieldKind};
use crate::form::{FieldEvent, FormAssist, FormView, StudentForm};
use crate::income::{format_brl, parse_amount};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use serde_json::Value;
use std::io;

pub struct App {
    pub assist: FormAssist,
    pub form: StudentForm,
    /// Focusable fields, in page order
    pub order: Vec<FieldId>,
    pub focus: usize,
    /// Path being typed into the file picker, applied on Enter
    pub photo_input: String,
    pub status: String,
    pub submitted: Option<Value>,
    pub quit: bool,
}

impl App {
    pub fn new(assist: FormAssist, mut form: StudentForm) -> Self {
        assist.bind(&mut form);

        let order = assist
            .registry()
            .list_all()
            .iter()
            .filter(|def| def.kind != FieldKind::Display)
            .map(|def| def.id)
            .collect();

        Self {
            assist,
            form,
            order,
            focus: 0,
            photo_input: String::new(),
            status: String::new(),
            submitted: None,
            quit: false,
        }
    }

    /// The field under the cursor, or `None` when nothing on the form is focusable.
    pub fn focused(&self) -> Option<FieldId> {
        self.order.get(self.focus).copied()
    }

    fn focused_definition(&self) -> Option<&FieldDefinition> {
        self.focused().and_then(|field| self.assist.registry().get(field))
    }

    pub fn next_field(&mut self) {
        self.move_focus(true);
    }

    pub fn previous_field(&mut self) {
        self.move_focus(false);
    }

    /// Blur the current field, then move to the next enabled one.
    fn move_focus(&mut self, forward: bool) {
        let Some(leaving) = self.focused() else {
            return;
        };
        self.assist.dispatch(&mut self.form, FieldEvent::Blur { field: leaving });

        let len = self.order.len();
        for _ in 0..len {
            self.focus = if forward {
                (self.focus + 1) % len
            } else {
                (self.focus + len - 1) % len
            };
            if self.form.is_enabled(self.order[self.focus]) {
                break;
            }
        }
    }

    pub fn type_char(&mut self, c: char) {
        let (field, kind) = match self.focused_definition() {
            Some(def) => (def.id, def.kind.clone()),
            None => return,
        };

        match kind {
            FieldKind::Checkbox if c == ' ' => self.toggle(field),
            FieldKind::Choice(options) if c == ' ' => self.cycle_choice(field, &options),
            FieldKind::File => self.photo_input.push(c),
            FieldKind::Checkbox | FieldKind::Choice(_) | FieldKind::Display => {}
            _ => {
                let mut value = self.form.value(field);
                value.push(c);
                self.assist.dispatch(&mut self.form, FieldEvent::Input { field, value });
            }
        }
    }

    pub fn backspace(&mut self) {
        let (field, kind) = match self.focused_definition() {
            Some(def) => (def.id, def.kind.clone()),
            None => return,
        };
        match kind {
            FieldKind::File => {
                self.photo_input.pop();
            }
            kind if kind.is_editable() => {
                let mut value = self.form.value(field);
                value.pop();
                self.assist.dispatch(&mut self.form, FieldEvent::Input { field, value });
            }
            _ => {}
        }
    }

    pub fn enter(&mut self) {
        if self.focused() == Some(FieldId::Photo) {
            let path = std::mem::take(&mut self.photo_input);
            self.assist.dispatch(
                &mut self.form,
                FieldEvent::FileSelected {
                    field: FieldId::Photo,
                    path: path.clone(),
                },
            );
            self.status = if !path.trim().is_empty() && self.form.value(FieldId::Photo) != path.trim() {
                format!("Arquivo recusado: {}", path.trim())
            } else {
                String::new()
            };
        } else {
            self.next_field();
        }
    }

    fn toggle(&mut self, field: FieldId) {
        let checked = !self.form.is_checked(field);
        self.assist.dispatch(&mut self.form, FieldEvent::Toggle { field, checked });
    }

    fn cycle_choice(&mut self, field: FieldId, options: &[String]) {
        if options.is_empty() {
            return;
        }
        let current = self.form.value(field);
        let next = match options.iter().position(|o| *o == current) {
            Some(i) => options[(i + 1) % options.len()].clone(),
            None => options[0].clone(),
        };
        self.assist.dispatch(&mut self.form, FieldEvent::Change { field, value: next });
    }

    pub fn submit(&mut self) {
        if let Some(leaving) = self.focused() {
            self.assist.dispatch(&mut self.form, FieldEvent::Blur { field: leaving });
        }
        self.submitted = Some(self.form.submission(self.assist.registry()));
        self.quit = true;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            KeyCode::Esc => self.quit = true,
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.previous_field(),
            KeyCode::Enter => self.enter(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) => self.type_char(c),
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    while !app.quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
    Ok(())
}

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0]);
    render_form(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(Span::styled(
        "Cadastro de Aluno",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let label_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    for def in app.assist.registry().list_all() {
        let focused = def.kind != FieldKind::Display && app.focused() == Some(def.id);
        let marker = if focused {
            Span::styled("→ ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            Span::raw("  ")
        };

        let mut spans = vec![marker, Span::styled(format!("{}: ", def.label), label_style)];
        spans.extend(field_spans(app, def));
        lines.push(Line::from(spans));
    }

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Dados do Aluno "),
    );

    f.render_widget(form, area);
}

fn field_spans<'a>(app: &'a App, def: &'a FieldDefinition) -> Vec<Span<'a>> {
    let state = app.form.state(def.id);
    let value_style = if state.enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
    };

    match (&def.kind, def.id) {
        (_, FieldId::AgeBadge) => match app.form.badge(FieldId::AgeBadge) {
            Some((text, style)) => {
                let color = match style {
                    BadgeStyle::Success => Color::Green,
                    BadgeStyle::Info => Color::Cyan,
                };
                vec![Span::styled(
                    format!(" {} ", text),
                    Style::default().fg(Color::Black).bg(color),
                )]
            }
            None => vec![],
        },
        (_, FieldId::PhotoPreview) => {
            if state.visible {
                vec![Span::styled(
                    format!("[{}]", app.form.value(FieldId::Photo)),
                    Style::default().fg(Color::Green),
                )]
            } else {
                vec![]
            }
        }
        (_, FieldId::PhotoPlaceholder) => {
            if state.visible {
                vec![Span::styled("(nenhuma foto selecionada)", Style::default().fg(Color::DarkGray))]
            } else {
                vec![]
            }
        }
        (FieldKind::File, _) => vec![
            Span::styled(app.photo_input.clone(), value_style),
            Span::styled("  Enter para selecionar", Style::default().fg(Color::DarkGray)),
        ],
        (FieldKind::Checkbox, _) => {
            let mark = if state.checked { "[x]" } else { "[ ]" };
            vec![Span::styled(mark, value_style)]
        }
        (FieldKind::Currency, _) => {
            let mut spans = vec![Span::styled(state.value.clone(), value_style)];
            if let Some(amount) = parse_amount(&state.value) {
                spans.push(Span::styled(
                    format!("  {}", format_brl(amount)),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ));
            }
            spans
        }
        _ => {
            if state.value.is_empty() && !def.placeholder.is_empty() {
                vec![Span::styled(
                    def.placeholder.as_str(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )]
            } else {
                vec![Span::styled(state.value, value_style)]
            }
        }
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if !app.status.is_empty() {
        status_spans.push(Span::styled(format!(" {} ", app.status), Style::default().fg(Color::Red)));
        status_spans.push(Span::raw("| "));
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Próximo | "));
    status_spans.push(Span::styled("Espaço", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Marcar | "));
    status_spans.push(Span::styled("Ctrl+S", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Salvar | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Sair"));

    let status_bar = Paragraph::new(Line::from(status_spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::{AgeLabels, FixedClock};
    use crate::fields::FieldRegistry;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn create_app(form: StudentForm) -> App {
        let assist = FormAssist::new(
            FieldRegistry::student_form().unwrap(),
            Box::new(FixedClock(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())),
            AgeLabels::default(),
        );
        App::new(assist, form)
    }

    fn focus_on(app: &mut App, field: FieldId) {
        app.focus = app.order.iter().position(|f| *f == field).unwrap();
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.type_char(c);
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_display_elements_not_focusable() {
        let app = create_app(StudentForm::new());
        assert!(!app.order.contains(&FieldId::AgeBadge));
        assert!(!app.order.contains(&FieldId::PhotoPreview));
        assert_eq!(app.focused(), Some(FieldId::Photo));
    }

    #[test]
    fn test_form_without_fields_handles_keys() {
        let assist = FormAssist::new(
            FieldRegistry::new(),
            Box::new(FixedClock(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())),
            AgeLabels::default(),
        );
        let mut app = App::new(assist, StudentForm::new());
        assert_eq!(app.focused(), None);

        for code in [KeyCode::Tab, KeyCode::BackTab, KeyCode::Char('a'), KeyCode::Backspace, KeyCode::Enter] {
            app.handle_key(key(code));
        }
        assert_eq!(app.focused(), None);

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(app.submitted, Some(serde_json::json!({})));
    }

    #[test]
    fn test_typing_birthdate_updates_badge() {
        let mut app = create_app(StudentForm::new());
        focus_on(&mut app, FieldId::BirthDate);

        type_str(&mut app, "2000-01-15");
        assert_eq!(app.form.badge(FieldId::AgeBadge).unwrap().0, "23 anos");

        app.backspace();
        assert_eq!(app.form.value(FieldId::BirthDate), "2000-01-1");
        assert_eq!(app.form.badge(FieldId::AgeBadge).unwrap().0, "24 anos");
        app.backspace();
        assert_eq!(app.form.badge(FieldId::AgeBadge).unwrap().0, "--");
    }

    #[test]
    fn test_tab_skips_disabled_profession() {
        let mut app = create_app(StudentForm::new());
        focus_on(&mut app, FieldId::Employed);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focused(), Some(FieldId::FamilyAllowance));

        focus_on(&mut app, FieldId::Employed);
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focused(), Some(FieldId::Profession));
    }

    #[test]
    fn test_income_normalized_when_leaving_field() {
        let mut app = create_app(StudentForm::new());
        focus_on(&mut app, FieldId::FamilyIncome);

        type_str(&mut app, "850,5x");
        assert_eq!(app.form.value(FieldId::FamilyIncome), "850.5");

        app.next_field();
        assert_eq!(app.form.value(FieldId::FamilyIncome), "850.50");
    }

    #[test]
    fn test_choice_cycles() {
        let mut app = create_app(StudentForm::new());
        focus_on(&mut app, FieldId::Sector);

        app.type_char(' ');
        assert_eq!(app.form.value(FieldId::Sector), "CULTURAL");
        app.type_char(' ');
        assert_eq!(app.form.value(FieldId::Sector), "PROFISSIONALIZANTE");
        app.type_char(' ');
        assert_eq!(app.form.value(FieldId::Sector), "CULTURAL");
    }

    #[test]
    fn test_photo_picker() {
        let mut app = create_app(StudentForm::new());
        focus_on(&mut app, FieldId::Photo);

        type_str(&mut app, "lista.txt");
        app.enter();
        assert!(app.status.contains("lista.txt"));
        assert!(app.form.is_visible(FieldId::PhotoPlaceholder));

        type_str(&mut app, "aluno.jpeg");
        app.enter();
        assert!(app.status.is_empty());
        assert_eq!(app.form.value(FieldId::Photo), "aluno.jpeg");
        assert!(app.form.is_visible(FieldId::PhotoPreview));
    }

    #[test]
    fn test_submit_collects_form() {
        let mut app = create_app(StudentForm::new());
        focus_on(&mut app, FieldId::FullName);
        type_str(&mut app, "Ana");

        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        assert!(app.quit);
        let submitted = app.submitted.as_ref().unwrap();
        assert_eq!(submitted["nome_completo"], "Ana");
    }

    #[test]
    fn test_escape_quits_without_submitting() {
        let mut app = create_app(StudentForm::new());
        app.handle_key(key(KeyCode::Esc));
        assert!(app.quit);
        assert!(app.submitted.is_none());
    }

    #[test]
    fn test_render_shows_badge() {
        let app = create_app(StudentForm::new().with_value(FieldId::BirthDate, "2010-01-02"));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| ui(f, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("13 anos"));
        assert!(content.contains("Cadastro de Aluno"));
    }
}
