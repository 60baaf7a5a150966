//! Interactive terminal viewer over a labeled CSV.
//!
//! Loads the table once, shows the aggregate summary, and steps through
//! individual records. Left/Right (or h/l, p/n) navigate; q or Esc quits.
//! A missing or empty table is reported as a plain message, never a crash.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Write};
use std::path::Path;

use finprobe_core::{LabeledRecord, ReportError, Summary, ViewerState, report};

/// Launch the viewer against a labeled CSV.
pub fn run(path: &Path) -> anyhow::Result<()> {
    let records = match report::read_csv(path) {
        Ok(records) => records,
        Err(ReportError::MissingFile { path }) => {
            println!("No labeled data found at {}.", path.display());
            println!("Run `finprobe label` first.");
            return Ok(());
        }
        Err(err) => {
            println!("Could not load {}: {err}", path.display());
            return Ok(());
        }
    };

    // Empty table: error state, no aggregate computation.
    let Some(mut state) = ViewerState::new(records.len()) else {
        println!("{} contains no labeled records.", path.display());
        return Ok(());
    };

    // Loaded once, cached for the session.
    let summary = Summary::compute(&records);

    terminal::enable_raw_mode()?;
    execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = event_loop(&records, &summary, &mut state);

    execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

fn event_loop(
    records: &[LabeledRecord],
    summary: &Summary,
    state: &mut ViewerState,
) -> anyhow::Result<()> {
    loop {
        render(records, summary, state)?;

        match event::read()? {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => state.prev(),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => state.next(),
                _ => {}
            },
            Event::Resize(..) => {}
            _ => {}
        }
    }
    Ok(())
}

fn render(records: &[LabeledRecord], summary: &Summary, state: &ViewerState) -> anyhow::Result<()> {
    let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
    let width = width.clamp(40, 120);

    let mut out = String::new();
    header(&mut out, summary, width);
    histogram(&mut out, summary, width);
    record_panel(&mut out, &records[state.index()], state, width);
    out.push_str("\r\n  \u{2190}/\u{2192} navigate   q quit\r\n");

    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0), Print(out))?;
    stdout.flush()?;
    Ok(())
}

fn header(out: &mut String, summary: &Summary, width: usize) {
    let rule = "\u{2500}".repeat(width);
    out.push_str("  FinanceQA: Model Failure Analysis\r\n");
    out.push_str(&rule);
    out.push_str("\r\n");

    let most_common = summary
        .most_common_error
        .map(|l| l.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!(
        "  Samples: {}   Accuracy: {:.1}%   Failures: {}   Most common error: {}\r\n",
        summary.total,
        summary.accuracy * 100.0,
        summary.failures,
        most_common,
    ));
    out.push_str(&rule);
    out.push_str("\r\n");
}

fn histogram(out: &mut String, summary: &Summary, width: usize) {
    let max = summary
        .histogram
        .first()
        .map(|(_, n)| *n)
        .unwrap_or(1)
        .max(1);
    let bar_room = width.saturating_sub(44).max(10);

    out.push_str("  Error breakdown\r\n");
    for (label, count) in &summary.histogram {
        let bar_len = (count * bar_room).div_ceil(max);
        out.push_str(&format!(
            "  {:<35} {:>4} {}\r\n",
            label.to_string(),
            count,
            "\u{2587}".repeat(bar_len),
        ));
    }
}

fn record_panel(out: &mut String, record: &LabeledRecord, state: &ViewerState, width: usize) {
    let rule = "\u{2500}".repeat(width);
    out.push_str(&rule);
    out.push_str("\r\n");
    out.push_str(&format!(
        "  Record {} of {}   [{}]\r\n\r\n",
        state.index() + 1,
        state.len(),
        record.error_label,
    ));

    field(out, "Company", &record.sample.company, width);
    field(out, "Question type", &record.sample.question_type, width);
    if !record.sample.file_name.is_empty() {
        let source = if record.sample.file_link.trim().is_empty() {
            record.sample.file_name.clone()
        } else {
            format!("{} ({})", record.sample.file_name, record.sample.file_link)
        };
        field(out, "Source file", &source, width);
    }
    field(out, "Question", &record.sample.question, width);
    field(out, "Ground truth", &record.sample.answer, width);
    field(out, "Model answer", &record.model_answer, width);
    field(out, "Rationale", &record.error_rationale, width);
    if record.sample.context.trim().is_empty() {
        field(out, "Context", "(none provided)", width);
    } else {
        field(out, "Context", &record.sample.context, width);
    }
}

fn field(out: &mut String, name: &str, value: &str, width: usize) {
    out.push_str(&format!("  {name}\r\n"));
    let value = if value.is_empty() { "-" } else { value };
    let wrap_width = width.saturating_sub(6).max(20);
    // Wrap per source line so paragraph breaks in context survive.
    for raw_line in value.lines() {
        if raw_line.trim().is_empty() {
            out.push_str("\r\n");
            continue;
        }
        for line in textwrap::wrap(raw_line, wrap_width) {
            out.push_str(&format!("    {line}\r\n"));
        }
    }
    out.push_str("\r\n");
}
