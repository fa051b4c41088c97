//! Interactive browsing session.
//!
//! Lines starting with `:` are commands; any other line is search text.
//! Input arrives a whole line at a time, so search text is flushed on Enter
//! and never waits out the debounce delay. Notices print once, after the
//! line that raised them.

use crate::app::AppResult;
use crate::render;
use bpcatalog_core::export::{self, ExportFormat};
use bpcatalog_core::view::{NoticeDurations, NoticeKind};
use bpcatalog_core::{
    ArticleRecord, CatalogConfig, CatalogStats, CatalogStore, ContributionOutcome,
    ContributionService, EntryDraft, GitHubClient, LocalStateRepository, ViewMode, ViewState,
    YearFilter,
};
use log::info;
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  <text>               search (blank clears)
  :decade D | all      filter by decade, e.g. 1990 or 1990s
  :year Y | all        filter by exact year
  :process P | all     filter by process tag
  :author A | all      filter by author
  :view table|cards|stats
  :show N              open record N of the current list
  :eq                  toggle static/recursive equation
  :back                leave the detail view
  :export csv|json [FILE]
  :add TITLE | AUTHORS | YEAR | VOLUME | ISSUE | PROCESS | EQUATION
  :clear               reset all filters
  :help
  :quit";

/// Outcome of one input line.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Redraw,
    Quiet,
    Contribute(EntryDraft),
    Quit,
}

/// Runs the session until `:quit` or end of input.
pub async fn run<R: LocalStateRepository>(
    config: &CatalogConfig,
    store: &mut CatalogStore<R>,
    service: &ContributionService<GitHubClient>,
) -> AppResult<()> {
    let mut state = ViewState::new(
        config.search_debounce(),
        NoticeDurations {
            success: config.notice_success(),
            error: config.notice_error(),
            pull_request: config.notice_error(),
        },
    );
    info!("event=browse_start module=cli status=ok records={}", store.len());

    println!("{}", screen(&state, store.records()));
    println!("type :help for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let now = Instant::now();
        state.tick(now);
        match handle_line(&mut state, store.records(), line.trim_end(), now) {
            Step::Quit => break,
            Step::Quiet => {}
            Step::Redraw => println!("{}", screen(&state, store.records())),
            Step::Contribute(draft) => {
                contribute(&mut state, store, service, draft, now).await;
                println!("{}", screen(&state, store.records()));
            }
        }
        for notice in state.notices_mut().take_active(now) {
            println!("{}", render::notice(&notice));
        }
    }

    info!("event=browse_end module=cli status=ok");
    Ok(())
}

fn handle_line(
    state: &mut ViewState,
    records: &[ArticleRecord],
    line: &str,
    now: Instant,
) -> Step {
    let Some(command) = line.strip_prefix(':') else {
        state.type_search(line, now);
        state.submit_search();
        return Step::Redraw;
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "q" | "quit" | "exit" => Step::Quit,
        "help" | "h" => {
            println!("{HELP}");
            Step::Quiet
        }
        "decade" => {
            match YearFilter::parse_decade(arg) {
                Ok(year) => state.criteria_mut().year = year,
                Err(err) => state.notices_mut().error(err.to_string(), now),
            }
            Step::Redraw
        }
        "year" => {
            match YearFilter::parse_year(arg) {
                Ok(year) => state.criteria_mut().year = year,
                Err(err) => state.notices_mut().error(err.to_string(), now),
            }
            Step::Redraw
        }
        "process" => {
            state.criteria_mut().set_process(arg);
            Step::Redraw
        }
        "author" => {
            state.criteria_mut().set_author(arg);
            Step::Redraw
        }
        "view" => {
            match ViewMode::parse(arg) {
                Some(mode) if mode != ViewMode::Detail => state.set_mode(mode),
                _ => state
                    .notices_mut()
                    .error(format!("unknown view `{arg}`; use table, cards or stats"), now),
            }
            Step::Redraw
        }
        "show" => {
            let visible = state.visible(records);
            let picked = arg
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| visible.get(index))
                .map(|record| record.key());
            match picked {
                Some(key) => state.select(key),
                None => state
                    .notices_mut()
                    .error(format!("no record number `{arg}` in the current list"), now),
            }
            Step::Redraw
        }
        "eq" => {
            state.toggle_equation();
            Step::Redraw
        }
        "back" => {
            state.close_detail();
            Step::Redraw
        }
        "clear" => {
            state.clear_filters();
            Step::Redraw
        }
        "export" => {
            export_from_session(state, records, arg, now);
            Step::Quiet
        }
        "add" => match parse_add(arg) {
            Some(draft) => Step::Contribute(draft),
            None => {
                state.notices_mut().error(
                    "usage: :add TITLE | AUTHORS | YEAR | VOLUME | ISSUE [| PROCESS | EQUATION]",
                    now,
                );
                Step::Quiet
            }
        },
        other => {
            state
                .notices_mut()
                .error(format!("unknown command `:{other}`; type :help"), now);
            Step::Quiet
        }
    }
}

async fn contribute<R: LocalStateRepository>(
    state: &mut ViewState,
    store: &mut CatalogStore<R>,
    service: &ContributionService<GitHubClient>,
    draft: EntryDraft,
    now: Instant,
) {
    let record = match draft.into_record() {
        Ok(record) => record,
        Err(err) => {
            state.notices_mut().error(err.to_string(), now);
            return;
        }
    };
    if let Err(err) = state.begin_submission() {
        state.notices_mut().error(err.to_string(), now);
        return;
    }
    let result = service.contribute(store, record).await;
    state.finish_submission();

    let notices = state.notices_mut();
    match result {
        Ok(outcome @ ContributionOutcome::Submitted(_)) => {
            notices.push(NoticeKind::PullRequest, outcome.message(), now)
        }
        Ok(outcome) if outcome.is_warning() => notices.error(outcome.message(), now),
        Ok(outcome) => notices.success(outcome.message(), now),
        Err(err) => notices.error(err.to_string(), now),
    }
}

/// Parses `:add` arguments: `title | authors | year | volume | issue | process | equation`.
fn parse_add(arg: &str) -> Option<EntryDraft> {
    let fields = arg.split('|').map(str::trim).collect::<Vec<_>>();
    if fields.len() < 5 {
        return None;
    }
    let field = |index: usize| fields.get(index).copied().unwrap_or_default().to_string();
    Some(EntryDraft {
        title: field(0),
        authors: field(1),
        year: field(2),
        volume: field(3),
        issue: field(4),
        process: field(5),
        static_equation: field(6),
        ..EntryDraft::default()
    })
}

fn export_from_session(
    state: &mut ViewState,
    records: &[ArticleRecord],
    arg: &str,
    now: Instant,
) {
    let (format_name, path) = match arg.split_once(char::is_whitespace) {
        Some((format, path)) => (format, Some(path.trim())),
        None => (arg, None),
    };
    let Some(format) = ExportFormat::parse(format_name) else {
        state
            .notices_mut()
            .error("usage: :export csv|json [FILE]", now);
        return;
    };
    let path = path
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format.default_file_name()));

    let visible = state.visible(records);
    let result = export::render(format, &visible, records)
        .and_then(|contents| export::write_export(&path, &contents));
    match result {
        Ok(()) => state
            .notices_mut()
            .success(format!("Exported to {}", path.display()), now),
        Err(err) => state.notices_mut().error(err.to_string(), now),
    }
}

fn screen(state: &ViewState, records: &[ArticleRecord]) -> String {
    match state.mode() {
        ViewMode::Table => render::table(&state.visible(records)),
        ViewMode::Cards => render::cards(&state.visible(records)),
        ViewMode::Stats => render::stats(&CatalogStats::compute(records)),
        ViewMode::Detail => match state.selected_record(records) {
            Some(record) => render::detail(record, state.equation(), render::SwitchHint::Command),
            None => render::table(&state.visible(records)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{handle_line, parse_add, Step};
    use bpcatalog_core::{ArticleRecord, ViewMode, ViewState, YearFilter};
    use std::time::Instant;

    fn records() -> Vec<ArticleRecord> {
        vec![
            ArticleRecord::new("Resurgence of operant behavior", 1995, 64, 1)
                .with_process("Resurgence"),
            ArticleRecord::new("Matching law", 1970, 13, 2).with_process("Matching Law"),
        ]
    }

    #[test]
    fn plain_text_searches_immediately_on_enter() {
        let records = records();
        let mut state = ViewState::default();
        let step = handle_line(&mut state, &records, "resurgence", Instant::now());
        assert_eq!(step, Step::Redraw);
        assert_eq!(state.visible(&records).len(), 1);
        assert!(!state.debouncer().is_pending());
    }

    #[test]
    fn show_opens_detail_of_visible_record() {
        let records = records();
        let mut state = ViewState::default();
        let now = Instant::now();
        handle_line(&mut state, &records, ":decade 1970s", now);
        assert_eq!(state.criteria().year, YearFilter::Decade(1970));

        handle_line(&mut state, &records, ":show 1", now);
        assert_eq!(state.mode(), ViewMode::Detail);
        assert_eq!(
            state.selected().map(|key| key.title.as_str()),
            Some("Matching law")
        );
    }

    #[test]
    fn add_parses_pipe_separated_fields() {
        let draft = parse_add("Delay discounting | Green & Myerson | 2004 | 81 | 3 | Discounting")
            .expect("five or more fields parse");
        assert_eq!(draft.authors, "Green & Myerson");
        assert_eq!(draft.issue, "3");
        assert_eq!(draft.process, "Discounting");
        assert_eq!(draft.static_equation, "");
        assert!(parse_add("only | three | fields").is_none());
    }

    #[test]
    fn bad_input_becomes_error_notice() {
        let records = records();
        let mut state = ViewState::default();
        let now = Instant::now();
        handle_line(&mut state, &records, ":show 9", now);
        handle_line(&mut state, &records, ":decade 1995", now);
        assert_eq!(state.notices().active(now).count(), 2);
        assert_eq!(state.notices_mut().take_active(now).len(), 2);
        assert_eq!(state.notices().active(now).count(), 0);
        assert_eq!(handle_line(&mut state, &records, ":quit", now), Step::Quit);
    }
}
