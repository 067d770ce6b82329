use super::TerminalView;
use crate::search::SearchController;
use crate::viewport::VisibilityScheduler;
use anyhow::Result;
use rustyline::{history::DefaultHistory, Editor};
use std::sync::Arc;
use tracing::debug;

const PROMPT: &str = "search> ";

const HELP: &str = "\
Type a query and press Enter to filter (an empty line shows everything).
  :n       next page
  :p       previous page
  :r       redraw (shows artwork that arrived meanwhile)
  :stats   artwork cache statistics
  :help    this message
  :q       quit";

#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Query(String),
    NextPage,
    PrevPage,
    Redraw,
    Stats,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> ReplCommand {
    match line.trim() {
        ":n" | ":next" => ReplCommand::NextPage,
        ":p" | ":prev" => ReplCommand::PrevPage,
        ":r" | ":redraw" => ReplCommand::Redraw,
        ":stats" => ReplCommand::Stats,
        ":h" | ":help" => ReplCommand::Help,
        ":q" | ":quit" => ReplCommand::Quit,
        query => ReplCommand::Query(query.to_string()),
    }
}

/// Interactive search loop.
///
/// Blocking: run it on a blocking thread of the tokio runtime, since
/// visibility reports spawn lookup tasks.
pub struct Repl {
    controller: Arc<SearchController>,
    scheduler: Arc<VisibilityScheduler>,
    view: Arc<TerminalView>,
}

impl Repl {
    pub fn new(
        controller: Arc<SearchController>,
        scheduler: Arc<VisibilityScheduler>,
        view: Arc<TerminalView>,
    ) -> Self {
        Self {
            controller,
            scheduler,
            view,
        }
    }

    /// Tells the scheduler which placeholders are in the observation region.
    fn report_visible(&self) {
        let visible = self.view.intersecting_placeholders();
        debug!("{} placeholders in observation region", visible.len());
        self.scheduler.report_visible(visible);
    }

    /// Applies one command. Returns false when the loop should stop.
    pub fn execute(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Query(query) => {
                self.controller.apply_query(&query);
            }
            ReplCommand::NextPage => {
                self.view.scroll_pages(1);
            }
            ReplCommand::PrevPage => {
                self.view.scroll_pages(-1);
            }
            ReplCommand::Redraw => {}
            ReplCommand::Stats => {
                let stats = self.scheduler.cache().stats();
                println!(
                    "artwork found: {}, empty: {}, in flight: {}, lookups: {}",
                    stats.found, stats.empty, stats.in_flight, stats.lookups_dispatched
                );
                return true;
            }
            ReplCommand::Help => {
                println!("{}", HELP);
                return true;
            }
            ReplCommand::Quit => return false,
        }
        self.report_visible();
        print!("{}", self.view.draw());
        true
    }

    pub fn run(&self) -> Result<()> {
        println!("{}\n", HELP);
        self.report_visible();
        print!("{}", self.view.draw());

        let mut rl = Editor::<(), DefaultHistory>::new()?;
        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    if !self.execute(parse_command(&line)) {
                        break;
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    println!("CTRL-D: exiting.");
                    break;
                }
                Err(e) => {
                    println!("Error: {:?}", e);
                    break;
                }
            }
        }
        Ok(())
    }
}
