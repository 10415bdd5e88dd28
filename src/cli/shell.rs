//! Interactive session over a [`TaskStore`].
//!
//! Filter and search live only as long as the session. Task positions
//! typed into the shell refer to the list as last rendered, so `toggle 1`
//! always means the first task on screen.

use std::io::{self, BufRead, Write};

use log::debug;

use crate::cli::output::{
    format_counts, format_filter_tabs, format_listing, number_in_order, parse_status_filter,
    resolve_task_ref,
};
use crate::io::kv::KeyValueStore;
use crate::ops::validate::{prepare_edit, validate_title};
use crate::store::TaskStore;

pub const PROMPT: &str = "th> ";

const HELP: &str = "\
commands:
  add <title>            add a task to the top of the list
  toggle <n|id>          mark complete / open again
  edit <n|id> <title>    change the title of an open task
  delete <n|id>          delete a task
  clear                  delete all completed tasks
  filter <all|active|completed>
  search [text]          filter by title; no text clears the search
  list                   show the list
  stats                  show counts
  help                   show this help
  quit                   leave the shell";

/// What a line asked the session to do next
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Render,
    /// A mutation wrote to the store; render and report a failed write
    Commit,
    Quit,
}

/// Read commands from `input` until EOF or `quit`, writing to `out`.
pub fn run<S, R, W>(store: &mut TaskStore<S>, input: R, mut out: W) -> io::Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    render(store, &mut out)?;
    write!(out, "{}", PROMPT)?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        match execute(store, line.trim(), &mut out)? {
            Step::Quit => return Ok(()),
            Step::Render | Step::Commit => render(store, &mut out)?,
            Step::Continue => {}
        }
        write!(out, "{}", PROMPT)?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

fn render<S: KeyValueStore, W: Write>(store: &TaskStore<S>, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", format_filter_tabs(store.filter(), &store.counts()))?;
    if !store.search().trim().is_empty() {
        writeln!(out, "search: {}", store.search())?;
    }
    for line in format_listing(&number_in_order(store.visible()), &store.counts(), false, None) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn execute<S: KeyValueStore, W: Write>(
    store: &mut TaskStore<S>,
    line: &str,
    out: &mut W,
) -> io::Result<Step> {
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };
    debug!("event=shell_command module=shell cmd={}", cmd);

    let step = match cmd {
        "" => Step::Continue,
        "quit" | "exit" | "q" => Step::Quit,
        "help" | "?" => {
            writeln!(out, "{}", HELP)?;
            Step::Continue
        }
        "list" | "ls" => Step::Render,
        "stats" => {
            writeln!(out, "{}", format_counts(&store.counts()))?;
            Step::Continue
        }
        "add" => match validate_title(rest) {
            Ok(title) => {
                store.add(title);
                Step::Commit
            }
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                Step::Continue
            }
        },
        "toggle" | "done" => match visible_id(store, rest) {
            Some(id) => committed(store.toggle(&id)),
            None => not_found(out, rest)?,
        },
        "delete" | "rm" => match visible_id(store, rest) {
            Some(id) => committed(store.delete(&id)),
            None => not_found(out, rest)?,
        },
        "edit" => {
            let (task_ref, draft) = match rest.split_once(char::is_whitespace) {
                Some((r, d)) => (r, d),
                None => (rest, ""),
            };
            let target = resolve_task_ref(store.visible(), task_ref)
                .map(|t| (t.id.clone(), t.title.clone(), t.completed));
            match target {
                Some((_, _, true)) => {
                    writeln!(out, "cannot edit a completed task: {}", task_ref)?;
                    Step::Continue
                }
                Some((id, current, false)) => match prepare_edit(&current, draft) {
                    Some(title) => match validate_title(&title) {
                        Ok(title) => committed(store.edit(&id, &title)),
                        Err(e) => {
                            writeln!(out, "error: {}", e)?;
                            Step::Continue
                        }
                    },
                    None => {
                        writeln!(out, "title unchanged")?;
                        Step::Continue
                    }
                },
                None => not_found(out, task_ref)?,
            }
        }
        "clear" => {
            let removed = store.clear_completed();
            writeln!(out, "cleared {} completed task(s)", removed)?;
            committed(removed > 0)
        }
        "filter" => match parse_status_filter(rest) {
            Ok(filter) => {
                store.set_filter(filter);
                Step::Render
            }
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                Step::Continue
            }
        },
        "search" => {
            store.set_search(rest);
            Step::Render
        }
        other => {
            writeln!(out, "unknown command '{}' (try `help`)", other)?;
            Step::Continue
        }
    };

    if step == Step::Commit && !store.last_persisted() {
        writeln!(out, "warning: change not saved")?;
    }
    Ok(step)
}

/// `Commit` if the store wrote, else a plain re-render
fn committed(wrote: bool) -> Step {
    if wrote { Step::Commit } else { Step::Render }
}

fn visible_id<S: KeyValueStore>(store: &TaskStore<S>, task_ref: &str) -> Option<String> {
    resolve_task_ref(store.visible(), task_ref).map(|t| t.id.clone())
}

fn not_found<W: Write>(out: &mut W, task_ref: &str) -> io::Result<Step> {
    writeln!(out, "task not found: {}", task_ref)?;
    Ok(Step::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv::MemoryStore;
    use crate::io::slot::PersistentSlot;
    use crate::model::filter::StatusFilter;

    fn new_store() -> TaskStore<MemoryStore> {
        TaskStore::open(PersistentSlot::new(MemoryStore::new(), "tasks"))
    }

    fn run_script(store: &mut TaskStore<MemoryStore>, script: &str) -> String {
        let mut out = Vec::new();
        run(store, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn titles(store: &TaskStore<MemoryStore>) -> Vec<&str> {
        store.tasks().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn empty_session_shows_empty_state() {
        let mut store = new_store();
        let out = run_script(&mut store, "quit\n");
        assert!(out.contains("No tasks yet!"));
    }

    #[test]
    fn add_toggle_filter_search() {
        let mut store = new_store();
        let out = run_script(
            &mut store,
            "add Buy milk\nadd Walk dog\ntoggle 2\nfilter active\n",
        );
        assert_eq!(titles(&store), vec!["Walk dog", "Buy milk"]);
        assert!(store.tasks()[1].completed);
        assert_eq!(store.filter(), StatusFilter::Active);
        assert!(out.contains("[Active 1]"));

        run_script(&mut store, "filter all\nsearch MILK\n");
        let visible: Vec<_> = store.visible().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(visible, vec!["Buy milk"]);

        run_script(&mut store, "search\n");
        assert_eq!(store.visible().len(), 2);
    }

    #[test]
    fn positions_follow_visible_list() {
        let mut store = new_store();
        run_script(&mut store, "add first\nadd second\nadd third\nfilter all\nsearch first\ndelete 1\n");
        assert_eq!(titles(&store), vec!["third", "second"]);
    }

    #[test]
    fn empty_add_is_rejected() {
        let mut store = new_store();
        let out = run_script(&mut store, "add    \n");
        assert!(out.contains("error: Task title cannot be empty"));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn edit_rules() {
        let mut store = new_store();
        let out = run_script(&mut store, "add Walk dog\nedit 1 Walk dog\nedit 1   \n");
        assert_eq!(out.matches("title unchanged").count(), 2);
        run_script(&mut store, "edit 1 Walk the dog\n");
        assert_eq!(titles(&store), vec!["Walk the dog"]);
    }

    #[test]
    fn clear_and_unknown_refs() {
        let mut store = new_store();
        let out = run_script(&mut store, "add a\nadd b\ntoggle 1\nclear\ntoggle 9\nbogus\n");
        assert!(out.contains("cleared 1 completed task(s)"));
        assert!(out.contains("task not found: 9"));
        assert!(out.contains("unknown command 'bogus'"));
        assert_eq!(titles(&store), vec!["a"]);
    }

    #[test]
    fn quit_stops_reading() {
        let mut store = new_store();
        run_script(&mut store, "add a\nquit\nadd b\n");
        assert_eq!(titles(&store), vec!["a"]);
    }

    #[test]
    fn unsaved_warning_only_after_mutation() {
        let mut store = TaskStore::open(PersistentSlot::new(MemoryStore::with_quota(64), "tasks"));
        let out = run_script(
            &mut store,
            "add a title long enough that the encoded list overflows the quota\nlist\nfilter active\nsearch title\nstats\n",
        );
        assert_eq!(out.matches("warning: change not saved").count(), 1);
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn completed_tasks_cannot_be_edited() {
        let mut store = new_store();
        let out = run_script(&mut store, "add Walk dog\ntoggle 1\nedit 1 Walk the dog\n");
        assert!(out.contains("cannot edit a completed task: 1"));
        assert_eq!(titles(&store), vec!["Walk dog"]);

        run_script(&mut store, "toggle 1\nedit 1 Walk the dog\n");
        assert_eq!(titles(&store), vec!["Walk the dog"]);
    }

    #[test]
    fn bad_filter_keeps_current() {
        let mut store = new_store();
        let out = run_script(&mut store, "filter someday\n");
        assert!(out.contains("unknown filter 'someday'"));
        assert_eq!(store.filter(), StatusFilter::All);
    }
}
