use crate::config::Config;
use crate::dataset::Dataset;
use crate::parsers::{self, epoch};
use crate::prompt::Prompter;
use regex::{Regex, RegexBuilder};
use std::io;

/// Picks the column holding timestamps, by keyword or by asking.
pub struct ColumnSelector {
    keywords: Vec<Regex>,
    preview_samples: usize,
}

enum Dialog {
    Presenting,
    AwaitingConfirmation(usize),
    Done(Option<usize>),
}

impl ColumnSelector {
    pub fn new(config: &Config) -> Result<Self, regex::Error> {
        let keywords = config
            .priority_keywords
            .iter()
            .map(|k| {
                RegexBuilder::new(&regex::escape(k))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            keywords,
            preview_samples: config.preview_samples,
        })
    }

    /// The first keyword matching any column wins; within it, the first
    /// matching column in the given order.
    pub fn guess_timestamp_column<'c>(&self, columns: &'c [String]) -> Option<&'c str> {
        self.keywords.iter().find_map(|kw| {
            columns
                .iter()
                .find(|col| kw.is_match(col))
                .map(String::as_str)
        })
    }

    /// Interactive selection with preview and confirmation. Rejecting the
    /// preview starts over; running out of input counts as declining.
    pub fn select_timestamp_column(
        &self,
        dataset: &Dataset,
        prompter: &mut dyn Prompter,
    ) -> io::Result<Option<String>> {
        if dataset.is_empty() {
            prompter.say("Dataset is empty. Cannot determine timestamp column.")?;
            return Ok(None);
        }

        let mut state = Dialog::Presenting;
        loop {
            state = match state {
                Dialog::Presenting => match self.present(dataset, prompter)? {
                    Some(idx) => Dialog::AwaitingConfirmation(idx),
                    None => Dialog::Done(None),
                },
                Dialog::AwaitingConfirmation(idx) => {
                    self.preview(dataset, idx, prompter)?;
                    match prompter.ask("Proceed with this timestamp field? (y/n): ")? {
                        Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                            Dialog::Done(Some(idx))
                        }
                        Some(_) => Dialog::Presenting,
                        None => Dialog::Done(None),
                    }
                }
                Dialog::Done(choice) => {
                    return Ok(choice.map(|idx| dataset.columns()[idx].clone()));
                }
            };
        }
    }

    fn present(&self, dataset: &Dataset, prompter: &mut dyn Prompter) -> io::Result<Option<usize>> {
        let columns = dataset.columns();

        prompter.say("")?;
        prompter.say("CSV headers with sample values (row 1):")?;
        for (i, col) in columns.iter().enumerate() {
            let sample = dataset.first_row_value(i).unwrap_or_default();
            prompter.say(&format!("{}. {} - {}", i + 1, col, sample))?;
        }

        let suggestion = self
            .guess_timestamp_column(columns)
            .and_then(|name| dataset.column_index(name));
        let question = match suggestion {
            Some(idx) => {
                let sample = dataset.first_row_value(idx).unwrap_or("N/A");
                prompter.say("")?;
                prompter.say(&format!(
                    "Suggested timestamp column: {} (e.g. {})",
                    columns[idx], sample
                ))?;
                format!(
                    "Select timestamp column, either in epoch time or ISO-8601 \
                     [press Enter to accept '{}']: ",
                    columns[idx]
                )
            }
            None => "Select timestamp column, either in epoch time or ISO-8601: ".to_string(),
        };

        loop {
            let Some(answer) = prompter.ask(&question)? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                if let Some(idx) = suggestion {
                    return Ok(Some(idx));
                }
            } else if let Ok(n) = answer.parse::<usize>() {
                if (1..=columns.len()).contains(&n) {
                    return Ok(Some(n - 1));
                }
            }
            prompter.say("Invalid selection. Try again.")?;
        }
    }

    fn preview(&self, dataset: &Dataset, idx: usize, prompter: &mut dyn Prompter) -> io::Result<()> {
        prompter.say("")?;
        prompter.say(&format!("Sample values from '{}':", dataset.columns()[idx]))?;
        for sample in dataset.non_empty_samples(idx, self.preview_samples) {
            let line = match epoch::preview(sample) {
                Some(dt) => format!("  - {} → {}", sample, parsers::format_canonical(&dt)),
                None => format!("  - {}", sample),
            };
            prompter.say(&line)?;
        }
        prompter.say("Make sure these are valid ISO-8601 timestamps.")
    }
}
