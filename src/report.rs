//! Human and machine readable summaries of a split.

use serde::Serialize;

use crate::split::{BranchCollision, BucketOutcome, BucketStatus, ChangeSet, Strategy};

/// How the plan is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// One branch the split would create.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedBranch {
    pub branch: String,
    pub base_directory: String,
    pub file_count: usize,
    pub files: Vec<String>,
}

/// What a split would do, computed without touching git.
#[derive(Debug, Clone, Serialize)]
pub struct SplitPlan {
    pub root_branch: String,
    pub upstream: String,
    pub strategy: Strategy,
    pub branches: Vec<PlannedBranch>,
    pub collisions: Vec<BranchCollision>,
}

impl SplitPlan {
    pub fn from_change_set(change_set: &ChangeSet, upstream: &str) -> Self {
        let root = change_set.branch_name();
        let branches = change_set
            .iter()
            .map(|list| PlannedBranch {
                branch: list.branch_name(root),
                base_directory: list.base_directory().to_string(),
                file_count: list.file_count(),
                files: list.affected_paths().to_vec(),
            })
            .collect();

        Self {
            root_branch: root.to_string(),
            upstream: upstream.to_string(),
            strategy: change_set.policy().strategy(),
            branches,
            collisions: change_set.branch_collisions(),
        }
    }

    /// Aligned table of branch, base directory and file count.
    pub fn to_table(&self) -> String {
        let rows: Vec<[String; 3]> = self
            .branches
            .iter()
            .map(|b| {
                [
                    b.branch.clone(),
                    b.base_directory.clone(),
                    b.file_count.to_string(),
                ]
            })
            .collect();

        let mut out = format_table(["BRANCH", "BASE DIRECTORY", "FILES"], &rows);

        let total: usize = self.branches.iter().map(|b| b.file_count).sum();
        out.push_str(&format!(
            "\n{} branches, {} files (split of {} against {})\n",
            self.branches.len(),
            total,
            self.root_branch,
            self.upstream
        ));

        for collision in &self.collisions {
            out.push_str(&format!(
                "[WARN] {} would be used by {}; only the first will be created\n",
                collision.branch,
                collision.base_directories.join(", ")
            ));
        }

        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The plan as printed before splitting.
    ///
    /// JSON output is the document alone so it stays parseable; the dry-run
    /// footer is only added to the table.
    pub fn render(
        &self,
        format: OutputFormat,
        dry_run: bool,
    ) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Table => {
                let mut out = self.to_table();
                if dry_run {
                    out.push_str("\nDry run complete. No branches created.\n");
                }
                Ok(out)
            }
            OutputFormat::Json => Ok(format!("{}\n", self.to_json()?)),
        }
    }
}

/// One `[DONE]`/`[SKIP]`/`[FAIL]` line per bucket.
pub fn format_outcomes(outcomes: &[BucketOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        let line = match &outcome.status {
            BucketStatus::Created => format!(
                "  [DONE] {} ({} files from {})",
                outcome.branch, outcome.file_count, outcome.base_directory
            ),
            BucketStatus::Skipped { reason } => {
                format!("  [SKIP] {}: {}", outcome.base_directory, reason)
            }
            BucketStatus::Failed { stage, error } => format!(
                "  [FAIL] {}: could not {}: {}",
                outcome.branch, stage, error
            ),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn format_table(header: [&str; 3], rows: &[[String; 3]]) -> String {
    let mut widths = header.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: [&str; 3]| {
        out.push_str(&format!(
            "{:<w0$}  {:<w1$}  {:>w2$}\n",
            cells[0],
            cells[1],
            cells[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        ));
    };

    push_row(header);
    for row in rows {
        push_row([row[0].as_str(), row[1].as_str(), row[2].as_str()]);
    }
    out
}
