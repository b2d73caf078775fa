//! Trial summary table and per-trial record access.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{TableError, TrialError};
use crate::literal::{Literal, LiteralError, Number};

/// Columns the summary table must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "name",
    "agent_type",
    "agent_start_position",
    "tree_visibility",
    "tree_rewards",
    "tree_positions",
    "best_path",
    "path_reached_reward_goal",
    "path_true_reward",
];

/// A grid coordinate. Displays as `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct Position {
    pub row: i64,
    pub col: i64,
}

impl Position {
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to `other`, saturating at `u64::MAX`.
    pub fn distance(self, other: Position) -> u64 {
        self.row
            .abs_diff(other.row)
            .saturating_add(self.col.abs_diff(other.col))
    }
}

impl From<(i64, i64)> for Position {
    fn from((row, col): (i64, i64)) -> Self {
        Self::new(row, col)
    }
}

impl From<Position> for (i64, i64) {
    fn from(position: Position) -> Self {
        (position.row, position.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The agent's belief trait about unseen reward sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Optimist,
    Pessimist,
}

impl AgentType {
    /// The counterfactual trait.
    pub fn flipped(self) -> Self {
        match self {
            AgentType::Optimist => AgentType::Pessimist,
            AgentType::Pessimist => AgentType::Optimist,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentType::Optimist => "optimist",
            AgentType::Pessimist => "pessimist",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "optimist" => Ok(AgentType::Optimist),
            "pessimist" => Ok(AgentType::Pessimist),
            other => Err(other.to_string()),
        }
    }
}

/// One parsed trial. Visibility, rewards and positions are parallel.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub trial_name: String,
    pub agent_type: AgentType,
    pub start_position: Position,
    pub tree_visibility: Vec<bool>,
    pub tree_rewards: Vec<f64>,
    pub tree_positions: Vec<Position>,
    pub best_path: Vec<Position>,
    pub reached_reward_goal: bool,
    pub path_true_reward: Number,
}

/// A table row as stored on disk, before literal parsing.
#[derive(Debug, Clone, Deserialize)]
struct RawTrialRow {
    name: String,
    agent_type: String,
    agent_start_position: String,
    tree_visibility: String,
    tree_rewards: String,
    tree_positions: String,
    best_path: String,
    path_reached_reward_goal: String,
    path_true_reward: String,
}

/// The input summary table, indexed by trial name.
#[derive(Debug, Default)]
pub struct TrialTable {
    rows: Vec<RawTrialRow>,
    index: HashMap<String, Vec<usize>>,
    /// Any row's `path_true_reward` is a float, so the whole column is.
    float_rewards: bool,
}

impl TrialTable {
    /// Read the table at `path`.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        debug!(path = %path.display(), rows = table.len(), "loaded trial table");
        Ok(table)
    }

    /// Read a table from any CSV source with a header row.
    ///
    /// Header names are trimmed. `path_true_reward` is typed per column: if
    /// any row holds a float, every row's value is read as a float.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(TableError::MissingColumn(column.to_string()));
            }
        }

        let mut table = TrialTable::default();
        for row in csv.deserialize::<RawTrialRow>() {
            let row = row?;
            let idx = table.rows.len();
            table.index.entry(row.name.clone()).or_default().push(idx);
            table.rows.push(row);
        }

        table.float_rewards = table.rows.iter().any(|row| {
            matches!(Number::parse(&row.path_true_reward), Ok(Number::Float(_)))
        });

        for (name, rows) in &table.index {
            if rows.len() > 1 {
                warn!(trial = %name, count = rows.len(), "duplicate trial name in table");
            }
        }

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up one trial and parse its structured columns.
    ///
    /// Fails if the name is absent or appears more than once.
    pub fn get_trial_info(&self, trial_name: &str) -> Result<TrialRecord, TrialError> {
        let row = match self.index.get(trial_name).map(Vec::as_slice) {
            None | Some([]) => return Err(TrialError::NotFound(trial_name.to_string())),
            Some([idx]) => &self.rows[*idx],
            Some(rows) => {
                return Err(TrialError::Duplicate {
                    trial_name: trial_name.to_string(),
                    count: rows.len(),
                });
            }
        };
        let mut record = parse_row(row)?;
        if self.float_rewards {
            record.path_true_reward = record.path_true_reward.to_float();
        }
        Ok(record)
    }
}

fn parse_row(row: &RawTrialRow) -> Result<TrialRecord, TrialError> {
    let trial_name = row.name.as_str();
    let parse = |field: &'static str, text: &str| {
        Literal::parse(text).map_err(|source| field_error(trial_name, field, source))
    };

    let agent_type = row
        .agent_type
        .parse::<AgentType>()
        .map_err(|value| TrialError::UnknownAgent {
            trial_name: trial_name.to_string(),
            value,
        })?;

    let start_position = parse("agent_start_position", &row.agent_start_position)?
        .as_position()
        .map_err(|e| field_error(trial_name, "agent_start_position", e))?;

    let tree_visibility: Vec<bool> = parse("tree_visibility", &row.tree_visibility)?
        .as_seq()
        .and_then(|flags| flags.iter().map(visibility_flag).collect())
        .map_err(|e| field_error(trial_name, "tree_visibility", e))?;

    let tree_rewards = parse("tree_rewards", &row.tree_rewards)?
        .as_f64_vec()
        .map_err(|e| field_error(trial_name, "tree_rewards", e))?;

    let tree_positions = parse("tree_positions", &row.tree_positions)?
        .as_positions()
        .map_err(|e| field_error(trial_name, "tree_positions", e))?;

    let best_path = parse("best_path", &row.best_path)?
        .as_positions()
        .map_err(|e| field_error(trial_name, "best_path", e))?;

    let reached_reward_goal = parse_outcome(&row.path_reached_reward_goal)
        .map_err(|e| field_error(trial_name, "path_reached_reward_goal", e))?;

    let path_true_reward = Number::parse(&row.path_true_reward)
        .map_err(|e| field_error(trial_name, "path_true_reward", e))?;

    if tree_visibility.len() != tree_rewards.len() || tree_rewards.len() != tree_positions.len() {
        return Err(TrialError::LengthMismatch {
            trial_name: trial_name.to_string(),
            visibility: tree_visibility.len(),
            rewards: tree_rewards.len(),
            positions: tree_positions.len(),
        });
    }

    Ok(TrialRecord {
        trial_name: trial_name.to_string(),
        agent_type,
        start_position,
        tree_visibility,
        tree_rewards,
        tree_positions,
        best_path,
        reached_reward_goal,
        path_true_reward,
    })
}

fn field_error(trial_name: &str, field: &'static str, source: LiteralError) -> TrialError {
    TrialError::FieldParse {
        trial_name: trial_name.to_string(),
        field,
        source,
    }
}

fn visibility_flag(flag: &Literal) -> Result<bool, LiteralError> {
    match flag {
        Literal::Int(0) | Literal::Bool(false) => Ok(false),
        Literal::Int(1) | Literal::Bool(true) => Ok(true),
        Literal::Int(_) => Err(LiteralError::TypeMismatch {
            expected: "0 or 1",
            found: "int",
        }),
        _ => Err(LiteralError::TypeMismatch {
            expected: "0 or 1",
            found: "non-integer",
        }),
    }
}

fn parse_outcome(text: &str) -> Result<bool, LiteralError> {
    match text.trim() {
        "True" | "true" | "1" => Ok(true),
        "False" | "false" | "0" => Ok(false),
        _ => Err(LiteralError::TypeMismatch {
            expected: "boolean",
            found: "text",
        }),
    }
}
