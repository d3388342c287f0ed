//! Operators and department roles.

use serde::{Deserialize, Serialize};

use crate::error::{TurniError, TurniResult};

pub const DEFAULT_OPERATORS: [&str; 9] = [
    "Pestarino",
    "Maccioni",
    "Imelio",
    "Martinelli",
    "Poidomani",
    "Marmorato",
    "Pasquero",
    "Gigliotti",
    "Gemme",
];

pub const DEFAULT_ROLES: [&str; 6] = ["Sala 1", "Sala 2", "Sala 3", "Olieria", "Reparto1", "Reparto2"];

/// Ordered operator and role lists. Order matters: it drives table layout and
/// breaks ties in rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default = "default_operators")]
    pub operators: Vec<String>,

    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
}

fn default_operators() -> Vec<String> {
    DEFAULT_OPERATORS.iter().map(|s| s.to_string()).collect()
}

fn default_roles() -> Vec<String> {
    DEFAULT_ROLES.iter().map(|s| s.to_string()).collect()
}

impl Default for Roster {
    fn default() -> Self {
        Roster {
            operators: default_operators(),
            roles: default_roles(),
        }
    }
}

fn add_unique(list: &mut Vec<String>, name: &str, what: &str) -> TurniResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TurniError::Roster(format!("{what} name cannot be empty")));
    }
    if list.iter().any(|existing| existing == trimmed) {
        return Err(TurniError::Roster(format!("{what} '{trimmed}' already exists")));
    }
    list.push(trimmed.to_string());
    Ok(trimmed.to_string())
}

/// Trim names, drop blanks and keep the first of any duplicates.
pub fn clean_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut cleaned: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !cleaned.iter().any(|n| n == name) {
            cleaned.push(name.to_string());
        }
    }
    cleaned
}

fn remove_named(list: &mut Vec<String>, name: &str, what: &str) -> TurniResult<()> {
    let before = list.len();
    list.retain(|existing| existing != name);
    if list.len() == before {
        return Err(TurniError::Roster(format!("{what} '{name}' not found")));
    }
    Ok(())
}

impl Roster {
    pub fn has_operator(&self, name: &str) -> bool {
        self.operators.iter().any(|op| op == name)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role == name)
    }

    /// Add an operator, returning the trimmed name that was stored.
    pub fn add_operator(&mut self, name: &str) -> TurniResult<String> {
        add_unique(&mut self.operators, name, "Operator")
    }

    pub fn remove_operator(&mut self, name: &str) -> TurniResult<()> {
        remove_named(&mut self.operators, name, "Operator")
    }

    /// Add a role, returning the trimmed name that was stored.
    pub fn add_role(&mut self, name: &str) -> TurniResult<String> {
        add_unique(&mut self.roles, name, "Role")
    }

    pub fn remove_role(&mut self, name: &str) -> TurniResult<()> {
        remove_named(&mut self.roles, name, "Role")
    }
}
