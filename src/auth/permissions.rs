//! Role-to-path allow-list for the `/panel` area.
//!
//! The table is built once at startup and shared read-only between requests.
//! A role may visit a path when the path equals one of its prefixes or lies
//! below one (`prefix` followed by `/`). Prefixes are plain strings, not patterns.

use std::collections::HashMap;
use std::path::Path;

use super::errors::PermissionsError;

/// Allowed path prefixes per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePermissions {
    roles: HashMap<String, Vec<String>>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "ADMIN",
        &[
            "/panel/admin",
            "/panel/universidades",
            "/panel/programas",
            "/panel/grupos",
            "/panel/profesores",
            "/panel/asignaturas",
            "/panel/instituciones",
            "/panel/estudiantes",
            "/panel/roles",
            "/panel/usuarios",
            "/panel/horarios",
            "/panel/notas",
            "/panel/asistencias",
            "/panel/inicio",
        ],
    ),
    ("PROFESOR", &["/panel/profesor", "/panel/inicio"]),
    ("ESTUDIANTE", &["/panel/estudiante", "/panel/inicio"]),
];

impl RolePermissions {
    /// Build a table, rejecting prefixes that could never match a request path.
    pub fn new(roles: HashMap<String, Vec<String>>) -> Result<Self, PermissionsError> {
        for (role, prefixes) in &roles {
            for prefix in prefixes {
                if !prefix.starts_with('/') || (prefix.len() > 1 && prefix.ends_with('/')) {
                    return Err(PermissionsError::InvalidPrefix {
                        role: role.clone(),
                        prefix: prefix.clone(),
                    });
                }
            }
        }
        Ok(Self { roles })
    }

    /// The table the application ships with.
    pub fn builtin() -> Self {
        let roles = BUILTIN
            .iter()
            .map(|(role, prefixes)| {
                (
                    role.to_string(),
                    prefixes.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();
        Self { roles }
    }

    /// Parse a JSON object of the form `{"ROLE": ["/panel/a", "/panel/b"]}`.
    pub fn from_json(json: &str) -> Result<Self, PermissionsError> {
        let roles: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::new(roles)
    }

    /// Load a JSON table from disk.
    pub fn load(path: &Path) -> Result<Self, PermissionsError> {
        let json = std::fs::read_to_string(path).map_err(|source| PermissionsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Allowed prefixes for a role, empty for roles the table doesn't know.
    pub fn allowed_prefixes(&self, role: &str) -> &[String] {
        self.roles.get(role).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn allows(&self, role: &str, path: &str) -> bool {
        self.allowed_prefixes(role)
            .iter()
            .any(|prefix| path_within(path, prefix))
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}

/// True when `path` is `prefix` itself or a sub-path of it.
pub fn path_within(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
