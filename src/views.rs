use crate::package::Package;
use colored::{Color, Colorize};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const RULE_WIDTH: usize = 80;

/// Keys from `brew info` that are noise in the info table.
const IGNORED_INFO_KEYS: &[&str] = &[
    "aliases",
    "artifacts",
    "bottle",
    "depends_on",
    "desc",
    "full_name",
    "full_token",
    "head_dependencies",
    "installed",
    "installed_time",
    "license",
    "link_overwrite",
    "linked_keg",
    "name",
    "oldname",
    "post_install_defined",
    "pour_bottle_only_if",
    "revision",
    "ruby_source_checksum",
    "ruby_source_path",
    "sha256",
    "tap_git_head",
    "token",
    "url",
    "url_specs",
    "urls",
    "uses_from_macos_bounds",
    "versions",
];

static LIST_KEYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"conflicts_with|dependencies|requirements|uses_from_macos|oldnames|versioned_formulae",
    )
    .expect("list key pattern is valid")
});

/// Print a section heading such as `── BREW UPDATE ─────`.
pub fn rule(title: &str) {
    println!("\n{}", rule_line(title));
}

fn rule_line(title: &str) -> String {
    let label = format!("── {} ", title.to_uppercase());
    let fill = RULE_WIDTH.saturating_sub(label.chars().count());
    format!("{}{}", label, "─".repeat(fill))
        .cyan()
        .bold()
        .to_string()
}

/// A bordered text table with per-column colors.
pub struct Table {
    title: Option<String>,
    caption: Option<String>,
    headers: Vec<String>,
    colors: Vec<Option<Color>>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[(&str, Option<Color>)]) -> Self {
        Self {
            title: None,
            caption: None,
            headers: columns.iter().map(|(name, _)| name.to_string()).collect(),
            colors: columns.iter().map(|(_, color)| *color).collect(),
            rows: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Hide the header row.
    pub fn headless(mut self) -> Self {
        self.headers.iter_mut().for_each(String::clear);
        self
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        (0..self.colors.len())
            .map(|col| {
                std::iter::once(&self.headers[col])
                    .chain(self.rows.iter().filter_map(|row| row.get(col)))
                    .flat_map(|cell| cell.lines())
                    .map(|line| line.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}", left, segments.join(mid), right)
        };

        let mut out = Vec::new();
        if let Some(title) = &self.title {
            let total = widths.iter().map(|w| w + 3).sum::<usize>() + 1;
            for line in title.lines() {
                let pad = total.saturating_sub(line.chars().count()) / 2;
                out.push(format!("{}{}", " ".repeat(pad), line.bold()));
            }
        }

        out.push(border("┌", "┬", "┐"));
        if self.headers.iter().any(|h| !h.is_empty()) {
            let cells: Vec<String> = self
                .headers
                .iter()
                .zip(&widths)
                .map(|(header, width)| pad(header, *width).bold().to_string())
                .collect();
            out.push(format!("│ {} │", cells.join(" │ ")));
            out.push(border("├", "┼", "┤"));
        }

        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                out.push(border("├", "┼", "┤"));
            }
            let height = row.iter().map(|c| c.lines().count()).max().unwrap_or(1).max(1);
            for line_no in 0..height {
                let cells: Vec<String> = widths
                    .iter()
                    .enumerate()
                    .map(|(col, width)| {
                        let text = row
                            .get(col)
                            .and_then(|cell| cell.lines().nth(line_no))
                            .unwrap_or("");
                        let padded = pad(text, *width);
                        match self.colors[col] {
                            Some(color) => padded.color(color).to_string(),
                            None => padded,
                        }
                    })
                    .collect();
                out.push(format!("│ {} │", cells.join(" │ ")));
            }
        }
        out.push(border("└", "┴", "┘"));

        if let Some(caption) = &self.caption {
            out.push(caption.dimmed().to_string());
        }

        out.join("\n")
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Table of outdated packages; `excluded_view` switches to the excluded-by-config wording.
pub fn update_table(packages: &[Package], excluded_view: bool) -> String {
    let mut table = Table::new(&[
        ("Name", Some(Color::Cyan)),
        ("Description", Some(Color::Cyan)),
        ("Type", Some(Color::Magenta)),
        ("Current version", Some(Color::Magenta)),
        ("New version", Some(Color::Green)),
    ]);

    table = if excluded_view {
        table
            .title("Updates excluded by config")
            .caption("To upgrade these packages run `brew upgrade <package>`.")
    } else {
        table.title("Available Updates")
    };

    for package in packages {
        let installed = match &package.pinned_version {
            Some(pinned) => format!("{} (pinned {})", package.installed_version(), pinned),
            None => package.installed_version().to_string(),
        };
        table.add_row(vec![
            package.name.clone(),
            package.description().to_string(),
            package.package_type.to_string(),
            installed,
            package.current.clone().unwrap_or_default(),
        ]);
    }

    table.render()
}

/// Key/value rows describing a package whose info has been loaded.
pub fn info_rows(package: &Package, top_level: bool, used_by: &[String]) -> Vec<(String, String)> {
    let mut rows = vec![
        ("Name".to_string(), full_name(package)),
        (
            "Installed version".to_string(),
            package.installed_version().to_string(),
        ),
        ("Top Level Install".to_string(), top_level.to_string()),
        ("Type".to_string(), package.package_type.to_string()),
    ];
    if !used_by.is_empty() {
        rows.push(("Used by".to_string(), used_by.join(", ")));
    }

    let Some(info) = package.info() else {
        return rows;
    };

    for (key, value) in info.entries() {
        if IGNORED_INFO_KEYS.contains(&key.as_str()) || !is_present(value) {
            continue;
        }

        let row = match key.as_str() {
            "homepage" => ("Homepage".to_string(), package.homepage().to_string()),
            "keg_only_reason" => {
                let reason = value
                    .get("reason")
                    .map(display_value)
                    .unwrap_or_else(|| display_value(value));
                (
                    "Keg only reason".to_string(),
                    reason.trim_start_matches(':').to_string(),
                )
            }
            _ if LIST_KEYS.is_match(key) => (humanize_key(key), join_strings(value)),
            _ => (humanize_key(key), display_value(value)),
        };
        rows.push(row);
    }

    rows
}

pub fn info_table(package: &Package, top_level: bool, used_by: &[String]) -> String {
    let title = if package.description().is_empty() {
        package.name.clone()
    } else {
        format!("{}\n{}", package.name, package.description())
    };

    let mut table = Table::new(&[("Key", Some(Color::Cyan)), ("Value", None)])
        .title(title)
        .headless();
    for (key, value) in info_rows(package, top_level, used_by) {
        table.add_row(vec![key, value]);
    }
    table.render()
}

fn full_name(package: &Package) -> String {
    package
        .info()
        .and_then(|info| {
            info.entries()
                .find(|(key, _)| matches!(key.as_str(), "full_name" | "full_token"))
                .and_then(|(_, value)| value.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| package.name.clone())
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => join_strings(value),
        other => other.to_string(),
    }
}

fn join_strings(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => display_value(other),
    }
}

/// `keg_only` -> `Keg only`
fn humanize_key(key: &str) -> String {
    let spaced = key.replace('_', " ").to_lowercase();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
