// Output formatting and display for CLI

use crate::descriptor::{DescriptorSet, ProcessDescriptor};
use colored::*;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

/// Print the result of a successful `check` run
pub fn print_check_report(path: &Path, set: &DescriptorSet) {
    println!(
        "{}",
        format!("✓ {} is valid", path.display()).green().bold()
    );

    if set.is_empty() {
        println!("{}", "  (no processes declared)".yellow());
        return;
    }

    for descriptor in set {
        let rotation = if descriptor.rotation_enabled() {
            "log rotation on".to_string()
        } else {
            "log rotation off".to_string()
        };
        println!(
            "  {} {} ({} instance(s), {})",
            "•".bold(),
            descriptor.name.cyan(),
            descriptor.instances,
            rotation
        );
    }
}

/// Print an error message to stderr
pub fn print_error(error: &str) {
    eprintln!("{} {}", "✗ Error:".red().bold(), error);
}

/// Print a formatted table of descriptors
pub fn print_descriptor_table(set: &DescriptorSet) {
    if set.is_empty() {
        println!("{}", "No processes declared in this file".yellow());
        return;
    }

    #[derive(Tabled)]
    struct DescriptorRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Script")]
        script: String,
        #[tabled(rename = "Interpreter")]
        interpreter: String,
        #[tabled(rename = "Instances")]
        instances: String,
        #[tabled(rename = "Autorestart")]
        autorestart: String,
        #[tabled(rename = "Memory limit")]
        memory: String,
        #[tabled(rename = "Restart delay")]
        restart_delay: String,
        #[tabled(rename = "Max restarts")]
        max_restarts: String,
        #[tabled(rename = "Rotation")]
        rotation: String,
    }

    let rows: Vec<DescriptorRow> = set
        .apps()
        .iter()
        .map(|d| DescriptorRow {
            name: truncate(&d.name, 20),
            script: d.script.display().to_string(),
            interpreter: d
                .interpreter
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            instances: d.instances.to_string(),
            autorestart: if d.autorestart { "yes" } else { "no" }.to_string(),
            memory: d
                .max_memory_restart
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
            restart_delay: format!("{}ms", d.restart_delay),
            max_restarts: d.max_restarts.to_string(),
            rotation: format_rotation(d),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    println!("\n{}\n", table);
    println!(
        "{}",
        format!("Total: {} process(es)", set.len()).dimmed().italic()
    );
}

/// Summarize a descriptor's rotation policy for the table
fn format_rotation(descriptor: &ProcessDescriptor) -> String {
    match descriptor.rotation() {
        None => "off".to_string(),
        Some(rotation) => {
            let mut parts = Vec::new();
            if let Some(max_size) = rotation.max_size {
                parts.push(format!("at {}", max_size));
            }
            if let Some(retain) = rotation.retain {
                parts.push(format!("keep {}", retain));
            }
            if rotation.compress {
                parts.push("compressed".to_string());
            }
            if parts.is_empty() {
                "on".to_string()
            } else {
                parts.join(", ")
            }
        }
    }
}

/// Truncate a string to a maximum length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
